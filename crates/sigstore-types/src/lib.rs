//! Core types and data structures for Sigstore
//!
//! This crate provides the data structures consumed by verification: the
//! bundle format, transparency log entries, DSSE envelopes, and the artifact
//! input.

pub mod artifact;
pub mod bundle;
pub mod dsse;
pub mod encoding;
pub mod error;
pub mod hash;

pub use artifact::Artifact;
pub use bundle::{
    Bundle, Checkpoint, InclusionPromise, InclusionProof, KindVersion, LogId, MediaType,
    MessageDigest, MessageSignature, RawCertificate, SignatureContent, TransparencyLogEntry,
    VerificationMaterial, VerificationMaterialContent,
};
pub use dsse::{pae, DsseEnvelope, DsseSignature, IN_TOTO_PAYLOAD_TYPE};
pub use encoding::{
    string_i64, CanonicalizedBody, DerCertificate, DerPublicKey, LogIndex, LogKeyId, PayloadBytes,
    Sha256Hash, SignatureBytes, SignedTimestamp,
};
pub use error::{Error, Result};
pub use hash::HashAlgorithm;
