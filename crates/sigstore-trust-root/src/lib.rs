//! Sigstore trusted root parsing
//!
//! The trusted root lists every trust anchor verification needs:
//! - certificate authorities (for signing certificates)
//! - transparency log public keys (for inclusion promises)
//! - Certificate Transparency log public keys (for embedded SCTs)
//!
//! [`TrustedRoot`] is the JSON document as published. Verification works
//! on [`TrustMaterial`], where certificates and keys have been decoded once.
//!
//! # Example
//!
//! ```no_run
//! use sigstore_trust_root::TrustedRoot;
//!
//! let root = TrustedRoot::from_file("trusted_root.json").unwrap();
//! let material = root.trust_material().unwrap();
//! println!("{} certificate authorities", material.certificate_authorities.len());
//! ```

pub mod error;
pub mod material;
pub mod trusted_root;

pub use error::{Error, Result};
pub use material::{TrustMaterial, TrustedCertificateAuthority, TrustedLog};
pub use trusted_root::{
    CertChain, CertificateAuthority, LogPublicKey, TimeWindow, TransparencyLog, TrustedRoot,
    TRUSTED_ROOT_MEDIA_TYPE_PREFIX,
};
