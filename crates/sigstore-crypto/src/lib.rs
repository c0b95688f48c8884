//! Cryptographic primitives for Sigstore
//!
//! This crate provides hashing, signature verification and key handling
//! using aws-lc-rs as the cryptographic backend, plus the X.509 certificate
//! model used by chain, SCT and identity verification.

pub mod error;
pub mod hash;
pub mod key;
pub mod scheme;
#[cfg(test)]
mod test_keys;
pub mod verification;
pub mod x509;

pub use error::{Error, Result};
pub use hash::sha256;
pub use key::{KeyAlgorithm, PublicKey};
pub use scheme::SigningScheme;
pub use verification::{verify_signature, verify_signature_prehashed};
pub use x509::{
    BasicConstraints, Certificate, Extension, GeneralName, KeyUsage, SubjectAltName,
};
