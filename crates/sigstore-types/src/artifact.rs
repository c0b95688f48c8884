//! Artifact input for verification
//!
//! Artifacts can be provided as raw bytes or as a pre-computed digest, so
//! large files never need to be loaded just to check a message signature.

use crate::Sha256Hash;

/// An artifact to be verified
///
/// - `Bytes`: raw artifact bytes (the digest is computed internally)
/// - `Digest`: pre-computed SHA-256 digest (signatures are checked prehashed)
///
/// # Example
///
/// ```
/// use sigstore_types::{Artifact, Sha256Hash};
///
/// let artifact = Artifact::from(b"hello world".as_slice());
/// assert!(artifact.bytes().is_some());
///
/// let digest = Sha256Hash::from_hex(
///     "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
/// ).unwrap();
/// let artifact = Artifact::from(digest);
/// assert!(artifact.bytes().is_none());
/// ```
#[derive(Debug, Clone, Copy)]
pub enum Artifact<'a> {
    /// Raw artifact bytes
    Bytes(&'a [u8]),
    /// Pre-computed SHA-256 digest
    Digest(Sha256Hash),
}

impl<'a> Artifact<'a> {
    /// Get the raw bytes if available
    pub fn bytes(&self) -> Option<&'a [u8]> {
        match self {
            Artifact::Bytes(bytes) => Some(bytes),
            Artifact::Digest(_) => None,
        }
    }

    /// Get the pre-computed digest if available
    pub fn pre_computed_digest(&self) -> Option<Sha256Hash> {
        match self {
            Artifact::Bytes(_) => None,
            Artifact::Digest(hash) => Some(*hash),
        }
    }
}

impl<'a> From<&'a [u8]> for Artifact<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Artifact::Bytes(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for Artifact<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        Artifact::Bytes(bytes.as_slice())
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Artifact<'a> {
    fn from(bytes: &'a [u8; N]) -> Self {
        Artifact::Bytes(bytes.as_slice())
    }
}

impl From<Sha256Hash> for Artifact<'static> {
    fn from(hash: Sha256Hash) -> Self {
        Artifact::Digest(hash)
    }
}
