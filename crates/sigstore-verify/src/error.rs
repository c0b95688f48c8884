//! Error types for sigstore-verify

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during verification
#[derive(Error, Debug)]
pub enum Error {
    /// The bundle is structurally unusable: missing fields, unknown log,
    /// no key for a public key hint
    #[error("Invalid bundle: {0}")]
    InvalidBundle(String),

    /// A cryptographic or policy check failed
    #[error("Verification failed: {0}")]
    Verification(String),

    /// No trusted certificate chain could be established
    #[error("Certificate chain verification failed: {0}")]
    Chain(#[from] ChainError),

    /// A certificate or key could not be decoded
    #[error("Crypto error: {0}")]
    Crypto(#[from] sigstore_crypto::Error),

    /// The trusted root could not be decoded
    #[error("Trust root error: {0}")]
    TrustRoot(#[from] sigstore_trust_root::Error),
}

impl From<sigstore_bundle::Error> for Error {
    fn from(e: sigstore_bundle::Error) -> Self {
        Error::InvalidBundle(e.to_string())
    }
}

/// Reasons a certificate chain is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// No trust anchors were supplied
    #[error("no trusted certificates provided")]
    NoCertificates,

    /// No chain of verifying signatures could be built at all
    #[error("no valid certificate path found")]
    NoValidPath,

    /// Chains exist but none passes through a trust anchor
    #[error("no trusted certificate path found")]
    NoTrustedPath,

    /// The selected path has fewer than two certificates
    #[error("certificate chain must contain at least two certificates, found {0}")]
    PathTooShort(usize),

    /// The leaf is itself a CA
    #[error("leaf certificate must not be a CA")]
    LeafIsCa,

    /// A certificate above the leaf is not a CA
    #[error("certificate at position {0} is not a CA")]
    NotCa(usize),

    /// The leaf may not be used for signatures
    #[error("leaf certificate does not allow digitalSignature")]
    MissingDigitalSignature,

    /// The leaf has no email or URI subject alternative name
    #[error("leaf certificate has no email or URI subject alternative name")]
    MissingSubjectAltName,

    /// A certificate is outside its validity window
    #[error("certificate at position {index} is not valid or expired at {time}")]
    NotValidAt { index: usize, time: DateTime<Utc> },

    /// A CA has more intermediates below it than its pathLenConstraint allows
    #[error("certificate at position {0} exceeds its path length constraint")]
    PathLenExceeded(usize),

    /// An issuer name does not equal the next certificate's subject
    #[error("incorrect certificate name chaining at position {0}")]
    BrokenNameChain(usize),
}

/// Result type for verification operations
pub type Result<T> = std::result::Result<T, Error>;
