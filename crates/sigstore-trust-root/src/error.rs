//! Error types for sigstore-trust-root

use thiserror::Error;

/// Reasons a trusted root document cannot be turned into trust material
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read trusted root: {0}")]
    Io(#[from] std::io::Error),

    /// A CA certificate did not decode
    #[error("failed to parse certificate: {0}")]
    Certificate(String),

    /// A log key did not decode as a SubjectPublicKeyInfo
    #[error("invalid key format: {0}")]
    InvalidKey(String),

    /// The document is not a `TrustedRoot` v0.1
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),
}

pub type Result<T> = std::result::Result<T, Error>;
