//! Error types for sigstore-types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Bad base64 or hex, or a byte field of the wrong length
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// `mediaType` names no known bundle version
    #[error("Invalid media type: {0}")]
    InvalidMediaType(String),

    /// A PEM certificate that could not be unwrapped to DER
    #[error("Invalid certificate: {0}")]
    InvalidCertificate(String),
}

pub type Result<T> = std::result::Result<T, Error>;
