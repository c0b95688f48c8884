//! Error types for sigstore-rekor

use thiserror::Error;

/// Errors that can occur decoding Rekor entries
#[derive(Error, Debug)]
pub enum Error {
    /// The canonicalized body is not valid base64 or UTF-8
    #[error("invalid entry body: {0}")]
    InvalidBody(String),

    /// The body does not match the schema of its kind/version
    #[error("failed to parse {kind} v{version} body: {source}")]
    Schema {
        kind: String,
        version: String,
        #[source]
        source: serde_json::Error,
    },

    /// No schema is known for this kind/version
    #[error("unsupported entry kind/version: {0}/{1}")]
    UnsupportedKind(String, String),
}

/// Result type for Rekor operations
pub type Result<T> = std::result::Result<T, Error>;
