//! Error types for sigstore-bundle

use thiserror::Error;

/// Errors that can occur in bundle operations
#[derive(Error, Debug)]
pub enum Error {
    /// One or more fields failed structural validation, by JSON path
    #[error("Bundle validation error: missing or invalid {}", .0.join(", "))]
    InvalidFields(Vec<String>),

    /// The bundle could not be parsed
    #[error("Bundle parse error: {0}")]
    Parse(#[from] sigstore_types::Error),
}

/// Result type for bundle operations
pub type Result<T> = std::result::Result<T, Error>;
