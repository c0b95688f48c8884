//! Error types for sigstore-asn1

use thiserror::Error;

/// Errors that can occur while decoding DER
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed encoding: bad length, unsupported tag, truncated buffer
    #[error("ASN.1 parse error: {0}")]
    Parse(String),

    /// A typed accessor was called on an element with a different tag
    #[error("ASN.1 type error: {0}")]
    Type(String),
}

/// Result type for ASN.1 operations
pub type Result<T> = std::result::Result<T, Error>;
