//! Error types for sigstore-crypto

use thiserror::Error;

/// Errors raised while decoding keys and certificates or checking signatures
#[derive(Error, Debug)]
pub enum Error {
    /// A signature did not verify
    #[error("Verification error: {0}")]
    Verification(String),

    /// The SubjectPublicKeyInfo is malformed
    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("PEM error: {0}")]
    Pem(String),

    /// Malformed DER
    #[error("ASN.1 error: {0}")]
    Asn1(#[from] sigstore_asn1::Error),

    /// The DER decodes but is not a well-formed X.509 certificate
    #[error("Certificate error: {0}")]
    InvalidCertificate(String),
}

impl From<pem::PemError> for Error {
    fn from(e: pem::PemError) -> Self {
        Error::Pem(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
