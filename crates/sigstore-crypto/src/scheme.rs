//! Signature schemes accepted by Sigstore trust material

/// A public key algorithm paired with the digest it signs over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningScheme {
    EcdsaP256Sha256,
    EcdsaP256Sha384,
    EcdsaP256Sha512,
    EcdsaP384Sha256,
    EcdsaP384Sha384,
    EcdsaP384Sha512,
    Ed25519,
    RsaPssSha256,
    RsaPssSha384,
    RsaPssSha512,
    RsaPkcs1Sha256,
    RsaPkcs1Sha384,
    RsaPkcs1Sha512,
}

impl SigningScheme {
    /// Name used in log messages and errors
    pub fn name(&self) -> &'static str {
        use SigningScheme::*;
        match self {
            EcdsaP256Sha256 => "ECDSA_P256_SHA256",
            EcdsaP256Sha384 => "ECDSA_P256_SHA384",
            EcdsaP256Sha512 => "ECDSA_P256_SHA512",
            EcdsaP384Sha256 => "ECDSA_P384_SHA256",
            EcdsaP384Sha384 => "ECDSA_P384_SHA384",
            EcdsaP384Sha512 => "ECDSA_P384_SHA512",
            Ed25519 => "ED25519",
            RsaPssSha256 => "RSA_PSS_SHA256",
            RsaPssSha384 => "RSA_PSS_SHA384",
            RsaPssSha512 => "RSA_PSS_SHA512",
            RsaPkcs1Sha256 => "RSA_PKCS1_SHA256",
            RsaPkcs1Sha384 => "RSA_PKCS1_SHA384",
            RsaPkcs1Sha512 => "RSA_PKCS1_SHA512",
        }
    }

    /// Whether the scheme digests its input with SHA-256
    ///
    /// Only these schemes can check a signature against a bare SHA-256
    /// artifact digest.
    pub fn uses_sha256(&self) -> bool {
        matches!(
            self,
            SigningScheme::EcdsaP256Sha256
                | SigningScheme::EcdsaP384Sha256
                | SigningScheme::RsaPssSha256
                | SigningScheme::RsaPkcs1Sha256
        )
    }
}

impl std::fmt::Display for SigningScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
