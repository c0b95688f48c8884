//! Signature checks over raw key bytes
//!
//! Keys arrive here already unwrapped from their SubjectPublicKeyInfo (see
//! [`crate::PublicKey`]), so aws-lc-rs only needs the scheme to pick an
//! algorithm.

use crate::error::{Error, Result};
use crate::scheme::SigningScheme;
use aws_lc_rs::digest::{Digest, SHA256};
use aws_lc_rs::signature::{
    UnparsedPublicKey, VerificationAlgorithm, ECDSA_P256_SHA256_ASN1, ECDSA_P256_SHA384_ASN1,
    ECDSA_P256_SHA512_ASN1, ECDSA_P384_SHA256_ASN1, ECDSA_P384_SHA384_ASN1,
    ECDSA_P384_SHA512_ASN1, ED25519, RSA_PKCS1_2048_8192_SHA256,
    RSA_PKCS1_2048_8192_SHA384, RSA_PKCS1_2048_8192_SHA512, RSA_PSS_2048_8192_SHA256,
    RSA_PSS_2048_8192_SHA384, RSA_PSS_2048_8192_SHA512,
};

fn algorithm(scheme: SigningScheme) -> &'static dyn VerificationAlgorithm {
    match scheme {
        SigningScheme::EcdsaP256Sha256 => &ECDSA_P256_SHA256_ASN1,
        SigningScheme::EcdsaP256Sha384 => &ECDSA_P256_SHA384_ASN1,
        SigningScheme::EcdsaP256Sha512 => &ECDSA_P256_SHA512_ASN1,
        SigningScheme::EcdsaP384Sha256 => &ECDSA_P384_SHA256_ASN1,
        SigningScheme::EcdsaP384Sha384 => &ECDSA_P384_SHA384_ASN1,
        SigningScheme::EcdsaP384Sha512 => &ECDSA_P384_SHA512_ASN1,
        SigningScheme::Ed25519 => &ED25519,
        SigningScheme::RsaPssSha256 => &RSA_PSS_2048_8192_SHA256,
        SigningScheme::RsaPssSha384 => &RSA_PSS_2048_8192_SHA384,
        SigningScheme::RsaPssSha512 => &RSA_PSS_2048_8192_SHA512,
        SigningScheme::RsaPkcs1Sha256 => &RSA_PKCS1_2048_8192_SHA256,
        SigningScheme::RsaPkcs1Sha384 => &RSA_PKCS1_2048_8192_SHA384,
        SigningScheme::RsaPkcs1Sha512 => &RSA_PKCS1_2048_8192_SHA512,
    }
}

/// Verify `signature` over `data` with a raw public key
pub fn verify_signature(
    public_key: &[u8],
    data: &[u8],
    signature: &[u8],
    scheme: SigningScheme,
) -> Result<()> {
    UnparsedPublicKey::new(algorithm(scheme), public_key)
        .verify(data, signature)
        .map_err(|_| Error::Verification(format!("{} signature invalid", scheme)))
}

/// Verify a signature over prehashed data using the specified scheme
///
/// This is used when only the SHA-256 digest of an artifact is available.
/// The scheme must itself digest with SHA-256 so that the digest can be
/// substituted for the hashing step.
pub fn verify_signature_prehashed(
    public_key: &[u8],
    digest: &[u8],
    signature: &[u8],
    scheme: SigningScheme,
) -> Result<()> {
    if !scheme.uses_sha256() {
        return Err(Error::UnsupportedAlgorithm(format!(
            "{} cannot be checked against a SHA-256 digest",
            scheme
        )));
    }
    if digest.len() != 32 {
        return Err(Error::Verification(format!(
            "prehashed verification requires a 32-byte digest, got {}",
            digest.len()
        )));
    }

    let digest = Digest::import_less_safe(digest, &SHA256)
        .map_err(|_| Error::Verification("malformed SHA-256 digest".to_string()))?;
    UnparsedPublicKey::new(algorithm(scheme), public_key)
        .verify_digest(&digest, signature)
        .map_err(|_| Error::Verification(format!("{} signature invalid", scheme)))
}
