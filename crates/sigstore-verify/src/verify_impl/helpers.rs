//! Helper functions for verification
//!
//! This module contains extracted helper functions to break down the
//! large verification logic into manageable pieces.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use sigstore_crypto::{Certificate, PublicKey};
use sigstore_types::{Artifact, Bundle, Sha256Hash, VerificationMaterialContent};
use std::collections::HashMap;

/// The key material a bundle was signed with
#[derive(Debug, Clone)]
pub enum SigningMaterial {
    /// A signing certificate and the rest of the chain shipped with it
    Certificate {
        leaf: Certificate,
        chain: Vec<Certificate>,
    },
    /// A key registered on the verifier, looked up by the bundle's hint
    PublicKey(PublicKey),
}

impl SigningMaterial {
    /// The key the artifact signature must verify under
    pub fn public_key(&self) -> &PublicKey {
        match self {
            Self::Certificate { leaf, .. } => leaf.public_key(),
            Self::PublicKey(key) => key,
        }
    }

    /// The signing certificate, when there is one
    pub fn leaf(&self) -> Option<&Certificate> {
        match self {
            Self::Certificate { leaf, .. } => Some(leaf),
            Self::PublicKey(_) => None,
        }
    }

    /// Whether a PEM document (as recorded in a log entry body) names this
    /// signer
    ///
    /// A `CERTIFICATE` block must be the signing certificate; a `PUBLIC KEY`
    /// block must be the signing key.
    pub fn matches_pem(&self, pem_bytes: &[u8]) -> bool {
        let Ok(parsed) = pem::parse(pem_bytes) else {
            return false;
        };
        match (parsed.tag(), self) {
            ("CERTIFICATE", Self::Certificate { leaf, .. }) => parsed.contents() == leaf.der(),
            ("PUBLIC KEY", _) => parsed.contents() == self.public_key().spki_der(),
            _ => false,
        }
    }
}

/// Extract and decode the signing material of a bundle
///
/// Public key material is resolved through `keys`, which maps hints to keys.
pub fn extract_signing_material(
    content: &VerificationMaterialContent,
    keys: &HashMap<String, PublicKey>,
) -> Result<SigningMaterial> {
    match content {
        VerificationMaterialContent::Certificate(cert) => Ok(SigningMaterial::Certificate {
            leaf: Certificate::from_der(cert.raw_bytes.as_bytes())?,
            chain: Vec::new(),
        }),
        VerificationMaterialContent::X509CertificateChain { certificates } => {
            let (leaf, rest) = certificates
                .split_first()
                .ok_or_else(|| Error::InvalidBundle("no certificates in chain".to_string()))?;
            let chain = rest
                .iter()
                .map(|c| Certificate::from_der(c.raw_bytes.as_bytes()))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(SigningMaterial::Certificate {
                leaf: Certificate::from_der(leaf.raw_bytes.as_bytes())?,
                chain,
            })
        }
        VerificationMaterialContent::PublicKey { hint } => keys
            .get(hint)
            .cloned()
            .map(SigningMaterial::PublicKey)
            .ok_or_else(|| {
                Error::InvalidBundle(format!("no public key registered for hint {:?}", hint))
            }),
    }
}

/// Determine the instant the signing certificate is checked at
///
/// This is the earliest integrated time among log entries that carry an
/// inclusion promise, since only those times are signed by the log. Without
/// any, the certificate's own `notBefore` is used; public key material falls
/// back to the current time.
pub fn determine_validation_time(
    bundle: &Bundle,
    leaf: Option<&Certificate>,
) -> Result<DateTime<Utc>> {
    let earliest = bundle
        .tlog_entries()
        .iter()
        .filter(|entry| entry.inclusion_promise.is_some())
        .map(|entry| entry.integrated_time)
        .min();

    match (earliest, leaf) {
        (Some(time), _) => DateTime::from_timestamp(time, 0)
            .ok_or_else(|| Error::InvalidBundle(format!("invalid integrated time {}", time))),
        (None, Some(leaf)) => Ok(leaf.not_before()),
        (None, None) => Ok(Utc::now()),
    }
}

/// Check that every promised log entry was integrated while the signing
/// certificate was valid
pub fn validate_integrated_times(bundle: &Bundle, leaf: &Certificate) -> Result<()> {
    for entry in bundle.tlog_entries() {
        if entry.inclusion_promise.is_none() {
            continue;
        }
        let time = DateTime::from_timestamp(entry.integrated_time, 0).ok_or_else(|| {
            Error::InvalidBundle(format!("invalid integrated time {}", entry.integrated_time))
        })?;
        if !leaf.valid_for_date(time) {
            return Err(Error::Verification(format!(
                "integrated time {} is outside certificate validity ({} to {})",
                time,
                leaf.not_before(),
                leaf.not_after()
            )));
        }
    }
    Ok(())
}

/// Compute the SHA-256 digest from an artifact
pub fn artifact_digest(artifact: &Artifact<'_>) -> Sha256Hash {
    match artifact {
        Artifact::Bytes(bytes) => Sha256Hash::from_bytes(sigstore_crypto::sha256(bytes)),
        Artifact::Digest(hash) => *hash,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEAF_PEM: &str = include_str!("../../tests/fixtures/leaf.pem");
    const SIGNER_PUB: &str = include_str!("../../tests/fixtures/signer.pub");
    const HASHEDREKORD: &str = include_str!("../../tests/fixtures/hashedrekord.sigstore.json");

    #[test]
    fn test_matches_pem() {
        let leaf = Certificate::from_pem(LEAF_PEM).unwrap();
        let leaf_key_pem = pem::encode(&pem::Pem::new(
            "PUBLIC KEY",
            leaf.public_key().spki_der().to_vec(),
        ));
        let signer = SigningMaterial::Certificate {
            leaf,
            chain: Vec::new(),
        };
        assert!(signer.matches_pem(LEAF_PEM.as_bytes()));
        assert!(signer.matches_pem(leaf_key_pem.as_bytes()));
        assert!(!signer.matches_pem(SIGNER_PUB.as_bytes()));
        assert!(!signer.matches_pem(b"not pem"));

        let key = SigningMaterial::PublicKey(PublicKey::from_pem(SIGNER_PUB).unwrap());
        assert!(key.matches_pem(SIGNER_PUB.as_bytes()));
        assert!(!key.matches_pem(LEAF_PEM.as_bytes()));
    }

    #[test]
    fn test_unknown_hint() {
        let content = VerificationMaterialContent::PublicKey {
            hint: "missing".to_string(),
        };
        let err = extract_signing_material(&content, &HashMap::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidBundle(_)));
    }

    #[test]
    fn test_validation_time_uses_promised_entries() {
        let mut bundle = Bundle::from_json(HASHEDREKORD).unwrap();
        let leaf = Certificate::from_pem(LEAF_PEM).unwrap();

        let time = determine_validation_time(&bundle, Some(&leaf)).unwrap();
        assert_eq!(time.timestamp(), 1_709_294_402);
        validate_integrated_times(&bundle, &leaf).unwrap();

        bundle.verification_material.tlog_entries[0].inclusion_promise = None;
        let time = determine_validation_time(&bundle, Some(&leaf)).unwrap();
        assert_eq!(time, leaf.not_before());
    }

    #[test]
    fn test_integrated_time_outside_validity() {
        let mut bundle = Bundle::from_json(HASHEDREKORD).unwrap();
        let leaf = Certificate::from_pem(LEAF_PEM).unwrap();
        bundle.verification_material.tlog_entries[0].integrated_time = 1_709_294_402 + 3600;
        let err = validate_integrated_times(&bundle, &leaf).unwrap_err();
        assert!(matches!(err, Error::Verification(_)));
    }

    #[test]
    fn test_artifact_digest() {
        let digest = artifact_digest(&Artifact::from(b"hello, sigstore!\n".as_slice()));
        assert_eq!(artifact_digest(&Artifact::Digest(digest)), digest);
    }
}
