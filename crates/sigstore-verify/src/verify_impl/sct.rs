//! Certificate Transparency SCT (Signed Certificate Timestamp) verification
//!
//! SCTs embedded in a certificate are signed by the CT log over the
//! pre-certificate: the TBS certificate with the SCT list extension removed,
//! bound to the issuer's key hash (RFC 6962 section 3.2).

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use sigstore_crypto::{Certificate, KeyAlgorithm, PublicKey, SigningScheme};
use sigstore_trust_root::TrustedLog;
use tls_codec::{
    DeserializeBytes, SerializeBytes, TlsByteVecU16, TlsByteVecU24, TlsDeserializeBytes,
    TlsSerializeBytes, TlsSize,
};

// TLS HashAlgorithm and SignatureAlgorithm codes (RFC 5246 section 7.4.1.4.1)
const HASH_SHA256: u8 = 4;
const HASH_SHA384: u8 = 5;
const HASH_SHA512: u8 = 6;
const SIG_RSA: u8 = 1;
const SIG_ECDSA: u8 = 3;

const SCT_VERSION_V1: u8 = 0;
const SIGNATURE_TYPE_CERTIFICATE_TIMESTAMP: u8 = 0;
const LOG_ENTRY_TYPE_PRECERT: u16 = 1;

/// A Signed Certificate Timestamp in its TLS encoding
#[derive(Debug, Clone, PartialEq, TlsDeserializeBytes, TlsSerializeBytes, TlsSize)]
pub struct SignedCertificateTimestamp {
    pub version: u8,
    pub log_id: [u8; 32],
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
    pub extensions: TlsByteVecU16,
    pub hash_algorithm: u8,
    pub signature_algorithm: u8,
    pub signature: TlsByteVecU16,
}

/// The pre-certificate entry a CT log signs
#[derive(Debug, TlsSerializeBytes, TlsSize)]
struct PreCert {
    issuer_key_hash: [u8; 32],
    tbs_certificate: TlsByteVecU24,
}

/// The `digitally-signed` input of an SCT signature
#[derive(Debug, TlsSerializeBytes, TlsSize)]
struct DigitallySigned {
    version: u8,
    signature_type: u8,
    timestamp: u64,
    entry_type: u16,
    signed_entry: PreCert,
    extensions: TlsByteVecU16,
}

impl SignedCertificateTimestamp {
    /// Parse a `SignedCertificateTimestampList`
    pub fn parse_list(bytes: &[u8]) -> Result<Vec<Self>> {
        let (list, rest) = TlsByteVecU16::tls_deserialize_bytes(bytes)
            .map_err(|e| Error::Verification(format!("malformed SCT list: {:?}", e)))?;
        if !rest.is_empty() {
            return Err(Error::Verification(
                "trailing data after SCT list".to_string(),
            ));
        }

        let mut scts = Vec::new();
        let mut remaining = list.as_slice();
        while !remaining.is_empty() {
            let (entry, rest) = TlsByteVecU16::tls_deserialize_bytes(remaining)
                .map_err(|e| Error::Verification(format!("malformed SCT entry: {:?}", e)))?;
            let (sct, trailing) = Self::tls_deserialize_bytes(entry.as_slice())
                .map_err(|e| Error::Verification(format!("malformed SCT: {:?}", e)))?;
            if !trailing.is_empty() {
                return Err(Error::Verification("trailing data after SCT".to_string()));
            }
            scts.push(sct);
            remaining = rest;
        }
        Ok(scts)
    }

    /// The SCT timestamp, if representable
    pub fn time(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.timestamp)
            .ok()
            .and_then(DateTime::from_timestamp_millis)
    }

    /// The scheme this SCT's signature is checked with under `key`
    fn scheme(&self, key: &PublicKey) -> Option<SigningScheme> {
        let scheme = match (self.signature_algorithm, self.hash_algorithm, key.algorithm()) {
            (SIG_ECDSA, HASH_SHA256, KeyAlgorithm::EcP256) => SigningScheme::EcdsaP256Sha256,
            (SIG_ECDSA, HASH_SHA384, KeyAlgorithm::EcP256) => SigningScheme::EcdsaP256Sha384,
            (SIG_ECDSA, HASH_SHA256, KeyAlgorithm::EcP384) => SigningScheme::EcdsaP384Sha256,
            (SIG_ECDSA, HASH_SHA384, KeyAlgorithm::EcP384) => SigningScheme::EcdsaP384Sha384,
            (SIG_RSA, HASH_SHA256, KeyAlgorithm::Rsa) => SigningScheme::RsaPkcs1Sha256,
            (SIG_RSA, HASH_SHA384, KeyAlgorithm::Rsa) => SigningScheme::RsaPkcs1Sha384,
            (SIG_RSA, HASH_SHA512, KeyAlgorithm::Rsa) => SigningScheme::RsaPkcs1Sha512,
            _ => return None,
        };
        Some(scheme)
    }

    /// Serialize the data the log signed for this SCT
    fn signed_data(&self, precert_tbs: &[u8], issuer_key_hash: [u8; 32]) -> Result<Vec<u8>> {
        DigitallySigned {
            version: self.version,
            signature_type: SIGNATURE_TYPE_CERTIFICATE_TIMESTAMP,
            timestamp: self.timestamp,
            entry_type: LOG_ENTRY_TYPE_PRECERT,
            signed_entry: PreCert {
                issuer_key_hash,
                tbs_certificate: precert_tbs.into(),
            },
            extensions: self.extensions.clone(),
        }
        .tls_serialize()
        .map_err(|e| Error::Verification(format!("failed to serialize SCT data: {:?}", e)))
    }

    /// Check the signature against one log
    fn verify_with(&self, log: &TrustedLog, signed_data: &[u8]) -> bool {
        let Some(scheme) = self.scheme(&log.key) else {
            tracing::debug!(
                "SCT algorithm {}/{} does not fit log {} key",
                self.hash_algorithm,
                self.signature_algorithm,
                log.log_id_hex()
            );
            return false;
        };
        log.key
            .verify_with_scheme(signed_data, self.signature.as_slice(), scheme)
            .is_ok()
    }
}

/// Verify the SCTs embedded in `cert` and require at least `threshold` of
/// them to verify against a trusted CT log
///
/// `issuer` is the certificate that signed `cert`; its key hash is part of
/// the signed data. Returns the number of verified SCTs.
pub fn verify_scts(
    cert: &Certificate,
    issuer: &Certificate,
    ctlogs: &[TrustedLog],
    threshold: usize,
) -> Result<usize> {
    let scts = match cert.sct_list()? {
        Some(list) => SignedCertificateTimestamp::parse_list(&list)?,
        None => Vec::new(),
    };

    let mut verified = 0;
    if !scts.is_empty() {
        let precert_tbs = cert.precertificate_tbs()?;
        let issuer_key_hash = sigstore_crypto::sha256(issuer.public_key().spki_der());

        for sct in &scts {
            if sct.version != SCT_VERSION_V1 {
                tracing::debug!("skipping SCT with version {}", sct.version);
                continue;
            }
            let Some(time) = sct.time() else {
                continue;
            };
            let signed_data = sct.signed_data(&precert_tbs, issuer_key_hash)?;
            let matched = ctlogs
                .iter()
                .filter(|log| log.accepts(&sct.log_id, time))
                .any(|log| sct.verify_with(log, &signed_data));
            if matched {
                tracing::debug!("SCT from log {} verified", hex::encode(sct.log_id));
                verified += 1;
            } else {
                tracing::debug!("no trusted CT log verifies SCT {}", hex::encode(sct.log_id));
            }
        }
    }

    if verified < threshold {
        return Err(Error::Verification(format!(
            "not enough SCTs verified (found {}, need {})",
            verified, threshold
        )));
    }
    Ok(verified)
}
