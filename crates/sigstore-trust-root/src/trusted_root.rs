//! The `TrustedRoot` JSON document
//!
//! These types mirror the published document closely enough to decode it.
//! Fields verification never reads (CA subjects, key details, timestamp
//! authorities) are left out and ignored.

use crate::material::{TrustMaterial, TrustedCertificateAuthority, TrustedLog};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sigstore_crypto::{Certificate, PublicKey};
use sigstore_types::{DerPublicKey, HashAlgorithm, LogId, RawCertificate};

/// Media type prefix shared by all trusted root versions
pub const TRUSTED_ROOT_MEDIA_TYPE_PREFIX: &str = "application/vnd.dev.sigstore.trustedroot";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustedRoot {
    pub media_type: String,
    /// Rekor instances, whose keys sign inclusion promises
    #[serde(default)]
    pub tlogs: Vec<TransparencyLog>,
    /// Fulcio instances
    #[serde(default)]
    pub certificate_authorities: Vec<CertificateAuthority>,
    /// CT logs, whose keys sign embedded SCTs
    #[serde(default)]
    pub ctlogs: Vec<TransparencyLog>,
}

/// A Rekor or CT log
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransparencyLog {
    pub base_url: String,
    pub hash_algorithm: HashAlgorithm,
    pub public_key: LogPublicKey,
    pub log_id: LogId,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogPublicKey {
    /// DER SubjectPublicKeyInfo
    pub raw_bytes: DerPublicKey,
    /// When the log signed with this key
    #[serde(default)]
    pub valid_for: TimeWindow,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateAuthority {
    #[serde(default)]
    pub uri: String,
    pub cert_chain: CertChain,
    /// When the CA issued certificates
    #[serde(default)]
    pub valid_for: TimeWindow,
}

/// Intermediates first, the root last
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CertChain {
    pub certificates: Vec<RawCertificate>,
}

/// A validity period in RFC 3339 form
///
/// A missing bound leaves that side open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TimeWindow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

impl TimeWindow {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// Whether `time` falls inside the window, bounds inclusive
    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| start <= time) && self.end.map_or(true, |end| time <= end)
    }
}

impl TrustedRoot {
    /// Parse a trusted root, rejecting documents of any other media type
    pub fn from_json(json: &str) -> Result<Self> {
        let root: Self = serde_json::from_str(json)?;
        if !root.media_type.starts_with(TRUSTED_ROOT_MEDIA_TYPE_PREFIX) {
            return Err(Error::UnsupportedMediaType(root.media_type));
        }
        Ok(root)
    }

    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Decode every certificate and key into [`TrustMaterial`]
    ///
    /// Any entry that fails to decode fails the whole trusted root.
    pub fn trust_material(&self) -> Result<TrustMaterial> {
        let certificate_authorities = self
            .certificate_authorities
            .iter()
            .map(|ca| -> Result<TrustedCertificateAuthority> {
                let certificates = ca
                    .cert_chain
                    .certificates
                    .iter()
                    .map(|entry| {
                        Certificate::from_der(entry.raw_bytes.as_bytes()).map_err(|e| {
                            Error::Certificate(format!("certificate authority {}: {}", ca.uri, e))
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(TrustedCertificateAuthority {
                    uri: ca.uri.clone(),
                    certificates,
                    valid_for: ca.valid_for,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let material = TrustMaterial {
            certificate_authorities,
            ctlogs: self.ctlogs.iter().map(trusted_log).collect::<Result<_>>()?,
            tlogs: self.tlogs.iter().map(trusted_log).collect::<Result<_>>()?,
        };
        tracing::debug!(
            "trust material: {} certificate authorities, {} CT logs, {} transparency logs",
            material.certificate_authorities.len(),
            material.ctlogs.len(),
            material.tlogs.len()
        );
        Ok(material)
    }
}

fn trusted_log(log: &TransparencyLog) -> Result<TrustedLog> {
    let key = PublicKey::from_spki_der(log.public_key.raw_bytes.as_bytes())
        .map_err(|e| Error::InvalidKey(format!("log {}: {}", log.base_url, e)))?;
    Ok(TrustedLog {
        log_id: log.log_id.key_id.as_bytes().to_vec(),
        base_url: log.base_url.clone(),
        key,
        valid_for: log.public_key.valid_for,
    })
}
