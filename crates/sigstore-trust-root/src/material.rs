//! Decoded trust anchors
//!
//! [`TrustMaterial`] is read-only once built and can be shared between
//! concurrent verifications.

use crate::trusted_root::TimeWindow;
use chrono::{DateTime, Utc};
use sigstore_crypto::{Certificate, PublicKey};

/// All trust anchors, decoded
#[derive(Debug, Clone, Default)]
pub struct TrustMaterial {
    /// Certificate authorities, in trusted root order
    pub certificate_authorities: Vec<TrustedCertificateAuthority>,
    /// Certificate Transparency logs
    pub ctlogs: Vec<TrustedLog>,
    /// Transparency logs
    pub tlogs: Vec<TrustedLog>,
}

/// A certificate authority with its decoded chain
#[derive(Debug, Clone)]
pub struct TrustedCertificateAuthority {
    pub uri: String,
    /// Leaf-most first, root last
    pub certificates: Vec<Certificate>,
    pub valid_for: TimeWindow,
}

/// A transparency or CT log key
#[derive(Debug, Clone)]
pub struct TrustedLog {
    /// The log ID, normally SHA-256 of the key's SPKI
    pub log_id: Vec<u8>,
    pub base_url: String,
    pub key: PublicKey,
    pub valid_for: TimeWindow,
}

impl TrustedLog {
    /// Log ID as lowercase hex
    pub fn log_id_hex(&self) -> String {
        hex::encode(&self.log_id)
    }

    /// Whether this log has ID `log_id` and its key was in use at `time`
    pub fn accepts(&self, log_id: &[u8], time: DateTime<Utc>) -> bool {
        self.log_id == log_id && self.valid_for.contains(time)
    }
}

impl TrustMaterial {
    /// Certificate authorities whose validity window contains `time`
    pub fn certificate_authorities_at(
        &self,
        time: DateTime<Utc>,
    ) -> impl Iterator<Item = &TrustedCertificateAuthority> {
        self.certificate_authorities
            .iter()
            .filter(move |ca| ca.valid_for.contains(time))
    }
}
