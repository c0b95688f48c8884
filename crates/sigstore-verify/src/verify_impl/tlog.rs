//! Transparency log verification
//!
//! This module handles SET (Signed Entry Timestamp) verification: the
//! inclusion promise a log hands out when it accepts an entry.

use crate::error::{Error, Result};
use serde::Serialize;
use sigstore_trust_root::TrustedLog;
use sigstore_types::TransparencyLogEntry;

/// The payload a transparency log signs for an inclusion promise
#[derive(Serialize)]
struct RekorPayload {
    body: String,
    #[serde(rename = "integratedTime")]
    integrated_time: i64,
    #[serde(rename = "logIndex")]
    log_index: i64,
    #[serde(rename = "logID")]
    log_id: String,
}

/// Verify SET (Signed Entry Timestamp)
///
/// Candidate keys are the trusted logs whose ID matches the entry and whose
/// validity window contains the entry's integrated time. The SET verifies if
/// any candidate key accepts it.
pub fn verify_set(entry: &TransparencyLogEntry, tlogs: &[TrustedLog]) -> Result<()> {
    let promise = entry
        .inclusion_promise
        .as_ref()
        .ok_or_else(|| Error::InvalidBundle("missing inclusion promise".into()))?;
    let log_id = entry
        .log_id
        .as_ref()
        .ok_or_else(|| Error::InvalidBundle("missing log ID".into()))?;
    let log_id_hex = log_id.key_id.to_hex();

    let integrated_time = chrono::DateTime::from_timestamp(entry.integrated_time, 0)
        .ok_or_else(|| Error::InvalidBundle("invalid integrated time".into()))?;

    let candidates: Vec<&TrustedLog> = tlogs
        .iter()
        .filter(|log| log.accepts(log_id.key_id.as_bytes(), integrated_time))
        .collect();
    if candidates.is_empty() {
        return Err(Error::InvalidBundle(format!(
            "no key found for logID {}",
            log_id_hex
        )));
    }

    let payload = RekorPayload {
        body: entry.canonicalized_body.to_base64(),
        integrated_time: entry.integrated_time,
        log_index: entry.log_index.value(),
        log_id: log_id_hex,
    };
    let canonical_json = serde_json_canonicalizer::to_vec(&payload)
        .map_err(|e| Error::Verification(format!("canonicalization failed: {}", e)))?;

    let signature = promise.signed_entry_timestamp.as_bytes();
    for log in candidates {
        match log.key.verify(&canonical_json, signature) {
            Ok(()) => {
                tracing::debug!(
                    "SET for entry {} verified by log {}",
                    entry.log_index.value(),
                    log.base_url
                );
                return Ok(());
            }
            Err(e) => tracing::debug!("log {} rejected SET: {}", log.base_url, e),
        }
    }

    Err(Error::Verification(
        "transparency log SET verification failed".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigstore_types::{InclusionPromise, LogId, LogKeyId, SignedTimestamp};

    fn entry() -> TransparencyLogEntry {
        serde_json::from_str(
            r#"{
                "logIndex": "7",
                "logId": {"keyId": "AAAA"},
                "integratedTime": "1709294402",
                "inclusionPromise": {"signedEntryTimestamp": "AAAA"},
                "canonicalizedBody": "e30="
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_missing_promise_is_invalid_bundle() {
        let mut entry = entry();
        entry.inclusion_promise = None;
        let err = verify_set(&entry, &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidBundle(_)));
    }

    #[test]
    fn test_missing_log_id_is_invalid_bundle() {
        let mut entry = entry();
        entry.log_id = None;
        let err = verify_set(&entry, &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidBundle(_)));
    }

    #[test]
    fn test_unknown_log_id() {
        let mut entry = entry();
        entry.log_id = Some(LogId {
            key_id: LogKeyId::new(vec![0xab; 4]),
        });
        entry.inclusion_promise = Some(InclusionPromise {
            signed_entry_timestamp: SignedTimestamp::new(vec![1, 2, 3]),
        });
        let err = verify_set(&entry, &[]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid bundle: no key found for logID abababab"
        );
    }
}
