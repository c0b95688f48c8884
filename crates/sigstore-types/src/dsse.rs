//! DSSE envelopes
//!
//! A bundle signs an in-toto statement (or any other payload) by wrapping it
//! in a Dead Simple Signing Envelope. The signature covers the envelope's
//! pre-authentication encoding rather than the payload alone, which binds
//! the payload type into what is signed.

use crate::encoding::{PayloadBytes, SignatureBytes};
use serde::{Deserialize, Serialize};

/// Payload type of an in-toto statement
pub const IN_TOTO_PAYLOAD_TYPE: &str = "application/vnd.in-toto+json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DsseEnvelope {
    pub payload_type: String,
    pub payload: PayloadBytes,
    #[serde(default)]
    pub signatures: Vec<DsseSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DsseSignature {
    /// Key lookup hint; Sigstore leaves it empty
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub keyid: String,
    #[serde(default)]
    pub sig: SignatureBytes,
}

impl DsseEnvelope {
    pub fn new(payload_type: String, payload: PayloadBytes, signatures: Vec<DsseSignature>) -> Self {
        Self {
            payload_type,
            payload,
            signatures,
        }
    }

    /// The bytes each signature in this envelope is made over
    pub fn pae(&self) -> Vec<u8> {
        pae(&self.payload_type, self.payload.as_bytes())
    }

    /// Whether the payload is an in-toto statement
    pub fn is_in_toto(&self) -> bool {
        self.payload_type == IN_TOTO_PAYLOAD_TYPE
    }
}

/// DSSE v1 pre-authentication encoding
///
/// `"DSSEv1" SP len(type) SP type SP len(payload) SP payload`, lengths in
/// ASCII decimal.
pub fn pae(payload_type: &str, payload: &[u8]) -> Vec<u8> {
    let header = format!("DSSEv1 {} {} {} ", payload_type.len(), payload_type, payload.len());
    let mut out = Vec::with_capacity(header.len() + payload.len());
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(payload);
    out
}
