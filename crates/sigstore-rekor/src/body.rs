//! Strongly-typed Rekor entry body structures
//!
//! The canonicalized body of a transparency log entry is base64-encoded JSON
//! of the form `{"apiVersion", "kind", "spec"}`. Each supported kind/version
//! pair has its own `spec` layout below.

use crate::error::{Error, Result};
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Parsed Rekor entry body
#[derive(Debug, Clone)]
pub enum RekorEntryBody {
    /// HashedRekord v0.0.1
    HashedRekordV001(HashedRekordV001Body),
    /// DSSE v0.0.1
    DsseV001(DsseV001Body),
    /// Intoto v0.0.2
    IntotoV002(IntotoV002Body),
}

// ============================================================================
// HashedRekord v0.0.1
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashedRekordV001Body {
    pub api_version: String,
    pub kind: String,
    pub spec: HashedRekordV001Spec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashedRekordV001Spec {
    pub data: HashedRekordV001Data,
    pub signature: HashedRekordV001Signature,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashedRekordV001Data {
    pub hash: HashValue,
}

/// A hash as `{algorithm, value}` with a hex value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashValue {
    pub algorithm: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashedRekordV001Signature {
    /// Base64-encoded signature
    pub content: String,
    pub public_key: PublicKeyContent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicKeyContent {
    /// Base64-encoded PEM (certificate or public key)
    pub content: String,
}

// ============================================================================
// DSSE v0.0.1
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DsseV001Body {
    pub api_version: String,
    pub kind: String,
    pub spec: DsseV001Spec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DsseV001Spec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub envelope_hash: Option<HashValue>,
    pub payload_hash: HashValue,
    #[serde(default)]
    pub signatures: Vec<DsseV001Signature>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DsseV001Signature {
    /// Base64-encoded signature
    pub signature: String,
    /// Base64-encoded PEM of the verifying certificate or key
    pub verifier: String,
}

// ============================================================================
// Intoto v0.0.2
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntotoV002Body {
    pub api_version: String,
    pub kind: String,
    pub spec: IntotoV002Spec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntotoV002Spec {
    pub content: IntotoV002Content,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntotoV002Content {
    pub envelope: IntotoEnvelope,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntotoEnvelope {
    #[serde(default)]
    pub payload_type: String,
    /// Base64-encoded payload
    pub payload: String,
    pub signatures: Vec<IntotoSignature>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntotoSignature {
    /// Base64-encoded signature
    pub sig: String,
    #[serde(default)]
    pub public_key: String,
}

impl IntotoEnvelope {
    /// The raw payload bytes
    pub fn decoded_payload(&self) -> Result<Vec<u8>> {
        decode(&self.payload, "payload")
    }
}

impl IntotoSignature {
    /// The raw signature bytes
    pub fn decoded_sig(&self) -> Result<Vec<u8>> {
        decode(&self.sig, "signature")
    }
}

fn decode(value: &str, what: &str) -> Result<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(value)
        .map_err(|e| Error::InvalidBody(format!("invalid base64 {}: {}", what, e)))
}

// ============================================================================
// Helper functions
// ============================================================================

impl RekorEntryBody {
    /// Parse a Rekor entry body from its decoded JSON bytes
    pub fn from_json(body: &[u8], kind: &str, version: &str) -> Result<Self> {
        match (kind, version) {
            ("hashedrekord", "0.0.1") => parse(body, kind, version).map(Self::HashedRekordV001),
            ("dsse", "0.0.1") => parse(body, kind, version).map(Self::DsseV001),
            ("intoto", "0.0.2") => parse(body, kind, version).map(Self::IntotoV002),
            _ => Err(Error::UnsupportedKind(
                kind.to_string(),
                version.to_string(),
            )),
        }
    }

    /// Parse a Rekor entry body from base64-encoded JSON
    pub fn from_base64_json(base64_body: &str, kind: &str, version: &str) -> Result<Self> {
        let body = base64::engine::general_purpose::STANDARD
            .decode(base64_body)
            .map_err(|e| Error::InvalidBody(format!("failed to decode body: {}", e)))?;
        Self::from_json(&body, kind, version)
    }

    /// The `kind` declared inside the body
    pub fn kind(&self) -> &str {
        match self {
            Self::HashedRekordV001(b) => &b.kind,
            Self::DsseV001(b) => &b.kind,
            Self::IntotoV002(b) => &b.kind,
        }
    }

    /// The `apiVersion` declared inside the body
    pub fn api_version(&self) -> &str {
        match self {
            Self::HashedRekordV001(b) => &b.api_version,
            Self::DsseV001(b) => &b.api_version,
            Self::IntotoV002(b) => &b.api_version,
        }
    }
}

fn parse<T: DeserializeOwned>(body: &[u8], kind: &str, version: &str) -> Result<T> {
    let text = std::str::from_utf8(body)
        .map_err(|e| Error::InvalidBody(format!("body is not valid UTF-8: {}", e)))?;
    serde_json::from_str(text).map_err(|source| {
        tracing::debug!("{} v{} body did not match schema", kind, version);
        Error::Schema {
            kind: kind.to_string(),
            version: version.to_string(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const HASHEDREKORD: &str = r#"{
        "apiVersion": "0.0.1",
        "kind": "hashedrekord",
        "spec": {
            "data": {"hash": {"algorithm": "sha256", "value": "abcd1234"}},
            "signature": {
                "content": "c2lnbmF0dXJl",
                "publicKey": {"content": "cHVibGlja2V5"}
            }
        }
    }"#;

    const DSSE: &str = r#"{
        "apiVersion": "0.0.1",
        "kind": "dsse",
        "spec": {
            "envelopeHash": {"algorithm": "sha256", "value": "00"},
            "payloadHash": {"algorithm": "sha256", "value": "11"},
            "signatures": [{"signature": "c2ln", "verifier": "cGVt"}]
        }
    }"#;

    const INTOTO: &str = r#"{
        "apiVersion": "0.0.2",
        "kind": "intoto",
        "spec": {
            "content": {
                "envelope": {
                    "payloadType": "application/vnd.in-toto+json",
                    "payload": "aGVsbG8=",
                    "signatures": [{"sig": "c2ln", "publicKey": ""}]
                }
            }
        }
    }"#;

    fn b64(s: &str) -> String {
        base64::engine::general_purpose::STANDARD.encode(s.as_bytes())
    }

    #[test]
    fn test_parse_hashedrekord_v001() {
        let body =
            RekorEntryBody::from_base64_json(&b64(HASHEDREKORD), "hashedrekord", "0.0.1").unwrap();
        let RekorEntryBody::HashedRekordV001(body) = body else {
            panic!("expected hashedrekord body");
        };
        assert_eq!(body.spec.data.hash.value, "abcd1234");
        assert_eq!(body.spec.signature.content, "c2lnbmF0dXJl");
    }

    #[test]
    fn test_parse_dsse_v001() {
        let body = RekorEntryBody::from_json(DSSE.as_bytes(), "dsse", "0.0.1").unwrap();
        assert_eq!(body.kind(), "dsse");
        assert_eq!(body.api_version(), "0.0.1");
        let RekorEntryBody::DsseV001(body) = body else {
            panic!("expected dsse body");
        };
        assert_eq!(body.spec.payload_hash.value, "11");
        assert_eq!(body.spec.signatures.len(), 1);
    }

    #[test]
    fn test_parse_intoto_v002() {
        let body = RekorEntryBody::from_json(INTOTO.as_bytes(), "intoto", "0.0.2").unwrap();
        let RekorEntryBody::IntotoV002(body) = body else {
            panic!("expected intoto body");
        };
        let envelope = &body.spec.content.envelope;
        assert_eq!(envelope.decoded_payload().unwrap(), b"hello");
        assert_eq!(envelope.signatures[0].decoded_sig().unwrap(), b"sig");
    }

    #[rstest]
    #[case("hashedrekord", "0.0.2")]
    #[case("rekord", "0.0.1")]
    #[case("dsse", "0.0.3")]
    fn test_unsupported_kind(#[case] kind: &str, #[case] version: &str) {
        let result = RekorEntryBody::from_json(b"{}", kind, version);
        assert!(matches!(result, Err(Error::UnsupportedKind(_, _))));
    }

    #[test]
    fn test_schema_mismatch() {
        let result = RekorEntryBody::from_json(HASHEDREKORD.as_bytes(), "dsse", "0.0.1");
        match result {
            Err(Error::Schema { kind, .. }) => assert_eq!(kind, "dsse"),
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_base64() {
        let result = RekorEntryBody::from_base64_json("not base64!", "hashedrekord", "0.0.1");
        assert!(matches!(result, Err(Error::InvalidBody(_))));
    }
}
