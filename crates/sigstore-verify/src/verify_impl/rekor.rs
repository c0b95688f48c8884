//! Rekor transparency log entry validation
//!
//! This module checks that the body a log entry commits to describes the
//! same signature, signer and artifact as the bundle that carries it.

use super::helpers::SigningMaterial;
use crate::error::{Error, Result};
use base64::Engine;
use sigstore_rekor::body::{DsseV001Body, HashedRekordV001Body, IntotoV002Body, RekorEntryBody};
use sigstore_types::{
    DsseEnvelope, MessageSignature, Sha256Hash, SignatureContent, TransparencyLogEntry,
};

/// Verify that a log entry's body is consistent with the bundle content
pub fn verify_entry_body(
    entry: &TransparencyLogEntry,
    content: &SignatureContent,
    signer: &SigningMaterial,
    artifact_digest: &Sha256Hash,
) -> Result<()> {
    let kind_version = entry
        .kind_version
        .as_ref()
        .ok_or_else(|| Error::InvalidBundle("missing kindVersion".to_string()))?;

    let body = RekorEntryBody::from_json(
        entry.canonicalized_body.as_bytes(),
        &kind_version.kind,
        &kind_version.version,
    )
    .map_err(|e| Error::Verification(format!("failed to parse Rekor body: {}", e)))?;

    if body.kind() != kind_version.kind || body.api_version() != kind_version.version {
        return Err(Error::Verification(format!(
            "Rekor body is {} v{} but the entry claims {} v{}",
            body.kind(),
            body.api_version(),
            kind_version.kind,
            kind_version.version
        )));
    }

    match (&body, content) {
        (RekorEntryBody::HashedRekordV001(body), SignatureContent::MessageSignature(sig)) => {
            verify_hashedrekord_v001(body, sig, signer, artifact_digest)
        }
        (RekorEntryBody::DsseV001(body), SignatureContent::DsseEnvelope(envelope)) => {
            verify_dsse_v001(body, envelope, signer)
        }
        (RekorEntryBody::IntotoV002(body), SignatureContent::DsseEnvelope(envelope)) => {
            verify_intoto_v002(body, envelope)
        }
        _ => Err(Error::Verification(format!(
            "{} entry does not match the bundle content",
            body.kind()
        ))),
    }
}

fn verify_hashedrekord_v001(
    body: &HashedRekordV001Body,
    signature: &MessageSignature,
    signer: &SigningMaterial,
    artifact_digest: &Sha256Hash,
) -> Result<()> {
    let hash = &body.spec.data.hash;
    if !hash.algorithm.eq_ignore_ascii_case("sha256")
        || !hash.value.eq_ignore_ascii_case(&artifact_digest.to_hex())
    {
        return Err(Error::Verification(format!(
            "hashedrekord digest {}:{} does not match artifact digest {}",
            hash.algorithm,
            hash.value,
            artifact_digest.to_hex()
        )));
    }

    let rekor_sig = decode(&body.spec.signature.content, "signature")?;
    if rekor_sig != signature.signature.as_bytes() {
        return Err(Error::Verification(
            "signature in bundle does not match hashedrekord entry".to_string(),
        ));
    }

    let verifier = decode(&body.spec.signature.public_key.content, "public key")?;
    if !signer.matches_pem(&verifier) {
        return Err(Error::Verification(
            "hashedrekord entry was signed by a different key".to_string(),
        ));
    }

    Ok(())
}

/// Verify DSSE v0.0.1 entry
///
/// The envelope hash is not compared: it covers the JSON the client
/// submitted, which cannot be reproduced byte for byte. The payload hash
/// and the signature/verifier pairs are.
fn verify_dsse_v001(
    body: &DsseV001Body,
    envelope: &DsseEnvelope,
    signer: &SigningMaterial,
) -> Result<()> {
    let payload_hash = hex::encode(sigstore_crypto::sha256(envelope.payload.as_bytes()));
    let expected = &body.spec.payload_hash;
    if !expected.algorithm.eq_ignore_ascii_case("sha256")
        || !expected.value.eq_ignore_ascii_case(&payload_hash)
    {
        return Err(Error::Verification(format!(
            "DSSE payload hash mismatch: computed {}, expected {}",
            payload_hash, expected.value
        )));
    }

    let rekor_signatures = &body.spec.signatures;
    if envelope.signatures.len() != rekor_signatures.len() {
        return Err(Error::Verification(format!(
            "DSSE signature count mismatch: bundle has {}, Rekor entry has {}",
            envelope.signatures.len(),
            rekor_signatures.len()
        )));
    }

    for bundle_sig in &envelope.signatures {
        let mut found = false;
        for rekor_sig in rekor_signatures {
            let sig = decode(&rekor_sig.signature, "signature")?;
            let verifier = decode(&rekor_sig.verifier, "verifier")?;
            if sig == bundle_sig.sig.as_bytes() && signer.matches_pem(&verifier) {
                found = true;
                break;
            }
        }
        if !found {
            return Err(Error::Verification(
                "DSSE signature in bundle does not match any signature in Rekor entry".to_string(),
            ));
        }
    }

    Ok(())
}

fn verify_intoto_v002(body: &IntotoV002Body, envelope: &DsseEnvelope) -> Result<()> {
    let rekor_envelope = &body.spec.content.envelope;

    let payload = rekor_envelope
        .decoded_payload()
        .map_err(|e| Error::Verification(format!("failed to decode Rekor payload: {}", e)))?;
    if payload != envelope.payload.as_bytes() {
        return Err(Error::Verification(
            "DSSE payload in bundle does not match intoto Rekor entry".to_string(),
        ));
    }

    for bundle_sig in &envelope.signatures {
        for rekor_sig in &rekor_envelope.signatures {
            let sig = rekor_sig.decoded_sig().map_err(|e| {
                Error::Verification(format!("failed to decode Rekor signature: {}", e))
            })?;
            if sig == bundle_sig.sig.as_bytes() {
                return Ok(());
            }
        }
    }

    Err(Error::Verification(
        "DSSE signature in bundle does not match intoto Rekor entry".to_string(),
    ))
}

fn decode(value: &str, what: &str) -> Result<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(value)
        .map_err(|e| Error::Verification(format!("invalid base64 {} in Rekor body: {}", what, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigstore_crypto::PublicKey;
    use sigstore_types::{DsseSignature, KindVersion, PayloadBytes, SignatureBytes};

    const SIGNER_PUB: &str = include_str!("../../tests/fixtures/signer.pub");

    fn b64(bytes: &[u8]) -> String {
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    fn signer() -> SigningMaterial {
        SigningMaterial::PublicKey(PublicKey::from_pem(SIGNER_PUB).unwrap())
    }

    fn entry(kind: &str, version: &str, body: &str) -> TransparencyLogEntry {
        let mut entry: TransparencyLogEntry = serde_json::from_str(
            r#"{"logIndex": "1", "integratedTime": "1709294402"}"#,
        )
        .unwrap();
        entry.kind_version = Some(KindVersion {
            kind: kind.to_string(),
            version: version.to_string(),
        });
        entry.canonicalized_body = body.as_bytes().to_vec().into();
        entry
    }

    fn envelope() -> DsseEnvelope {
        DsseEnvelope::new(
            "application/vnd.in-toto+json".to_string(),
            PayloadBytes::new(b"hello".to_vec()),
            vec![DsseSignature {
                keyid: String::new(),
                sig: SignatureBytes::new(b"sig".to_vec()),
            }],
        )
    }

    fn intoto_body(payload: &[u8], sig: &[u8]) -> String {
        format!(
            r#"{{"apiVersion": "0.0.2", "kind": "intoto", "spec": {{"content": {{"envelope": {{
                "payloadType": "application/vnd.in-toto+json",
                "payload": "{}",
                "signatures": [{{"sig": "{}", "publicKey": ""}}]
            }}}}}}}}"#,
            b64(payload),
            b64(sig)
        )
    }

    #[test]
    fn test_intoto_consistent() {
        let entry = entry("intoto", "0.0.2", &intoto_body(b"hello", b"sig"));
        let content = SignatureContent::DsseEnvelope(envelope());
        let digest = Sha256Hash::from_bytes([0; 32]);
        verify_entry_body(&entry, &content, &signer(), &digest).unwrap();
    }

    #[test]
    fn test_intoto_signature_mismatch() {
        let entry = entry("intoto", "0.0.2", &intoto_body(b"hello", b"other"));
        let content = SignatureContent::DsseEnvelope(envelope());
        let digest = Sha256Hash::from_bytes([0; 32]);
        let err = verify_entry_body(&entry, &content, &signer(), &digest).unwrap_err();
        assert!(matches!(err, Error::Verification(_)));
    }

    #[test]
    fn test_kind_version_must_match_body() {
        let body = intoto_body(b"hello", b"sig").replace("\"0.0.2\"", "\"0.0.3\"");
        let entry = entry("intoto", "0.0.2", &body);
        let content = SignatureContent::DsseEnvelope(envelope());
        let digest = Sha256Hash::from_bytes([0; 32]);
        let err = verify_entry_body(&entry, &content, &signer(), &digest).unwrap_err();
        assert!(err.to_string().contains("claims intoto v0.0.2"));
    }

    #[test]
    fn test_unknown_kind() {
        let entry = entry("rekord", "0.0.1", "{}");
        let content = SignatureContent::DsseEnvelope(envelope());
        let digest = Sha256Hash::from_bytes([0; 32]);
        let err = verify_entry_body(&entry, &content, &signer(), &digest).unwrap_err();
        assert!(matches!(err, Error::Verification(_)));
    }

    #[test]
    fn test_body_kind_must_match_content() {
        let entry = entry("intoto", "0.0.2", &intoto_body(b"hello", b"sig"));
        let content = SignatureContent::MessageSignature(MessageSignature {
            message_digest: None,
            signature: SignatureBytes::new(b"sig".to_vec()),
        });
        let digest = Sha256Hash::from_bytes([0; 32]);
        let err = verify_entry_body(&entry, &content, &signer(), &digest).unwrap_err();
        assert!(err.to_string().contains("does not match the bundle content"));
    }
}
