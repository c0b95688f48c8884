//! Artifact signature verification
//!
//! Message signatures are checked over the artifact (or its digest), DSSE
//! envelopes over the PAE of their payload.

use crate::error::{Error, Result};
use serde::Deserialize;
use sigstore_crypto::PublicKey;
use sigstore_types::{Artifact, DsseEnvelope, MessageSignature, Sha256Hash};
use std::collections::HashMap;

/// The part of an in-toto statement that binds it to artifacts
#[derive(Deserialize)]
struct Statement {
    #[serde(default)]
    subject: Vec<Subject>,
}

#[derive(Deserialize)]
struct Subject {
    #[serde(default)]
    digest: HashMap<String, String>,
}

/// Verify a message signature over the artifact
///
/// When the artifact is only known by digest the signature is checked
/// prehashed.
pub fn verify_message_signature(
    signature: &MessageSignature,
    key: &PublicKey,
    artifact: &Artifact<'_>,
    artifact_digest: &Sha256Hash,
) -> Result<()> {
    if let Some(digest) = &signature.message_digest {
        if digest.digest != *artifact_digest {
            return Err(Error::Verification(
                "message digest in bundle does not match artifact hash".to_string(),
            ));
        }
    }

    let sig = signature.signature.as_bytes();
    let verified = match artifact {
        Artifact::Bytes(bytes) => key.verify(bytes, sig),
        Artifact::Digest(digest) => key.verify_prehashed(digest.as_bytes(), sig),
    };
    verified.map_err(|e| Error::Verification(format!("signature verification failed: {}", e)))
}

/// Verify a DSSE envelope and, for in-toto statements, that the artifact is
/// one of its subjects
pub fn verify_dsse_envelope(
    envelope: &DsseEnvelope,
    key: &PublicKey,
    artifact_digest: &Sha256Hash,
) -> Result<()> {
    let [signature] = envelope.signatures.as_slice() else {
        return Err(Error::InvalidBundle(format!(
            "DSSE envelope must carry exactly one signature, found {}",
            envelope.signatures.len()
        )));
    };

    key.verify(&envelope.pae(), signature.sig.as_bytes())
        .map_err(|e| Error::Verification(format!("DSSE signature verification failed: {}", e)))?;

    if envelope.is_in_toto() {
        let statement: Statement = serde_json::from_slice(envelope.payload.as_bytes())
            .map_err(|e| Error::Verification(format!("failed to parse in-toto statement: {}", e)))?;

        let expected = artifact_digest.to_hex();
        let matched = statement.subject.iter().any(|subject| {
            subject
                .digest
                .get("sha256")
                .is_some_and(|value| value.eq_ignore_ascii_case(&expected))
        });
        if !statement.subject.is_empty() && !matched {
            return Err(Error::Verification(
                "artifact hash does not match any subject in attestation".to_string(),
            ));
        }
    }

    Ok(())
}
