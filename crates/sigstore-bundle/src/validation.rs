//! Bundle validation
//!
//! Structural checks on a parsed bundle, applied before any cryptography.
//! Every problem is recorded as the JSON path of the offending field, so a
//! malformed bundle is reported in one pass.

use crate::error::{Error, Result};
use sigstore_types::{
    Bundle, HashAlgorithm, MediaType, SignatureContent, TransparencyLogEntry,
    VerificationMaterialContent,
};

/// Validation options
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    /// Require an inclusion promise on every entry of a v0.1 bundle
    pub require_inclusion_promise: bool,
    /// Require an inclusion proof on every entry of a v0.2+ bundle
    pub require_inclusion_proof: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            require_inclusion_promise: true,
            require_inclusion_proof: true,
        }
    }
}

/// Validate a Sigstore bundle
pub fn validate_bundle(bundle: &Bundle) -> Result<()> {
    validate_bundle_with_options(bundle, &ValidationOptions::default())
}

/// Validate a Sigstore bundle with custom options
pub fn validate_bundle_with_options(bundle: &Bundle, options: &ValidationOptions) -> Result<()> {
    let mut invalid = Vec::new();

    let version = match bundle.version() {
        Ok(version) => Some(version),
        Err(_) => {
            invalid.push("mediaType".to_string());
            None
        }
    };

    validate_content(bundle, &mut invalid);
    validate_verification_material(bundle, version, &mut invalid);

    for (i, entry) in bundle.tlog_entries().iter().enumerate() {
        validate_tlog_entry(entry, i, version, options, &mut invalid);
    }

    if invalid.is_empty() {
        Ok(())
    } else {
        tracing::debug!("bundle failed validation: {:?}", invalid);
        Err(Error::InvalidFields(invalid))
    }
}

/// Parse a bundle from JSON and validate it
pub fn load_bundle(json: &str) -> Result<Bundle> {
    let bundle = Bundle::from_json(json)?;
    validate_bundle(&bundle)?;
    Ok(bundle)
}

fn validate_content(bundle: &Bundle, invalid: &mut Vec<String>) {
    match &bundle.content {
        None => invalid.push("content".to_string()),
        Some(SignatureContent::MessageSignature(sig)) => {
            if sig.signature.is_empty() {
                invalid.push("messageSignature.signature".to_string());
            }
            if let Some(digest) = &sig.message_digest {
                if digest.algorithm != HashAlgorithm::Sha2256 {
                    invalid.push("messageSignature.messageDigest.algorithm".to_string());
                }
            }
        }
        Some(SignatureContent::DsseEnvelope(env)) => {
            if env.payload.is_empty() {
                invalid.push("dsseEnvelope.payload".to_string());
            }
            if env.payload_type.is_empty() {
                invalid.push("dsseEnvelope.payloadType".to_string());
            }
            match env.signatures.as_slice() {
                [sig] => {
                    if sig.sig.is_empty() {
                        invalid.push("dsseEnvelope.signatures[0].sig".to_string());
                    }
                }
                _ => invalid.push("dsseEnvelope.signatures".to_string()),
            }
        }
    }
}

fn validate_verification_material(
    bundle: &Bundle,
    version: Option<MediaType>,
    invalid: &mut Vec<String>,
) {
    match &bundle.verification_material.content {
        VerificationMaterialContent::X509CertificateChain { certificates } => {
            if version == Some(MediaType::Bundle0_3) {
                invalid.push("verificationMaterial.x509CertificateChain".to_string());
            }
            if certificates.is_empty() {
                invalid.push("verificationMaterial.x509CertificateChain.certificates".to_string());
            }
            for (i, cert) in certificates.iter().enumerate() {
                if cert.raw_bytes.is_empty() {
                    invalid.push(format!(
                        "verificationMaterial.x509CertificateChain.certificates[{}].rawBytes",
                        i
                    ));
                }
            }
        }
        VerificationMaterialContent::Certificate(cert) => {
            if cert.raw_bytes.is_empty() {
                invalid.push("verificationMaterial.certificate.rawBytes".to_string());
            }
        }
        VerificationMaterialContent::PublicKey { .. } => {}
    }
}

fn validate_tlog_entry(
    entry: &TransparencyLogEntry,
    index: usize,
    version: Option<MediaType>,
    options: &ValidationOptions,
    invalid: &mut Vec<String>,
) {
    let path = |field: &str| format!("verificationMaterial.tlogEntries[{}].{}", index, field);

    if entry.log_id.is_none() {
        invalid.push(path("logId"));
    }
    if entry.kind_version.is_none() {
        invalid.push(path("kindVersion"));
    }
    if entry.canonicalized_body.is_empty() {
        invalid.push(path("canonicalizedBody"));
    }

    match version {
        Some(MediaType::Bundle0_1) => {
            if options.require_inclusion_promise && entry.inclusion_promise.is_none() {
                invalid.push(path("inclusionPromise"));
            }
        }
        Some(MediaType::Bundle0_2 | MediaType::Bundle0_3) => match &entry.inclusion_proof {
            None if options.require_inclusion_proof => invalid.push(path("inclusionProof")),
            Some(proof) if proof.checkpoint.is_empty() => {
                invalid.push(path("inclusionProof.checkpoint"))
            }
            _ => {}
        },
        None => {}
    }
}
