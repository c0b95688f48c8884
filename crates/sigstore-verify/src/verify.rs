//! High-level verification API
//!
//! This module provides the main entry point for verifying Sigstore signatures.

use crate::error::{ChainError, Error, Result};
use crate::identity::{verify_identity, CertificateIdentity};
use crate::verify_impl::chain::{verify_certificate_chain, ChainVerifyOptions};
use crate::verify_impl::helpers::{self, SigningMaterial};
use crate::verify_impl::{rekor, sct, signature, tlog};
use chrono::{DateTime, Utc};
use sigstore_bundle::{validate_bundle_with_options, ValidationOptions};
use sigstore_crypto::{Certificate, PublicKey};
use sigstore_trust_root::{TrustMaterial, TrustedRoot};
use sigstore_types::{Artifact, Bundle, SignatureContent};
use std::collections::HashMap;

/// Policy for verifying signatures
#[derive(Debug, Clone)]
pub struct VerificationPolicy {
    /// Identities the signing certificate may carry; empty accepts any
    pub identities: Vec<CertificateIdentity>,
    /// Minimum number of embedded SCTs that must verify
    pub ctlog_threshold: usize,
    /// Minimum number of transparency log entries that must verify
    pub tlog_threshold: usize,
    /// Verify embedded SCTs
    pub verify_ctlog: bool,
    /// Verify transparency log entries
    pub verify_tlog: bool,
}

impl Default for VerificationPolicy {
    fn default() -> Self {
        Self {
            identities: Vec::new(),
            ctlog_threshold: 1,
            tlog_threshold: 1,
            verify_ctlog: true,
            verify_tlog: true,
        }
    }
}

impl VerificationPolicy {
    /// Accept signatures from `identity` (in addition to any already required)
    pub fn require_identity(mut self, identity: CertificateIdentity) -> Self {
        self.identities.push(identity);
        self
    }

    /// Set the number of SCTs that must verify
    pub fn with_ctlog_threshold(mut self, threshold: usize) -> Self {
        self.ctlog_threshold = threshold;
        self
    }

    /// Set the number of transparency log entries that must verify
    pub fn with_tlog_threshold(mut self, threshold: usize) -> Self {
        self.tlog_threshold = threshold;
        self
    }

    /// Skip Certificate Transparency verification
    pub fn skip_ctlog(mut self) -> Self {
        self.verify_ctlog = false;
        self
    }

    /// Skip transparency log verification
    pub fn skip_tlog(mut self) -> Self {
        self.verify_tlog = false;
        self
    }
}

/// Result of verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    /// Length of the verified certificate chain (0 for public key material)
    pub chain_length: usize,
    /// Identity (email or URI SAN) from the certificate
    pub identity: Option<String>,
    /// OIDC issuer from the certificate
    pub issuer: Option<String>,
    /// Number of embedded SCTs that verified
    pub verified_scts: usize,
    /// Number of transparency log entries whose promise verified
    pub verified_tlog_entries: usize,
    /// The instant the certificate chain was checked at
    pub validation_time: DateTime<Utc>,
}

/// A verifier for Sigstore signatures
#[derive(Debug, Clone)]
pub struct Verifier {
    trust: TrustMaterial,
    /// Keys for `publicKey` verification material, by hint
    keys: HashMap<String, PublicKey>,
}

impl Verifier {
    /// Create a new verifier over decoded trust material
    pub fn new(trust: TrustMaterial) -> Self {
        Self {
            trust,
            keys: HashMap::new(),
        }
    }

    /// Create a new verifier from a trusted root document
    pub fn from_trusted_root(trusted_root: &TrustedRoot) -> Result<Self> {
        Ok(Self::new(trusted_root.trust_material()?))
    }

    /// Register a key for bundles whose verification material is a public
    /// key with this hint
    pub fn with_public_key(mut self, hint: impl Into<String>, key: PublicKey) -> Self {
        self.keys.insert(hint.into(), key);
        self
    }

    /// The trust material this verifier checks against
    pub fn trust_material(&self) -> &TrustMaterial {
        &self.trust
    }

    /// Verify an artifact against a bundle
    ///
    /// The artifact can be provided as raw bytes or as a pre-computed SHA-256 digest.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sigstore_verify::{Verifier, VerificationPolicy};
    /// use sigstore_trust_root::TrustedRoot;
    /// use sigstore_types::Bundle;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let trusted_root = TrustedRoot::from_file("trusted_root.json")?;
    /// let verifier = Verifier::from_trusted_root(&trusted_root)?;
    /// let bundle = Bundle::from_json(&std::fs::read_to_string("artifact.sigstore.json")?)?;
    ///
    /// let artifact = std::fs::read("artifact")?;
    /// verifier.verify(&artifact, &bundle, &VerificationPolicy::default())?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// The checks run in this order, and the first failure is returned:
    ///
    /// 1. Validate the bundle structure.
    /// 2. Verify that the signing certificate chains to a trusted CA at the
    ///    validation time, then verify its embedded SCTs.
    /// 3. Verify the certificate identity against the policy.
    /// 4. Verify the inclusion promise of every log entry, the timely
    ///    insertion of each entry, and the consistency of each entry body
    ///    with the bundle.
    /// 5. Verify the signature over the artifact or DSSE payload.
    pub fn verify<'a>(
        &self,
        artifact: impl Into<Artifact<'a>>,
        bundle: &Bundle,
        policy: &VerificationPolicy,
    ) -> Result<VerificationResult> {
        let artifact = artifact.into();

        // (1): Bundle structure
        let options = ValidationOptions {
            require_inclusion_promise: policy.verify_tlog,
            require_inclusion_proof: policy.verify_tlog,
        };
        validate_bundle_with_options(bundle, &options)?;
        let content = bundle
            .content
            .as_ref()
            .ok_or_else(|| Error::InvalidBundle("missing signature content".to_string()))?;

        let signer = helpers::extract_signing_material(
            &bundle.verification_material.content,
            &self.keys,
        )?;
        let validation_time = helpers::determine_validation_time(bundle, signer.leaf())?;
        let artifact_digest = helpers::artifact_digest(&artifact);

        let mut result = VerificationResult {
            chain_length: 0,
            identity: None,
            issuer: None,
            verified_scts: 0,
            verified_tlog_entries: 0,
            validation_time,
        };

        // (2): Certificate chain and SCTs
        if let SigningMaterial::Certificate { leaf, chain } = &signer {
            let path = self.verify_chain(leaf, chain, validation_time)?;
            result.chain_length = path.len();

            if policy.verify_ctlog {
                result.verified_scts =
                    sct::verify_scts(leaf, &path[1], &self.trust.ctlogs, policy.ctlog_threshold)?;
            }

            result.identity = leaf
                .subject_alt_name()
                .and_then(|san| san.identity())
                .map(str::to_string);
            result.issuer = leaf.fulcio_issuer();
        }

        // (3): Identity policy
        if !policy.identities.is_empty() {
            let leaf = signer.leaf().ok_or_else(|| {
                Error::Verification(
                    "identity policy requires certificate verification material".to_string(),
                )
            })?;
            result.identity = Some(verify_identity(leaf, &policy.identities)?);
        }

        // (4): Transparency log entries
        if policy.verify_tlog {
            for entry in bundle.tlog_entries() {
                tlog::verify_set(entry, &self.trust.tlogs)?;
                rekor::verify_entry_body(entry, content, &signer, &artifact_digest)?;
                result.verified_tlog_entries += 1;
            }
            if let Some(leaf) = signer.leaf() {
                helpers::validate_integrated_times(bundle, leaf)?;
            }
            if result.verified_tlog_entries < policy.tlog_threshold {
                return Err(Error::Verification(format!(
                    "not enough transparency log entries verified (found {}, need {})",
                    result.verified_tlog_entries, policy.tlog_threshold
                )));
            }
        }

        // (5): Artifact signature
        let key = signer.public_key();
        match content {
            SignatureContent::MessageSignature(sig) => {
                signature::verify_message_signature(sig, key, &artifact, &artifact_digest)?
            }
            SignatureContent::DsseEnvelope(envelope) => {
                signature::verify_dsse_envelope(envelope, key, &artifact_digest)?
            }
        }

        tracing::debug!(
            "bundle verified: chain length {}, {} SCTs, {} tlog entries",
            result.chain_length,
            result.verified_scts,
            result.verified_tlog_entries
        );
        Ok(result)
    }

    /// Find a CA, valid at `time`, that `leaf` chains to
    ///
    /// Authorities are tried in trusted root order and the first one that
    /// yields a valid path wins.
    fn verify_chain(
        &self,
        leaf: &Certificate,
        chain: &[Certificate],
        time: DateTime<Utc>,
    ) -> Result<Vec<Certificate>> {
        let mut last_error = ChainError::NoCertificates;
        for ca in self.trust.certificate_authorities_at(time) {
            let options = ChainVerifyOptions {
                trusted_certs: &ca.certificates,
                untrusted_certs: chain,
                check_date: time,
            };
            match verify_certificate_chain(leaf, &options) {
                Ok(path) => {
                    tracing::debug!("certificate chains to CA {}", ca.uri);
                    return Ok(path);
                }
                Err(e) => {
                    tracing::debug!("CA {} rejected certificate: {}", ca.uri, e);
                    last_error = e;
                }
            }
        }
        Err(last_error.into())
    }
}

/// Convenience function to verify an artifact against a bundle
///
/// The artifact can be provided as raw bytes or as a pre-computed SHA-256 digest:
/// - `verify(artifact_bytes, ...)` - pass raw bytes
/// - `verify(Sha256Hash::from_hex("...")?, ...)` - pass pre-computed digest
pub fn verify<'a>(
    artifact: impl Into<Artifact<'a>>,
    bundle: &Bundle,
    policy: &VerificationPolicy,
    trusted_root: &TrustedRoot,
) -> Result<VerificationResult> {
    let verifier = Verifier::from_trusted_root(trusted_root)?;
    verifier.verify(artifact, bundle, policy)
}
