//! Signer identity policy
//!
//! A Fulcio certificate records who signed (the subject alternative name)
//! and which OIDC provider vouched for them (the issuer extension). A
//! [`CertificateIdentity`] constrains both, plus any further extensions.

use crate::error::{Error, Result};
use regex::Regex;
use sigstore_crypto::Certificate;

/// How a subject alternative name is matched
#[derive(Debug, Clone)]
pub enum SanMatcher {
    /// The SAN must equal this value
    Exact(String),
    /// The SAN must match this pattern somewhere
    Regex(Regex),
}

impl SanMatcher {
    /// Match the SAN exactly
    pub fn exact(value: impl Into<String>) -> Self {
        Self::Exact(value.into())
    }

    /// Match the SAN against a regular expression
    ///
    /// The pattern is not anchored; use `^...$` to match the whole SAN.
    pub fn regex(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(Self::Regex)
            .map_err(|e| Error::Verification(format!("invalid SAN pattern {:?}: {}", pattern, e)))
    }

    /// Whether `san` satisfies this matcher
    pub fn matches(&self, san: &str) -> bool {
        match self {
            Self::Exact(value) => value == san,
            Self::Regex(regex) => regex.is_match(san),
        }
    }
}

impl std::fmt::Display for SanMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(value) => write!(f, "{}", value),
            Self::Regex(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

/// An identity a signing certificate may carry
#[derive(Debug, Clone)]
pub struct CertificateIdentity {
    /// Expected OIDC issuer
    pub issuer: String,
    /// Expected subject alternative name
    pub san: SanMatcher,
    /// Further required extensions as `(oid, value)` pairs
    pub extensions: Vec<(String, String)>,
}

impl CertificateIdentity {
    pub fn new(issuer: impl Into<String>, san: SanMatcher) -> Self {
        Self {
            issuer: issuer.into(),
            san,
            extensions: Vec::new(),
        }
    }

    /// Also require extension `oid` to hold `value`
    pub fn with_extension(mut self, oid: impl Into<String>, value: impl Into<String>) -> Self {
        self.extensions.push((oid.into(), value.into()));
        self
    }

    /// Whether `cert` carries this identity
    pub fn matches(&self, cert: &Certificate, san: &str) -> bool {
        if cert.fulcio_issuer().as_deref() != Some(self.issuer.as_str()) {
            return false;
        }
        if !self.san.matches(san) {
            return false;
        }
        self.extensions
            .iter()
            .all(|(oid, value)| extension_matches(cert, oid, value))
    }
}

/// Extension values are compared both as raw bytes and, for DER-encoded
/// strings, as the decoded string
fn extension_matches(cert: &Certificate, oid: &str, expected: &str) -> bool {
    let Some(ext) = cert.extension(oid) else {
        return false;
    };
    if ext.value() == expected.as_bytes() {
        return true;
    }
    ext.value_obj()
        .subs()
        .first()
        .and_then(|inner| inner.to_utf8_string().ok())
        .is_some_and(|value| value == expected)
}

/// Require `cert` to match at least one of `identities`
///
/// Returns the certificate's SAN identity.
pub fn verify_identity(cert: &Certificate, identities: &[CertificateIdentity]) -> Result<String> {
    let san = cert
        .subject_alt_name()
        .and_then(|san| san.identity())
        .ok_or_else(|| {
            Error::InvalidBundle("certificate has no email or URI subject alternative name".into())
        })?;

    if identities.iter().any(|identity| identity.matches(cert, san)) {
        return Ok(san.to_string());
    }

    let issuer = cert.fulcio_issuer().unwrap_or_default();
    tracing::debug!(
        "certificate identity {} from {} matched none of {} identities",
        san,
        issuer,
        identities.len()
    );
    Err(Error::Verification(format!(
        "certificate identity {} (issuer {}) does not match any trusted identity",
        san, issuer
    )))
}
