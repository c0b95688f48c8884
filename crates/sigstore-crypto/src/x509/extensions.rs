//! Typed views of the certificate extensions Sigstore relies on
//!
//! Each view is decoded from the `extnValue` OCTET STRING of its extension.
//! The decoder has already parsed that OCTET STRING's content as DER, so the
//! extension's own structure is its first child.

use crate::error::{Error, Result};
use sigstore_asn1::Asn1Obj;

/// keyUsage
pub const OID_KEY_USAGE: &str = "2.5.29.15";
/// subjectAltName
pub const OID_SUBJECT_ALT_NAME: &str = "2.5.29.17";
/// basicConstraints
pub const OID_BASIC_CONSTRAINTS: &str = "2.5.29.19";
/// subjectKeyIdentifier
pub const OID_SUBJECT_KEY_IDENTIFIER: &str = "2.5.29.14";
/// authorityKeyIdentifier
pub const OID_AUTHORITY_KEY_IDENTIFIER: &str = "2.5.29.35";
/// Embedded SCT list (RFC 6962)
pub const OID_SCT_LIST: &str = "1.3.6.1.4.1.11129.2.4.2";
/// Fulcio OIDC issuer, raw string value
pub const OID_FULCIO_ISSUER: &str = "1.3.6.1.4.1.57264.1.1";
/// Fulcio OIDC issuer, DER UTF8String value
pub const OID_FULCIO_ISSUER_V2: &str = "1.3.6.1.4.1.57264.1.8";

/// Extensions that may be marked critical without failing certificate parsing
pub const RECOGNIZED_CRITICAL_EXTENSIONS: &[&str] =
    &[OID_KEY_USAGE, OID_BASIC_CONSTRAINTS, OID_SUBJECT_ALT_NAME];

/// A single certificate extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    oid: String,
    critical: bool,
    value: Asn1Obj,
}

impl Extension {
    /// Decode `SEQUENCE { extnID, critical BOOLEAN DEFAULT FALSE, extnValue }`
    pub(crate) fn from_asn1(obj: &Asn1Obj) -> Result<Self> {
        let (oid, critical, value) = match obj.subs() {
            [oid, value] => (oid, false, value),
            [oid, critical, value] => (oid, critical.to_boolean()?, value),
            subs => {
                return Err(Error::InvalidCertificate(format!(
                    "extension has {} elements",
                    subs.len()
                )))
            }
        };
        if !value.tag().is_octet_string() {
            return Err(Error::InvalidCertificate(format!(
                "extension value has tag {}, expected OCTET STRING",
                value.tag()
            )));
        }

        Ok(Self {
            oid: oid.to_oid()?,
            critical,
            value: value.clone(),
        })
    }

    /// The extension OID in dotted form
    pub fn oid(&self) -> &str {
        &self.oid
    }

    /// Whether the extension is marked critical
    pub fn critical(&self) -> bool {
        self.critical
    }

    /// The content of the `extnValue` OCTET STRING
    pub fn value(&self) -> &[u8] {
        self.value.value()
    }

    /// The `extnValue` element itself, with any parsed children
    pub fn value_obj(&self) -> &Asn1Obj {
        &self.value
    }

    fn inner(&self) -> Result<&Asn1Obj> {
        self.value.subs().first().ok_or_else(|| {
            Error::InvalidCertificate(format!("extension {} value is not DER", self.oid))
        })
    }
}

/// basicConstraints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicConstraints {
    /// The cA flag
    pub ca: bool,
    /// Maximum number of intermediates below this CA
    pub path_len_constraint: Option<i64>,
}

impl BasicConstraints {
    pub(crate) fn from_extension(ext: &Extension) -> Result<Self> {
        let seq = ext.inner()?;
        let mut ca = false;
        let mut path_len_constraint = None;
        for sub in seq.subs() {
            if sub.tag().is_boolean() {
                ca = sub.to_boolean()?;
            } else if sub.tag().is_integer() {
                path_len_constraint = Some(sub.to_integer()?);
            }
        }
        Ok(Self {
            ca,
            path_len_constraint,
        })
    }
}

/// keyUsage bits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyUsage {
    bits: Vec<u8>,
}

impl KeyUsage {
    pub(crate) fn from_extension(ext: &Extension) -> Result<Self> {
        Ok(Self {
            bits: ext.inner()?.to_bit_string()?,
        })
    }

    fn bit(&self, n: usize) -> bool {
        self.bits.get(n) == Some(&1)
    }

    /// digitalSignature (bit 0)
    pub fn digital_signature(&self) -> bool {
        self.bit(0)
    }

    /// keyCertSign (bit 5)
    pub fn key_cert_sign(&self) -> bool {
        self.bit(5)
    }

    /// cRLSign (bit 6)
    pub fn crl_sign(&self) -> bool {
        self.bit(6)
    }
}

/// One entry of a GeneralNames sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneralName {
    /// `[0] otherName`: a type OID and its explicitly tagged value
    OtherName {
        /// type-id
        oid: String,
        /// The element inside the `[0] EXPLICIT` wrapper
        value: Asn1Obj,
    },
    /// `[1] rfc822Name`
    Email(String),
    /// `[2] dNSName`
    Dns(String),
    /// `[6] uniformResourceIdentifier`
    Uri(String),
    /// Any other form, kept by tag number
    Unsupported(u8),
}

impl GeneralName {
    fn from_asn1(obj: &Asn1Obj) -> Result<Self> {
        let tag = obj.tag();
        let text = || {
            String::from_utf8(obj.value().to_vec())
                .map_err(|e| Error::InvalidCertificate(format!("SAN is not UTF-8: {}", e)))
        };

        if tag.is_context_specific(0) {
            match obj.subs() {
                [oid, wrapper] if wrapper.tag().is_context_specific(0) => {
                    let value = wrapper.subs().first().cloned().ok_or_else(|| {
                        Error::InvalidCertificate("empty otherName value".to_string())
                    })?;
                    Ok(GeneralName::OtherName {
                        oid: oid.to_oid()?,
                        value,
                    })
                }
                _ => Err(Error::InvalidCertificate(
                    "malformed otherName".to_string(),
                )),
            }
        } else if tag.is_context_specific(1) {
            Ok(GeneralName::Email(text()?))
        } else if tag.is_context_specific(2) {
            Ok(GeneralName::Dns(text()?))
        } else if tag.is_context_specific(6) {
            Ok(GeneralName::Uri(text()?))
        } else {
            Ok(GeneralName::Unsupported(tag.number()))
        }
    }
}

/// subjectAltName
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectAltName {
    names: Vec<GeneralName>,
}

impl SubjectAltName {
    pub(crate) fn from_extension(ext: &Extension) -> Result<Self> {
        let names = ext
            .inner()?
            .subs()
            .iter()
            .map(GeneralName::from_asn1)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { names })
    }

    /// All names in order
    pub fn names(&self) -> &[GeneralName] {
        &self.names
    }

    /// The first rfc822Name
    pub fn email(&self) -> Option<&str> {
        self.names.iter().find_map(|name| match name {
            GeneralName::Email(email) => Some(email.as_str()),
            _ => None,
        })
    }

    /// The first URI
    pub fn uri(&self) -> Option<&str> {
        self.names.iter().find_map(|name| match name {
            GeneralName::Uri(uri) => Some(uri.as_str()),
            _ => None,
        })
    }

    /// The signer identity: email if present, otherwise URI
    pub fn identity(&self) -> Option<&str> {
        self.email().or_else(|| self.uri())
    }

    /// The string value of an otherName with the given type OID
    pub fn other_name(&self, oid: &str) -> Option<String> {
        self.names.iter().find_map(|name| match name {
            GeneralName::OtherName { oid: id, value } if id == oid => {
                value.to_utf8_string().ok()
            }
            _ => None,
        })
    }
}

/// `AuthorityKeyIdentifier.keyIdentifier` (`[0]` inside the sequence)
pub(crate) fn authority_key_identifier(ext: &Extension) -> Result<Option<Vec<u8>>> {
    Ok(ext
        .inner()?
        .subs()
        .iter()
        .find(|sub| sub.tag().is_context_specific(0))
        .map(|sub| sub.value().to_vec()))
}

/// `SubjectKeyIdentifier ::= OCTET STRING`
pub(crate) fn subject_key_identifier(ext: &Extension) -> Result<Vec<u8>> {
    let inner = ext.inner()?;
    if !inner.tag().is_octet_string() {
        return Err(Error::InvalidCertificate(format!(
            "subjectKeyIdentifier has tag {}",
            inner.tag()
        )));
    }
    Ok(inner.value().to_vec())
}

/// The TLS-encoded `SignedCertificateTimestampList` inside the extension
pub(crate) fn sct_list(ext: &Extension) -> Result<Vec<u8>> {
    let inner = ext.inner()?;
    if !inner.tag().is_octet_string() {
        return Err(Error::InvalidCertificate(format!(
            "SCT list extension has tag {}",
            inner.tag()
        )));
    }
    Ok(inner.value().to_vec())
}
