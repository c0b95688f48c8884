//! The certificate itself
//!
//! A [`Certificate`] wraps the decoded DER tree. Structural fields are
//! checked once at parse time; accessors then read fixed positions of the
//! `TBSCertificate` sequence.

use super::extensions::{
    authority_key_identifier, sct_list, subject_key_identifier, BasicConstraints, Extension,
    KeyUsage, SubjectAltName, OID_AUTHORITY_KEY_IDENTIFIER, OID_BASIC_CONSTRAINTS,
    OID_FULCIO_ISSUER, OID_FULCIO_ISSUER_V2, OID_KEY_USAGE, OID_SCT_LIST,
    OID_SUBJECT_ALT_NAME, OID_SUBJECT_KEY_IDENTIFIER, RECOGNIZED_CRITICAL_EXTENSIONS,
};
use crate::error::{Error, Result};
use crate::key::{KeyAlgorithm, PublicKey};
use crate::scheme::SigningScheme;
use chrono::{DateTime, Utc};
use sigstore_asn1::{Asn1Obj, Tag};

const OID_ECDSA_WITH_SHA256: &str = "1.2.840.10045.4.3.2";
const OID_ECDSA_WITH_SHA384: &str = "1.2.840.10045.4.3.3";
const OID_ECDSA_WITH_SHA512: &str = "1.2.840.10045.4.3.4";
const OID_RSASSA_PSS: &str = "1.2.840.113549.1.1.10";
const OID_SHA256_WITH_RSA: &str = "1.2.840.113549.1.1.11";
const OID_SHA384_WITH_RSA: &str = "1.2.840.113549.1.1.12";
const OID_SHA512_WITH_RSA: &str = "1.2.840.113549.1.1.13";
const OID_ED25519: &str = "1.3.101.112";

const OID_SHA256: &str = "2.16.840.1.101.3.4.2.1";
const OID_SHA384: &str = "2.16.840.1.101.3.4.2.2";
const OID_SHA512: &str = "2.16.840.1.101.3.4.2.3";

/// An X.509 v3 certificate
#[derive(Debug, Clone)]
pub struct Certificate {
    root: Asn1Obj,
    // 1 when the explicit [0] version is present, 0 for v1 certificates
    offset: usize,
    version: i64,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
    public_key: PublicKey,
    signature_algorithm: String,
    extensions: Vec<Extension>,
    basic_constraints: Option<BasicConstraints>,
    key_usage: Option<KeyUsage>,
    subject_alt_name: Option<SubjectAltName>,
    authority_key_id: Option<Vec<u8>>,
    subject_key_id: Option<Vec<u8>>,
}

impl Certificate {
    /// Parse a DER certificate, allowing the default set of critical extensions
    pub fn from_der(der: &[u8]) -> Result<Self> {
        Self::parse_with_recognized(der, RECOGNIZED_CRITICAL_EXTENSIONS)
    }

    /// Parse a PEM `CERTIFICATE` block
    pub fn from_pem(pem_str: &str) -> Result<Self> {
        let parsed = pem::parse(pem_str)?;
        if parsed.tag() != "CERTIFICATE" {
            return Err(Error::Pem(format!(
                "expected CERTIFICATE block, got {}",
                parsed.tag()
            )));
        }
        Self::from_der(parsed.contents())
    }

    /// Parse every `CERTIFICATE` block in a PEM bundle, in order
    pub fn from_pem_chain(pem_str: &str) -> Result<Vec<Self>> {
        pem::parse_many(pem_str)?
            .iter()
            .filter(|block| block.tag() == "CERTIFICATE")
            .map(|block| Self::from_der(block.contents()))
            .collect()
    }

    /// Parse a DER certificate
    ///
    /// Parsing fails if any extension marked critical is not listed in
    /// `recognized`.
    pub fn parse_with_recognized(der: &[u8], recognized: &[&str]) -> Result<Self> {
        let root = Asn1Obj::parse(der)?;
        let [tbs, signature_algorithm, signature] = root.subs() else {
            return Err(Error::InvalidCertificate(format!(
                "certificate has {} top-level elements, expected 3",
                root.subs().len()
            )));
        };
        if !tbs.tag().is_sequence() || !signature.tag().is_bit_string() {
            return Err(Error::InvalidCertificate(
                "malformed certificate structure".to_string(),
            ));
        }
        signature.bit_string_octets()?;

        let fields = tbs.subs();
        let (offset, version) = match fields.first() {
            Some(v) if v.tag().is_context_specific(0) => {
                let number = v
                    .subs()
                    .first()
                    .ok_or_else(|| Error::InvalidCertificate("empty version".to_string()))?
                    .to_integer()?;
                if !(0..=2).contains(&number) {
                    return Err(Error::InvalidCertificate(format!(
                        "unknown certificate version {}",
                        number
                    )));
                }
                (1, number + 1)
            }
            _ => (0, 1),
        };
        if fields.len() < offset + 6 {
            return Err(Error::InvalidCertificate(format!(
                "TBSCertificate has {} elements",
                fields.len()
            )));
        }

        let validity = &fields[offset + 3];
        let [not_before, not_after] = validity.subs() else {
            return Err(Error::InvalidCertificate(
                "validity must have two elements".to_string(),
            ));
        };
        let not_before = not_before.to_date()?;
        let not_after = not_after.to_date()?;

        let public_key = PublicKey::from_spki(&fields[offset + 5])?;

        let algorithm_oid = signature_algorithm
            .subs()
            .first()
            .ok_or_else(|| Error::InvalidCertificate("empty signature algorithm".to_string()))?
            .to_oid()?;

        let extensions = match fields.iter().find(|f| f.tag().is_context_specific(3)) {
            Some(wrapper) => {
                let seq = wrapper.subs().first().ok_or_else(|| {
                    Error::InvalidCertificate("empty extensions wrapper".to_string())
                })?;
                seq.subs()
                    .iter()
                    .map(Extension::from_asn1)
                    .collect::<Result<Vec<_>>>()?
            }
            None => Vec::new(),
        };

        for (i, ext) in extensions.iter().enumerate() {
            if ext.critical() && !recognized.contains(&ext.oid()) {
                return Err(Error::InvalidCertificate(format!(
                    "unrecognized critical extension {}",
                    ext.oid()
                )));
            }
            if extensions[..i].iter().any(|prev| prev.oid() == ext.oid()) {
                return Err(Error::InvalidCertificate(format!(
                    "duplicate extension {}",
                    ext.oid()
                )));
            }
        }

        let find = |oid: &str| extensions.iter().find(|ext| ext.oid() == oid);
        let basic_constraints = find(OID_BASIC_CONSTRAINTS)
            .map(BasicConstraints::from_extension)
            .transpose()?;
        let key_usage = find(OID_KEY_USAGE)
            .map(KeyUsage::from_extension)
            .transpose()?;
        let subject_alt_name = find(OID_SUBJECT_ALT_NAME)
            .map(SubjectAltName::from_extension)
            .transpose()?;
        let authority_key_id = match find(OID_AUTHORITY_KEY_IDENTIFIER) {
            Some(ext) => authority_key_identifier(ext)?,
            None => None,
        };
        let subject_key_id = find(OID_SUBJECT_KEY_IDENTIFIER)
            .map(subject_key_identifier)
            .transpose()?;

        Ok(Self {
            root,
            offset,
            version,
            not_before,
            not_after,
            public_key,
            signature_algorithm: algorithm_oid,
            extensions,
            basic_constraints,
            key_usage,
            subject_alt_name,
            authority_key_id,
            subject_key_id,
        })
    }

    /// The DER encoding
    pub fn der(&self) -> &[u8] {
        self.root.raw()
    }

    /// The certificate as a PEM `CERTIFICATE` block
    pub fn to_pem(&self) -> String {
        pem::encode(&pem::Pem::new("CERTIFICATE", self.der().to_vec()))
    }

    fn tbs(&self) -> &Asn1Obj {
        &self.root.subs()[0]
    }

    fn field(&self, index: usize) -> &Asn1Obj {
        &self.tbs().subs()[self.offset + index]
    }

    /// The encoded `TBSCertificate`, which the issuer signature covers
    pub fn tbs_der(&self) -> &[u8] {
        self.tbs().raw()
    }

    /// Certificate version (3 for X.509v3)
    pub fn version(&self) -> i64 {
        self.version
    }

    /// Serial number content octets
    pub fn serial_number(&self) -> &[u8] {
        self.field(0).value()
    }

    /// Serial number as lowercase hex
    pub fn serial_number_hex(&self) -> String {
        hex::encode(self.serial_number())
    }

    /// The encoded issuer `Name`
    pub fn issuer(&self) -> &Asn1Obj {
        self.field(2)
    }

    /// The encoded subject `Name`
    pub fn subject(&self) -> &Asn1Obj {
        self.field(4)
    }

    pub fn not_before(&self) -> DateTime<Utc> {
        self.not_before
    }

    pub fn not_after(&self) -> DateTime<Utc> {
        self.not_after
    }

    /// Whether `date` lies within `[notBefore, notAfter]`, both ends inclusive
    pub fn valid_for_date(&self, date: DateTime<Utc>) -> bool {
        self.not_before <= date && date <= self.not_after
    }

    /// The subject public key
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// The outer signature algorithm OID
    pub fn signature_algorithm(&self) -> &str {
        &self.signature_algorithm
    }

    /// The issuer's signature over the TBS bytes
    pub fn signature(&self) -> &[u8] {
        // checked at parse time
        self.root.subs()[2].bit_string_octets().unwrap_or_default()
    }

    /// All extensions in certificate order
    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    /// The extension with the given OID, if present
    pub fn extension(&self, oid: &str) -> Option<&Extension> {
        self.extensions.iter().find(|ext| ext.oid() == oid)
    }

    pub fn basic_constraints(&self) -> Option<&BasicConstraints> {
        self.basic_constraints.as_ref()
    }

    pub fn key_usage(&self) -> Option<&KeyUsage> {
        self.key_usage.as_ref()
    }

    pub fn subject_alt_name(&self) -> Option<&SubjectAltName> {
        self.subject_alt_name.as_ref()
    }

    /// `authorityKeyIdentifier.keyIdentifier`
    pub fn authority_key_id(&self) -> Option<&[u8]> {
        self.authority_key_id.as_deref()
    }

    /// `subjectKeyIdentifier`
    pub fn subject_key_id(&self) -> Option<&[u8]> {
        self.subject_key_id.as_deref()
    }

    /// The TLS-encoded embedded SCT list, if the certificate carries one
    pub fn sct_list(&self) -> Result<Option<Vec<u8>>> {
        self.extension(OID_SCT_LIST).map(sct_list).transpose()
    }

    /// A CA certificate: basicConstraints.cA set, and keyCertSign asserted
    /// whenever a keyUsage extension is present
    pub fn is_ca(&self) -> bool {
        let ca = self.basic_constraints.is_some_and(|bc| bc.ca);
        let may_sign_certs = self
            .key_usage
            .as_ref()
            .map_or(true, |ku| ku.key_cert_sign());
        ca && may_sign_certs
    }

    /// Whether issuer and subject names are identical
    pub fn is_self_issued(&self) -> bool {
        self.issuer() == self.subject()
    }

    /// The OIDC issuer recorded by Fulcio
    ///
    /// The DER UTF8String form is preferred over the legacy raw string form.
    pub fn fulcio_issuer(&self) -> Option<String> {
        if let Some(ext) = self.extension(OID_FULCIO_ISSUER_V2) {
            match ext.value_obj().subs().first().map(|s| s.to_utf8_string()) {
                Some(Ok(issuer)) => return Some(issuer),
                _ => tracing::debug!("malformed Fulcio issuer extension, trying legacy form"),
            }
        }
        self.extension(OID_FULCIO_ISSUER)
            .and_then(|ext| String::from_utf8(ext.value().to_vec()).ok())
    }

    /// The scheme the issuer signature is checked with, given the signer's key
    pub fn signature_scheme(&self, signer: &PublicKey) -> Result<SigningScheme> {
        use KeyAlgorithm::*;

        let unsupported = || {
            Error::UnsupportedAlgorithm(format!(
                "signature algorithm {} with {:?} key",
                self.signature_algorithm,
                signer.algorithm()
            ))
        };

        let scheme = match (self.signature_algorithm.as_str(), signer.algorithm()) {
            (OID_ECDSA_WITH_SHA256, EcP256) => SigningScheme::EcdsaP256Sha256,
            (OID_ECDSA_WITH_SHA384, EcP256) => SigningScheme::EcdsaP256Sha384,
            (OID_ECDSA_WITH_SHA512, EcP256) => SigningScheme::EcdsaP256Sha512,
            (OID_ECDSA_WITH_SHA256, EcP384) => SigningScheme::EcdsaP384Sha256,
            (OID_ECDSA_WITH_SHA384, EcP384) => SigningScheme::EcdsaP384Sha384,
            (OID_ECDSA_WITH_SHA512, EcP384) => SigningScheme::EcdsaP384Sha512,
            (OID_SHA256_WITH_RSA, Rsa) => SigningScheme::RsaPkcs1Sha256,
            (OID_SHA384_WITH_RSA, Rsa) => SigningScheme::RsaPkcs1Sha384,
            (OID_SHA512_WITH_RSA, Rsa) => SigningScheme::RsaPkcs1Sha512,
            (OID_RSASSA_PSS, Rsa) => match self.pss_hash()?.as_str() {
                OID_SHA256 => SigningScheme::RsaPssSha256,
                OID_SHA384 => SigningScheme::RsaPssSha384,
                OID_SHA512 => SigningScheme::RsaPssSha512,
                _ => return Err(unsupported()),
            },
            (OID_ED25519, Ed25519) => SigningScheme::Ed25519,
            _ => return Err(unsupported()),
        };
        Ok(scheme)
    }

    /// The hash OID from `RSASSA-PSS-params`; SHA-1 when absent
    fn pss_hash(&self) -> Result<String> {
        let params = self.root.subs()[1].subs().get(1);
        let hash = params
            .and_then(|p| p.subs().iter().find(|s| s.tag().is_context_specific(0)))
            .and_then(|wrapper| wrapper.subs().first())
            .and_then(|algorithm| algorithm.subs().first());
        match hash {
            Some(oid) => Ok(oid.to_oid()?),
            None => Ok("1.3.14.3.2.26".to_string()),
        }
    }

    /// Check the signature over the TBS bytes
    ///
    /// With `None` the certificate's own key is used, which tests for a
    /// self-signature. Any failure yields `false`.
    pub fn verify(&self, issuer: Option<&Certificate>) -> bool {
        let key = issuer.map_or(&self.public_key, |i| &i.public_key);
        let result = self
            .signature_scheme(key)
            .and_then(|scheme| key.verify_with_scheme(self.tbs_der(), self.signature(), scheme));
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(
                    "certificate {} signature check failed: {}",
                    self.serial_number_hex(),
                    e
                );
                false
            }
        }
    }

    /// Whether the certificate is self-issued and verifies under its own key
    pub fn is_self_signed(&self) -> bool {
        self.is_self_issued() && self.verify(None)
    }

    /// The TBS bytes with one extension removed and everything else
    /// re-encoded unchanged
    ///
    /// Removing the embedded SCT list yields the pre-certificate TBS that CT
    /// logs sign.
    pub fn tbs_without_extension(&self, oid: &str) -> Result<Vec<u8>> {
        let tbs = self.tbs();
        let fields = tbs
            .subs()
            .iter()
            .map(|field| -> Result<Asn1Obj> {
                if !field.tag().is_context_specific(3) {
                    return Ok(field.clone());
                }
                let Some(seq) = field.subs().first() else {
                    return Ok(field.clone());
                };
                let mut kept = Vec::with_capacity(seq.subs().len());
                for ext in seq.subs() {
                    let id = ext.subs().first().map(|o| o.to_oid()).transpose()?;
                    if id.as_deref() != Some(oid) {
                        kept.push(ext.clone());
                    }
                }
                let seq = Asn1Obj::from_subs(Tag::SEQUENCE, &kept)?;
                Ok(Asn1Obj::from_subs(field.tag(), &[seq])?)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Asn1Obj::from_subs(tbs.tag(), &fields)?.raw().to_vec())
    }

    /// The TBS bytes a CT log signed for the embedded SCTs
    pub fn precertificate_tbs(&self) -> Result<Vec<u8>> {
        self.tbs_without_extension(OID_SCT_LIST)
    }
}

impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        self.tbs_der() == other.tbs_der()
    }
}

impl Eq for Certificate {}

impl std::hash::Hash for Certificate {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.tbs_der().hash(state);
    }
}

impl TryFrom<&[u8]> for Certificate {
    type Error = Error;

    fn try_from(der: &[u8]) -> Result<Self> {
        Self::from_der(der)
    }
}
