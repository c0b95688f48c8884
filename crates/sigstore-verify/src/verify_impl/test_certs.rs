//! Synthetic certificates for chain tests
//!
//! Certificates are assembled with the DER encoder and signed with throwaway
//! P-256 keys, valid from 2020-01-01 to 2030-01-01.

use aws_lc_rs::rand::SystemRandom;
use aws_lc_rs::signature::{EcdsaKeyPair, KeyPair, ECDSA_P256_SHA256_ASN1_SIGNING};
use sigstore_asn1::{Asn1Obj, Tag};
use sigstore_crypto::Certificate;

const ECDSA_WITH_SHA256: &[u8] = &[0x2a, 0x86, 0x48, 0xce, 0x3d, 0x04, 0x03, 0x02];
const ID_EC_PUBLIC_KEY: &[u8] = &[0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01];
const PRIME256V1: &[u8] = &[0x2a, 0x86, 0x48, 0xce, 0x3d, 0x03, 0x01, 0x07];
const COMMON_NAME: &[u8] = &[0x55, 0x04, 0x03];
const SUBJECT_KEY_ID: &[u8] = &[0x55, 0x1d, 0x0e];
const KEY_USAGE: &[u8] = &[0x55, 0x1d, 0x0f];
const SUBJECT_ALT_NAME: &[u8] = &[0x55, 0x1d, 0x11];
const BASIC_CONSTRAINTS: &[u8] = &[0x55, 0x1d, 0x13];
const AUTHORITY_KEY_ID: &[u8] = &[0x55, 0x1d, 0x23];

/// keyUsage digitalSignature
pub const DIGITAL_SIGNATURE: u8 = 0x80;
/// keyUsage keyEncipherment
pub const KEY_ENCIPHERMENT: u8 = 0x20;
/// keyUsage keyCertSign | cRLSign
const CERT_SIGN: u8 = 0x06;

pub struct TestKey(EcdsaKeyPair);

impl TestKey {
    pub fn generate() -> Self {
        let alg = &ECDSA_P256_SHA256_ASN1_SIGNING;
        let pkcs8 = EcdsaKeyPair::generate_pkcs8(alg, &SystemRandom::new()).unwrap();
        Self(EcdsaKeyPair::from_pkcs8(alg, pkcs8.as_ref()).unwrap())
    }

    fn spki(&self) -> Asn1Obj {
        let mut bits = vec![0u8];
        bits.extend_from_slice(self.0.public_key().as_ref());
        seq(&[
            seq(&[oid(ID_EC_PUBLIC_KEY), oid(PRIME256V1)]),
            prim(Tag::BIT_STRING, &bits),
        ])
    }

    fn sign(&self, data: &[u8]) -> Vec<u8> {
        self.0
            .sign(&SystemRandom::new(), data)
            .unwrap()
            .as_ref()
            .to_vec()
    }
}

fn tag(byte: u8) -> Tag {
    Tag::from_byte(byte).unwrap()
}

fn prim(tag: Tag, value: &[u8]) -> Asn1Obj {
    Asn1Obj::from_value(tag, value).unwrap()
}

fn seq(subs: &[Asn1Obj]) -> Asn1Obj {
    Asn1Obj::from_subs(Tag::SEQUENCE, subs).unwrap()
}

fn oid(bytes: &[u8]) -> Asn1Obj {
    prim(Tag::OID, bytes)
}

fn name(common_name: &str) -> Asn1Obj {
    let attribute = seq(&[
        oid(COMMON_NAME),
        prim(Tag::UTF8_STRING, common_name.as_bytes()),
    ]);
    seq(&[Asn1Obj::from_subs(Tag::SET, &[attribute]).unwrap()])
}

fn extension(id: &[u8], critical: bool, value: Asn1Obj) -> Asn1Obj {
    let mut subs = vec![oid(id)];
    if critical {
        subs.push(prim(tag(0x01), &[0xff]));
    }
    subs.push(prim(Tag::OCTET_STRING, &value.to_der()));
    seq(&subs)
}

/// A v3 certificate under construction
pub struct CertBuilder {
    serial: u8,
    subject: String,
    issuer: String,
    extensions: Vec<Asn1Obj>,
}

impl CertBuilder {
    /// `serial` must stay below 0x80 to encode as a positive INTEGER
    pub fn new(serial: u8, subject: &str, issuer: &str) -> Self {
        Self {
            serial,
            subject: subject.to_string(),
            issuer: issuer.to_string(),
            extensions: Vec::new(),
        }
    }

    /// Critical basicConstraints with cA set, plus keyCertSign and cRLSign
    pub fn ca(mut self, path_len: Option<u8>) -> Self {
        let mut constraints = vec![prim(tag(0x01), &[0xff])];
        if let Some(max) = path_len {
            constraints.push(prim(Tag::INTEGER, &[max]));
        }
        self.extensions
            .push(extension(BASIC_CONSTRAINTS, true, seq(&constraints)));
        self.key_usage(CERT_SIGN)
    }

    pub fn key_usage(mut self, bits: u8) -> Self {
        let value = prim(Tag::BIT_STRING, &[0x00, bits]);
        self.extensions.push(extension(KEY_USAGE, true, value));
        self
    }

    /// A subjectAltName holding one rfc822Name
    pub fn email(mut self, email: &str) -> Self {
        let rfc822 = Tag::context_specific(1, false).unwrap();
        let value = seq(&[prim(rfc822, email.as_bytes())]);
        self.extensions
            .push(extension(SUBJECT_ALT_NAME, false, value));
        self
    }

    pub fn subject_key_id(mut self, id: &[u8]) -> Self {
        let value = prim(Tag::OCTET_STRING, id);
        self.extensions
            .push(extension(SUBJECT_KEY_ID, false, value));
        self
    }

    pub fn authority_key_id(mut self, id: &[u8]) -> Self {
        let key_identifier = Tag::context_specific(0, false).unwrap();
        let value = seq(&[prim(key_identifier, id)]);
        self.extensions
            .push(extension(AUTHORITY_KEY_ID, false, value));
        self
    }

    /// Encode the certificate for `subject_key`, signed by `issuer_key`
    pub fn sign(self, subject_key: &TestKey, issuer_key: &TestKey) -> Certificate {
        let algorithm = seq(&[oid(ECDSA_WITH_SHA256)]);
        let utc_time = tag(0x17);
        let validity = seq(&[
            prim(utc_time, b"200101000000Z"),
            prim(utc_time, b"300101000000Z"),
        ]);
        let version = Asn1Obj::from_subs(
            Tag::context_specific(0, true).unwrap(),
            &[prim(Tag::INTEGER, &[0x02])],
        )
        .unwrap();

        let mut fields = vec![
            version,
            prim(Tag::INTEGER, &[self.serial]),
            algorithm.clone(),
            name(&self.issuer),
            validity,
            name(&self.subject),
            subject_key.spki(),
        ];
        if !self.extensions.is_empty() {
            let wrapper = Tag::context_specific(3, true).unwrap();
            fields.push(Asn1Obj::from_subs(wrapper, &[seq(&self.extensions)]).unwrap());
        }
        let tbs = seq(&fields);

        let mut signature = vec![0u8];
        signature.extend(issuer_key.sign(tbs.raw()));
        let der = seq(&[tbs, algorithm, prim(Tag::BIT_STRING, &signature)]);
        Certificate::from_der(der.raw()).unwrap()
    }
}

#[test]
fn test_built_root_is_self_signed_ca() {
    let key = TestKey::generate();
    let root = CertBuilder::new(1, "root", "root")
        .ca(Some(0))
        .sign(&key, &key);
    assert_eq!(root.version(), 3);
    assert!(root.is_ca());
    assert!(root.is_self_signed());
    assert_eq!(
        root.basic_constraints().unwrap().path_len_constraint,
        Some(0)
    );
}
