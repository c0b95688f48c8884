//! Throwaway key pairs for unit tests

use crate::key::{ID_EC_PUBLIC_KEY, ID_ED25519, SECP256R1, SECP384R1};
use crate::scheme::SigningScheme;
use aws_lc_rs::rand::SystemRandom;
use aws_lc_rs::signature::{
    EcdsaKeyPair, Ed25519KeyPair, KeyPair, ECDSA_P256_SHA256_ASN1_SIGNING,
    ECDSA_P384_SHA384_ASN1_SIGNING,
};
use sigstore_asn1::{Asn1Obj, Tag};

pub(crate) enum TestKey {
    P256(EcdsaKeyPair),
    P384(EcdsaKeyPair),
    Ed25519(Ed25519KeyPair),
}

impl TestKey {
    pub fn p256() -> Self {
        Self::P256(ecdsa(&ECDSA_P256_SHA256_ASN1_SIGNING))
    }

    pub fn p384() -> Self {
        Self::P384(ecdsa(&ECDSA_P384_SHA384_ASN1_SIGNING))
    }

    pub fn ed25519() -> Self {
        let pkcs8 = Ed25519KeyPair::generate_pkcs8(&SystemRandom::new()).unwrap();
        Self::Ed25519(Ed25519KeyPair::from_pkcs8(pkcs8.as_ref()).unwrap())
    }

    pub fn scheme(&self) -> SigningScheme {
        match self {
            Self::P256(_) => SigningScheme::EcdsaP256Sha256,
            Self::P384(_) => SigningScheme::EcdsaP384Sha384,
            Self::Ed25519(_) => SigningScheme::Ed25519,
        }
    }

    pub fn public_bytes(&self) -> Vec<u8> {
        match self {
            Self::P256(kp) | Self::P384(kp) => kp.public_key().as_ref().to_vec(),
            Self::Ed25519(kp) => kp.public_key().as_ref().to_vec(),
        }
    }

    pub fn sign(&self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::P256(kp) | Self::P384(kp) => kp
                .sign(&SystemRandom::new(), data)
                .unwrap()
                .as_ref()
                .to_vec(),
            Self::Ed25519(kp) => kp.sign(data).as_ref().to_vec(),
        }
    }

    /// SubjectPublicKeyInfo built with the DER encoder
    pub fn spki_der(&self) -> Vec<u8> {
        let oids: &[&[u8]] = match self {
            Self::P256(_) => &[ID_EC_PUBLIC_KEY, SECP256R1],
            Self::P384(_) => &[ID_EC_PUBLIC_KEY, SECP384R1],
            Self::Ed25519(_) => &[ID_ED25519],
        };
        let algorithm: Vec<Asn1Obj> = oids
            .iter()
            .map(|oid| Asn1Obj::from_value(Tag::OID, oid).unwrap())
            .collect();
        let mut bits = vec![0u8];
        bits.extend(self.public_bytes());
        Asn1Obj::from_subs(
            Tag::SEQUENCE,
            &[
                Asn1Obj::from_subs(Tag::SEQUENCE, &algorithm).unwrap(),
                Asn1Obj::from_value(Tag::BIT_STRING, &bits).unwrap(),
            ],
        )
        .unwrap()
        .raw()
        .to_vec()
    }
}

fn ecdsa(alg: &'static aws_lc_rs::signature::EcdsaSigningAlgorithm) -> EcdsaKeyPair {
    let pkcs8 = EcdsaKeyPair::generate_pkcs8(alg, &SystemRandom::new()).unwrap();
    EcdsaKeyPair::from_pkcs8(alg, pkcs8.as_ref()).unwrap()
}

#[test]
fn test_spki_round_trips_through_key_parser() {
    for key in [TestKey::p256(), TestKey::p384(), TestKey::ed25519()] {
        let parsed = crate::PublicKey::from_spki_der(&key.spki_der()).unwrap();
        assert_eq!(parsed.key_bytes(), key.public_bytes().as_slice());
        assert_eq!(parsed.default_scheme(), key.scheme());
    }
}
