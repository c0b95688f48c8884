//! Public keys decoded from SubjectPublicKeyInfo
//!
//! aws-lc-rs takes keys in their algorithm-native form: the uncompressed EC
//! point, the PKCS#1 `RSAPublicKey`, or the raw Ed25519 key. Each of these is
//! exactly the BIT STRING payload of an SPKI, so parsing an SPKI is a matter
//! of picking that payload out and recording which algorithm it belongs to.

use crate::error::{Error, Result};
use crate::hash::sha256;
use crate::scheme::SigningScheme;
use crate::verification::{verify_signature, verify_signature_prehashed};
use sigstore_asn1::Asn1Obj;

/// DER content of id-ecPublicKey (1.2.840.10045.2.1)
pub(crate) const ID_EC_PUBLIC_KEY: &[u8] = &[0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01];
/// DER content of prime256v1 (1.2.840.10045.3.1.7)
pub(crate) const SECP256R1: &[u8] = &[0x2a, 0x86, 0x48, 0xce, 0x3d, 0x03, 0x01, 0x07];
/// DER content of secp384r1 (1.3.132.0.34)
pub(crate) const SECP384R1: &[u8] = &[0x2b, 0x81, 0x04, 0x00, 0x22];
/// DER content of id-Ed25519 (1.3.101.112)
pub(crate) const ID_ED25519: &[u8] = &[0x2b, 0x65, 0x70];

const OID_EC_PUBLIC_KEY: &str = "1.2.840.10045.2.1";
const OID_SECP256R1: &str = "1.2.840.10045.3.1.7";
const OID_SECP384R1: &str = "1.3.132.0.34";
const OID_RSA_ENCRYPTION: &str = "1.2.840.113549.1.1.1";
const OID_RSASSA_PSS: &str = "1.2.840.113549.1.1.10";
const OID_ED25519: &str = "1.3.101.112";

/// The key type of a [`PublicKey`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    /// ECDSA over NIST P-256
    EcP256,
    /// ECDSA over NIST P-384
    EcP384,
    /// RSA (PKCS#1 or PSS)
    Rsa,
    /// Ed25519
    Ed25519,
}

/// A public key parsed from a DER SubjectPublicKeyInfo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    spki: Vec<u8>,
    key_bytes: Vec<u8>,
    algorithm: KeyAlgorithm,
}

impl PublicKey {
    /// Parse a DER-encoded SubjectPublicKeyInfo
    pub fn from_spki_der(der: &[u8]) -> Result<Self> {
        Self::from_spki(&Asn1Obj::parse(der)?)
    }

    /// Parse a PEM `PUBLIC KEY` block
    pub fn from_pem(pem_str: &str) -> Result<Self> {
        let parsed = pem::parse(pem_str)?;
        if parsed.tag() != "PUBLIC KEY" {
            return Err(Error::Pem(format!(
                "expected PUBLIC KEY block, got {}",
                parsed.tag()
            )));
        }
        Self::from_spki_der(parsed.contents())
    }

    /// Interpret an already decoded SubjectPublicKeyInfo
    pub fn from_spki(spki: &Asn1Obj) -> Result<Self> {
        let [algorithm_id, key] = spki.subs() else {
            return Err(Error::InvalidKeyFormat(
                "SubjectPublicKeyInfo must have two elements".to_string(),
            ));
        };
        let Some(oid) = algorithm_id.subs().first() else {
            return Err(Error::InvalidKeyFormat(
                "missing public key algorithm".to_string(),
            ));
        };

        let algorithm = match oid.to_oid()?.as_str() {
            OID_EC_PUBLIC_KEY => {
                let curve = algorithm_id
                    .subs()
                    .get(1)
                    .ok_or_else(|| Error::InvalidKeyFormat("EC key without curve".to_string()))?
                    .to_oid()?;
                match curve.as_str() {
                    OID_SECP256R1 => KeyAlgorithm::EcP256,
                    OID_SECP384R1 => KeyAlgorithm::EcP384,
                    other => {
                        return Err(Error::UnsupportedAlgorithm(format!(
                            "EC curve {}",
                            other
                        )))
                    }
                }
            }
            OID_RSA_ENCRYPTION | OID_RSASSA_PSS => KeyAlgorithm::Rsa,
            OID_ED25519 => KeyAlgorithm::Ed25519,
            other => {
                return Err(Error::UnsupportedAlgorithm(format!(
                    "public key algorithm {}",
                    other
                )))
            }
        };

        Ok(Self {
            spki: spki.raw().to_vec(),
            key_bytes: key.bit_string_octets()?.to_vec(),
            algorithm,
        })
    }

    /// The key type
    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    /// The full SubjectPublicKeyInfo encoding
    pub fn spki_der(&self) -> &[u8] {
        &self.spki
    }

    /// The algorithm-native key bytes handed to aws-lc-rs
    pub fn key_bytes(&self) -> &[u8] {
        &self.key_bytes
    }

    /// SHA-256 of the SPKI, as used for transparency log and CT log IDs
    pub fn key_id(&self) -> [u8; 32] {
        sha256(&self.spki)
    }

    /// The scheme a signature by this key is checked with when nothing else
    /// says otherwise
    pub fn default_scheme(&self) -> SigningScheme {
        match self.algorithm {
            KeyAlgorithm::EcP256 => SigningScheme::EcdsaP256Sha256,
            KeyAlgorithm::EcP384 => SigningScheme::EcdsaP384Sha384,
            KeyAlgorithm::Rsa => SigningScheme::RsaPkcs1Sha256,
            KeyAlgorithm::Ed25519 => SigningScheme::Ed25519,
        }
    }

    /// Verify a signature over `data` with the default scheme
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> Result<()> {
        self.verify_with_scheme(data, signature, self.default_scheme())
    }

    /// Verify a signature over `data` with an explicit scheme
    pub fn verify_with_scheme(
        &self,
        data: &[u8],
        signature: &[u8],
        scheme: SigningScheme,
    ) -> Result<()> {
        verify_signature(&self.key_bytes, data, signature, scheme)
    }

    /// Verify a signature given only the SHA-256 digest of the signed data
    ///
    /// EC keys are checked with their SHA-256 variant; Ed25519 cannot be
    /// checked this way.
    pub fn verify_prehashed(&self, digest: &[u8; 32], signature: &[u8]) -> Result<()> {
        let scheme = match self.algorithm {
            KeyAlgorithm::EcP256 => SigningScheme::EcdsaP256Sha256,
            KeyAlgorithm::EcP384 => SigningScheme::EcdsaP384Sha256,
            KeyAlgorithm::Rsa => SigningScheme::RsaPkcs1Sha256,
            KeyAlgorithm::Ed25519 => {
                return Err(Error::UnsupportedAlgorithm(
                    "Ed25519 signatures cannot be checked against a digest".to_string(),
                ))
            }
        };
        verify_signature_prehashed(&self.key_bytes, digest, signature, scheme)
    }
}
