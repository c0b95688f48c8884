//! The Sigstore bundle
//!
//! A bundle travels alongside an artifact and carries everything needed to
//! verify it offline: the signature (a message signature or a DSSE
//! envelope), the signer's certificate chain or a hint naming their key, and
//! the transparency log entries that recorded the signing event.
//!
//! Only the fields verification reads are modelled. Unknown fields, such as
//! RFC 3161 timestamp data, are ignored when decoding.

use crate::dsse::DsseEnvelope;
use crate::encoding::{
    string_i64, CanonicalizedBody, DerCertificate, LogIndex, LogKeyId, Sha256Hash, SignatureBytes,
    SignedTimestamp,
};
use crate::error::{Error, Result};
use crate::hash::HashAlgorithm;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

const MEDIA_TYPE_V01: &str = "application/vnd.dev.sigstore.bundle+json;version=0.1";
const MEDIA_TYPE_V02: &str = "application/vnd.dev.sigstore.bundle+json;version=0.2";
const MEDIA_TYPE_V03: &str = "application/vnd.dev.sigstore.bundle.v0.3+json";
const MEDIA_TYPE_V03_LEGACY: &str = "application/vnd.dev.sigstore.bundle+json;version=0.3";

/// `null` decodes like an absent field
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Bundle format versions
///
/// v0.1 entries carry an inclusion promise; from v0.2 on they carry an
/// inclusion proof instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MediaType {
    Bundle0_1,
    Bundle0_2,
    Bundle0_3,
}

impl MediaType {
    /// The canonical `mediaType` string
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Bundle0_1 => MEDIA_TYPE_V01,
            MediaType::Bundle0_2 => MEDIA_TYPE_V02,
            MediaType::Bundle0_3 => MEDIA_TYPE_V03,
        }
    }
}

impl FromStr for MediaType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            MEDIA_TYPE_V01 => Ok(MediaType::Bundle0_1),
            MEDIA_TYPE_V02 => Ok(MediaType::Bundle0_2),
            MEDIA_TYPE_V03 | MEDIA_TYPE_V03_LEGACY => Ok(MediaType::Bundle0_3),
            _ => Err(Error::InvalidMediaType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    /// Kept as written so that validation can report unknown versions
    pub media_type: String,
    pub verification_material: VerificationMaterial,
    /// `None` when the bundle carries neither a message signature nor an
    /// envelope
    #[serde(flatten)]
    pub content: Option<SignatureContent>,
}

impl Bundle {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::Json)
    }

    /// Bundle format version named by `mediaType`
    pub fn version(&self) -> Result<MediaType> {
        self.media_type.parse()
    }

    /// All certificates carried by the bundle, leaf first
    pub fn certificates(&self) -> Vec<&DerCertificate> {
        match &self.verification_material.content {
            VerificationMaterialContent::Certificate(cert) => vec![&cert.raw_bytes],
            VerificationMaterialContent::X509CertificateChain { certificates } => {
                certificates.iter().map(|c| &c.raw_bytes).collect()
            }
            VerificationMaterialContent::PublicKey { .. } => Vec::new(),
        }
    }

    pub fn tlog_entries(&self) -> &[TransparencyLogEntry] {
        &self.verification_material.tlog_entries
    }

    pub fn dsse_envelope(&self) -> Option<&DsseEnvelope> {
        match &self.content {
            Some(SignatureContent::DsseEnvelope(env)) => Some(env),
            _ => None,
        }
    }
}

/// What was signed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SignatureContent {
    MessageSignature(MessageSignature),
    DsseEnvelope(DsseEnvelope),
}

/// A signature directly over the artifact bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSignature {
    /// Digest of the artifact, as recorded by the signer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_digest: Option<MessageDigest>,
    #[serde(default)]
    pub signature: SignatureBytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDigest {
    pub algorithm: HashAlgorithm,
    pub digest: Sha256Hash,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMaterial {
    #[serde(flatten)]
    pub content: VerificationMaterialContent,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tlog_entries: Vec<TransparencyLogEntry>,
}

/// How the signer is identified
///
/// The JSON key selects the variant: `x509CertificateChain` (v0.1, v0.2),
/// `certificate` (v0.3) or `publicKey`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VerificationMaterialContent {
    /// The leaf certificate alone
    Certificate(RawCertificate),
    /// Leaf first, then any intermediates the signer supplied
    X509CertificateChain {
        #[serde(default)]
        certificates: Vec<RawCertificate>,
    },
    /// A key the verifier must already hold, looked up by hint
    PublicKey {
        #[serde(default)]
        hint: String,
    },
}

/// A `{"rawBytes": ...}` certificate wrapper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCertificate {
    #[serde(default)]
    pub raw_bytes: DerCertificate,
}

/// A Rekor entry recording the signing event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransparencyLogEntry {
    #[serde(default)]
    pub log_index: LogIndex,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_id: Option<LogId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind_version: Option<KindVersion>,
    /// Seconds since the Unix epoch at which the log accepted the entry
    #[serde(default, with = "string_i64")]
    pub integrated_time: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inclusion_promise: Option<InclusionPromise>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inclusion_proof: Option<InclusionProof>,
    /// The entry body exactly as the log hashed it
    #[serde(default)]
    pub canonicalized_body: CanonicalizedBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogId {
    /// SHA-256 of the log's DER public key
    pub key_id: LogKeyId,
}

/// Entry type, e.g. `hashedrekord` / `0.0.1`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KindVersion {
    pub kind: String,
    pub version: String,
}

/// The log's signed promise to include the entry (the SET)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InclusionPromise {
    pub signed_entry_timestamp: SignedTimestamp,
}

/// A Merkle inclusion proof
///
/// Only its presence and checkpoint are validated; the proof path is not
/// recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InclusionProof {
    pub log_index: LogIndex,
    pub root_hash: Sha256Hash,
    #[serde(with = "string_i64")]
    pub tree_size: i64,
    #[serde(default)]
    pub hashes: Vec<Sha256Hash>,
    #[serde(default)]
    pub checkpoint: Checkpoint,
}

/// Signed tree head in note format
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Checkpoint {
    #[serde(default)]
    pub envelope: String,
}

impl Checkpoint {
    pub fn is_empty(&self) -> bool {
        self.envelope.is_empty()
    }
}

impl<'de> Deserialize<'de> for Bundle {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Raw {
            // Bundles predating the media type field are v0.1
            #[serde(default = "v01")]
            media_type: String,
            verification_material: VerificationMaterial,
            #[serde(default)]
            message_signature: Option<MessageSignature>,
            #[serde(default)]
            dsse_envelope: Option<DsseEnvelope>,
        }

        fn v01() -> String {
            MEDIA_TYPE_V01.to_string()
        }

        let raw = Raw::deserialize(deserializer)?;
        let content = match (raw.message_signature, raw.dsse_envelope) {
            (Some(_), Some(_)) => {
                return Err(serde::de::Error::custom(
                    "bundle has both messageSignature and dsseEnvelope",
                ))
            }
            (Some(sig), None) => Some(SignatureContent::MessageSignature(sig)),
            (None, Some(env)) => Some(SignatureContent::DsseEnvelope(env)),
            (None, None) => None,
        };

        Ok(Bundle {
            media_type: raw.media_type,
            verification_material: raw.verification_material,
            content,
        })
    }
}
