//! Type-safe encoding wrappers
//!
//! Byte fields in bundles and trusted roots travel as base64 strings in JSON.
//! The newtypes here decode once at deserialization time and hold raw bytes,
//! so the rest of the workspace never juggles encoded and decoded forms.

use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Define a newtype over `Vec<u8>` that (de)serializes as standard base64
macro_rules! base64_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
        pub struct $name(Vec<u8>);

        impl $name {
            /// Wrap raw bytes
            pub fn new(bytes: Vec<u8>) -> Self {
                Self(bytes)
            }

            /// Copy raw bytes into a new value
            pub fn from_bytes(bytes: &[u8]) -> Self {
                Self(bytes.to_vec())
            }

            /// Decode from a base64 string
            pub fn from_base64(s: &str) -> Result<Self> {
                STANDARD
                    .decode(s)
                    .map(Self)
                    .map_err(|e| Error::InvalidEncoding(format!("invalid base64: {}", e)))
            }

            /// Encode as a base64 string
            pub fn to_base64(&self) -> String {
                STANDARD.encode(&self.0)
            }

            /// The raw bytes
            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            /// Consume and return the raw bytes
            pub fn into_bytes(self) -> Vec<u8> {
                self.0
            }

            /// Whether there are no bytes
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// Number of raw bytes
            pub fn len(&self) -> usize {
                self.0.len()
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl From<Vec<u8>> for $name {
            fn from(bytes: Vec<u8>) -> Self {
                Self(bytes)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_base64())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_base64(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

base64_newtype!(
    /// DER-encoded X.509 certificate
    DerCertificate
);

base64_newtype!(
    /// DER-encoded SubjectPublicKeyInfo
    DerPublicKey
);

base64_newtype!(
    /// Raw signature bytes
    SignatureBytes
);

base64_newtype!(
    /// Transparency log key identifier (SHA-256 of the log's public key)
    LogKeyId
);

base64_newtype!(
    /// Canonicalized transparency log entry body (JSON bytes)
    CanonicalizedBody
);

base64_newtype!(
    /// Signed entry timestamp from an inclusion promise
    SignedTimestamp
);

base64_newtype!(
    /// DSSE payload bytes
    PayloadBytes
);

impl DerCertificate {
    /// Decode a PEM `CERTIFICATE` block
    pub fn from_pem(pem_str: &str) -> Result<Self> {
        let parsed = pem::parse(pem_str)
            .map_err(|e| Error::InvalidCertificate(format!("invalid PEM: {}", e)))?;
        if parsed.tag() != "CERTIFICATE" {
            return Err(Error::InvalidCertificate(format!(
                "expected CERTIFICATE PEM block, got {}",
                parsed.tag()
            )));
        }
        Ok(Self(parsed.into_contents()))
    }

    /// Encode as a PEM `CERTIFICATE` block
    pub fn to_pem(&self) -> String {
        pem::encode(&pem::Pem::new("CERTIFICATE", self.0.clone()))
    }
}

impl LogKeyId {
    /// Lowercase hex form, used in log messages and errors
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

/// Transparency log index, carried as a decimal string in JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct LogIndex(i64);

impl LogIndex {
    /// Wrap an index
    pub fn new(index: i64) -> Self {
        LogIndex(index)
    }

    /// The numeric index
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for LogIndex {
    fn from(index: i64) -> Self {
        LogIndex(index)
    }
}

impl Serialize for LogIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        string_i64::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for LogIndex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        string_i64::deserialize(deserializer).map(LogIndex)
    }
}

/// Serde helper for 64-bit integers encoded as JSON strings
///
/// Protobuf JSON writes `int64` as a string. Bare numbers are accepted too.
pub mod string_i64 {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(i64),
    }

    pub fn serialize<S>(value: &i64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match StringOrNumber::deserialize(deserializer)? {
            StringOrNumber::String(s) => s.parse().map_err(serde::de::Error::custom),
            StringOrNumber::Number(n) => Ok(n),
        }
    }
}

/// SHA-256 hash digest (32 bytes)
///
/// This type represents a SHA-256 hash with compile-time size guarantees.
/// In JSON it is base64, matching the bundle's `messageDigest.digest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha256Hash([u8; 32]);

impl Sha256Hash {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Sha256Hash(bytes)
    }

    /// Try to create from a byte slice
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| {
            Error::InvalidEncoding(format!(
                "SHA-256 hash must be 32 bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Sha256Hash(arr))
    }

    /// Parse from hex-encoded string
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes =
            hex::decode(s).map_err(|e| Error::InvalidEncoding(format!("invalid hex: {}", e)))?;
        Self::try_from_slice(&bytes)
    }

    /// Parse from base64-encoded string
    pub fn from_base64(s: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(s)
            .map_err(|e| Error::InvalidEncoding(format!("invalid base64: {}", e)))?;
        Self::try_from_slice(&bytes)
    }

    /// Encode as hex string (lowercase)
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Encode as base64 string
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Get as a byte slice
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for Sha256Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Sha256Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Sha256Hash(bytes)
    }
}

impl Serialize for Sha256Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for Sha256Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Sha256Hash::from_base64(&s).map_err(serde::de::Error::custom)
    }
}
