//! Digest algorithm names as they appear in bundles and trusted roots

use serde::{Deserialize, Serialize};

/// A protobuf-specs `HashAlgorithm` value
///
/// Verification only accepts SHA-256 artifact digests; the other variants
/// exist so that documents naming them still decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashAlgorithm {
    #[serde(rename = "SHA2_256")]
    Sha2256,
    #[serde(rename = "SHA2_384")]
    Sha2384,
    #[serde(rename = "SHA2_512")]
    Sha2512,
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            HashAlgorithm::Sha2256 => "SHA2_256",
            HashAlgorithm::Sha2384 => "SHA2_384",
            HashAlgorithm::Sha2512 => "SHA2_512",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_names() {
        let alg: HashAlgorithm = serde_json::from_str("\"SHA2_512\"").unwrap();
        assert_eq!(alg, HashAlgorithm::Sha2512);
        assert_eq!(
            serde_json::to_string(&HashAlgorithm::Sha2256).unwrap(),
            "\"SHA2_256\""
        );
        assert!(serde_json::from_str::<HashAlgorithm>("\"MD5\"").is_err());
    }
}
