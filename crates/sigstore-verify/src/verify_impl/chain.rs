//! Certificate chain building and validation
//!
//! Paths are built from the leaf upwards. Each step looks for issuers by
//! authority key identifier, falling back to issuer/subject name equality
//! when either side lacks a key identifier, and keeps only the candidates
//! whose key verifies the child's signature. A self-signed certificate ends a
//! path. Of the complete paths, those that pass through a trust anchor are
//! kept and the shortest one is validated.

use crate::error::ChainError;
use chrono::{DateTime, Utc};
use sigstore_crypto::Certificate;

/// Inputs for [`verify_certificate_chain`]
#[derive(Debug, Clone, Copy)]
pub struct ChainVerifyOptions<'a> {
    /// Trust anchors
    pub trusted_certs: &'a [Certificate],
    /// Additional untrusted certificates that may appear in the path
    pub untrusted_certs: &'a [Certificate],
    /// The instant every certificate in the path must be valid at
    pub check_date: DateTime<Utc>,
}

/// Build and validate a trusted path for `leaf`
///
/// Returns the path ordered leaf first, root last.
pub fn verify_certificate_chain(
    leaf: &Certificate,
    options: &ChainVerifyOptions<'_>,
) -> Result<Vec<Certificate>, ChainError> {
    if options.trusted_certs.is_empty() {
        return Err(ChainError::NoCertificates);
    }

    let builder = PathBuilder::new(leaf, options);
    let mut visited = Vec::new();
    let paths = builder.build_paths(leaf, &mut visited);
    if paths.is_empty() {
        return Err(ChainError::NoValidPath);
    }

    let path = paths
        .into_iter()
        .filter(|path| path.iter().any(|cert| builder.is_trusted(cert)))
        .min_by_key(|path| path.len())
        .ok_or(ChainError::NoTrustedPath)?;

    tracing::debug!("selected certificate path of length {}", path.len());

    check_path(&path)?;

    for (index, cert) in path.iter().enumerate() {
        if !cert.valid_for_date(options.check_date) {
            return Err(ChainError::NotValidAt {
                index,
                time: options.check_date,
            });
        }
    }

    Ok(path.into_iter().cloned().collect())
}

/// Structural rules for a selected path
fn check_path(path: &[&Certificate]) -> Result<(), ChainError> {
    if path.len() < 2 {
        return Err(ChainError::PathTooShort(path.len()));
    }

    let leaf = path[0];
    if leaf.is_ca() {
        return Err(ChainError::LeafIsCa);
    }
    if !leaf.key_usage().is_some_and(|ku| ku.digital_signature()) {
        return Err(ChainError::MissingDigitalSignature);
    }
    if leaf
        .subject_alt_name()
        .and_then(|san| san.identity())
        .is_none()
    {
        return Err(ChainError::MissingSubjectAltName);
    }

    for (index, cert) in path.iter().enumerate().skip(1) {
        if !cert.is_ca() {
            return Err(ChainError::NotCa(index));
        }
        // self-issued intermediates do not count (RFC 5280 6.1.4)
        let below = path[1..index]
            .iter()
            .filter(|c| !c.is_self_issued())
            .count() as i64;
        let limit = cert
            .basic_constraints()
            .and_then(|bc| bc.path_len_constraint);
        if limit.is_some_and(|max| below > max) {
            return Err(ChainError::PathLenExceeded(index));
        }
    }

    for (index, pair) in path.windows(2).enumerate() {
        if pair[0].issuer() != pair[1].subject() {
            return Err(ChainError::BrokenNameChain(index));
        }
    }

    Ok(())
}

struct PathBuilder<'a> {
    trusted: &'a [Certificate],
    // deduplicated by TBS, trust anchors first
    pool: Vec<&'a Certificate>,
}

impl<'a> PathBuilder<'a> {
    fn new(leaf: &'a Certificate, options: &ChainVerifyOptions<'a>) -> Self {
        let mut pool: Vec<&'a Certificate> = Vec::new();
        let all = options
            .trusted_certs
            .iter()
            .chain(options.untrusted_certs)
            .chain(std::iter::once(leaf));
        for cert in all {
            if !pool.contains(&cert) {
                pool.push(cert);
            }
        }
        Self {
            trusted: options.trusted_certs,
            pool,
        }
    }

    fn is_trusted(&self, cert: &Certificate) -> bool {
        self.trusted.contains(cert)
    }

    /// Every path from `cert` up to a self-signed certificate
    ///
    /// `visited` holds the TBS bytes of the certificates below `cert` so a
    /// cycle in the pool can never be followed twice.
    fn build_paths(
        &self,
        cert: &'a Certificate,
        visited: &mut Vec<&'a [u8]>,
    ) -> Vec<Vec<&'a Certificate>> {
        if cert.is_self_signed() {
            return vec![vec![cert]];
        }

        visited.push(cert.tbs_der());
        let mut paths = Vec::new();
        for issuer in self.find_issuers(cert) {
            if visited.contains(&issuer.tbs_der()) {
                tracing::debug!(
                    "skipping issuer {}: already on this path",
                    issuer.serial_number_hex()
                );
                continue;
            }
            for mut sub_path in self.build_paths(issuer, visited) {
                sub_path.insert(0, cert);
                paths.push(sub_path);
            }
        }
        visited.pop();
        paths
    }

    /// Candidate issuers of `cert` whose key verifies its signature
    fn find_issuers(&self, cert: &Certificate) -> Vec<&'a Certificate> {
        let by_key_id = cert.authority_key_id();
        self.pool
            .iter()
            .copied()
            .filter(|candidate| match (by_key_id, candidate.subject_key_id()) {
                (Some(aki), Some(ski)) => ski == aki,
                _ => candidate.subject() == cert.issuer(),
            })
            .filter(|candidate| {
                let verified = cert.verify(Some(*candidate));
                if !verified {
                    tracing::debug!(
                        "candidate issuer {} does not verify {}",
                        candidate.serial_number_hex(),
                        cert.serial_number_hex()
                    );
                }
                verified
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify_impl::test_certs::{
        CertBuilder, TestKey, DIGITAL_SIGNATURE, KEY_ENCIPHERMENT,
    };
    use chrono::TimeZone;

    const ROOT_PEM: &str = include_str!("../../tests/fixtures/root.pem");
    const INTERMEDIATE_PEM: &str = include_str!("../../tests/fixtures/intermediate.pem");
    const LEAF_PEM: &str = include_str!("../../tests/fixtures/leaf.pem");
    const INVALID_LEAF_PEM: &str = include_str!("../../tests/fixtures/invalidleaf.pem");

    fn cert(pem: &str) -> Certificate {
        Certificate::from_pem(pem).unwrap()
    }

    fn signing_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 2).unwrap()
    }

    #[test]
    fn test_no_anchors() {
        let leaf = cert(LEAF_PEM);
        let options = ChainVerifyOptions {
            trusted_certs: &[],
            untrusted_certs: &[],
            check_date: signing_time(),
        };
        assert_eq!(
            verify_certificate_chain(&leaf, &options),
            Err(ChainError::NoCertificates)
        );
    }

    #[test]
    fn test_missing_intermediate_leaves_no_path() {
        let leaf = cert(LEAF_PEM);
        let trusted = [cert(ROOT_PEM)];
        let options = ChainVerifyOptions {
            trusted_certs: &trusted,
            untrusted_certs: &[],
            check_date: signing_time(),
        };
        assert_eq!(
            verify_certificate_chain(&leaf, &options),
            Err(ChainError::NoValidPath)
        );
    }

    #[test]
    fn test_trusted_intermediate_needs_its_root() {
        let leaf = cert(LEAF_PEM);
        let trusted = [cert(INTERMEDIATE_PEM)];
        let options = ChainVerifyOptions {
            trusted_certs: &trusted,
            untrusted_certs: &[],
            check_date: signing_time(),
        };
        assert_eq!(
            verify_certificate_chain(&leaf, &options),
            Err(ChainError::NoValidPath)
        );
    }

    #[test]
    fn test_path_without_anchor() {
        let leaf = cert(LEAF_PEM);
        let untrusted = [cert(INTERMEDIATE_PEM), cert(ROOT_PEM)];
        let trusted = [cert(INVALID_LEAF_PEM)];
        let options = ChainVerifyOptions {
            trusted_certs: &trusted,
            untrusted_certs: &untrusted,
            check_date: signing_time(),
        };
        assert_eq!(
            verify_certificate_chain(&leaf, &options),
            Err(ChainError::NoTrustedPath)
        );
    }

    #[test]
    fn test_self_signed_root_alone_is_too_short() {
        let root = cert(ROOT_PEM);
        let trusted = [root.clone()];
        let options = ChainVerifyOptions {
            trusted_certs: &trusted,
            untrusted_certs: &[],
            check_date: signing_time(),
        };
        assert_eq!(
            verify_certificate_chain(&root, &options),
            Err(ChainError::PathTooShort(1))
        );
    }

    #[test]
    fn test_intermediate_as_leaf_is_ca() {
        let intermediate = cert(INTERMEDIATE_PEM);
        let trusted = [cert(ROOT_PEM)];
        let options = ChainVerifyOptions {
            trusted_certs: &trusted,
            untrusted_certs: &[],
            check_date: signing_time(),
        };
        assert_eq!(
            verify_certificate_chain(&intermediate, &options),
            Err(ChainError::LeafIsCa)
        );
    }

    fn verify_built(
        leaf: &Certificate,
        trusted: &[Certificate],
        untrusted: &[Certificate],
    ) -> Result<Vec<Certificate>, ChainError> {
        let options = ChainVerifyOptions {
            trusted_certs: trusted,
            untrusted_certs: untrusted,
            check_date: signing_time(),
        };
        verify_certificate_chain(leaf, &options)
    }

    fn self_signed_root(key: &TestKey, path_len: Option<u8>) -> Certificate {
        CertBuilder::new(1, "root", "root")
            .ca(path_len)
            .sign(key, key)
    }

    #[test]
    fn test_leaf_without_digital_signature() {
        let root_key = TestKey::generate();
        let root = self_signed_root(&root_key, None);
        let leaf = CertBuilder::new(2, "leaf", "root")
            .key_usage(KEY_ENCIPHERMENT)
            .email("signer@example.com")
            .sign(&TestKey::generate(), &root_key);

        assert_eq!(
            verify_built(&leaf, &[root], &[]),
            Err(ChainError::MissingDigitalSignature)
        );
    }

    #[test]
    fn test_leaf_without_subject_alt_name() {
        let root_key = TestKey::generate();
        let root = self_signed_root(&root_key, None);
        let leaf = CertBuilder::new(2, "leaf", "root")
            .key_usage(DIGITAL_SIGNATURE)
            .sign(&TestKey::generate(), &root_key);

        assert_eq!(
            verify_built(&leaf, &[root], &[]),
            Err(ChainError::MissingSubjectAltName)
        );
    }

    #[test]
    fn test_key_id_match_with_wrong_issuer_name() {
        let root_key = TestKey::generate();
        let root = CertBuilder::new(1, "root", "root")
            .ca(None)
            .subject_key_id(&[0x11; 20])
            .sign(&root_key, &root_key);
        // found through the key identifier, but names a different issuer
        let leaf = CertBuilder::new(2, "leaf", "not-the-root")
            .key_usage(DIGITAL_SIGNATURE)
            .email("signer@example.com")
            .authority_key_id(&[0x11; 20])
            .sign(&TestKey::generate(), &root_key);

        assert_eq!(
            verify_built(&leaf, &[root], &[]),
            Err(ChainError::BrokenNameChain(0))
        );
    }

    #[test]
    fn test_path_len_constraint_exceeded() {
        let root_key = TestKey::generate();
        let intermediate_key = TestKey::generate();
        let root = self_signed_root(&root_key, Some(0));
        let intermediate = CertBuilder::new(2, "intermediate", "root")
            .ca(None)
            .sign(&intermediate_key, &root_key);
        let leaf = CertBuilder::new(3, "leaf", "intermediate")
            .key_usage(DIGITAL_SIGNATURE)
            .email("signer@example.com")
            .sign(&TestKey::generate(), &intermediate_key);

        assert_eq!(
            verify_built(&leaf, &[root], &[intermediate]),
            Err(ChainError::PathLenExceeded(2))
        );
    }

    #[test]
    fn test_issuer_without_subject_key_id_matches_by_name() {
        let root_key = TestKey::generate();
        let root = self_signed_root(&root_key, Some(0));
        let leaf = CertBuilder::new(2, "leaf", "root")
            .key_usage(DIGITAL_SIGNATURE)
            .email("signer@example.com")
            .authority_key_id(&[0x22; 20])
            .sign(&TestKey::generate(), &root_key);

        let path = verify_built(&leaf, &[root.clone()], &[]).unwrap();
        assert_eq!(path, vec![leaf, root]);
    }
}
