use chrono::{TimeZone, Utc};
use sigstore_crypto::KeyAlgorithm;
use sigstore_trust_root::TrustedRoot;
use std::path::PathBuf;

fn fixture_path() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.pop(); // crates
    path.push("sigstore-verify/tests/fixtures/trusted_root.json");
    path
}

#[test]
fn test_parse_fixture_trusted_root() {
    let trusted_root = TrustedRoot::from_file(fixture_path()).expect("Failed to parse trusted root");

    assert!(trusted_root.media_type.ends_with("version=0.1"));
    assert_eq!(trusted_root.tlogs.len(), 1);
    assert_eq!(trusted_root.ctlogs.len(), 1);
    assert_eq!(trusted_root.certificate_authorities.len(), 1);
    assert_eq!(
        trusted_root.certificate_authorities[0].cert_chain.certificates.len(),
        2
    );
}

#[test]
fn test_trust_material() {
    let trusted_root = TrustedRoot::from_file(fixture_path()).unwrap();
    let material = trusted_root.trust_material().expect("Failed to decode trust material");

    let ca = &material.certificate_authorities[0];
    assert_eq!(ca.uri, "https://fulcio.sigstore.test");
    assert_eq!(ca.certificates.len(), 2);
    assert!(ca.certificates.iter().all(|c| c.is_ca()));
    assert!(ca.certificates[1].is_self_signed());

    let tlog = &material.tlogs[0];
    assert_eq!(
        tlog.log_id_hex(),
        "47fe8f7b31c1d89659eaad0ae5d95d5b787e03ccfae6f4364667b0e6f954dafb"
    );
    assert_eq!(tlog.key.algorithm(), KeyAlgorithm::EcP256);
    // log IDs are the SPKI digest
    assert_eq!(tlog.key.key_id().as_slice(), tlog.log_id.as_slice());

    let ctlog = &material.ctlogs[0];
    assert_eq!(ctlog.key.key_id().as_slice(), ctlog.log_id.as_slice());
}

#[test]
fn test_trusted_log_accepts() {
    let material = TrustedRoot::from_file(fixture_path())
        .unwrap()
        .trust_material()
        .unwrap();
    let tlog = &material.tlogs[0];
    let ctlog = &material.ctlogs[0];

    let inside = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let before = Utc.with_ymd_and_hms(2019, 12, 31, 23, 59, 59).unwrap();

    assert!(tlog.accepts(&tlog.log_id, inside));
    assert!(!tlog.accepts(&ctlog.log_id, inside));
    assert!(!tlog.accepts(&tlog.log_id, before));
}

#[test]
fn test_certificate_authorities_at() {
    let material = TrustedRoot::from_file(fixture_path())
        .unwrap()
        .trust_material()
        .unwrap();

    let inside = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let before = Utc.with_ymd_and_hms(2019, 12, 31, 23, 59, 59).unwrap();

    assert_eq!(material.certificate_authorities_at(inside).count(), 1);
    assert_eq!(material.certificate_authorities_at(before).count(), 0);
}

#[test]
fn test_missing_file() {
    let result = TrustedRoot::from_file("/nonexistent/trusted_root.json");
    assert!(matches!(result, Err(sigstore_trust_root::Error::Io(_))));
}
