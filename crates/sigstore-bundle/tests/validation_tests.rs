//! Structural validation against the verification fixtures
//!
//! Negative cases start from a valid bundle and break one field through
//! `serde_json::Value`, so each test shows exactly what is being rejected.

use rstest::rstest;
use serde_json::{json, Value};
use sigstore_bundle::{
    load_bundle, validate_bundle, validate_bundle_with_options, Error, ValidationOptions,
};
use sigstore_types::{Bundle, MediaType};

const HASHEDREKORD_BUNDLE: &str =
    include_str!("../../sigstore-verify/tests/fixtures/hashedrekord.sigstore.json");
const DSSE_BUNDLE: &str = include_str!("../../sigstore-verify/tests/fixtures/dsse.sigstore.json");
const PUBLICKEY_BUNDLE: &str =
    include_str!("../../sigstore-verify/tests/fixtures/publickey.sigstore.json");

const V03_MEDIA_TYPE: &str = "application/vnd.dev.sigstore.bundle.v0.3+json";

fn value(json: &str) -> Value {
    serde_json::from_str(json).unwrap()
}

fn invalid_fields(bundle: Value) -> Vec<String> {
    let bundle = Bundle::from_json(&bundle.to_string()).expect("bundle still parses");
    match validate_bundle(&bundle) {
        Err(Error::InvalidFields(fields)) => fields,
        other => panic!("expected InvalidFields, got {:?}", other),
    }
}

fn fake_inclusion_proof() -> Value {
    json!({
        "logIndex": "25579",
        "rootHash": "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=",
        "treeSize": "25580",
        "hashes": [],
        "checkpoint": {"envelope": "rekor.sigstore.test - 1\n25580\nAAAA\n"}
    })
}

// ==== Valid Bundle Tests ====

#[rstest]
#[case(HASHEDREKORD_BUNDLE)]
#[case(DSSE_BUNDLE)]
#[case(PUBLICKEY_BUNDLE)]
fn test_fixture_bundles_are_valid(#[case] json: &str) {
    let bundle = Bundle::from_json(json).expect("Failed to parse bundle");
    assert_eq!(bundle.version().unwrap(), MediaType::Bundle0_1);

    let result = validate_bundle(&bundle);
    assert!(result.is_ok(), "validation failed: {:?}", result.err());
}

#[test]
fn test_load_bundle() {
    let bundle = load_bundle(DSSE_BUNDLE).expect("Failed to load bundle");
    assert!(bundle.dsse_envelope().is_some());
    assert_eq!(bundle.certificates().len(), 2);
}

#[test]
fn test_load_bundle_rejects_bad_json() {
    assert!(matches!(load_bundle("{not json"), Err(Error::Parse(_))));
}

#[test]
fn test_v03_with_single_certificate_and_proof() {
    let mut bundle = value(HASHEDREKORD_BUNDLE);
    bundle["mediaType"] = json!(V03_MEDIA_TYPE);
    let material = &mut bundle["verificationMaterial"];
    let leaf = material["x509CertificateChain"]["certificates"][0].clone();
    material.as_object_mut().unwrap().remove("x509CertificateChain");
    material["certificate"] = leaf;
    material["tlogEntries"][0]["inclusionProof"] = fake_inclusion_proof();

    let bundle = Bundle::from_json(&bundle.to_string()).unwrap();
    let result = validate_bundle(&bundle);
    assert!(result.is_ok(), "v0.3 validation failed: {:?}", result.err());
}

// ==== Invalid Bundle Tests ====

#[test]
fn test_unknown_media_type() {
    let mut bundle = value(HASHEDREKORD_BUNDLE);
    bundle["mediaType"] = json!("application/vnd.dev.sigstore.bundle+json;version=9.9");
    assert_eq!(invalid_fields(bundle), vec!["mediaType"]);
}

#[test]
fn test_missing_content() {
    let mut bundle = value(HASHEDREKORD_BUNDLE);
    bundle.as_object_mut().unwrap().remove("messageSignature");
    assert_eq!(invalid_fields(bundle), vec!["content"]);
}

#[test]
fn test_empty_message_signature() {
    let mut bundle = value(HASHEDREKORD_BUNDLE);
    bundle["messageSignature"]["signature"] = json!("");
    assert_eq!(invalid_fields(bundle), vec!["messageSignature.signature"]);
}

#[test]
fn test_dsse_envelope_needs_exactly_one_signature() {
    let mut bundle = value(DSSE_BUNDLE);
    let sig = bundle["dsseEnvelope"]["signatures"][0].clone();
    bundle["dsseEnvelope"]["signatures"] = json!([sig.clone(), sig]);
    assert_eq!(invalid_fields(bundle), vec!["dsseEnvelope.signatures"]);

    let mut bundle = value(DSSE_BUNDLE);
    bundle["dsseEnvelope"]["signatures"] = json!([]);
    assert_eq!(invalid_fields(bundle), vec!["dsseEnvelope.signatures"]);
}

#[test]
fn test_dsse_envelope_empty_payload() {
    let mut bundle = value(DSSE_BUNDLE);
    bundle["dsseEnvelope"]["payload"] = json!("");
    bundle["dsseEnvelope"]["signatures"][0]["sig"] = json!("");
    assert_eq!(
        invalid_fields(bundle),
        vec!["dsseEnvelope.payload", "dsseEnvelope.signatures[0].sig"]
    );
}

#[test]
fn test_empty_certificate_chain() {
    let mut bundle = value(HASHEDREKORD_BUNDLE);
    bundle["verificationMaterial"]["x509CertificateChain"]["certificates"] = json!([]);
    assert_eq!(
        invalid_fields(bundle),
        vec!["verificationMaterial.x509CertificateChain.certificates"]
    );
}

#[test]
fn test_v01_entry_without_promise() {
    let mut bundle = value(HASHEDREKORD_BUNDLE);
    let entry = bundle["verificationMaterial"]["tlogEntries"][0]
        .as_object_mut()
        .unwrap();
    entry.remove("inclusionPromise");
    entry.remove("logId");
    assert_eq!(
        invalid_fields(bundle),
        vec![
            "verificationMaterial.tlogEntries[0].logId",
            "verificationMaterial.tlogEntries[0].inclusionPromise",
        ]
    );
}

#[test]
fn test_v01_promise_requirement_can_be_relaxed() {
    let mut bundle = value(HASHEDREKORD_BUNDLE);
    bundle["verificationMaterial"]["tlogEntries"][0]
        .as_object_mut()
        .unwrap()
        .remove("inclusionPromise");
    let bundle = Bundle::from_json(&bundle.to_string()).unwrap();

    let options = ValidationOptions {
        require_inclusion_promise: false,
        ..Default::default()
    };
    assert!(validate_bundle_with_options(&bundle, &options).is_ok());
}

#[test]
fn test_v02_requires_inclusion_proof() {
    let mut bundle = value(HASHEDREKORD_BUNDLE);
    bundle["mediaType"] = json!("application/vnd.dev.sigstore.bundle+json;version=0.2");
    assert_eq!(
        invalid_fields(bundle),
        vec!["verificationMaterial.tlogEntries[0].inclusionProof"]
    );
}

#[test]
fn test_v03_forbids_certificate_chain() {
    let mut bundle = value(HASHEDREKORD_BUNDLE);
    bundle["mediaType"] = json!(V03_MEDIA_TYPE);
    bundle["verificationMaterial"]["tlogEntries"][0]["inclusionProof"] = fake_inclusion_proof();
    assert_eq!(
        invalid_fields(bundle),
        vec!["verificationMaterial.x509CertificateChain"]
    );
}

#[test]
fn test_error_message_lists_fields() {
    let mut bundle = value(HASHEDREKORD_BUNDLE);
    bundle.as_object_mut().unwrap().remove("messageSignature");
    bundle["verificationMaterial"]["x509CertificateChain"]["certificates"] = json!([]);
    let bundle = Bundle::from_json(&bundle.to_string()).unwrap();

    let message = validate_bundle(&bundle).unwrap_err().to_string();
    assert!(message.contains("content"), "{}", message);
    assert!(
        message.contains("verificationMaterial.x509CertificateChain.certificates"),
        "{}",
        message
    );
}
