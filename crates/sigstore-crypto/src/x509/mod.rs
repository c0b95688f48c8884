//! X.509 certificates for Sigstore
//!
//! Certificates are decoded with `sigstore-asn1`. Only what Sigstore
//! verification needs is modelled: names are compared as raw encodings, and
//! typed views exist for the extensions that gate chain building, CT and
//! identity checks.

mod certificate;
mod extensions;

pub use certificate::Certificate;
pub use extensions::{
    BasicConstraints, Extension, GeneralName, KeyUsage, SubjectAltName,
    OID_AUTHORITY_KEY_IDENTIFIER, OID_BASIC_CONSTRAINTS, OID_FULCIO_ISSUER, OID_FULCIO_ISSUER_V2,
    OID_KEY_USAGE, OID_SCT_LIST, OID_SUBJECT_ALT_NAME, OID_SUBJECT_KEY_IDENTIFIER,
    RECOGNIZED_CRITICAL_EXTENSIONS,
};
