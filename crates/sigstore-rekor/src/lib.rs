//! Rekor transparency log entry bodies
//!
//! A transparency log entry carries its body as base64 canonical JSON whose
//! schema depends on the entry's kind and version. This crate decodes the
//! kinds that appear in Sigstore bundles.

pub mod body;
pub mod error;

pub use body::RekorEntryBody;
pub use error::{Error, Result};
