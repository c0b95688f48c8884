//! Bundle format handling for Sigstore
//!
//! This crate validates the structure of Sigstore bundles (versions 0.1,
//! 0.2 and 0.3) before they reach cryptographic verification.

pub mod error;
pub mod validation;

pub use error::{Error, Result};
pub use validation::{load_bundle, validate_bundle, validate_bundle_with_options, ValidationOptions};
