//! Sigstore bundle verification
//!
//! This crate checks a signed artifact against a Sigstore bundle and a set of
//! trust anchors:
//! - the signing certificate must chain to a trusted certificate authority
//!   and carry enough verifiable SCTs from trusted CT logs
//! - the certificate identity must satisfy the [`VerificationPolicy`]
//! - every transparency log entry must carry a valid inclusion promise and
//!   describe the same signature as the bundle
//! - the signature must verify over the artifact or DSSE payload
//!
//! # Example
//!
//! ```no_run
//! use sigstore_verify::{CertificateIdentity, SanMatcher, VerificationPolicy, Verifier};
//! use sigstore_verify::trust_root::TrustedRoot;
//! use sigstore_verify::types::Bundle;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let root = TrustedRoot::from_file("trusted_root.json")?;
//! let verifier = Verifier::from_trusted_root(&root)?;
//! let bundle = Bundle::from_json(&std::fs::read_to_string("artifact.sigstore.json")?)?;
//!
//! let policy = VerificationPolicy::default().require_identity(CertificateIdentity::new(
//!     "https://accounts.google.com",
//!     SanMatcher::exact("signer@example.com"),
//! ));
//! let result = verifier.verify(std::fs::read("artifact")?.as_slice(), &bundle, &policy)?;
//! println!("signed by {:?}", result.identity);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod identity;
pub mod verify;
mod verify_impl;

pub use error::{ChainError, Error, Result};
pub use identity::{verify_identity, CertificateIdentity, SanMatcher};
pub use verify::{verify, VerificationPolicy, VerificationResult, Verifier};
pub use verify_impl::chain::{verify_certificate_chain, ChainVerifyOptions};
pub use verify_impl::sct::{verify_scts, SignedCertificateTimestamp};
pub use verify_impl::tlog::verify_set;

pub use sigstore_bundle as bundle;
pub use sigstore_crypto as crypto;
pub use sigstore_trust_root as trust_root;
pub use sigstore_types as types;
