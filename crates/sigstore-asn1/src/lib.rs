//! ASN.1 DER decoding for Sigstore
//!
//! This crate parses DER-encoded buffers into a tree of [`Asn1Obj`] nodes and
//! re-encodes them. It knows nothing about X.509; the certificate model in
//! `sigstore-crypto` is built on top of it.
//!
//! Only the subset of DER used by certificates and public keys is supported:
//! single-byte tags and definite lengths of at most six bytes.
//!
//! # Example
//!
//! ```
//! use sigstore_asn1::Asn1Obj;
//!
//! // SEQUENCE { INTEGER 5 }
//! let obj = Asn1Obj::parse(&[0x30, 0x03, 0x02, 0x01, 0x05]).unwrap();
//! assert_eq!(obj.subs().len(), 1);
//! assert_eq!(obj.subs()[0].to_integer().unwrap(), 5);
//! assert_eq!(obj.to_der(), vec![0x30, 0x03, 0x02, 0x01, 0x05]);
//! ```

pub mod error;
pub mod length;
pub mod obj;
pub mod parse;
pub mod stream;
pub mod tag;

pub use error::{Error, Result};
pub use length::{decode_length, encode_length, MAX_LENGTH_BYTES};
pub use obj::Asn1Obj;
pub use stream::ByteStream;
pub use tag::{Tag, TagClass};
