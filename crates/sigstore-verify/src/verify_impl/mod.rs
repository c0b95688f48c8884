//! Building blocks of bundle verification

pub mod chain;
pub mod helpers;
pub mod rekor;
pub mod sct;
pub mod signature;
pub mod tlog;

#[cfg(test)]
pub(crate) mod test_certs;
