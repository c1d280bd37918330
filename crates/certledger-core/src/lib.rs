//! # Certledger Core
//!
//! Pure primitives for Certledger: content digests, ledger identifiers and
//! the records the ledger keeps about registered certificates.
//!
//! This crate contains no I/O, no networking and no clock. It is pure
//! computation over fixed-width identifiers.
//!
//! ## Key Types
//!
//! - [`CertificateDigest`] - Content-addressed certificate identity (Keccak-256)
//! - [`Address`] - A 20-byte ledger account or contract address
//! - [`TxHash`] - A 32-byte transaction reference
//! - [`LedgerRecord`] - What the ledger stores for a registered digest
//! - [`TxReceipt`] - Proof that a submitted write was confirmed
//!
//! ## Hashing
//!
//! ```rust
//! use certledger_core::digest;
//!
//! let a = digest(b"certificate bytes");
//! let b = digest(b"certificate bytes");
//! assert_eq!(a, b);
//! assert!(a.to_hex().starts_with("0x"));
//! ```

pub mod digest;
pub mod error;
pub mod record;
pub mod types;

pub use digest::{digest, CertificateDigest};
pub use error::{CoreError, Result};
pub use record::{LedgerRecord, TxReceipt};
pub use types::{Address, TxHash};
