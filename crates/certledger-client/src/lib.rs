//! # Certledger Client
//!
//! Ledger abstraction for Certledger. Provides a trait-based interface over
//! the external append-only ledger, with a JSON-RPC implementation for real
//! deployments, an in-memory ledger for tests, and a simulated ledger for
//! running without any ledger at all.
//!
//! ## Key Types
//!
//! - [`Ledger`] - The async trait for all ledger operations
//! - [`RpcLedger`] - Ethereum JSON-RPC client for the certificate contract
//! - [`MemoryLedger`] - In-memory ledger with fault injection, for tests
//! - [`SimulatedLedger`] - Degraded-mode stand-in with pseudo-random answers
//! - [`LedgerError`] / [`ErrorKind`] - Structured failures
//!
//! ## Usage
//!
//! ```rust,no_run
//! use certledger_client::{Ledger, MemoryLedger};
//! use certledger_core::{digest, Address};
//!
//! async fn example() {
//!     let ledger = MemoryLedger::with_signer(Address::from_bytes([0x11; 20]));
//!     let d = digest(b"certificate");
//!
//!     assert!(!ledger.exists(&d).await.unwrap());
//!     let pending = ledger.register(&d, "issued by registrar").await.unwrap();
//!     // let confirmation = ledger.await_confirmation(&pending, timeout).await?;
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Reads are idempotent**: `exists` and `get_record` may be retried freely.
//! - **Writes are not**: a second `register` for the same digest fails with
//!   `DuplicateRegistration`, never overwrites.
//! - **Local timeouts only**: `await_confirmation` stops waiting at the
//!   deadline; it never cancels the submitted transaction.

pub mod abi;
pub mod error;
pub mod memory;
pub mod revert;
pub mod rpc;
pub mod simulated;
pub mod traits;

pub use error::{ErrorKind, LedgerError, Result};
pub use memory::MemoryLedger;
pub use rpc::{RpcConfig, RpcLedger};
pub use simulated::SimulatedLedger;
pub use traits::{Confirmation, Ledger, PendingTx};
