//! # Certledger Testkit
//!
//! Testing utilities for Certledger.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known digests so every client hashes the same way
//! - **Generators**: Proptest strategies for certificate bytes and metadata
//! - **Fixtures**: Engines over in-memory, stale-read and simulated ledgers
//!
//! ## Golden Vectors
//!
//! ```rust
//! use certledger_testkit::vectors::verify_all_vectors;
//!
//! for (name, matches, hex) in verify_all_vectors() {
//!     assert!(matches, "{name}: {hex}");
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use certledger_testkit::fixtures::TestFixture;
//!
//! async fn example() {
//!     let fixture = TestFixture::with_signer();
//!     let attempt = fixture.engine.register(b"diploma", None).await.unwrap();
//!     assert!(attempt.outcome.is_success());
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{degraded_engine, racing_engines, StaleReadLedger, TestFixture};
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector};
