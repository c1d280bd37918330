//! # Certledger
//!
//! Certificate registration and verification against an append-only
//! ledger.
//!
//! ## Overview
//!
//! A certificate is identified by the Keccak-256 digest of its exact bytes.
//! Only the digest ever leaves the process. The engine provides:
//!
//! - **Verification**: is this digest registered? Plus who registered it,
//!   when, and with what metadata, when available.
//! - **Registration**: record the digest once, wait for confirmation, and
//!   fall back to manual instructions when automatic registration is not
//!   possible.
//! - **Health**: configuration state, without touching the network.
//!
//! ## Key Concepts
//!
//! - **Degraded mode**: no ledger configured. Answers are simulated and
//!   always labelled as such.
//! - **Read-only mode**: ledger configured but no signer. Verification is
//!   real, registration returns manual instructions.
//! - **Duplicate**: registering an already known digest is reported as
//!   "already registered", never as a failure and never overwritten.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use certledger::{Engine, EngineConfig};
//!
//! async fn example() {
//!     let config = EngineConfig::from_env().unwrap();
//!     let engine = Engine::connect(config).unwrap();
//!
//!     let attempt = engine.register(b"certificate bytes", None).await.unwrap();
//!     println!("{:?}", attempt.outcome.state());
//!
//!     let result = engine.verify(b"certificate bytes").await.unwrap();
//!     println!("{}", result.message());
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `certledger::core` - Digest and ledger value types
//! - `certledger::client` - Ledger trait and implementations

pub mod config;
pub mod engine;
pub mod error;
pub mod health;
pub mod register;
pub mod response;
pub mod service;
pub mod verify;

pub use certledger_client as client;
pub use certledger_core as core;

pub use config::{EngineConfig, LedgerConnection, ReadEndpoint, SuppliedSettings};
pub use engine::Engine;
pub use error::{ConfigError, EngineError, Result};
pub use health::{HealthReport, HealthReporter};
pub use register::{
    ManualInstructions, Registrar, RegistrationAttempt, RegistrationOutcome, RegistrationState,
};
pub use response::{ErrorResponse, InstructionSteps, RegisterResponse, VerifyResponse};
pub use service::{Reply, ReplyBody, Service};
pub use verify::{VerificationResult, Verifier};

pub use certledger_core::{digest, CertificateDigest};
