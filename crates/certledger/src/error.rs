//! Error types for the engine.

use certledger_client::LedgerError;
use certledger_core::CoreError;
use thiserror::Error;

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An address variable is set but malformed.
    #[error("{var} is not a valid address ({value}): {source}")]
    InvalidAddress {
        var: &'static str,
        value: String,
        #[source]
        source: CoreError,
    },

    /// A numeric variable is set but malformed.
    #[error("{var} is not a valid number: {value}")]
    InvalidNumber { var: &'static str, value: String },
}

/// Errors that can occur during engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Ledger error that orchestration could not absorb.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
