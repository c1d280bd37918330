//! Records owned by the ledger.
//!
//! Both types are read-only views of ledger state. Nothing in this
//! workspace constructs a `LedgerRecord` except ledger implementations.

use serde::{Deserialize, Serialize};

use crate::types::{Address, TxHash};

/// What the ledger keeps for a registered certificate.
///
/// Created once by a successful registration and never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// Identity that performed the registration.
    pub registrar: Address,
    /// Ledger-recorded registration time (Unix seconds).
    pub timestamp: u64,
    /// Free-text metadata supplied at registration.
    pub metadata: String,
    /// Whether the ledger holds a record for the digest.
    pub exists: bool,
}

/// Confirmation of a submitted write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    /// The transaction that was confirmed.
    pub tx_hash: TxHash,
    /// The block that included it.
    pub block_number: u64,
}
