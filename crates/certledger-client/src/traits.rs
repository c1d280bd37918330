//! Ledger trait: the abstract interface over the external ledger.
//!
//! This trait lets orchestration stay ledger-agnostic. Implementations
//! include JSON-RPC (real), in-memory (tests) and simulated (degraded mode).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use certledger_core::{Address, CertificateDigest, LedgerRecord, TxHash, TxReceipt};

use crate::error::Result;

/// Handle for a submitted, not yet confirmed, registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTx {
    /// Transaction reference returned by the ledger.
    pub tx_hash: TxHash,
    /// The digest the transaction registers.
    pub digest: CertificateDigest,
}

/// Outcome of waiting for a submitted write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    /// The write was durably accepted.
    Confirmed(TxReceipt),
    /// The deadline passed first. The transaction may still confirm later.
    TimedOut,
    /// The ledger rejected the write for a reason other than a duplicate.
    Reverted(String),
}

/// The Ledger trait: async interface for certificate records.
///
/// # Design Notes
///
/// - **Authoritative duplicates**: an existing record is never overwritten;
///   `register` for a known digest fails with `DuplicateRegistration`.
/// - **Race losers**: a registration that loses a race at confirmation time
///   is reported as `Err(DuplicateRegistration)`, not as `Reverted`.
/// - **Descriptors are local**: `signer`, `contract_address` and
///   `is_simulated` never touch the network.
#[async_trait]
pub trait Ledger: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    /// Whether the ledger holds a record for the digest.
    async fn exists(&self, digest: &CertificateDigest) -> Result<bool>;

    /// Fetch the record for the digest, `None` if there is none.
    async fn get_record(&self, digest: &CertificateDigest) -> Result<Option<LedgerRecord>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Writes
    // ─────────────────────────────────────────────────────────────────────────

    /// Submit a registration.
    ///
    /// # Errors
    /// - `NoSignerConfigured` if this ledger has no write credentials.
    /// - `Unavailable` if the endpoint cannot be reached.
    /// - `DuplicateRegistration` if the digest is already registered.
    async fn register(&self, digest: &CertificateDigest, metadata: &str) -> Result<PendingTx>;

    /// Wait up to `timeout` for a submitted registration to confirm.
    async fn await_confirmation(
        &self,
        pending: &PendingTx,
        timeout: Duration,
    ) -> Result<Confirmation>;

    // ─────────────────────────────────────────────────────────────────────────
    // Descriptors
    // ─────────────────────────────────────────────────────────────────────────

    /// The account writes are signed with, if any.
    fn signer(&self) -> Option<Address>;

    /// The contract holding the records, if one is configured.
    fn contract_address(&self) -> Option<Address>;

    /// Whether answers are simulated rather than read from a ledger.
    fn is_simulated(&self) -> bool {
        false
    }
}

#[async_trait]
impl<L: Ledger + ?Sized> Ledger for Arc<L> {
    async fn exists(&self, digest: &CertificateDigest) -> Result<bool> {
        (**self).exists(digest).await
    }

    async fn get_record(&self, digest: &CertificateDigest) -> Result<Option<LedgerRecord>> {
        (**self).get_record(digest).await
    }

    async fn register(&self, digest: &CertificateDigest, metadata: &str) -> Result<PendingTx> {
        (**self).register(digest, metadata).await
    }

    async fn await_confirmation(
        &self,
        pending: &PendingTx,
        timeout: Duration,
    ) -> Result<Confirmation> {
        (**self).await_confirmation(pending, timeout).await
    }

    fn signer(&self) -> Option<Address> {
        (**self).signer()
    }

    fn contract_address(&self) -> Option<Address> {
        (**self).contract_address()
    }

    fn is_simulated(&self) -> bool {
        (**self).is_simulated()
    }
}
