//! In-memory implementation of the Ledger trait.
//!
//! This is primarily for testing. It has the same semantics as the contract
//! (one record per digest, duplicates rejected) and adds fault injection for
//! the failure paths orchestration has to survive.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use certledger_core::{digest, Address, CertificateDigest, LedgerRecord, TxHash, TxReceipt};
use tokio::sync::RwLock;

use crate::error::{LedgerError, Result};
use crate::traits::{Confirmation, Ledger, PendingTx};

/// In-memory ledger.
///
/// All data is lost when the ledger is dropped. Thread-safe via RwLock.
/// Check-and-insert in `register` happens under one write lock, so
/// concurrent registrations of one digest produce exactly one record.
pub struct MemoryLedger {
    inner: RwLock<MemoryLedgerInner>,
    signer: Option<Address>,
    contract: Address,
}

struct MemoryLedgerInner {
    /// Records indexed by digest.
    records: HashMap<CertificateDigest, LedgerRecord>,

    /// Submitted transactions: tx -> (digest, block).
    transactions: HashMap<TxHash, (CertificateDigest, u64)>,

    /// Last block produced.
    block_height: u64,

    /// Number of `register` calls, successful or not.
    submissions: u64,

    /// Injected faults.
    faults: Faults,
}

#[derive(Default)]
struct Faults {
    reads_unavailable: bool,
    record_lookups_unavailable: bool,
    submission_error: Option<LedgerError>,
    stall_confirmations: bool,
    revert_confirmations: Option<String>,
    confirmation_error: Option<LedgerError>,
}

/// Contract address reported by in-memory ledgers unless overridden.
pub const MEMORY_CONTRACT: Address = Address([0xce; 20]);

impl MemoryLedger {
    /// Create a read-only ledger (no signer).
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Create a ledger that accepts writes signed by `signer`.
    pub fn with_signer(signer: Address) -> Self {
        Self::build(Some(signer))
    }

    fn build(signer: Option<Address>) -> Self {
        Self {
            inner: RwLock::new(MemoryLedgerInner {
                records: HashMap::new(),
                transactions: HashMap::new(),
                block_height: 0,
                submissions: 0,
                faults: Faults::default(),
            }),
            signer,
            contract: MEMORY_CONTRACT,
        }
    }

    /// Override the reported contract address.
    pub fn at_contract(mut self, contract: Address) -> Self {
        self.contract = contract;
        self
    }

    /// Seed a record, as if an external registrant had written it.
    pub async fn insert_record(&self, digest: CertificateDigest, record: LedgerRecord) {
        let mut inner = self.inner.write().await;
        inner.block_height += 1;
        inner.records.insert(digest, record);
    }

    /// Number of `register` calls seen so far.
    pub async fn submission_count(&self) -> u64 {
        self.inner.read().await.submissions
    }

    /// Number of records held.
    pub async fn record_count(&self) -> usize {
        self.inner.read().await.records.len()
    }

    /// Last block produced.
    pub async fn block_height(&self) -> u64 {
        self.inner.read().await.block_height
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Fault Injection
    // ─────────────────────────────────────────────────────────────────────────

    /// Make every read fail with `Unavailable`.
    pub async fn set_reads_unavailable(&self, on: bool) {
        self.inner.write().await.faults.reads_unavailable = on;
    }

    /// Make `get_record` alone fail with `Unavailable`.
    pub async fn set_record_lookups_unavailable(&self, on: bool) {
        self.inner.write().await.faults.record_lookups_unavailable = on;
    }

    /// Make every `register` fail with the given error.
    pub async fn fail_submissions(&self, error: Option<LedgerError>) {
        self.inner.write().await.faults.submission_error = error;
    }

    /// Accept submissions but never confirm them.
    pub async fn stall_confirmations(&self, on: bool) {
        self.inner.write().await.faults.stall_confirmations = on;
    }

    /// Accept submissions, then fail the confirmation wait with the given
    /// error. The submitted record stays in place.
    pub async fn fail_confirmations(&self, error: Option<LedgerError>) {
        self.inner.write().await.faults.confirmation_error = error;
    }

    /// Accept submissions, then revert them with `reason` at confirmation.
    pub async fn revert_confirmations(&self, reason: Option<String>) {
        self.inner.write().await.faults.revert_confirmations = reason;
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn exists(&self, digest: &CertificateDigest) -> Result<bool> {
        let inner = self.inner.read().await;
        if inner.faults.reads_unavailable {
            return Err(LedgerError::Unavailable("memory ledger offline".into()));
        }
        Ok(inner.records.contains_key(digest))
    }

    async fn get_record(&self, digest: &CertificateDigest) -> Result<Option<LedgerRecord>> {
        let inner = self.inner.read().await;
        if inner.faults.reads_unavailable || inner.faults.record_lookups_unavailable {
            return Err(LedgerError::Unavailable("memory ledger offline".into()));
        }
        Ok(inner.records.get(digest).cloned())
    }

    async fn register(&self, cert: &CertificateDigest, metadata: &str) -> Result<PendingTx> {
        let signer = self.signer.ok_or(LedgerError::NoSignerConfigured)?;

        let mut inner = self.inner.write().await;
        inner.submissions += 1;

        if let Some(err) = &inner.faults.submission_error {
            return Err(err.clone());
        }

        if inner.records.contains_key(cert) {
            return Err(LedgerError::DuplicateRegistration(*cert));
        }

        let mut preimage = cert.as_bytes().to_vec();
        preimage.extend_from_slice(&inner.submissions.to_be_bytes());
        let tx_hash = TxHash::from_bytes(*digest(&preimage).as_bytes());

        inner.block_height += 1;
        let block = inner.block_height;
        inner.transactions.insert(tx_hash, (*cert, block));

        // A reverting transaction leaves no record behind.
        if inner.faults.revert_confirmations.is_none() {
            inner.records.insert(
                *cert,
                LedgerRecord {
                    registrar: signer,
                    timestamp: now_secs(),
                    metadata: metadata.to_string(),
                    exists: true,
                },
            );
        }

        Ok(PendingTx {
            tx_hash,
            digest: *cert,
        })
    }

    async fn await_confirmation(
        &self,
        pending: &PendingTx,
        timeout: Duration,
    ) -> Result<Confirmation> {
        let (stalled, reverted, failure, known) = {
            let inner = self.inner.read().await;
            (
                inner.faults.stall_confirmations,
                inner.faults.revert_confirmations.clone(),
                inner.faults.confirmation_error.clone(),
                inner.transactions.get(&pending.tx_hash).copied(),
            )
        };

        if let Some(err) = failure {
            return Err(err);
        }

        if stalled {
            tokio::time::sleep(timeout).await;
            return Ok(Confirmation::TimedOut);
        }

        let Some((_, block_number)) = known else {
            return Err(LedgerError::InvalidResponse(format!(
                "unknown transaction {}",
                pending.tx_hash
            )));
        };

        if let Some(reason) = reverted {
            return Ok(Confirmation::Reverted(reason));
        }

        Ok(Confirmation::Confirmed(TxReceipt {
            tx_hash: pending.tx_hash,
            block_number,
        }))
    }

    fn signer(&self) -> Option<Address> {
        self.signer
    }

    fn contract_address(&self) -> Option<Address> {
        Some(self.contract)
    }
}

/// Current time in Unix seconds.
fn now_secs() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
