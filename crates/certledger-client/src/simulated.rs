//! Degraded-mode ledger: pseudo-random answers when no ledger is configured.
//!
//! Exists so integration tests and UI work can exercise every response
//! shape without a live ledger. It is selected once at startup, only when
//! no endpoint is configured; an unreachable endpoint is never replaced
//! by simulation.

use std::time::Duration;

use async_trait::async_trait;
use certledger_core::{Address, CertificateDigest, LedgerRecord};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::Mutex;

use crate::error::{LedgerError, Result};
use crate::traits::{Confirmation, Ledger, PendingTx};

/// Simulated ledger with no backing state.
pub struct SimulatedLedger {
    rng: Mutex<StdRng>,
    latency: Duration,
}

impl SimulatedLedger {
    /// Entropy-seeded simulation with the given per-read latency.
    pub fn new(latency: Duration) -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
            latency,
        }
    }

    /// Reproducible simulation, for tests.
    pub fn with_seed(seed: u64, latency: Duration) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            latency,
        }
    }
}

#[async_trait]
impl Ledger for SimulatedLedger {
    async fn exists(&self, digest: &CertificateDigest) -> Result<bool> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let answer = self.rng.lock().await.gen_bool(0.5);
        tracing::debug!(hash = %digest, answer, "simulated existence check");
        Ok(answer)
    }

    async fn get_record(&self, _digest: &CertificateDigest) -> Result<Option<LedgerRecord>> {
        Ok(None)
    }

    async fn register(&self, _digest: &CertificateDigest, _metadata: &str) -> Result<PendingTx> {
        Err(LedgerError::NoSignerConfigured)
    }

    async fn await_confirmation(
        &self,
        _pending: &PendingTx,
        _timeout: Duration,
    ) -> Result<Confirmation> {
        Ok(Confirmation::TimedOut)
    }

    fn signer(&self) -> Option<Address> {
        None
    }

    fn contract_address(&self) -> Option<Address> {
        None
    }

    fn is_simulated(&self) -> bool {
        true
    }
}
