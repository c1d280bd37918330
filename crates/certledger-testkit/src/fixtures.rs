//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use certledger::{Engine, EngineConfig, Service};
use certledger_client::{Confirmation, Ledger, MemoryLedger, PendingTx, Result, SimulatedLedger};
use certledger_core::{Address, CertificateDigest, LedgerRecord};

/// Signer used by [`TestFixture::with_signer`].
pub const TEST_SIGNER: Address = Address([0x11; 20]);

/// An engine over an in-memory ledger.
pub struct TestFixture {
    pub ledger: Arc<MemoryLedger>,
    pub engine: Engine,
}

impl TestFixture {
    /// Ledger with a signer: registrations go through.
    pub fn with_signer() -> Self {
        Self::over(MemoryLedger::with_signer(TEST_SIGNER))
    }

    /// Ledger without a signer: registrations fall back to instructions.
    pub fn read_only() -> Self {
        Self::over(MemoryLedger::new())
    }

    /// Wrap an existing memory ledger.
    pub fn over(ledger: MemoryLedger) -> Self {
        let ledger = Arc::new(ledger);
        let engine = Engine::with_ledger(test_config(), ledger.clone());
        Self { ledger, engine }
    }

    /// A service over the fixture's engine.
    pub fn service(&self) -> Service {
        Service::new(self.engine.clone())
    }
}

/// Engine config with short timeouts.
pub fn test_config() -> EngineConfig {
    EngineConfig {
        confirmation_timeout: Duration::from_secs(5),
        poll_interval: Duration::from_millis(10),
        simulated_latency: Duration::ZERO,
        ..EngineConfig::default()
    }
}

/// An engine with no ledger configured, seeded for repeatable answers.
pub fn degraded_engine(seed: u64) -> Engine {
    Engine::with_ledger(
        test_config(),
        Arc::new(SimulatedLedger::with_seed(seed, Duration::ZERO)),
    )
}

/// Wraps a ledger so that existence checks always answer "no".
///
/// Models a read replica lagging behind writes: both sides of a
/// registration race pass the pre-check, and the ledger itself has to
/// reject the loser.
pub struct StaleReadLedger<L> {
    inner: L,
}

impl<L: Ledger> StaleReadLedger<L> {
    pub fn new(inner: L) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<L: Ledger> Ledger for StaleReadLedger<L> {
    async fn exists(&self, _digest: &CertificateDigest) -> Result<bool> {
        Ok(false)
    }

    async fn get_record(&self, digest: &CertificateDigest) -> Result<Option<LedgerRecord>> {
        self.inner.get_record(digest).await
    }

    async fn register(&self, digest: &CertificateDigest, metadata: &str) -> Result<PendingTx> {
        self.inner.register(digest, metadata).await
    }

    async fn await_confirmation(
        &self,
        pending: &PendingTx,
        timeout: Duration,
    ) -> Result<Confirmation> {
        self.inner.await_confirmation(pending, timeout).await
    }

    fn signer(&self) -> Option<Address> {
        self.inner.signer()
    }

    fn contract_address(&self) -> Option<Address> {
        self.inner.contract_address()
    }
}

/// Two engines sharing one ledger, each behind a stale read path.
pub fn racing_engines(ledger: Arc<MemoryLedger>) -> (Engine, Engine) {
    let stale: Arc<dyn Ledger> = Arc::new(StaleReadLedger::new(ledger));
    (
        Engine::with_ledger(test_config(), stale.clone()),
        Engine::with_ledger(test_config(), stale),
    )
}

/// Lowercase hex of raw bytes, for building expected values.
pub fn hex_of(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}
