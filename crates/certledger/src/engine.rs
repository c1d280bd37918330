//! The Engine: one handle over configuration, ledger and orchestrators.

use std::sync::Arc;

use certledger_client::{Ledger, RpcLedger, SimulatedLedger};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::health::{HealthReport, HealthReporter};
use crate::register::{RegistrationAttempt, Registrar};
use crate::verify::{VerificationResult, Verifier};

/// Certificate engine.
///
/// Cheap to clone; clones share the same ledger connection, which is
/// created once and reused for every request.
#[derive(Clone)]
pub struct Engine {
    config: Arc<EngineConfig>,
    ledger: Arc<dyn Ledger>,
    verifier: Verifier,
    registrar: Registrar,
    health: HealthReporter,
}

impl Engine {
    /// Build the ledger connection described by `config`.
    ///
    /// Without a read endpoint the engine runs degraded over a
    /// [`SimulatedLedger`].
    pub fn connect(config: EngineConfig) -> Result<Self> {
        let ledger: Arc<dyn Ledger> = match config.rpc_config() {
            Some(rpc) => {
                tracing::info!(
                    rpc_url = %rpc.rpc_url,
                    contract = %rpc.contract,
                    signer = rpc.signer.is_some(),
                    "connecting to ledger"
                );
                Arc::new(RpcLedger::new(rpc)?)
            }
            None => {
                tracing::warn!("ledger not configured, running in simulated mode");
                Arc::new(SimulatedLedger::new(config.simulated_latency))
            }
        };
        Ok(Self::with_ledger(config, ledger))
    }

    /// Build an engine over an existing ledger.
    pub fn with_ledger(config: EngineConfig, ledger: Arc<dyn Ledger>) -> Self {
        let verifier = Verifier::new(ledger.clone());
        let registrar = Registrar::new(
            ledger.clone(),
            config.confirmation_timeout,
            config.network_id,
        );
        let health = HealthReporter::new(&config, ledger.as_ref());

        Self {
            config: Arc::new(config),
            ledger,
            verifier,
            registrar,
            health,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Arc<dyn Ledger> {
        &self.ledger
    }

    /// Check whether certificate bytes are registered.
    pub async fn verify(&self, bytes: &[u8]) -> Result<VerificationResult> {
        self.verifier.verify(bytes).await
    }

    /// Register certificate bytes, falling back to manual instructions
    /// when automatic registration is impossible or fails.
    pub async fn register(
        &self,
        bytes: &[u8],
        metadata: Option<&str>,
    ) -> Result<RegistrationAttempt> {
        self.registrar.register(bytes, metadata).await
    }

    pub fn health(&self) -> HealthReport {
        self.health.report()
    }
}
