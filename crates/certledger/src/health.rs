//! Health reporting from local configuration only.

use certledger_client::Ledger;
use serde::Serialize;

use crate::config::EngineConfig;

/// Snapshot of how the engine was configured at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
    /// A real ledger is in use (not simulated).
    pub ledger_configured: bool,
    /// Write credentials are configured.
    pub signer_configured: bool,
    /// An RPC URL was supplied, even without a contract.
    pub rpc_set: bool,
    /// A deployed contract address was supplied, even without an RPC URL.
    pub has_contract_address: bool,
    pub env: String,
    pub network_id: u64,
}

/// Reports configuration state. Never touches the network, so an operator
/// can tell "not configured" apart from "configured but failing".
#[derive(Debug, Clone)]
pub struct HealthReporter {
    report: HealthReport,
}

impl HealthReporter {
    /// Capture configuration and the selected ledger's local descriptors.
    ///
    /// Settings count as configured when either the configuration names them
    /// or the ledger in use carries them.
    pub fn new(config: &EngineConfig, ledger: &dyn Ledger) -> Self {
        Self {
            report: HealthReport {
                status: "ok",
                ledger_configured: !ledger.is_simulated(),
                signer_configured: config.connection.write_signer.is_some()
                    || ledger.signer().is_some(),
                rpc_set: config.rpc_url_set(),
                has_contract_address: config.contract_address_set(),
                env: config.environment.clone(),
                network_id: config.network_id,
            },
        }
    }

    pub fn report(&self) -> HealthReport {
        self.report.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SuppliedSettings;
    use certledger_client::{MemoryLedger, SimulatedLedger};
    use certledger_core::Address;
    use serde_json::json;
    use std::time::Duration;

    fn simulated() -> SimulatedLedger {
        SimulatedLedger::with_seed(1, Duration::ZERO)
    }

    #[test]
    fn test_report_shape() {
        let config = EngineConfig {
            environment: "production".into(),
            ..EngineConfig::default()
        };
        let report = HealthReporter::new(&config, &MemoryLedger::new()).report();
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "status": "ok",
                "ledgerConfigured": true,
                "signerConfigured": false,
                "rpcSet": false,
                "hasContractAddress": false,
                "env": "production",
                "networkId": 80002
            })
        );
    }

    #[test]
    fn test_signer_without_endpoint() {
        let mut config = EngineConfig::default();
        config.connection.write_signer = Some(Address::from_bytes([0x11; 20]));

        let report = HealthReporter::new(&config, &simulated()).report();
        assert!(!report.ledger_configured);
        assert!(report.signer_configured);
        assert!(!report.rpc_set);
    }

    #[test]
    fn test_rpc_without_contract() {
        let config = EngineConfig {
            supplied: SuppliedSettings {
                rpc_url: true,
                contract_address: false,
            },
            ..EngineConfig::default()
        };
        let partial = HealthReporter::new(&config, &simulated()).report();
        let empty = HealthReporter::new(&EngineConfig::default(), &simulated()).report();

        assert!(!partial.ledger_configured);
        assert!(partial.rpc_set);
        assert!(!partial.has_contract_address);
        assert_ne!(partial, empty);
    }
}
