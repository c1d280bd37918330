//! Engine configuration and the process-wide ledger connection.
//!
//! Configuration is read once at startup into an immutable [`EngineConfig`]
//! and passed explicitly to [`crate::Engine`]. Nothing re-reads the
//! environment afterwards.

use std::time::Duration;

use certledger_client::RpcConfig;
use certledger_core::Address;

use crate::error::ConfigError;

/// Network id used when `CHAIN_ID` is unset or unparsable (Polygon Amoy).
pub const DEFAULT_NETWORK_ID: u64 = 80002;

/// Environment label used when `NODE_ENV` is unset.
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Contract value that deployments ship with before the contract exists.
pub const UNDEPLOYED_CONTRACT: &str = "0x...";

/// Where reads go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadEndpoint {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,
    /// Certificate registry contract.
    pub contract: Address,
}

/// The process-wide ledger handle.
///
/// - No `read_endpoint`: degraded mode, answers are simulated.
/// - No `write_signer`: read-only, registration falls back to manual
///   instructions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerConnection {
    pub read_endpoint: Option<ReadEndpoint>,
    pub write_signer: Option<Address>,
}

impl LedgerConnection {
    /// Whether no real ledger is configured.
    pub fn is_degraded(&self) -> bool {
        self.read_endpoint.is_none()
    }
}

/// Which ledger settings were supplied, complete or not.
///
/// A read endpoint needs both the URL and the contract; these flags keep
/// track of a half-configured ledger so health can say what is missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuppliedSettings {
    pub rpc_url: bool,
    pub contract_address: bool,
}

/// Configuration for the engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Ledger endpoint and signer.
    pub connection: LedgerConnection,
    /// Raw presence of the ledger settings.
    pub supplied: SuppliedSettings,
    /// Network (chain) id, reported by health and shown in instructions.
    pub network_id: u64,
    /// Deployment environment label.
    pub environment: String,
    /// How long a registration waits for confirmation.
    pub confirmation_timeout: Duration,
    /// Receipt polling interval while confirming.
    pub poll_interval: Duration,
    /// Artificial latency of simulated reads.
    pub simulated_latency: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            connection: LedgerConnection::default(),
            supplied: SuppliedSettings::default(),
            network_id: DEFAULT_NETWORK_ID,
            environment: DEFAULT_ENVIRONMENT.to_string(),
            confirmation_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_secs(1),
            simulated_latency: Duration::from_millis(1500),
        }
    }
}

impl EngineConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `RPC_URL` (or legacy `PROVIDER_URL`) | unset |
    /// | `CONTRACT_ADDRESS` | unset |
    /// | `SIGNER_ADDRESS` | unset |
    /// | `CHAIN_ID` | 80002 |
    /// | `NODE_ENV` | development |
    /// | `CONFIRMATION_TIMEOUT_SECS` | 60 |
    /// | `CONFIRMATION_POLL_MS` | 1000 |
    /// | `SIMULATED_LATENCY_MS` | 1500 |
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let rpc_url = var("RPC_URL").or_else(|| var("PROVIDER_URL"));

        let contract = match var("CONTRACT_ADDRESS") {
            Some(v) if v != UNDEPLOYED_CONTRACT => Some(parse_address("CONTRACT_ADDRESS", &v)?),
            _ => {
                tracing::warn!("CONTRACT_ADDRESS missing; ledger reads will be simulated");
                None
            }
        };

        let write_signer = var("SIGNER_ADDRESS")
            .map(|v| parse_address("SIGNER_ADDRESS", &v))
            .transpose()?;

        let supplied = SuppliedSettings {
            rpc_url: rpc_url.is_some(),
            contract_address: contract.is_some(),
        };

        let read_endpoint = match (rpc_url, contract) {
            (Some(rpc_url), Some(contract)) => Some(ReadEndpoint { rpc_url, contract }),
            (None, Some(_)) => {
                tracing::warn!("RPC_URL missing; ledger reads will be simulated");
                None
            }
            _ => None,
        };

        let network_id = match var("CHAIN_ID") {
            Some(v) => v.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %v, "CHAIN_ID unparsable, using default");
                DEFAULT_NETWORK_ID
            }),
            None => DEFAULT_NETWORK_ID,
        };

        Ok(Self {
            connection: LedgerConnection {
                read_endpoint,
                write_signer,
            },
            supplied,
            network_id,
            environment: var("NODE_ENV").unwrap_or(defaults.environment),
            confirmation_timeout: parse_duration(
                "CONFIRMATION_TIMEOUT_SECS",
                var("CONFIRMATION_TIMEOUT_SECS"),
                Duration::from_secs,
                defaults.confirmation_timeout,
            )?,
            poll_interval: parse_duration(
                "CONFIRMATION_POLL_MS",
                var("CONFIRMATION_POLL_MS"),
                Duration::from_millis,
                defaults.poll_interval,
            )?,
            simulated_latency: parse_duration(
                "SIMULATED_LATENCY_MS",
                var("SIMULATED_LATENCY_MS"),
                Duration::from_millis,
                defaults.simulated_latency,
            )?,
        })
    }

    /// Whether an RPC URL is configured.
    pub fn rpc_url_set(&self) -> bool {
        self.supplied.rpc_url || self.connection.read_endpoint.is_some()
    }

    /// Whether a deployed contract address is configured.
    pub fn contract_address_set(&self) -> bool {
        self.supplied.contract_address || self.connection.read_endpoint.is_some()
    }

    /// JSON-RPC client configuration, if a real ledger is configured.
    pub fn rpc_config(&self) -> Option<RpcConfig> {
        let endpoint = self.connection.read_endpoint.as_ref()?;
        Some(
            RpcConfig::new(endpoint.rpc_url.clone(), endpoint.contract)
                .with_signer(self.connection.write_signer)
                .with_poll_interval(self.poll_interval),
        )
    }
}

fn parse_address(var: &'static str, value: &str) -> Result<Address, ConfigError> {
    value.parse().map_err(|source| ConfigError::InvalidAddress {
        var,
        value: value.to_string(),
        source,
    })
}

fn parse_duration(
    var: &'static str,
    value: Option<String>,
    unit: fn(u64) -> Duration,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match value {
        Some(v) => v
            .parse()
            .map(unit)
            .map_err(|_| ConfigError::InvalidNumber { var, value: v }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const CONTRACT: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
    const SIGNER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    fn config(vars: &[(&str, &str)]) -> Result<EngineConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn test_empty_environment_is_degraded() {
        let cfg = config(&[]).unwrap();
        assert!(cfg.connection.is_degraded());
        assert!(cfg.connection.write_signer.is_none());
        assert_eq!(cfg.network_id, DEFAULT_NETWORK_ID);
        assert_eq!(cfg.environment, "development");
        assert!(cfg.rpc_config().is_none());
    }

    #[test]
    fn test_full_environment() {
        let cfg = config(&[
            ("RPC_URL", "https://rpc-amoy.polygon.technology"),
            ("CONTRACT_ADDRESS", CONTRACT),
            ("SIGNER_ADDRESS", SIGNER),
            ("CHAIN_ID", "31337"),
            ("NODE_ENV", "production"),
            ("CONFIRMATION_TIMEOUT_SECS", "5"),
        ])
        .unwrap();

        let endpoint = cfg.connection.read_endpoint.clone().unwrap();
        assert_eq!(endpoint.rpc_url, "https://rpc-amoy.polygon.technology");
        assert_eq!(endpoint.contract, CONTRACT.parse().unwrap());
        assert_eq!(cfg.connection.write_signer, Some(SIGNER.parse().unwrap()));
        assert_eq!(cfg.network_id, 31337);
        assert_eq!(cfg.environment, "production");
        assert_eq!(cfg.confirmation_timeout, Duration::from_secs(5));

        let rpc = cfg.rpc_config().unwrap();
        assert_eq!(rpc.signer, cfg.connection.write_signer);
    }

    #[test]
    fn test_legacy_provider_url() {
        let cfg = config(&[("PROVIDER_URL", "http://localhost:8545"), ("CONTRACT_ADDRESS", CONTRACT)])
            .unwrap();
        assert_eq!(
            cfg.connection.read_endpoint.unwrap().rpc_url,
            "http://localhost:8545"
        );
    }

    #[test]
    fn test_undeployed_contract_placeholder() {
        let cfg = config(&[("RPC_URL", "http://localhost:8545"), ("CONTRACT_ADDRESS", "0x...")])
            .unwrap();
        assert!(cfg.connection.is_degraded());
    }

    #[test]
    fn test_malformed_address_rejected() {
        let err = config(&[("SIGNER_ADDRESS", "not-an-address")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidAddress {
                var: "SIGNER_ADDRESS",
                ..
            }
        ));
    }

    #[test]
    fn test_partial_ledger_settings_are_tracked() {
        let cfg = config(&[("RPC_URL", "http://localhost:8545")]).unwrap();
        assert!(cfg.connection.is_degraded());
        assert!(cfg.rpc_url_set());
        assert!(!cfg.contract_address_set());

        let cfg = config(&[("CONTRACT_ADDRESS", CONTRACT)]).unwrap();
        assert!(cfg.connection.is_degraded());
        assert!(!cfg.rpc_url_set());
        assert!(cfg.contract_address_set());

        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.supplied, SuppliedSettings::default());
    }

    #[test]
    fn test_bad_chain_id_falls_back() {
        let cfg = config(&[("CHAIN_ID", "amoy")]).unwrap();
        assert_eq!(cfg.network_id, DEFAULT_NETWORK_ID);
    }

    #[test]
    fn test_bad_timeout_rejected() {
        let err = config(&[("CONFIRMATION_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { .. }));
    }
}
