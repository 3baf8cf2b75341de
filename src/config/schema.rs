//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::Framework;

/// Root configuration for `txctl` and library consumers.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TxConfig {
    /// The chain the builder talks to.
    pub network: NetworkConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// One chain endpoint and its encoding parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Framework family (`cosmos` or `evm`).
    pub framework: Framework,

    /// CometBFT RPC (Cosmos) or JSON-RPC (EVM) endpoint.
    pub rpc_endpoint: String,

    /// Cosmos REST (LCD) endpoint; falls back to `rpc_endpoint`.
    pub rest_endpoint: Option<String>,

    /// Chain identifier (a decimal number for EVM chains).
    pub chain_id: String,

    /// Bech32 account prefix (Cosmos only).
    pub address_prefix: String,

    /// Bech32 validator operator prefix; defaults to `<address_prefix>valoper`.
    pub validator_prefix: Option<String>,

    /// Application version hint; skips feature detection when set.
    pub sdk_version: Option<String>,

    /// Gas limit used when a Cosmos request leaves it at zero.
    pub default_gas_limit: u64,

    /// Per-request HTTP timeout in seconds.
    pub request_timeout_secs: u64,
}

impl NetworkConfig {
    /// REST endpoint for account queries.
    pub fn rest_endpoint(&self) -> &str {
        self.rest_endpoint.as_deref().unwrap_or(&self.rpc_endpoint)
    }

    pub fn validator_prefix(&self) -> String {
        self.validator_prefix
            .clone()
            .unwrap_or_else(|| format!("{}valoper", self.address_prefix))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            framework: Framework::Cosmos,
            rpc_endpoint: String::new(),
            rest_endpoint: None,
            chain_id: String::new(),
            address_prefix: "cosmos".to_string(),
            validator_prefix: None,
            sdk_version: None,
            default_gas_limit: 200_000,
            request_timeout_secs: 10,
        }
    }
}

/// Timeout configuration for caller-side deadlines.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Deadline for one build/broadcast call chain in seconds.
    pub call_secs: u64,
}

impl TimeoutConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_secs)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { call_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable ones.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml() {
        let config: TxConfig = toml::from_str(
            r#"
            [network]
            framework = "evm"
            rpc_endpoint = "http://localhost:8545"
            chain_id = "31337"
            "#,
        )
        .unwrap();

        assert_eq!(config.network.framework, Framework::Evm);
        assert_eq!(config.network.rest_endpoint(), "http://localhost:8545");
        assert_eq!(config.network.default_gas_limit, 200_000);
        assert_eq!(config.timeouts.call_secs, 30);
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_validator_prefix_default() {
        let mut network = NetworkConfig {
            address_prefix: "osmo".to_string(),
            ..Default::default()
        };
        assert_eq!(network.validator_prefix(), "osmovaloper");

        network.validator_prefix = Some("osmoval".to_string());
        assert_eq!(network.validator_prefix(), "osmoval");
    }
}
