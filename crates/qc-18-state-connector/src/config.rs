//! State Connector configuration.
//!
//! Loaded once at process start and read-only afterwards. Tests build it
//! directly with the builder methods instead of touching the environment.

use crate::domain::{Address, ConfigError};
use std::env;
use std::time::Duration;

/// Environment key for the node-local attestor committee.
pub const LOCAL_ATTESTORS_ENV: &str = "LOCAL_ATTESTATION_PROVIDERS";

/// Environment key for the per-probe timeout in milliseconds.
pub const PROBE_TIMEOUT_ENV: &str = "QC_ATTESTOR_TIMEOUT_MS";

/// Default per-probe timeout.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(2_000);

/// Configuration for the State Connector service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateConnectorConfig {
    /// Node-local override committee; empty means no override.
    pub local_attestors: Vec<Address>,
    /// Wall-clock budget for one attestor probe.
    pub probe_timeout: Duration,
}

impl Default for StateConnectorConfig {
    fn default() -> Self {
        Self {
            local_attestors: Vec::new(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }
}

impl StateConnectorConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `LOCAL_ATTESTATION_PROVIDERS`: comma-separated hex addresses
    ///   (default: empty, no local override)
    /// - `QC_ATTESTOR_TIMEOUT_MS`: probe timeout (default: 2000)
    pub fn from_env() -> Result<Self, ConfigError> {
        let local_attestors = match env::var(LOCAL_ATTESTORS_ENV) {
            Ok(raw) => parse_attestor_list(&raw)?,
            Err(_) => Vec::new(),
        };

        let probe_timeout = match env::var(PROBE_TIMEOUT_ENV) {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::InvalidNumber {
                    key: PROBE_TIMEOUT_ENV.to_string(),
                    value: raw.clone(),
                })?,
            Err(_) => DEFAULT_PROBE_TIMEOUT,
        };

        Ok(Self {
            local_attestors,
            probe_timeout,
        })
    }

    /// Override the local committee.
    pub fn with_local_attestors(mut self, attestors: Vec<Address>) -> Self {
        self.local_attestors = attestors;
        self
    }

    /// Override the probe timeout.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }
}

/// Parse a comma-separated attestor list. Blank entries are skipped.
pub fn parse_attestor_list(raw: &str) -> Result<Vec<Address>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(Address::from_hex)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StateConnectorConfig::default();
        assert!(config.local_attestors.is_empty());
        assert_eq!(config.probe_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_parse_empty_list() {
        assert!(parse_attestor_list("").unwrap().is_empty());
        assert!(parse_attestor_list(" , ,").unwrap().is_empty());
    }

    #[test]
    fn test_parse_list() {
        let list = parse_attestor_list(
            "0x1000000000000000000000000000000000000001, 1000000000000000000000000000000000000002,",
        )
        .unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].0[19], 0x02);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_attestor_list("0xnothex").is_err());
    }

    #[test]
    fn test_builder_overrides() {
        let config = StateConnectorConfig::default()
            .with_local_attestors(vec![Address([1; 20])])
            .with_probe_timeout(Duration::from_millis(10));
        assert_eq!(config.local_attestors.len(), 1);
        assert_eq!(config.probe_timeout, Duration::from_millis(10));
    }

    // Single test so the environment is never mutated concurrently.
    #[test]
    fn test_from_env() {
        env::remove_var(LOCAL_ATTESTORS_ENV);
        env::remove_var(PROBE_TIMEOUT_ENV);
        assert_eq!(
            StateConnectorConfig::from_env().unwrap(),
            StateConnectorConfig::default()
        );

        env::set_var(
            LOCAL_ATTESTORS_ENV,
            "0x1000000000000000000000000000000000000001,1000000000000000000000000000000000000002",
        );
        env::set_var(PROBE_TIMEOUT_ENV, " 250 ");
        let config = StateConnectorConfig::from_env().unwrap();
        assert_eq!(config.local_attestors.len(), 2);
        assert_eq!(config.local_attestors[0].0[19], 0x01);
        assert_eq!(config.probe_timeout, Duration::from_millis(250));

        env::set_var(PROBE_TIMEOUT_ENV, "soon");
        let err = StateConnectorConfig::from_env().unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidNumber {
                key: PROBE_TIMEOUT_ENV.to_string(),
                value: "soon".to_string(),
            }
        );

        env::remove_var(PROBE_TIMEOUT_ENV);
        env::set_var(LOCAL_ATTESTORS_ENV, "0xnothex");
        assert!(matches!(
            StateConnectorConfig::from_env(),
            Err(ConfigError::InvalidAddress { .. })
        ));

        env::remove_var(LOCAL_ATTESTORS_ENV);
    }
}
