//! # Domain Errors
//!
//! Error types for the State Connector.
//!
//! Only transport-level failures of calls the core cannot work around are
//! surfaced here. A failing attestor is never an error: it becomes an
//! abstention inside the tally.

use super::value_objects::Address;
use primitive_types::U256;
use thiserror::Error;

/// Failure of a single host call.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CallError {
    /// Execution reverted.
    #[error("Call reverted: {0}")]
    Reverted(String),

    /// Gas budget exhausted.
    #[error("Out of gas (budget {budget})")]
    OutOfGas {
        /// Gas budget that was supplied
        budget: u64,
    },

    /// Target has no code / cannot be reached.
    #[error("Target unreachable: {0}")]
    Unreachable(Address),
}

/// State Connector error types.
#[derive(Debug, Error)]
pub enum StateConnectorError {
    /// Registry lookup call failed at the transport level.
    #[error("Registry lookup at {target} failed: {source}")]
    RegistryLookup {
        /// Contract that was called
        target: Address,
        /// Underlying call failure
        #[source]
        source: CallError,
    },

    /// Registry returned a buffer that is not a sequence of 32-byte words.
    #[error("Malformed registry response from {target}: {len} bytes")]
    MalformedRegistryResponse {
        /// Contract that returned the buffer
        target: Address,
        /// Buffer length received
        len: usize,
    },

    /// Finality emission call failed.
    #[error("Finality emission failed: {0}")]
    EmissionFailed(#[source] CallError),

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for State Connector operations.
pub type StateConnectorResult<T> = Result<T, StateConnectorError>;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Address string could not be parsed.
    #[error("Invalid address {value:?}: {reason}")]
    InvalidAddress {
        /// Raw value
        value: String,
        /// Parse failure
        reason: String,
    },

    /// Numeric setting could not be parsed.
    #[error("Invalid value for {key}: {value:?}")]
    InvalidNumber {
        /// Environment key
        key: String,
        /// Raw value
        value: String,
    },
}

/// Daemon trigger errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DaemonError {
    /// Daemon call failed.
    #[error("Daemon trigger call failed: {0}")]
    Call(#[from] CallError),

    /// Daemon returned no data.
    #[error("Return data from daemon trigger empty")]
    DataEmpty,

    /// Daemon returned data of the wrong width.
    #[error("Invalid return data from daemon trigger: {len} bytes")]
    InvalidData {
        /// Length received
        len: usize,
    },
}

/// Bounded-mint violations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MintError {
    /// Negative mint request.
    #[error("Mint request cannot be negative")]
    Negative,

    /// Mint request above the policy ceiling.
    #[error("Mint request of {requested} exceeded max of {max}")]
    MaxExceeded {
        /// Requested amount
        requested: U256,
        /// Policy ceiling
        max: U256,
    },
}
