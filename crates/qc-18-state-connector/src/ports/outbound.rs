//! # Outbound Ports
//!
//! Capabilities the State Connector needs from the host execution
//! environment.

use crate::domain::{Address, CallError};
use async_trait::async_trait;
use primitive_types::U256;

/// Call capability into the host execution environment.
///
/// Attestor probes and registry lookups are read-only by convention; only
/// the finality emission and the daemon trigger change state.
#[async_trait]
pub trait HostCaller: Send + Sync {
    /// Invoke `target` as `caller` with a bounded gas budget.
    async fn call(
        &self,
        caller: Address,
        target: Address,
        payload: &[u8],
        gas: u64,
    ) -> Result<Vec<u8>, CallError>;

    /// Current block gas limit.
    fn gas_limit(&self) -> u64;
}

/// Origin/provenance tag of the current execution context.
pub trait ProvenanceContext: Send + Sync {
    /// Current origin.
    fn origin(&self) -> Address;

    /// Replace the origin.
    fn set_origin(&self, origin: Address);
}

/// Balance credit capability used by the mint collaborator.
pub trait BalanceLedger: Send + Sync {
    /// Credit `amount` to `account`.
    fn add_balance(&self, account: Address, amount: U256);
}
