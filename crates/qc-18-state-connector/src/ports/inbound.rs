//! # Inbound Ports
//!
//! API trait defining what the State Connector can do.

use crate::domain::{RoundOutcome, RoundRequest, StateConnectorResult};
use async_trait::async_trait;
use primitive_types::U256;

/// State Connector API - inbound port.
///
/// The core is stateless across rounds: tracking which rounds were already
/// finalized is the caller's job.
#[async_trait]
pub trait StateConnectorApi: Send + Sync {
    /// Resolve a round without side effects.
    async fn resolve(&self, request: &RoundRequest) -> StateConnectorResult<RoundOutcome>;

    /// Resolve a round and emit the finality signal if it finalized.
    async fn finalize_round(&self, request: &RoundRequest) -> StateConnectorResult<RoundOutcome>;

    /// Run the daemon trigger and bounded mint for one host tick.
    ///
    /// Returns the minted amount; failures are logged, never raised.
    async fn trigger_and_mint(&self, chain_id: u64, time: u64) -> Option<U256>;

    /// Whether the mechanism is engaged for `chain_id` at `time`.
    fn is_active(&self, chain_id: u64, time: u64) -> bool;
}
