//! # State Connector Metrics
//!
//! Prometheus metrics for round outcomes and attestor health.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! qc-18-state-connector = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `state_connector_rounds_total` - Counter of resolved rounds (by outcome)
//! - `state_connector_abstentions_total` - Counter of abstaining attestors (by committee)
//! - `state_connector_divergences_total` - Counter of canonical/local divergences
//! - `state_connector_mint_rejected_total` - Counter of skipped mints (by reason)

use crate::domain::CommitteeKind;

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Rounds resolved, labeled by outcome
    pub static ref ROUNDS: IntCounterVec = register_int_counter_vec!(
        "state_connector_rounds_total",
        "Total number of attestation rounds resolved",
        &["outcome"]
    )
    .expect("Failed to create ROUNDS metric");

    /// Abstaining attestors, labeled by committee
    pub static ref ABSTENTIONS: IntCounterVec = register_int_counter_vec!(
        "state_connector_abstentions_total",
        "Total number of attestor abstentions",
        &["committee"]
    )
    .expect("Failed to create ABSTENTIONS metric");

    /// Canonical/local divergences
    pub static ref DIVERGENCES: IntCounter = register_int_counter!(
        "state_connector_divergences_total",
        "Total number of canonical/local committee divergences"
    )
    .expect("Failed to create DIVERGENCES metric");

    /// Skipped mints, labeled by reason
    pub static ref MINT_REJECTED: IntCounterVec = register_int_counter_vec!(
        "state_connector_mint_rejected_total",
        "Total number of mint requests skipped",
        &["reason"]
    )
    .expect("Failed to create MINT_REJECTED metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record a resolved round
#[cfg(feature = "metrics")]
pub fn record_round(outcome: &str) {
    ROUNDS.with_label_values(&[outcome]).inc();
    if outcome == "diverged" {
        DIVERGENCES.inc();
    }
}

/// Record abstentions for one committee tally
#[cfg(feature = "metrics")]
pub fn record_abstentions(kind: CommitteeKind, count: u64) {
    let label = kind.to_string();
    ABSTENTIONS.with_label_values(&[label.as_str()]).inc_by(count);
}

/// Record a skipped mint
#[cfg(feature = "metrics")]
pub fn record_mint_rejected(reason: &str) {
    MINT_REJECTED.with_label_values(&[reason]).inc();
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

/// Record a resolved round (no-op)
#[cfg(not(feature = "metrics"))]
pub fn record_round(_outcome: &str) {}

/// Record abstentions (no-op)
#[cfg(not(feature = "metrics"))]
pub fn record_abstentions(_kind: CommitteeKind, _count: u64) {}

/// Record a skipped mint (no-op)
#[cfg(not(feature = "metrics"))]
pub fn record_mint_rejected(_reason: &str) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_callable() {
        record_round("finalized");
        record_round("diverged");
        record_abstentions(CommitteeKind::Canonical, 3);
        record_mint_rejected("negative");
    }
}
