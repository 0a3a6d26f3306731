//! # QC-18 State Connector
//!
//! Dual-committee attestation of off-chain events.
//!
//! **Subsystem ID:** 18
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Decide whether the answer to an off-chain question may be treated as
//! final on-chain:
//! - Poll every attestor of the canonical (registry) committee concurrently
//! - Tally raw answers by exact byte equality
//! - Accept only a strict majority of the whole committee
//! - Cross-check against an optional node-local committee
//!
//! ## Trust Model
//!
//! | Situation | Outcome |
//! |-----------|---------|
//! | Canonical majority, no local committee | Finalized |
//! | Canonical and local majorities agree | Finalized |
//! | Canonical majority, local disagrees or has none | Diverged (operator warning) |
//! | No canonical majority | NotYetFinal (retry) |
//!
//! ## Module Structure
//!
//! ```text
//! qc-18-state-connector/
//! ├── domain/          # Address, Answer, Tally, Verdict, ActivationPolicy, errors
//! ├── algorithms/      # probe, tally, registry lookup, emitter, daemon mint
//! ├── ports/           # StateConnectorApi, HostCaller, ProvenanceContext
//! ├── adapters/        # InMemoryHost
//! └── service.rs       # StateConnectorService (committee resolver)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod config;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;
pub mod telemetry;

// Re-exports
pub use adapters::{InMemoryHost, Responder};
pub use algorithms::{
    check_mint_bounds, decode_committee, emit, fetch_canonical_committee, probe, tally,
    trigger_and_mint, trigger_daemon, ProbeBudget, ProvenanceGuard,
};
pub use config::StateConnectorConfig;
pub use domain::{
    invariant_strict_majority, AbstainReason, ActivationPolicy, Address, Answer, CallError,
    Committee, CommitteeKind, ConfigError, DaemonError, FinalityPayload, InstructionPayload,
    MintError, MintRequest, PolicyRule, ProbeResult, ProtocolParams, RoundId, RoundOutcome,
    RoundRequest, RoundState, StateConnectorError, StateConnectorResult, Tally, Verdict,
};
pub use ports::{BalanceLedger, HostCaller, ProvenanceContext, StateConnectorApi};
pub use service::{cross_check, StateConnectorService};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
