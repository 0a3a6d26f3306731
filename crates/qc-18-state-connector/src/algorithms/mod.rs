//! # Algorithms Module
//!
//! Probing, tallying, committee lookup, finality emission and the daemon
//! mint collaborator.

pub mod aggregator;
pub mod daemon;
pub mod emitter;
pub mod probe;
pub mod registry;

pub use aggregator::{tally, ProbeBudget};
pub use daemon::{check_mint_bounds, trigger_and_mint, trigger_daemon};
pub use emitter::{emit, ProvenanceGuard};
pub use probe::probe;
pub use registry::{decode_committee, fetch_canonical_committee};
