//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements outbound port traits for the State Connector.

mod in_memory_host;

pub use in_memory_host::{word_from_u64, CallRecord, InMemoryHost, Responder, DEFAULT_GAS_LIMIT};
