//! # Domain Module
//!
//! Core domain types for the State Connector.

pub mod entities;
pub mod errors;
pub mod invariants;
pub mod policy;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use policy::*;
pub use value_objects::*;
