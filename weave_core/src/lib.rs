//! weave_core: foundation types for the narrative context engine.
//!
//! This crate provides:
//! - Branch-scoped entity identifiers and plain data structs (§3)
//! - Hand-rolled error types for pure-logic crates (§7)
//! - The typed configuration aggregate (§6)
//! - rkyv-archived NPC tracking snapshots (§3, §6)

pub mod config;
pub mod domain;
pub mod errors;
pub mod ids;
pub mod relationship;
pub mod snapshot;

pub use config::EngineConfig;
pub use domain::*;
pub use errors::{CoreError, CoreResult};
pub use ids::*;
pub use relationship::RelationshipEntry;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
