//! Hot storage module using redb for the active branch of every story.
//!
//! Provides fast key-value storage and branch-scoped range scans for the
//! high write-rate, point-lookup data named in §6's persistence contract.

/// Redb-based hot storage implementation.
pub mod redb_hot_store;

pub use redb_hot_store::RedbHotStore;
