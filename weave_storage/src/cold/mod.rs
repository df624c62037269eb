//! Cold storage module using DuckDB for archival data: forked-away branch
//! history, NPC tracking snapshot blobs, and the cross-story directory.

/// DuckDB-based cold storage implementation.
pub mod duckdb_cold_store;

pub use duckdb_cold_store::DuckDbColdStore;
