//! weave_storage: the hybrid redb/DuckDB persistence layer (§6).
//!
//! Active branches live in the redb hot tier (`hot`) for low-latency point
//! lookups; forked-away branch history, NPC tracking snapshot blobs, and the
//! cross-story directory live in the DuckDB cold tier (`cold`). [`hybrid_store::HybridStorage`]
//! is the single facade callers use; [`fork_txn`] is the transactional
//! realization of §4.1's "fork is transactional" invariant.

/// Hot storage module (redb-based, active branches).
pub mod hot;
/// Cold storage module (DuckDB-based, archival + cross-story directory).
pub mod cold;
/// Hybrid storage combining hot and cold tiers.
pub mod hybrid_store;
/// Unified error type for storage operations.
pub mod storage_error;
/// Transactional branch forking (§4.1).
pub mod fork_txn;

pub use hybrid_store::HybridStorage;
pub use storage_error::StorageError;
