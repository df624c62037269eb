//! Unified error type for storage operations (§7 I/O-boundary idiom).

use thiserror::Error;

/// Unified error type for hybrid storage layers.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Error from the redb hot storage layer.
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),
    /// Error opening or creating the redb database file.
    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),
    /// Error raised by a redb transaction commit.
    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),
    /// Error raised opening or using a redb table.
    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),
    /// Error raised by a redb storage-level operation.
    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),
    /// Error raised by a redb commit.
    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),
    /// Error from the DuckDB cold storage layer.
    #[error("duckdb error: {0}")]
    DuckDb(#[from] duckdb::Error),
    /// Error during bincode serialization/deserialization of a hot-store row.
    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),
    /// Error during rkyv (de)serialization of an archival snapshot blob.
    #[error("snapshot serialization error: {0}")]
    Snapshot(String),
    /// A fork or lookup referenced a branch/story/entity that isn't in this store.
    #[error("not found: {0}")]
    NotFound(String),
    /// The requested fork failed a §4.1 invariant; the caller's descriptor
    /// list or sequence was invalid.
    #[error("fork error: {0}")]
    Fork(String),
}
