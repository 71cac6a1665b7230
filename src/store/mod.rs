//! Store Module
//!
//! The versioned key-value boundary the counter coordinates through.
//!
//! ## Responsibilities
//! - Per-key versioned reads (`get` returns value + revision)
//! - Unconditional writes (`put`, used only for lazy initialization)
//! - Conditional writes guarded by an expected revision (`update`)
//! - Bucket creation with a bounded per-key revision history
//!
//! The revision is opaque to callers: it is only ever compared for equality
//! by the store itself, never interpreted numerically by the counter.

mod memory;

pub use memory::{MemoryBucket, MemoryStore};

use std::sync::Arc;

use bytes::Bytes;

use crate::cancel::CancelToken;
use crate::error::Result;

/// A single versioned entry read from the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Stored value bytes
    pub value: Bytes,

    /// Store-assigned revision, advanced on every write to the key
    pub revision: u64,
}

/// Configuration for creating (or opening) a bucket
#[derive(Debug, Clone)]
pub struct BucketConfig {
    /// Bucket (namespace) name
    pub name: String,

    /// Number of past revisions the store retains per key.
    /// Kept for audit/rollback by the store; the counter never reads it.
    pub history_depth: usize,
}

/// One bucket of a versioned key-value store.
///
/// Implementations must guarantee that for any key, at most one `update`
/// guarded by a given revision succeeds; every other writer observing that
/// revision gets a `VersionConflict` and must re-read.
pub trait VersionedKv: Send + Sync {
    /// Read the entry for a key, or `None` if the key has never been written
    fn get(&self, key: &str, cancel: &CancelToken) -> Result<Option<Entry>>;

    /// Unconditionally write a value, returning the new revision
    fn put(&self, key: &str, value: &[u8], cancel: &CancelToken) -> Result<u64>;

    /// Conditionally write a value, succeeding only if the key's current
    /// revision equals `expected_revision`. Returns the new revision on
    /// success and `VersionConflict` otherwise.
    fn update(
        &self,
        key: &str,
        value: &[u8],
        expected_revision: u64,
        cancel: &CancelToken,
    ) -> Result<u64>;
}

impl std::fmt::Debug for dyn VersionedKv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn VersionedKv")
    }
}

/// A store that can hand out bucket handles.
pub trait KvStore: Send + Sync {
    /// Open a bucket, creating it with the configured history depth if it
    /// does not exist yet. Opening an existing bucket is idempotent and
    /// leaves its history depth unchanged.
    fn open_bucket(&self, config: &BucketConfig) -> Result<Arc<dyn VersionedKv>>;
}
