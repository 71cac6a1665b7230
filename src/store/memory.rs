//! In-memory versioned store
//!
//! Reference implementation of the store boundary: per-key revisions,
//! compare-and-swap updates, and a bounded revision history per key.
//! Serves as both the local backend and the test double.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;

use crate::cancel::CancelToken;
use crate::error::{GopherError, Result};
use crate::store::{BucketConfig, Entry, KvStore, VersionedKv};

/// Per-key record: current entry plus its retained history
#[derive(Debug)]
struct Record {
    current: Entry,
    history: VecDeque<Entry>,
}

/// Shared bucket state behind one lock
#[derive(Debug)]
struct BucketInner {
    records: HashMap<String, Record>,
    history_depth: usize,
}

/// One bucket of the in-memory store.
///
/// All mutation goes through the bucket's write lock, so revisions advance
/// strictly and at most one conditional write can succeed per revision.
#[derive(Debug, Clone)]
pub struct MemoryBucket {
    inner: Arc<RwLock<BucketInner>>,
}

impl MemoryBucket {
    fn new(history_depth: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(BucketInner {
                records: HashMap::new(),
                history_depth,
            })),
        }
    }

    /// Retained past revisions for a key, oldest first (audit only)
    pub fn history(&self, key: &str) -> Vec<Entry> {
        let inner = self.inner.read();
        inner
            .records
            .get(key)
            .map(|r| r.history.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Write a value into a record, advancing its revision and rolling the
    /// displaced entry into the bounded history. Caller holds the write lock.
    fn commit(inner: &mut BucketInner, key: &str, value: &[u8]) -> u64 {
        let history_depth = inner.history_depth;
        match inner.records.get_mut(key) {
            Some(record) => {
                let revision = record.current.revision + 1;
                let displaced = std::mem::replace(
                    &mut record.current,
                    Entry {
                        value: Bytes::copy_from_slice(value),
                        revision,
                    },
                );
                record.history.push_back(displaced);
                while record.history.len() > history_depth {
                    record.history.pop_front();
                }
                revision
            }
            None => {
                inner.records.insert(
                    key.to_string(),
                    Record {
                        current: Entry {
                            value: Bytes::copy_from_slice(value),
                            revision: 1,
                        },
                        history: VecDeque::new(),
                    },
                );
                1
            }
        }
    }
}

impl VersionedKv for MemoryBucket {
    fn get(&self, key: &str, cancel: &CancelToken) -> Result<Option<Entry>> {
        if cancel.is_cancelled() {
            return Err(GopherError::Cancelled);
        }
        let inner = self.inner.read();
        Ok(inner.records.get(key).map(|r| r.current.clone()))
    }

    fn put(&self, key: &str, value: &[u8], cancel: &CancelToken) -> Result<u64> {
        if cancel.is_cancelled() {
            return Err(GopherError::Cancelled);
        }
        let mut inner = self.inner.write();
        Ok(Self::commit(&mut inner, key, value))
    }

    fn update(
        &self,
        key: &str,
        value: &[u8],
        expected_revision: u64,
        cancel: &CancelToken,
    ) -> Result<u64> {
        if cancel.is_cancelled() {
            return Err(GopherError::Cancelled);
        }
        let mut inner = self.inner.write();

        let current_revision = inner.records.get(key).map(|r| r.current.revision);
        match current_revision {
            Some(revision) if revision == expected_revision => {
                Ok(Self::commit(&mut inner, key, value))
            }
            _ => Err(GopherError::VersionConflict {
                key: key.to_string(),
                expected: expected_revision,
            }),
        }
    }
}

/// In-memory store holding named buckets.
///
/// Cheap to clone; clones share the same buckets.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    buckets: Arc<RwLock<HashMap<String, MemoryBucket>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct handle to a bucket, mainly for test inspection
    pub fn bucket(&self, name: &str) -> Option<MemoryBucket> {
        self.buckets.read().get(name).cloned()
    }
}

impl KvStore for MemoryStore {
    fn open_bucket(&self, config: &BucketConfig) -> Result<Arc<dyn VersionedKv>> {
        if config.name.is_empty() {
            return Err(GopherError::StoreUnavailable(
                "bucket name must not be empty".to_string(),
            ));
        }

        let mut buckets = self.buckets.write();
        let bucket = buckets
            .entry(config.name.clone())
            .or_insert_with(|| MemoryBucket::new(config.history_depth))
            .clone();

        Ok(Arc::new(bucket))
    }
}
