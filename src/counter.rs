//! Atomic bounded counter
//!
//! The core of gopherd: a linearizable increment-and-fetch primitive built
//! on a versioned key-value store. Concurrent callers never talk to each
//! other; they serialize purely through the store's per-key revision
//! sequence via read-then-conditional-write.
//!
//! ## Algorithm (next_value)
//!
//! ```text
//! Read ──► Absent ──► Initialize(0) ──► Return 0
//!   │
//!   └────► Present ──► Parse ──► candidate = current + 1
//!                        │              │
//!                        ▼              ▼
//!                   CorruptState   ConditionalWrite(revision)
//!                                       │
//!                        ┌──────────────┴──────────────┐
//!                        ▼                             ▼
//!                    Conflict ──► Backoff ──► Read  Success ──► RangeCheck
//!                                                              │        │
//!                                                              ▼        ▼
//!                                                          Return   ExhaustedRange
//! ```
//!
//! Conflicts retry forever with a fixed backoff: under sustained contention
//! availability degrades rather than surfacing a contention error.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::cancel::CancelToken;
use crate::config::Config;
use crate::error::{GopherError, Result};
use crate::store::{BucketConfig, Entry, KvStore, VersionedKv};

/// Default maximum issuable value (inclusive)
pub const DEFAULT_MAX_VALUE: i64 = 99;

/// Default delay between conditional-write retries
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(10);

/// Default per-key history depth requested at bucket creation
pub const DEFAULT_HISTORY_DEPTH: usize = 10;

/// A bounded counter over one key in a versioned key-value store.
///
/// The handle caches no value: every operation re-reads the store, so one
/// `AtomicCounter` can be shared by any number of concurrent callers with
/// no additional synchronization.
pub struct AtomicCounter {
    bucket: Arc<dyn VersionedKv>,
    key: String,
    max_value: i64,
    retry_backoff: Duration,
}

impl AtomicCounter {
    /// Bind a counter to a key in an already-open bucket
    pub fn new(bucket: Arc<dyn VersionedKv>, key: impl Into<String>) -> Self {
        Self {
            bucket,
            key: key.into(),
            max_value: DEFAULT_MAX_VALUE,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }

    /// Open (creating if absent) the bucket named in `config` on `store` and
    /// bind a counter to the configured key.
    ///
    /// Fails with `StoreUnavailable` if the bucket cannot be created or
    /// reached.
    pub fn create(store: &dyn KvStore, config: &Config) -> Result<Self> {
        let bucket = store
            .open_bucket(&BucketConfig {
                name: config.bucket.clone(),
                history_depth: config.history_depth,
            })
            .map_err(|e| GopherError::StoreUnavailable(e.to_string()))?;

        tracing::debug!(
            bucket = %config.bucket,
            key = %config.key,
            max_value = config.max_value,
            "counter bound to bucket"
        );

        Ok(Self {
            bucket,
            key: config.key.clone(),
            max_value: config.max_value,
            retry_backoff: config.retry_backoff,
        })
    }

    /// Override the maximum issuable value (inclusive)
    pub fn with_max_value(mut self, max: i64) -> Self {
        self.max_value = max;
        self
    }

    /// Override the fixed retry backoff
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// The key this counter is bound to
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The maximum issuable value (inclusive)
    pub fn max_value(&self) -> i64 {
        self.max_value
    }

    /// Atomically increment and return the next value.
    ///
    /// The first call against a never-written key initializes it to 0 and
    /// returns 0; 0 is a legitimate issued value. Two racing first-callers
    /// may both take the initialization path, which is benign: the value
    /// written is deterministic given absence.
    ///
    /// The range check runs after the conditional write commits, so reaching
    /// the bound persists `max_value + 1` while this call fails with
    /// `ExhaustedRange`. External intervention (resetting the key) is
    /// required after that.
    pub fn next_value(&self, cancel: &CancelToken) -> Result<i64> {
        loop {
            if cancel.is_cancelled() {
                return Err(GopherError::Cancelled);
            }

            let entry = match self.bucket.get(&self.key, cancel)? {
                Some(entry) => entry,
                None => return self.initialize(0, cancel),
            };

            let current = self.parse_value(&entry)?;
            let candidate = current + 1;

            match self.bucket.update(
                &self.key,
                candidate.to_string().as_bytes(),
                entry.revision,
                cancel,
            ) {
                Ok(_) => {
                    if candidate > self.max_value {
                        return Err(GopherError::ExhaustedRange {
                            value: candidate,
                            max: self.max_value,
                        });
                    }
                    return Ok(candidate);
                }
                Err(GopherError::VersionConflict { .. }) => {
                    // Another writer won this revision; rescan from the top.
                    tracing::trace!(
                        key = %self.key,
                        revision = entry.revision,
                        "conditional write lost the race, retrying"
                    );
                    thread::sleep(self.retry_backoff);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Return the current value without incrementing.
    ///
    /// A never-written key reads as 0 and is left absent (no side effect,
    /// unlike `next_value`). May be stale relative to concurrent increments.
    pub fn current_value(&self, cancel: &CancelToken) -> Result<i64> {
        match self.bucket.get(&self.key, cancel)? {
            Some(entry) => self.parse_value(&entry),
            None => Ok(0),
        }
    }

    /// Seed the key with its first value via an unconditional write
    fn initialize(&self, initial: i64, cancel: &CancelToken) -> Result<i64> {
        self.bucket
            .put(&self.key, initial.to_string().as_bytes(), cancel)?;
        tracing::debug!(key = %self.key, value = initial, "counter initialized");
        Ok(initial)
    }

    /// Decode an entry's decimal text payload, or fail fatally
    fn parse_value(&self, entry: &Entry) -> Result<i64> {
        let text = std::str::from_utf8(&entry.value).map_err(|_| GopherError::CorruptState {
            key: self.key.clone(),
            reason: "stored value is not valid UTF-8".to_string(),
        })?;

        text.parse::<i64>().map_err(|e| GopherError::CorruptState {
            key: self.key.clone(),
            reason: format!("invalid counter value '{}': {}", text, e),
        })
    }
}
