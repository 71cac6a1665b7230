//! Configuration for gopherd
//!
//! Centralized configuration with sensible defaults.

use std::time::Duration;

use crate::counter::{DEFAULT_HISTORY_DEPTH, DEFAULT_MAX_VALUE, DEFAULT_RETRY_BACKOFF};

/// Main configuration for a gopherd instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Counter Configuration
    // -------------------------------------------------------------------------
    /// Store bucket (namespace) holding the counter record
    pub bucket: String,

    /// Key inside the bucket that the counter is bound to
    pub key: String,

    /// Highest value the counter is allowed to issue (inclusive)
    pub max_value: i64,

    /// Fixed delay between conditional-write retries
    pub retry_backoff: Duration,

    /// Per-key revision history depth kept by the store (audit only)
    pub history_depth: usize,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Number of connection worker threads
    pub worker_threads: usize,

    /// Max queued connections waiting for a worker
    pub max_pending_connections: usize,

    /// Connection read timeout (milliseconds, 0 disables)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 disables)
    pub write_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bucket: "atomic_counter".to_string(),
            key: "last_user_id".to_string(),
            max_value: DEFAULT_MAX_VALUE,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            history_depth: DEFAULT_HISTORY_DEPTH,
            listen_addr: "127.0.0.1:4311".to_string(),
            worker_threads: 8,
            max_pending_connections: 64,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the store bucket name
    pub fn bucket(mut self, name: impl Into<String>) -> Self {
        self.config.bucket = name.into();
        self
    }

    /// Set the counter key name
    pub fn key(mut self, name: impl Into<String>) -> Self {
        self.config.key = name.into();
        self
    }

    /// Set the maximum issuable value (inclusive)
    pub fn max_value(mut self, max: i64) -> Self {
        self.config.max_value = max;
        self
    }

    /// Set the fixed retry backoff
    pub fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.config.retry_backoff = backoff;
        self
    }

    /// Set the store's per-key history depth
    pub fn history_depth(mut self, depth: usize) -> Self {
        self.config.history_depth = depth;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the number of connection worker threads
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.config.worker_threads = count;
        self
    }

    /// Set the maximum number of queued pending connections
    pub fn max_pending_connections(mut self, count: usize) -> Self {
        self.config.max_pending_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
