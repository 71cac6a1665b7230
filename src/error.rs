//! Error types for gopherd
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using GopherError
pub type Result<T> = std::result::Result<T, GopherError>;

/// Unified error type for gopherd operations
#[derive(Debug, Error)]
pub enum GopherError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("corrupt counter state for key '{key}': {reason}")]
    CorruptState { key: String, reason: String },

    /// Raised by a conditional write that lost the race for its revision.
    /// The counter absorbs this kind inside its retry loop; callers above
    /// the counter normally never observe it.
    #[error("version conflict on key '{key}': expected revision {expected}")]
    VersionConflict { key: String, expected: u64 },

    // -------------------------------------------------------------------------
    // Counter Errors
    // -------------------------------------------------------------------------
    #[error("counter has reached the maximum value: {value} exceeds {max}")]
    ExhaustedRange { value: i64, max: i64 },

    // -------------------------------------------------------------------------
    // Cancellation
    // -------------------------------------------------------------------------
    #[error("operation cancelled")]
    Cancelled,

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("network error: {0}")]
    Network(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("configuration error: {0}")]
    Config(String),
}
