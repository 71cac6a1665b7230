//! # gopherd
//!
//! A networked service that hands out sequential identifiers with:
//! - A linearizable, bounded atomic counter built on a versioned
//!   key-value store (read + conditional-write, no in-process lock)
//! - Lazy initialization on first use and fixed-backoff conflict retry
//! - TCP-based client protocol with named operations
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │                  (Multiple Clients)                          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   GopherService                              │
//! │           (next-gopher / current / ping routing)             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!               ┌───────▼────────┐
//!               │ AtomicCounter  │
//!               │ (CAS + retry)  │
//!               └───────┬────────┘
//!                       │
//!               ┌───────▼────────┐
//!               │  VersionedKv   │
//!               │ (revisions +   │
//!               │  cond. writes) │
//!               └────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cancel;
pub mod config;
pub mod error;

pub mod counter;
pub mod network;
pub mod protocol;
pub mod service;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use cancel::CancelToken;
pub use config::Config;
pub use counter::AtomicCounter;
pub use error::{GopherError, Result};
pub use service::GopherService;
pub use store::MemoryStore;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of gopherd
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
