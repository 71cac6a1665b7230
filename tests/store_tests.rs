//! Tests for the in-memory versioned store
//!
//! These tests verify:
//! - Revision assignment and strict advancement per key
//! - Conditional write (compare-and-swap) semantics
//! - Bounded per-key history retention
//! - Bucket creation/open idempotence
//! - Cancellation at the store boundary

use gopherd::cancel::CancelToken;
use gopherd::error::GopherError;
use gopherd::store::{BucketConfig, KvStore, MemoryStore, VersionedKv};

// =============================================================================
// Helper Functions
// =============================================================================

fn config(name: &str, history: usize) -> BucketConfig {
    BucketConfig {
        name: name.to_string(),
        history_depth: history,
    }
}

// =============================================================================
// Revision Tests
// =============================================================================

#[test]
fn store_put_assigns_advancing_revisions() {
    let store = MemoryStore::new();
    let bucket = store.open_bucket(&config("counters", 10)).unwrap();
    let cancel = CancelToken::new();

    let r1 = bucket.put("k", b"0", &cancel).unwrap();
    let r2 = bucket.put("k", b"1", &cancel).unwrap();
    let r3 = bucket.put("k", b"2", &cancel).unwrap();

    assert!(r1 < r2 && r2 < r3);

    let entry = bucket.get("k", &cancel).unwrap().unwrap();
    assert_eq!(entry.revision, r3);
    assert_eq!(&entry.value[..], b"2");
}

#[test]
fn store_get_missing_key_returns_none() {
    let store = MemoryStore::new();
    let bucket = store.open_bucket(&config("counters", 10)).unwrap();

    assert!(bucket.get("missing", &CancelToken::new()).unwrap().is_none());
}

#[test]
fn store_revisions_are_independent_per_key() {
    let store = MemoryStore::new();
    let bucket = store.open_bucket(&config("counters", 10)).unwrap();
    let cancel = CancelToken::new();

    let ra = bucket.put("a", b"0", &cancel).unwrap();
    bucket.put("a", b"1", &cancel).unwrap();
    let rb = bucket.put("b", b"0", &cancel).unwrap();

    // A fresh key starts its own sequence
    assert_eq!(ra, rb);
}

// =============================================================================
// Conditional Write Tests
// =============================================================================

#[test]
fn store_update_succeeds_on_matching_revision() {
    let store = MemoryStore::new();
    let bucket = store.open_bucket(&config("counters", 10)).unwrap();
    let cancel = CancelToken::new();

    let r1 = bucket.put("k", b"0", &cancel).unwrap();
    let r2 = bucket.update("k", b"1", r1, &cancel).unwrap();

    assert!(r2 > r1);
    assert_eq!(&bucket.get("k", &cancel).unwrap().unwrap().value[..], b"1");
}

#[test]
fn store_update_conflicts_on_stale_revision() {
    let store = MemoryStore::new();
    let bucket = store.open_bucket(&config("counters", 10)).unwrap();
    let cancel = CancelToken::new();

    let r1 = bucket.put("k", b"0", &cancel).unwrap();
    bucket.update("k", b"1", r1, &cancel).unwrap();

    // Re-using the consumed revision must fail and leave the value alone
    let err = bucket.update("k", b"9", r1, &cancel).unwrap_err();
    assert!(matches!(err, GopherError::VersionConflict { .. }));
    assert_eq!(&bucket.get("k", &cancel).unwrap().unwrap().value[..], b"1");
}

#[test]
fn store_update_on_missing_key_conflicts() {
    let store = MemoryStore::new();
    let bucket = store.open_bucket(&config("counters", 10)).unwrap();

    let err = bucket
        .update("missing", b"1", 1, &CancelToken::new())
        .unwrap_err();
    assert!(matches!(err, GopherError::VersionConflict { .. }));
}

#[test]
fn store_at_most_one_update_wins_per_revision() {
    let store = MemoryStore::new();
    let bucket = store.open_bucket(&config("counters", 10)).unwrap();
    let cancel = CancelToken::new();

    let r1 = bucket.put("k", b"0", &cancel).unwrap();

    let first = bucket.update("k", b"a", r1, &cancel);
    let second = bucket.update("k", b"b", r1, &cancel);

    assert!(first.is_ok());
    assert!(matches!(second, Err(GopherError::VersionConflict { .. })));
    assert_eq!(&bucket.get("k", &cancel).unwrap().unwrap().value[..], b"a");
}

// =============================================================================
// History Tests
// =============================================================================

#[test]
fn store_history_is_bounded_by_depth() {
    let store = MemoryStore::new();
    store.open_bucket(&config("counters", 3)).unwrap();
    let bucket = store.bucket("counters").unwrap();
    let cancel = CancelToken::new();

    for i in 0..10 {
        bucket.put("k", i.to_string().as_bytes(), &cancel).unwrap();
    }

    let history = bucket.history("k");
    assert_eq!(history.len(), 3);

    // Oldest retained first; the newest displaced entry last
    assert_eq!(&history[0].value[..], b"6");
    assert_eq!(&history[2].value[..], b"8");
}

// =============================================================================
// Bucket Lifecycle Tests
// =============================================================================

#[test]
fn store_open_bucket_is_idempotent() {
    let store = MemoryStore::new();
    let cancel = CancelToken::new();

    let first = store.open_bucket(&config("counters", 10)).unwrap();
    first.put("k", b"7", &cancel).unwrap();

    // Re-opening returns a handle to the same data
    let second = store.open_bucket(&config("counters", 10)).unwrap();
    assert_eq!(&second.get("k", &cancel).unwrap().unwrap().value[..], b"7");
}

#[test]
fn store_rejects_empty_bucket_name() {
    let store = MemoryStore::new();
    let err = store.open_bucket(&config("", 10)).unwrap_err();
    assert!(matches!(err, GopherError::StoreUnavailable(_)));
}

#[test]
fn store_buckets_are_isolated() {
    let store = MemoryStore::new();
    let cancel = CancelToken::new();

    let a = store.open_bucket(&config("a", 10)).unwrap();
    let b = store.open_bucket(&config("b", 10)).unwrap();

    a.put("k", b"1", &cancel).unwrap();
    assert!(b.get("k", &cancel).unwrap().is_none());
}

// =============================================================================
// Cancellation Tests
// =============================================================================

#[test]
fn store_calls_fail_fast_on_cancelled_token() {
    let store = MemoryStore::new();
    let bucket = store.open_bucket(&config("counters", 10)).unwrap();

    let cancelled = CancelToken::new();
    cancelled.cancel();

    assert!(matches!(
        bucket.get("k", &cancelled),
        Err(GopherError::Cancelled)
    ));
    assert!(matches!(
        bucket.put("k", b"0", &cancelled),
        Err(GopherError::Cancelled)
    ));
    assert!(matches!(
        bucket.update("k", b"0", 1, &cancelled),
        Err(GopherError::Cancelled)
    ));

    // Nothing was written
    assert!(bucket.get("k", &CancelToken::new()).unwrap().is_none());
}
