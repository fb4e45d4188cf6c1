//! Volatile in-process backend.
//!
//! Entries live exactly as long as the backend instance. Values are stored
//! type-erased behind `dyn Any` with the concrete type name kept as a tag;
//! the tag is checked on every read, so looking up a key at a type other
//! than the one stored surfaces as [`CacheError::TypeMismatch`] instead of
//! reinterpreted garbage.
//!
//! The table grows without bound (there is no eviction path) and is
//! `RefCell`-guarded, not locked: the backend is single-threaded by design
//! and deliberately `!Sync`.

use std::any::{self, Any};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use memocache_core::{CacheError, CacheResult, Fingerprint};

use crate::traits::{CacheBackend, CacheStats, CacheValue};

/// A stored value plus the tag identifying its concrete type.
struct StoredValue {
    type_name: &'static str,
    value: Box<dyn Any>,
}

/// In-process key→value store with process-lifetime entries.
#[derive(Default)]
pub struct MemoryBackend {
    entries: RefCell<HashMap<Fingerprint, StoredValue>>,
    hits: Cell<u64>,
    misses: Cell<u64>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether the backend holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl CacheBackend for MemoryBackend {
    fn invoke_keyed<R, F>(&self, label: &str, key: Fingerprint, producer: F) -> CacheResult<R>
    where
        R: CacheValue,
        F: FnOnce() -> R,
    {
        {
            let entries = self.entries.borrow();
            if let Some(stored) = entries.get(&key) {
                self.hits.set(self.hits.get() + 1);
                tracing::debug!(source = "memory", label, key = %key, "cache hit");
                return stored
                    .value
                    .downcast_ref::<R>()
                    .cloned()
                    .ok_or(CacheError::TypeMismatch {
                        key,
                        stored: stored.type_name,
                        requested: any::type_name::<R>(),
                    });
            }
        }

        // The map borrow is released before the producer runs: a producer
        // may re-enter this backend (memoized recursion goes through here).
        let value = producer();
        self.misses.set(self.misses.get() + 1);
        tracing::debug!(source = "memory", label, key = %key, "cache miss");
        self.entries.borrow_mut().insert(
            key,
            StoredValue {
                type_name: any::type_name::<R>(),
                value: Box::new(value.clone()),
            },
        );
        Ok(value)
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.get(),
            misses: self.misses.get(),
            entries: self.entries.borrow().len() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ANONYMOUS_LABEL;
    use std::cell::Cell;

    fn fib(n: u64) -> u64 {
        if n < 2 {
            n
        } else {
            fib(n - 1) + fib(n - 2)
        }
    }

    #[test]
    fn test_repeated_invoke_runs_producer_once() {
        let cache = MemoryBackend::new();
        let calls = Cell::new(0u32);

        let first: u64 = cache
            .invoke("fib", &(10u64,), || {
                calls.set(calls.get() + 1);
                fib(10)
            })
            .expect("memory invoke cannot fail at a fresh key");
        let second: u64 = cache
            .invoke("fib", &(10u64,), || {
                calls.set(calls.get() + 1);
                fib(10)
            })
            .expect("second call should be a hit");

        assert_eq!(first, 55);
        assert_eq!(second, 55);
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_distinct_args_create_distinct_entries() {
        let cache = MemoryBackend::new();
        let calls = Cell::new(0u32);

        let ten: u64 = cache
            .invoke("fib", &(10u64,), || {
                calls.set(calls.get() + 1);
                fib(10)
            })
            .expect("fresh key");
        let eleven: u64 = cache
            .invoke("fib", &(11u64,), || {
                calls.set(calls.get() + 1);
                fib(11)
            })
            .expect("fresh key");

        assert_eq!(ten, 55);
        assert_eq!(eleven, 89);
        assert_eq!(calls.get(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_keyed_invoke_bypasses_hashing() {
        let cache = MemoryBackend::new();
        let calls = Cell::new(0u32);
        let key = Fingerprint::from_raw(28725);

        let first: u64 = cache
            .invoke_keyed("fib", key, || {
                calls.set(calls.get() + 1);
                fib(12)
            })
            .expect("fresh key");
        let second: u64 = cache
            .invoke_keyed("fib", key, || {
                calls.set(calls.get() + 1);
                fib(12)
            })
            .expect("hit");

        assert_eq!(first, 144);
        assert_eq!(second, 144);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_read_at_wrong_type_is_a_typed_failure() {
        let cache = MemoryBackend::new();
        let key = Fingerprint::from_raw(7);

        let _: u64 = cache.invoke_keyed("mixed", key, || 55u64).expect("fresh key");
        let err = cache
            .invoke_keyed::<String, _>("mixed", key, || "hello".to_string())
            .expect_err("reading a u64 entry as String must fail");

        match err {
            CacheError::TypeMismatch {
                stored, requested, ..
            } => {
                assert!(stored.contains("u64"));
                assert!(requested.contains("String"));
            }
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_anonymous_label_is_shared() {
        let cache = MemoryBackend::new();
        let calls = Cell::new(0u32);

        let _: u64 = cache
            .invoke_anon(&(5u64,), || {
                calls.set(calls.get() + 1);
                fib(5)
            })
            .expect("fresh key");
        let again: u64 = cache
            .invoke(ANONYMOUS_LABEL, &(5u64,), || {
                calls.set(calls.get() + 1);
                fib(5)
            })
            .expect("hit");

        assert_eq!(again, 5);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_producer_may_reenter_the_backend() {
        let cache = MemoryBackend::new();

        let outer: u64 = cache
            .invoke("outer", &(2u64,), || {
                let inner: u64 = cache
                    .invoke("inner", &(1u64,), || 40)
                    .expect("inner invoke inside a producer");
                inner + 2
            })
            .expect("fresh key");

        assert_eq!(outer, 42);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_entries_accumulate_without_eviction() {
        let cache = MemoryBackend::new();
        for n in 0..100u64 {
            let _: u64 = cache.invoke("id", &(n,), || n).expect("fresh key");
        }
        assert_eq!(cache.len(), 100);
    }
}
