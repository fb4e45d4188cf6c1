//! The cache call contract and the value bound both backends accept.
//!
//! [`CacheBackend`] is the single facade every storage strategy implements:
//! one required keyed operation carrying the hit/miss logic, plus provided
//! entry points that compute the key through the fingerprint engine. Any
//! component implementing it can be substituted for any other.

use memocache_core::{CacheResult, Fingerprint, HashArgs};
use serde::{de::DeserializeOwned, Serialize};

/// Label used when the caller does not supply one.
pub const ANONYMOUS_LABEL: &str = "anonymous";

/// Marker trait for values a cache can hold.
///
/// `Clone` lets the memory backend hand out copies of a stored value,
/// `Serialize + DeserializeOwned` lets the persistent backend round-trip it
/// through the injected codec, and `'static` is required for type-erased
/// storage. Blanket-implemented; never implement it by hand.
pub trait CacheValue: Clone + Serialize + DeserializeOwned + 'static {}

impl<T> CacheValue for T where T: Clone + Serialize + DeserializeOwned + 'static {}

/// The single call contract for pluggable cache backends.
///
/// Three entry points converge on one operation: [`invoke_keyed`] takes a
/// caller-asserted key and performs the backend's hit/miss logic against it;
/// [`invoke`] computes the key from `(label, args)` first; [`invoke_anon`]
/// defaults the label. On a hit the producer is never run; on a miss it runs
/// exactly once and its result is stored before being returned.
///
/// # Keyed calls
///
/// [`invoke_keyed`] trusts the supplied key blindly; it exists for argument
/// types that are not hashable. Two calls sharing a label and a key share an
/// entry, whether or not they are the same logical call.
///
/// [`invoke_keyed`]: CacheBackend::invoke_keyed
/// [`invoke`]: CacheBackend::invoke
/// [`invoke_anon`]: CacheBackend::invoke_anon
pub trait CacheBackend {
    /// Look up `key`; on a miss, run the producer and store its result.
    ///
    /// # Errors
    ///
    /// Backend-specific lookup or store failures propagate to the caller;
    /// a failing call aborts only itself and leaves other entries intact.
    fn invoke_keyed<R, F>(&self, label: &str, key: Fingerprint, producer: F) -> CacheResult<R>
    where
        R: CacheValue,
        F: FnOnce() -> R;

    /// Hit/miss/entry counters for this backend.
    fn stats(&self) -> CacheStats;

    /// Invoke with the key computed from `(label, args)`.
    fn invoke<A, R, F>(&self, label: &str, args: &A, producer: F) -> CacheResult<R>
    where
        A: HashArgs,
        R: CacheValue,
        F: FnOnce() -> R,
    {
        self.invoke_keyed(label, Fingerprint::compute(label, args), producer)
    }

    /// Invoke with the label defaulted to [`ANONYMOUS_LABEL`].
    fn invoke_anon<A, R, F>(&self, args: &A, producer: F) -> CacheResult<R>
    where
        A: HashArgs,
        R: CacheValue,
        F: FnOnce() -> R,
    {
        self.invoke(ANONYMOUS_LABEL, args, producer)
    }
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of entries currently stored.
    pub entries: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_stats_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.8).abs() < 0.001);

        let empty_stats = CacheStats::default();
        assert!((empty_stats.hit_rate() - 0.0).abs() < 0.001);
    }
}
