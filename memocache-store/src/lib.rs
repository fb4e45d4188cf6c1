//! Memocache Store - Backends, Wrappers, and the Recursion Registry
//!
//! A transparent memoization layer for pure functions: a call is identified
//! by a fingerprint of its label and arguments, and its result is looked up
//! in, or stored into, a pluggable backend behind one `invoke` contract.
//!
//! # Backends
//!
//! Two storage strategies implement [`CacheBackend`]:
//!
//! - [`MemoryBackend`]: volatile, entries live as long as the instance.
//! - [`DiskBackend`]: durable, one file per entry, survives restarts.
//!
//! They are isolated stores: populating one never populates the other.
//!
//! # Example
//!
//! ```ignore
//! use memocache_store::{CacheBackend, DiskBackend, Memoized};
//!
//! fn fib(n: u64) -> u64 {
//!     if n < 2 { n } else { fib(n - 1) + fib(n - 2) }
//! }
//!
//! let cache = DiskBackend::in_current_dir()?;
//! // Facade form: label, argument tuple, producer.
//! let x: u64 = cache.invoke("fib", &(30u64,), || fib(30))?;
//! // Wrapper form: call sites look like calls to the bare function.
//! let memo = Memoized::new(&cache, "fib", fib);
//! let y: u64 = memo.call((30u64,))?;
//! assert_eq!(x, y);
//! ```
//!
//! # Hazards, by design
//!
//! Fingerprints are not collision-free and collisions are not detected; the
//! backends never evict, expire, or invalidate; nothing here is safe to
//! share across threads. See the individual modules for the contracts.

pub mod codec;
pub mod disk;
pub mod memoize;
pub mod memory;
pub mod registry;
pub mod traits;

pub use codec::{CodecError, JsonCodec, ValueCodec};
pub use disk::DiskBackend;
pub use memoize::{Memoized, Producer, Traced};
pub use memory::MemoryBackend;
pub use registry::{FnIdentity, Registry};
pub use traits::{CacheBackend, CacheStats, CacheValue, ANONYMOUS_LABEL};

// Re-export the core types callers need to name.
pub use memocache_core::{
    CacheError, CacheResult, Fingerprint, HashArgs, RegistryError, StableHasher, StoreError,
};
