//! Memocache Core - Fingerprint and Error Types
//!
//! Pure data types with no business logic. The storage crate depends on
//! this; this crate depends on nothing else in the workspace.

pub mod error;
pub mod fingerprint;

pub use error::{CacheError, CacheResult, RegistryError, StoreError};
pub use fingerprint::{Fingerprint, HashArgs, StableHasher};
