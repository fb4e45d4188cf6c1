//! Error types for memocache operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::fingerprint::Fingerprint;

/// Persistent backend errors: filesystem access and value encoding.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to create cache directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read cache entry {path}: {source}")]
    ReadEntry {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write cache entry {path}: {source}")]
    WriteEntry {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode value for entry {entry}: {reason}")]
    Encode { entry: String, reason: String },

    #[error("failed to decode cache entry {path} as {requested}: {reason}")]
    Decode {
        path: PathBuf,
        requested: &'static str,
        reason: String,
    },
}

/// Recursion registry errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("function at {address:#x} is not registered with any cache")]
    NotRegistered { address: usize },
}

/// Master error type for all memocache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("type mismatch for key {key}: stored {stored}, requested {requested}")]
    TypeMismatch {
        key: Fingerprint,
        stored: &'static str,
        requested: &'static str,
    },

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// Result type alias for memocache operations.
pub type CacheResult<T> = Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display_create_dir() {
        let err = StoreError::CreateDir {
            path: PathBuf::from("/tmp/cache"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("create cache directory"));
        assert!(msg.contains("/tmp/cache"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_store_error_display_decode() {
        let err = StoreError::Decode {
            path: PathBuf::from("cache/fib-42"),
            requested: "alloc::string::String",
            reason: "invalid type: integer".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("fib-42"));
        assert!(msg.contains("String"));
        assert!(msg.contains("invalid type"));
    }

    #[test]
    fn test_registry_error_display_not_registered() {
        let err = RegistryError::NotRegistered { address: 0xdead };
        let msg = format!("{}", err);
        assert!(msg.contains("not registered"));
        assert!(msg.contains("0xdead"));
    }

    #[test]
    fn test_type_mismatch_display_names_both_types() {
        let err = CacheError::TypeMismatch {
            key: Fingerprint::from_raw(7),
            stored: "u64",
            requested: "alloc::string::String",
        };
        let msg = format!("{}", err);
        assert!(msg.contains("7"));
        assert!(msg.contains("u64"));
        assert!(msg.contains("String"));
    }

    #[test]
    fn test_cache_error_from_variants() {
        let store = CacheError::from(StoreError::Encode {
            entry: "fib-1".to_string(),
            reason: "oops".to_string(),
        });
        assert!(matches!(store, CacheError::Store(_)));

        let registry = CacheError::from(RegistryError::NotRegistered { address: 1 });
        assert!(matches!(registry, CacheError::Registry(_)));
    }
}
