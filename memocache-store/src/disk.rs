//! Durable on-disk backend.
//!
//! One file per distinct `(label, fingerprint)` pair, named
//! `<label>-<key>` under a dedicated `cache` directory created eagerly at
//! construction. Entries survive process restarts; a second backend opened
//! over the same root sees them.
//!
//! All I/O is blocking whole-file reads and writes with no locking and no
//! atomic-rename discipline: two processes racing to populate one entry end
//! up last-writer-wins, with no corruption protection beyond what the
//! filesystem gives a single whole-file write.

use std::any;
use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};

use memocache_core::{CacheResult, Fingerprint, StoreError};

use crate::codec::{JsonCodec, ValueCodec};
use crate::traits::{CacheBackend, CacheStats, CacheValue};

/// Filesystem key→blob store with filesystem-lifetime entries.
///
/// The codec is injected; [`JsonCodec`] is the default. Reading an entry
/// back requires the codec that wrote it.
pub struct DiskBackend<S = JsonCodec> {
    dir: PathBuf,
    codec: S,
    hits: Cell<u64>,
    misses: Cell<u64>,
}

impl DiskBackend<JsonCodec> {
    /// Open a backend rooted at `root`, creating `<root>/cache` (and any
    /// missing parents) if absent. Idempotent over an existing directory.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, StoreError> {
        Self::with_codec(root, JsonCodec)
    }

    /// Open a backend rooted at the current working directory.
    pub fn in_current_dir() -> Result<Self, StoreError> {
        let cwd = std::env::current_dir().map_err(|e| StoreError::CreateDir {
            path: PathBuf::from("."),
            source: e,
        })?;
        Self::new(cwd)
    }
}

impl<S: ValueCodec> DiskBackend<S> {
    /// Open a backend with an injected codec.
    pub fn with_codec<P: AsRef<Path>>(root: P, codec: S) -> Result<Self, StoreError> {
        let dir = root.as_ref().join("cache");
        fs::create_dir_all(&dir).map_err(|e| StoreError::CreateDir {
            path: dir.clone(),
            source: e,
        })?;
        Ok(Self {
            dir,
            codec,
            hits: Cell::new(0),
            misses: Cell::new(0),
        })
    }

    /// The cache directory this backend writes into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether an entry file exists for `(label, key)`.
    pub fn entry_exists(&self, label: &str, key: Fingerprint) -> bool {
        self.entry_path(label, key).exists()
    }

    fn entry_path(&self, label: &str, key: Fingerprint) -> PathBuf {
        self.dir.join(format!("{label}-{key}"))
    }
}

impl<S: ValueCodec> CacheBackend for DiskBackend<S> {
    fn invoke_keyed<R, F>(&self, label: &str, key: Fingerprint, producer: F) -> CacheResult<R>
    where
        R: CacheValue,
        F: FnOnce() -> R,
    {
        let path = self.entry_path(label, key);
        if path.exists() {
            let bytes = fs::read(&path).map_err(|e| StoreError::ReadEntry {
                path: path.clone(),
                source: e,
            })?;
            let value: R = self.codec.decode(&bytes).map_err(|e| StoreError::Decode {
                path: path.clone(),
                requested: any::type_name::<R>(),
                reason: e.to_string(),
            })?;
            self.hits.set(self.hits.get() + 1);
            tracing::debug!(source = "disk", label, key = %key, path = %path.display(), "cache hit");
            return Ok(value);
        }

        let value = producer();
        self.misses.set(self.misses.get() + 1);
        tracing::debug!(source = "disk", label, key = %key, path = %path.display(), "cache miss");
        let bytes = self.codec.encode(&value).map_err(|e| StoreError::Encode {
            entry: format!("{label}-{key}"),
            reason: e.to_string(),
        })?;
        fs::write(&path, bytes).map_err(|e| StoreError::WriteEntry { path, source: e })?;
        // Return the value we just computed; never re-read it from disk.
        Ok(value)
    }

    fn stats(&self) -> CacheStats {
        let entries = fs::read_dir(&self.dir).map(|d| d.count() as u64).unwrap_or(0);
        CacheStats {
            hits: self.hits.get(),
            misses: self.misses.get(),
            entries,
        }
    }
}
