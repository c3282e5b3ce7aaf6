//! Persistence boundary
//!
//! The whole board is persisted as one string blob under a single fixed
//! key. The transport is opaque to the core: anything with `get`/`set` on
//! strings works. An absent key means an empty collection; there is no
//! versioning or migration scheme.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use crate::error::StorageError;

/// Fixed key under which the whole watch collection is stored.
pub const BOARD_KEY: &str = "watches";

/// Opaque key-value string store.
pub trait StorageBackend: Send + Sync {
    /// Fetch the value for a key. Absent keys are `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store a value, replacing any previous one (last write wins).
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// File backend
// ─────────────────────────────────────────────────────────────────────────────

/// Stores each key as `<dir>/<key>.json`.
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Platform data directory for the app, e.g. `~/.local/share/lapwatch`.
    /// `None` when the platform exposes no data dir.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("lapwatch"))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StorageBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Read { path, source: e }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| StorageError::CreateDir {
            path: self.dir.clone(),
            source: e,
        })?;

        let path = self.path_for(key);
        std::fs::write(&path, value).map_err(|e| StorageError::Write { path, source: e })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory backend
// ─────────────────────────────────────────────────────────────────────────────

/// Ephemeral backend for tests and `--no-persist` runs.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value, for tests that simulate a previous session.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let backend = Self::new();
        let _ = backend.set(key, value);
        backend
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
