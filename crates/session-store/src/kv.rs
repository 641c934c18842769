//! Key-Value Persistence Backends
//!
//! The store persists aggregates through a plain string get/set seam so the
//! on-device backend can vary (file, preferences store, test double).

use crate::StoreError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Persistent key-value collaborator
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` under `key`, replacing any prior value
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory backend (tests and ephemeral runs)
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("Lock error: {}", e)))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("Lock error: {}", e)))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// File-backed backend: one JSON object per store file, read-modify-write
/// per set. Suited to the low write rate of a 1 Hz merge loop.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read_all(&self) -> Result<HashMap<String, String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(StoreError::Unavailable(e.to_string())),
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_all()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        let payload = serde_json::to_string(&entries)?;
        std::fs::write(&self.path, payload).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        debug!("Persisted {} keys to {}", entries.len(), self.path.display());
        Ok(())
    }
}
