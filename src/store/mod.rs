//! Persistent key-value collaborator
//!
//! The cache persists its single slot through [`KeyValueStore`], the
//! shape of a browser's localStorage: string keys, string values, writes
//! that can fail on quota. An in-memory implementation serves tests and
//! short-lived hosts; a JSON-file implementation backs the CLI.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::warn;

use crate::errors::StoreError;

/// String key-value storage with fallible writes.
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove_item(&self, key: &str);
}

/// In-memory store with an optional byte budget to mimic quota limits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    max_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects writes once total value bytes would exceed
    /// `max_bytes`, the way a browser quota does.
    pub fn with_capacity_limit(max_bytes: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_bytes: Some(max_bytes),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::backend("store lock poisoned"))?;
        if let Some(max) = self.max_bytes {
            let occupied: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            if occupied + value.len() > max {
                return Err(StoreError::QuotaExceeded);
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }
}

/// File-backed store holding all keys in one JSON document.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_map(&self) -> HashMap<String, String> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!("Discarding unreadable store file {:?}: {}", self.path, e);
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        }
    }

    fn write_map(&self, map: &HashMap<String, String>) -> Result<(), StoreError> {
        let contents =
            serde_json::to_string(map).map_err(|e| StoreError::backend(e.to_string()))?;
        std::fs::write(&self.path, contents).map_err(|e| StoreError::backend(e.to_string()))
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.read_map().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut map = self.read_map();
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn remove_item(&self, key: &str) {
        let mut map = self.read_map();
        if map.remove(key).is_some() {
            if let Err(e) = self.write_map(&map) {
                warn!("Failed to persist removal of {}: {}", key, e);
            }
        }
    }
}
