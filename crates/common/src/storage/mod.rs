//! Durable key-value slots
//!
//! Provides:
//! - `DurableSlot`, the named string slot the rating store persists into
//! - `MemorySlot` for tests and ephemeral runs
//! - `FileSlot`, one JSON file per key with atomic replace

use crate::config::StorageConfig;
use crate::errors::{AppError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// A client-side durable key-value store holding serialized values.
///
/// Absence of a key is not an error.
pub trait DurableSlot: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`, returning whether it existed
    fn remove(&self, key: &str) -> Result<bool>;

    /// Check if a key exists
    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// In-process slot. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> AppError {
        AppError::Storage {
            message: "memory slot lock poisoned".to_string(),
        }
    }
}

impl DurableSlot for MemorySlot {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().map_err(|_| Self::poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        Ok(entries.remove(key).is_some())
    }
}

/// Slot backed by `<dir>/<key>.json` files.
#[derive(Debug, Clone)]
pub struct FileSlot {
    dir: PathBuf,
}

impl FileSlot {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(AppError::Validation {
                message: format!("Invalid slot key '{}'", key),
                field: Some("key".to_string()),
            });
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl DurableSlot for FileSlot {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path(key)?;
        match std::fs::read_to_string(&path) {
            Ok(value) => {
                debug!(path = %path.display(), "Slot hit");
                Ok(Some(value))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Slot miss");
                Ok(None)
            }
            Err(e) => Err(AppError::Storage {
                message: format!("Failed to read '{}': {}", path.display(), e),
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path(key)?;
        std::fs::create_dir_all(&self.dir).map_err(|e| AppError::Storage {
            message: format!("Failed to create slot directory: {}", e),
        })?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(|e| AppError::Storage {
            message: format!("Failed to write '{}': {}", tmp.display(), e),
        })?;
        std::fs::rename(&tmp, &path).map_err(|e| AppError::Storage {
            message: format!("Failed to replace '{}': {}", path.display(), e),
        })?;

        debug!(path = %path.display(), bytes = value.len(), "Slot set");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let path = self.path(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "Slot removed");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::Storage {
                message: format!("Failed to remove '{}': {}", path.display(), e),
            }),
        }
    }
}

/// Build the slot selected by configuration.
pub fn open_slot(config: &StorageConfig) -> Result<Arc<dyn DurableSlot>> {
    match config.backend.as_str() {
        "memory" => {
            info!("Using in-memory rating slot");
            Ok(Arc::new(MemorySlot::new()))
        }
        "file" => {
            info!(dir = %config.dir, "Using file rating slot");
            Ok(Arc::new(FileSlot::new(&config.dir)))
        }
        other => Err(AppError::Configuration {
            message: format!("Unknown storage backend '{}'", other),
        }),
    }
}
