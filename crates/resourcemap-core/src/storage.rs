// SPDX-License-Identifier: AGPL-3.0
// ResourceMap Core - Durable key/value storage
//
// Small string key/value store used for the session cache.
// Each key is written independently; there are no transactions.

use crate::settings::config_file_path;
use crate::types::AppError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Storage key for the bearer token
pub const AUTH_TOKEN_KEY: &str = "authToken";
/// Storage key for the JSON-serialized user
pub const USER_KEY: &str = "user";

/// Durable string key/value storage
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
    fn remove(&self, key: &str) -> Result<(), AppError>;
}

/// Key/value store persisted as a JSON object on disk
pub struct FileKeyValueStore {
    entries: RwLock<BTreeMap<String, String>>,
    file_path: PathBuf,
}

impl FileKeyValueStore {
    /// Open the session store in the default config directory
    pub fn new() -> Result<Self, AppError> {
        Self::open(config_file_path("session.json")?)
    }

    /// Open a store backed by an explicit file, loading it if present
    pub fn open(file_path: impl AsRef<Path>) -> Result<Self, AppError> {
        let file_path = file_path.as_ref().to_path_buf();

        let entries = if file_path.exists() {
            let content = fs::read_to_string(&file_path)
                .map_err(|e| AppError::FileIo(format!("Failed to read storage: {}", e)))?;

            serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse storage, starting fresh: {}", e);
                BTreeMap::new()
            })
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            entries: RwLock::new(entries),
            file_path,
        })
    }

    fn persist(&self) -> Result<(), AppError> {
        let content = {
            let entries = self.entries.read().unwrap();
            serde_json::to_string_pretty(&*entries).map_err(|e| {
                AppError::Serialization(format!("Failed to serialize storage: {}", e))
            })?
        };

        fs::write(&self.file_path, content)
            .map_err(|e| AppError::FileIo(format!("Failed to write storage: {}", e)))?;

        Ok(())
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.entries.read().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        let removed = self.entries.write().unwrap().remove(key).is_some();
        if removed {
            self.persist()?;
        }
        Ok(())
    }
}

/// Volatile key/value store, used in tests and for throwaway sessions
#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.entries.read().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        self.entries.write().unwrap().remove(key);
        Ok(())
    }
}
