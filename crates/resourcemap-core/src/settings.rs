// SPDX-License-Identifier: AGPL-3.0
// ResourceMap Core - Settings persistence
//
// Settings are stored in a local JSON file next to the session cache.

use crate::types::{AppError, ClientSettings};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// In-memory cache of settings, persisted to disk on changes
pub struct SettingsStore {
    settings: RwLock<ClientSettings>,
    file_path: PathBuf,
}

/// Resolve a file inside the per-user config directory, creating the directory
pub(crate) fn config_file_path(file_name: &str) -> Result<PathBuf, AppError> {
    let config_dir = directories::ProjectDirs::from("org", "resourcemap", "client")
        .ok_or_else(|| AppError::FileIo("Could not determine config directory".to_string()))?
        .config_dir()
        .to_path_buf();

    fs::create_dir_all(&config_dir)
        .map_err(|e| AppError::FileIo(format!("Failed to create config dir: {}", e)))?;

    Ok(config_dir.join(file_name))
}

impl SettingsStore {
    /// Open the settings file in the default config directory
    pub fn new() -> Result<Self, AppError> {
        Self::open(config_file_path("settings.json")?)
    }

    /// Open a settings store backed by an explicit file
    pub fn open(file_path: impl AsRef<Path>) -> Result<Self, AppError> {
        let file_path = file_path.as_ref().to_path_buf();
        tracing::info!("Settings file path: {:?}", file_path);

        let settings = if file_path.exists() {
            let content = fs::read_to_string(&file_path)
                .map_err(|e| AppError::FileIo(format!("Failed to read settings: {}", e)))?;

            serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse settings, using defaults: {}", e);
                ClientSettings::default()
            })
        } else {
            tracing::info!("No settings file found, using defaults");
            ClientSettings::default()
        };

        let store = Self {
            settings: RwLock::new(settings),
            file_path,
        };

        if !store.file_path.exists() {
            store.persist()?;
        }

        Ok(store)
    }

    fn persist(&self) -> Result<(), AppError> {
        let content = {
            let settings = self.settings.read().unwrap();
            serde_json::to_string_pretty(&*settings).map_err(|e| {
                AppError::Serialization(format!("Failed to serialize settings: {}", e))
            })?
        };

        fs::write(&self.file_path, content)
            .map_err(|e| AppError::FileIo(format!("Failed to write settings: {}", e)))?;

        Ok(())
    }

    /// Get current settings
    pub fn get(&self) -> ClientSettings {
        self.settings.read().unwrap().clone()
    }

    /// Replace settings and persist to disk
    pub fn update(&self, new_settings: ClientSettings) -> Result<(), AppError> {
        new_settings.validate()?;
        {
            let mut settings = self.settings.write().unwrap();
            *settings = new_settings;
        }

        let result = self.persist();
        if let Err(e) = &result {
            tracing::error!("Failed to persist settings: {}", e);
        }
        result
    }

    pub fn set_notifications_enabled(&self, enabled: bool) -> Result<(), AppError> {
        self.settings.write().unwrap().notifications_enabled = enabled;
        self.persist()
    }

    pub fn set_dark_mode(&self, enabled: bool) -> Result<(), AppError> {
        self.settings.write().unwrap().dark_mode = enabled;
        self.persist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_file_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let store = SettingsStore::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(store.get(), ClientSettings::default());
    }

    #[test]
    fn test_update_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let store = SettingsStore::open(&path).unwrap();
        let mut settings = store.get();
        settings.api_base_url = "https://api.resourcemap.org/api".to_string();
        store.update(settings).unwrap();
        store.set_dark_mode(true).unwrap();
        store.set_notifications_enabled(false).unwrap();

        let reopened = SettingsStore::open(&path).unwrap();
        assert_eq!(reopened.get().api_base_url, "https://api.resourcemap.org/api");
        assert!(reopened.get().dark_mode);
        assert!(!reopened.get().notifications_enabled);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let store = SettingsStore::open(&path).unwrap();
        assert_eq!(store.get(), ClientSettings::default());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"darkMode": true}"#).unwrap();

        let store = SettingsStore::open(&path).unwrap();
        let settings = store.get();
        assert!(settings.dark_mode);
        assert_eq!(settings.request_timeout_ms, 10_000);
    }

    #[test]
    fn test_update_rejects_invalid_settings() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::open(dir.path().join("settings.json")).unwrap();
        let settings = ClientSettings {
            request_timeout_ms: 0,
            ..store.get()
        };
        assert!(store.update(settings).is_err());
        assert_eq!(store.get().request_timeout_ms, 10_000);
    }
}
