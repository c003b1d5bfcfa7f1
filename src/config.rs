//! Per-user settings: onboarding flag and chosen storage directory.
//!
//! Settings live in their own JSON file, independent of the notes directory,
//! and are re-read on every query so that external changes (including the
//! storage directory disappearing) are seen immediately.
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use crate::{write_atomically, CalError, Result};

/// Name of the settings file inside the platform config directory
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Durable application settings.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Whether the user finished onboarding
    pub onboarded: bool,

    /// Absolute path of the directory holding the notes file
    pub storage_directory: Option<PathBuf>,
}

/// Reads and writes [`Settings`] in a single file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    settings_path: PathBuf,
}

impl ConfigStore {
    /// Uses the given settings file
    pub fn open(settings_path: impl Into<PathBuf>) -> Self {
        Self {
            settings_path: settings_path.into(),
        }
    }

    /// Uses the per-user settings file of this platform
    pub fn from_platform() -> Result<Self> {
        let dirs = ProjectDirs::from("com", "tsarskiy", "calnotes").ok_or_else(|| {
            CalError::ConfigError {
                message: "could not determine a home directory for settings".to_string(),
            }
        })?;
        Ok(Self::open(dirs.config_dir().join(SETTINGS_FILE_NAME)))
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    /// Current settings; absent or unreadable files yield the defaults
    pub fn load(&self) -> Settings {
        let raw = match fs::read_to_string(&self.settings_path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Settings::default(),
            Err(e) => {
                warn!(
                    "Failed to read settings {}: {}",
                    self.settings_path.display(),
                    e
                );
                return Settings::default();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(
                "Settings file {} is unreadable, using defaults: {}",
                self.settings_path.display(),
                e
            );
            Settings::default()
        })
    }

    fn store(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.settings_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                debug!("Creating settings directory: {}", parent.display());
                fs::create_dir_all(parent).map_err(|e| {
                    error!("Failed to create settings directory: {}", e);
                    CalError::Io(e)
                })?;
            }
        }

        let json = serde_json::to_vec_pretty(settings)?;
        write_atomically(&self.settings_path, &json)
    }

    pub fn is_onboarded(&self) -> bool {
        self.load().onboarded
    }

    /// Marks onboarding as complete. Idempotent.
    pub fn set_onboarded(&self) -> Result<()> {
        let mut settings = self.load();
        if settings.onboarded {
            return Ok(());
        }
        settings.onboarded = true;
        self.store(&settings)?;
        info!("Onboarding marked complete");
        Ok(())
    }

    /// The recorded storage directory, whether or not it still exists
    pub fn storage_directory(&self) -> Option<PathBuf> {
        self.load().storage_directory
    }

    /// True only when a directory is recorded and is present on disk
    pub fn has_storage_directory(&self) -> bool {
        self.storage_directory().is_some_and(|dir| dir.is_dir())
    }

    /// Records `path` in absolute form, creating the directory tree first.
    ///
    /// Returns the absolute path that was recorded. Nothing is recorded when
    /// the directory cannot be created.
    pub fn set_storage_directory(&self, path: &Path) -> Result<PathBuf> {
        let absolute = std::path::absolute(path).map_err(|e| {
            error!("Failed to resolve {}: {}", path.display(), e);
            CalError::DirectoryCreation {
                path: path.to_path_buf(),
                source: e,
            }
        })?;

        fs::create_dir_all(&absolute).map_err(|e| {
            error!(
                "Failed to create storage directory {}: {}",
                absolute.display(),
                e
            );
            CalError::DirectoryCreation {
                path: absolute.clone(),
                source: e,
            }
        })?;

        let mut settings = self.load();
        settings.storage_directory = Some(absolute.clone());
        self.store(&settings)?;

        info!("Storage directory set to {}", absolute.display());
        Ok(absolute)
    }

    /// Onboarding entry point: ensure the directory, record it, mark onboarded
    pub fn choose_directory(&self, path: &Path) -> Result<PathBuf> {
        let dir = self.set_storage_directory(path)?;
        self.set_onboarded()?;
        Ok(dir)
    }

    /// The storage directory every note operation works in.
    ///
    /// Fails with `NoStorageConfigured` when none was ever chosen and with
    /// `StorageDirectoryMissing` when the chosen one is gone.
    pub fn resolve_storage_directory(&self) -> Result<PathBuf> {
        let dir = self.storage_directory().ok_or_else(|| {
            debug!("No storage directory recorded");
            CalError::NoStorageConfigured
        })?;

        if !dir.is_dir() {
            debug!("Storage directory {} no longer exists", dir.display());
            return Err(CalError::StorageDirectoryMissing { path: dir });
        }

        Ok(dir)
    }
}
