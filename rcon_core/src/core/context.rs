use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;

use crate::storage::StorageError;

const SETTINGS_FILE: &str = "settings.json";

/// Where the console keeps its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppContext {
    config_dir: PathBuf,
}

impl AppContext {
    /// `~/.config/rcon_console` on Linux, `%APPDATA%\rcon_console` on Windows, etc.
    pub fn from_project_dirs() -> Result<Self, StorageError> {
        let proj = ProjectDirs::from("", "", "rcon_console").ok_or(StorageError::NoConfigDir)?;
        Ok(Self::with_config_dir(proj.config_dir()))
    }

    pub fn with_config_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: dir.into(),
        }
    }

    /// Creates the config directory if needed.
    pub fn ensure(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.config_dir).map_err(|e| StorageError::io(&self.config_dir, e))
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE)
    }
}
