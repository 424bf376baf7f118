//! User settings persistence.
//!
//! Remembers the last chosen model and the folder images were last picked
//! from.

use crate::error::Result;
use crate::model::ModelChoice;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// User-configurable settings persisted between sessions.
///
/// Settings are stored as JSON in the user's config directory
/// (e.g., `~/.config/depth-lens/settings.json` on Linux).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Model used for the next submission.
    pub model: ModelChoice,
    /// Directory the file dialog opens in.
    #[serde(default)]
    pub last_directory: Option<PathBuf>,
}

impl Settings {
    /// Returns the path to the settings file.
    ///
    /// Creates the config directory if it doesn't exist.
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "depth-lens").map(|dirs| {
            let config_dir = dirs.config_dir();
            if !config_dir.exists() {
                let _ = fs::create_dir_all(config_dir);
            }
            config_dir.join("settings.json")
        })
    }

    /// Loads settings from disk, falling back to defaults if not found.
    pub fn load(default_model: ModelChoice) -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path, default_model),
            None => Self::with_defaults(default_model),
        }
    }

    /// Loads settings from `path`; missing or unreadable files yield defaults.
    pub fn load_from(path: &Path, default_model: ModelChoice) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_else(|| Self::with_defaults(default_model))
    }

    pub fn with_defaults(model: ModelChoice) -> Self {
        Self {
            model,
            last_directory: None,
        }
    }

    /// Persists settings to disk.
    ///
    /// # Errors
    /// Returns an error if serialization or file writing fails.
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            self.save_to(&path)?;
        }
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::with_defaults(ModelChoice::default())
    }
}
