/// Configuration for a rating session
///
/// Stored as JSON so the host application can keep it next to its own
/// settings. Every field is optional in the file; missing ones take defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::select::SelectOptions;
use crate::state::ratings::DEFAULT_TABLE;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Directory tree the images are drawn from
    pub source_root: PathBuf,
    /// SQLite file holding the ratings
    pub database_path: PathBuf,
    /// Table inside the database; several rating sets can share one file
    pub table: String,
    /// Extension, size and only-unrated filters
    pub select: SelectOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("images"),
            database_path: default_database_path(),
            table: DEFAULT_TABLE.to_string(),
            select: SelectOptions::default(),
        }
    }
}

impl Config {
    /// Convert to a JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON config file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write this config as JSON, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Where the rating database lives unless configured otherwise:
/// - Linux: ~/.local/share/dressage/dressage.sqlite
/// - macOS: ~/Library/Application Support/dressage/dressage.sqlite
/// - Windows: %APPDATA%\dressage\dressage.sqlite
///
/// Falls back to the home directory, then the working directory.
pub fn default_database_path() -> PathBuf {
    let mut path = dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    path.push("dressage");
    path.push("dressage.sqlite");
    path
}
