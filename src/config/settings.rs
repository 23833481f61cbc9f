//! Script discovery settings

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ConfigError;
use crate::scripts::{ScriptScanner, DEFAULT_EXTENSIONS};

/// Where script commands come from and how they are refreshed
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScriptSettings {
    /// Scripts are only scanned when enabled
    pub enabled: bool,
    /// Script folder; `~` is expanded
    pub folder: String,
    /// File extensions recognised as scripts
    pub extensions: Vec<String>,
    /// Rescan when the folder changes
    pub watch: bool,
}

impl Default for ScriptSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            folder: "~/.config/command-table/scripts".to_string(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            watch: true,
        }
    }
}

impl ScriptSettings {
    /// Reads settings from a JSON file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Script folder with `~` expanded
    pub fn resolved_folder(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.folder).as_ref())
    }

    /// Scanner for the configured folder, or `None` when disabled
    pub fn scanner(&self) -> Option<ScriptScanner> {
        self.enabled.then(|| {
            ScriptScanner::new(self.resolved_folder()).with_extensions(self.extensions.clone())
        })
    }
}
