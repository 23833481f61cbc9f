//! Snapshot file management with atomic writes and backup support.
//!
//! This module persists the catalog's `CommandCollection` as a versioned
//! JSON document. Key features:
//!
//! - **Atomic writes**: Uses temp-file-then-rename to prevent corruption
//! - **Automatic backups**: Every write creates a timestamped backup
//! - **Rollback safety**: Failed transactions leave the original snapshot untouched
//! - **Validation**: Snapshots with invalid command names are never written
//!
//! # Example
//!
//! ```no_run
//! use command_table::config::SnapshotStore;
//! use command_table::core::{CommandCatalog, NoActions};
//!
//! let catalog = CommandCatalog::with_builtin_commands(&NoActions)?;
//! let store = SnapshotStore::new("/home/user/.config/command-table/commands.json".into())?;
//!
//! store.save(&catalog.create_memento())?;
//! let restored = store.load()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
pub mod settings;
pub mod transaction;
pub mod validator;

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::core::CommandCollection;

pub use error::ConfigError;
pub use settings::ScriptSettings;
pub use transaction::SnapshotTransaction;
pub use validator::{SnapshotValidator, ValidationIssue, ValidationLevel, ValidationReport};

/// Current snapshot document format
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// On-disk shape of a snapshot file
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotDocument {
    /// Documents written before versioning carry no version and read as 1
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    #[serde(default)]
    pub commands: CommandCollection,
}

fn default_format_version() -> u32 {
    SNAPSHOT_FORMAT_VERSION
}

impl SnapshotDocument {
    pub fn new(commands: CommandCollection) -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            commands,
        }
    }
}

/// Manages one snapshot file and its backup directory.
///
/// Reading is free; all writes go through `SnapshotTransaction` so every
/// change is preceded by a backup and lands atomically.
#[derive(Debug)]
pub struct SnapshotStore {
    path: PathBuf,
    backup_dir: PathBuf,
}

impl SnapshotStore {
    /// Creates a store for `path`.
    ///
    /// The snapshot itself need not exist yet; its parent directory and a
    /// `backups/` directory next to it are created. A symlinked snapshot is
    /// allowed but logged.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::BackupDirNotWritable` if the backup directory
    /// cannot be created or is read-only.
    pub fn new(path: PathBuf) -> Result<Self, ConfigError> {
        if path.read_link().is_ok() {
            warn!(path = %path.display(), "snapshot file is a symlink");
        }

        // e.g. ~/.config/command-table/commands.json -> ~/.config/command-table/backups/
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let backup_dir = parent.join("backups");

        if !backup_dir.exists() {
            fs::create_dir_all(&backup_dir)
                .map_err(|_| ConfigError::BackupDirNotWritable(backup_dir.clone()))?;
        }

        if backup_dir.metadata()?.permissions().readonly() {
            return Err(ConfigError::BackupDirNotWritable(backup_dir));
        }

        Ok(Self { path, backup_dir })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Reads the raw snapshot text.
    pub fn read_snapshot(&self) -> Result<String, ConfigError> {
        if !self.path.exists() {
            return Err(ConfigError::NotFound(self.path.clone()));
        }
        Ok(fs::read_to_string(&self.path)?)
    }

    /// Parses snapshot text into a document, checking its format version.
    pub fn parse_document(&self, content: &str) -> Result<SnapshotDocument, ConfigError> {
        let document: SnapshotDocument =
            serde_json::from_str(content).map_err(|source| ConfigError::Parse {
                path: self.path.clone(),
                source,
            })?;

        if document.format_version > SNAPSHOT_FORMAT_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: document.format_version,
                supported: SNAPSHOT_FORMAT_VERSION,
            });
        }
        Ok(document)
    }

    /// Loads the persisted command collection.
    pub fn load(&self) -> Result<CommandCollection, ConfigError> {
        let content = self.read_snapshot()?;
        Ok(self.parse_document(&content)?.commands)
    }

    /// Loads the collection, or `None` when no snapshot has been saved yet.
    pub fn load_or_default(&self) -> Result<Option<CommandCollection>, ConfigError> {
        match self.load() {
            Ok(commands) => Ok(Some(commands)),
            Err(ConfigError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Renders a collection as snapshot text.
    pub fn render(commands: &CommandCollection) -> Result<String, ConfigError> {
        let document = SnapshotDocument::new(commands.clone());
        let mut text = serde_json::to_string_pretty(&document)?;
        text.push('\n');
        Ok(text)
    }

    /// Validates and writes `commands` inside a transaction.
    ///
    /// The previous snapshot (if any) is backed up first.
    pub fn save(&self, commands: &CommandCollection) -> Result<(), ConfigError> {
        let content = Self::render(commands)?;
        SnapshotTransaction::begin(self)?.commit_with_validation(&content)?;
        info!(path = %self.path.display(), commands = commands.len(), "snapshot saved");
        Ok(())
    }

    /// Lists backups of this snapshot, oldest first.
    pub fn list_backups(&self) -> Result<Vec<PathBuf>, ConfigError> {
        let prefix = format!("{}.", self.file_name()?);
        let mut backups: Vec<PathBuf> = fs::read_dir(&self.backup_dir)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(&prefix))
            })
            .collect();
        backups.sort();
        Ok(backups)
    }

    fn file_name(&self) -> Result<&str, ConfigError> {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                ConfigError::BackupFailed(format!("unusable file name: {}", self.path.display()))
            })
    }

    /// Copies the current snapshot into the backup directory.
    ///
    /// Returns `None` when there is nothing to back up yet.
    pub(crate) fn create_timestamped_backup(&self) -> Result<Option<PathBuf>, ConfigError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;

        // YYYY-MM-DD_HHMMSS
        let timestamp = Local::now().format("%Y-%m-%d_%H%M%S");
        let backup_path = self
            .backup_dir
            .join(format!("{}.{}", self.file_name()?, timestamp));

        fs::write(&backup_path, &content)
            .map_err(|e| ConfigError::BackupFailed(format!("{}: {}", backup_path.display(), e)))?;

        Ok(Some(backup_path))
    }
}

#[cfg(test)]
mod tests;
