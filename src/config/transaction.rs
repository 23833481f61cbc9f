// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Snapshot transaction management with automatic backups
//!
//! Provides atomic write operations for snapshot files.

use atomic_write_file::AtomicWriteFile;
use std::{fs, io::Write, path::{Path, PathBuf}};
use tracing::{info, warn};

use crate::config::{
    validator::{SnapshotValidator, ValidationLevel},
    ConfigError, SnapshotStore,
};

/// Atomic snapshot transaction with automatic backup.
///
/// # Lifecycle
///
/// 1. `begin()` - Creates timestamped backup immediately (if a snapshot exists)
/// 2. Caller prepares new content (in memory)
/// 3. `commit()` - Writes atomically or `rollback()` - Restores original
///
/// # Example
///
/// ```no_run
/// use command_table::config::{SnapshotStore, SnapshotTransaction};
/// use std::path::PathBuf;
///
/// let store = SnapshotStore::new(PathBuf::from("commands.json"))?;
/// let tx = SnapshotTransaction::begin(&store)?;
///
/// match tx.commit("{\"formatVersion\":1,\"commands\":{}}\n") {
///     Ok(()) => println!("Snapshot written"),
///     Err(e) => eprintln!("Commit failed: {}", e),
/// }
/// # Ok::<(), command_table::config::ConfigError>(())
/// ```
pub struct SnapshotTransaction<'a> {
    store: &'a SnapshotStore,
    backup_path: Option<PathBuf>,
}

impl<'a> SnapshotTransaction<'a> {
    /// Begins a new transaction by creating a timestamped backup.
    ///
    /// The transaction cannot outlive the store it writes to.
    ///
    /// # Errors
    ///
    /// Returns an error if the current snapshot cannot be read or the
    /// backup cannot be written. No changes are made in that case.
    pub fn begin(store: &'a SnapshotStore) -> Result<Self, ConfigError> {
        // Rollback point
        let backup_path = store.create_timestamped_backup()?;

        Ok(Self { store, backup_path })
    }

    /// Backup taken by `begin()`; `None` if no snapshot existed yet
    pub fn backup_path(&self) -> Option<&Path> {
        self.backup_path.as_deref()
    }

    /// Commits the transaction after validating the new snapshot
    ///
    /// 1. Parses and validates the content
    /// 2. Blocks on Error-level issues (invalid names, undecodable document)
    /// 3. Logs Warning-level issues (conflicts, malformed fields)
    /// 4. Commits if validation passes
    pub fn commit_with_validation(self, new_content: &str) -> Result<(), ConfigError> {
        let document = self.store.parse_document(new_content)?;
        let report = SnapshotValidator::new().validate(&document.commands);

        if report.has_errors() {
            let errors: Vec<String> = report
                .issues
                .iter()
                .filter(|i| i.validation_level == ValidationLevel::Error)
                .map(|i| format!("{}: {}", i.command, i.message))
                .collect();

            for error in &errors {
                warn!(issue = %error, "snapshot rejected");
            }

            return Err(ConfigError::ValidationFailed(format!(
                "{} validation error(s): {}",
                errors.len(),
                errors.join("; ")
            )));
        }

        for issue in report
            .issues
            .iter()
            .filter(|i| i.validation_level == ValidationLevel::Warning)
        {
            warn!(command = %issue.command, message = %issue.message, "snapshot warning");
        }

        self.commit(new_content)
    }

    /// Commits the transaction by atomically writing new content.
    ///
    /// Consumes the transaction, preventing accidental double-commits. On
    /// error the original snapshot is untouched and the backup remains.
    pub fn commit(self, new_content: &str) -> Result<(), ConfigError> {
        write_atomically(self.store.path(), new_content)?;
        info!(path = %self.store.path().display(), "snapshot committed");
        Ok(())
    }

    /// Rolls back to the state captured by `begin()`.
    ///
    /// If no snapshot existed when the transaction began, the file written
    /// since is removed.
    pub fn rollback(&self) -> Result<(), ConfigError> {
        match &self.backup_path {
            Some(backup_path) => {
                let backup_content = fs::read_to_string(backup_path)?;
                write_atomically(self.store.path(), &backup_content)?;
            }
            None => {
                if self.store.path().exists() {
                    fs::remove_file(self.store.path())?;
                }
            }
        }
        info!(path = %self.store.path().display(), "snapshot rolled back");
        Ok(())
    }
}

fn write_atomically(path: &Path, content: &str) -> Result<(), ConfigError> {
    let mut file = AtomicWriteFile::options()
        .open(path)
        .map_err(|e| ConfigError::WriteFailed(format!("Failed to open for atomic write: {}", e)))?;

    file.write_all(content.as_bytes())
        .map_err(|e| ConfigError::WriteFailed(format!("Failed to write content: {}", e)))?;

    file.commit()
        .map_err(|e| ConfigError::WriteFailed(format!("Failed to commit atomic write: {}", e)))?;

    Ok(())
}
