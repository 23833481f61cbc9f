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

//! Script folder scanning
//!
//! Reading and parsing script headers touches the filesystem, so the scan
//! runs on a worker thread. The result comes back as one `ScriptScan` batch
//! which the control context applies with `CommandCatalog::apply_script_scan`.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::mpsc::{channel, Receiver, TryRecvError},
    thread,
};

use thiserror::Error;
use tracing::{debug, warn};

use crate::core::{ScriptDeclaration, ScriptEntry, ScriptScan};

/// Extensions recognised as script files
pub const DEFAULT_EXTENSIONS: &[&str] = &["nvjs", "js"];

/// Errors raised while scanning a script folder
#[derive(Debug, Error)]
pub enum ScanError {
    /// The configured folder does not exist
    #[error("Script folder not found: {0}")]
    FolderNotFound(PathBuf),

    /// The worker thread ended without delivering a result
    #[error("Script scan worker exited without a result")]
    Disconnected,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Scans one folder (non-recursively) for script files
#[derive(Clone, Debug)]
pub struct ScriptScanner {
    folder: PathBuf,
    extensions: Vec<String>,
}

impl ScriptScanner {
    pub fn new(folder: PathBuf) -> Self {
        Self {
            folder,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Replaces the recognised extensions (compared case-insensitively)
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// True when `path` carries one of the recognised extensions
    pub fn is_script(&self, path: &Path) -> bool {
        is_script_path(path, &self.extensions)
    }

    /// Scans synchronously on the calling thread
    ///
    /// Entries are sorted by path. Content that is not valid UTF-8 is
    /// decoded lossily. Files that cannot be read at all are listed in
    /// `unreadable`; a missing folder is an error.
    pub fn scan(&self) -> Result<ScriptScan, ScanError> {
        if !self.folder.is_dir() {
            return Err(ScanError::FolderNotFound(self.folder.clone()));
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.folder)? {
            let path = entry?.path();
            if path.is_file() && self.is_script(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut entries = Vec::with_capacity(paths.len());
        let mut unreadable = Vec::new();
        for path in paths {
            match fs::read(&path) {
                Ok(bytes) => {
                    let content = String::from_utf8_lossy(&bytes);
                    let declaration = ScriptDeclaration::parse(&content, &path);
                    entries.push(ScriptEntry { path, declaration });
                }
                Err(e) => {
                    warn!(script = %path.display(), error = %e, "unreadable script kept as is");
                    unreadable.push(path);
                }
            }
        }

        debug!(
            folder = %self.folder.display(),
            scripts = entries.len(),
            unreadable = unreadable.len(),
            "script folder scanned"
        );
        Ok(ScriptScan { entries, unreadable })
    }

    /// Starts the scan on a worker thread
    pub fn spawn(&self) -> ScanHandle {
        let (tx, rx) = channel();
        let scanner = self.clone();

        thread::spawn(move || {
            let _ = tx.send(scanner.scan());
        });

        ScanHandle { rx }
    }
}

/// Pending result of a background scan
pub struct ScanHandle {
    rx: Receiver<Result<ScriptScan, ScanError>>,
}

impl ScanHandle {
    /// Non-blocking poll; `None` while the worker is still running
    pub fn try_take(&self) -> Option<Result<ScriptScan, ScanError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(ScanError::Disconnected)),
        }
    }

    /// Blocks until the worker delivers its result
    pub fn wait(self) -> Result<ScriptScan, ScanError> {
        self.rx.recv().map_err(|_| ScanError::Disconnected)?
    }
}

pub(crate) fn is_script_path(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|known| known.eq_ignore_ascii_case(ext)))
}
