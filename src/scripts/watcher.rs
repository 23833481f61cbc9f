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

//! Script folder watcher
//!
//! Uses OS-level file watching via the notify crate. The host polls
//! `check_for_changes` from its control loop and starts a rescan when it
//! returns true.

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::{
    path::Path,
    sync::mpsc::{channel, Receiver},
};
use tracing::{debug, warn};

use crate::scripts::scanner::{is_script_path, DEFAULT_EXTENSIONS};

/// Watches a script folder for created, modified and removed scripts
pub struct ScriptFolderWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    extensions: Vec<String>,
}

impl ScriptFolderWatcher {
    pub fn new(folder: &Path) -> notify::Result<Self> {
        let (tx, rx) = channel();

        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default(),
        )?;

        watcher.watch(folder, RecursiveMode::NonRecursive)?;
        debug!(folder = %folder.display(), "watching script folder");

        Ok(Self {
            _watcher: watcher,
            rx,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        })
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    /// Drains pending events (non-blocking)
    ///
    /// Returns true if any event touched a script file.
    pub fn check_for_changes(&self) -> bool {
        let mut changed = false;
        while let Ok(event_result) = self.rx.try_recv() {
            match event_result {
                Ok(event) => changed |= self.is_relevant(&event),
                Err(e) => warn!(error = %e, "script folder watch error"),
            }
        }
        changed
    }

    fn is_relevant(&self, event: &Event) -> bool {
        matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
        ) && event
            .paths
            .iter()
            .any(|path| is_script_path(path, &self.extensions))
    }
}
