// Copyright 2025 bakri (tidynest@proton.me)
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

//! Command Table
//!
//! A registry of named commands bound to three independent input spaces:
//! key combinations, multi-stroke pointer gestures and touch-zone taps.
//!
//! # Features
//!
//! - **Conflict Detection:** Live detection of gestures bound to several commands
//! - **Clones and Shares:** Independent command copies and shared parameters
//! - **Snapshots:** Versioned, tolerant persistence of bindings and parameters
//! - **Input Schemes:** Preset default binding layouts
//! - **Script Commands:** Commands declared by script headers, reconciled on rescan
//! - **Atomic Operations:** Safe file writes with timestamped backups
//!
//! # Architecture
//!
//! - **`core`:** Business logic (gestures, parser, catalog, conflicts, snapshots)
//! - **`scripts`:** Script folder scanning and watching
//! - **`config`:** File operations (snapshot store, transactions, validation, settings)
//! - **`settings`:** Controller and edit sessions for a settings surface
//!
//! # Examples
//!
//! ## Building the catalog and detecting conflicts
//!
//! ```
//! use command_table::core::{CommandCatalog, Gesture, GestureSpace, NoActions};
//!
//! let mut catalog = CommandCatalog::with_builtin_commands(&NoActions)?;
//! catalog.set_key_gestures("PrevPage", "Left".parse()?)?;
//!
//! // NextPage is bound to Left by default
//! let left = Gesture::parse(GestureSpace::Key, "Left")?;
//! assert_eq!(catalog.query_conflicts(&left, "PrevPage"), vec!["NextPage"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Saving and restoring
//!
//! ```no_run
//! use command_table::config::SnapshotStore;
//! use command_table::core::{CommandCatalog, NoActions};
//! use std::path::PathBuf;
//!
//! let mut catalog = CommandCatalog::with_builtin_commands(&NoActions)?;
//! let store = SnapshotStore::new(PathBuf::from("/tmp/commands.json"))?;
//!
//! store.save(&catalog.create_memento())?;
//! let report = catalog.restore(&store.load()?);
//! println!("Restored {} commands", report.applied.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod core;
pub mod scripts;
pub mod settings;

// Re-export commonly used types for convenience
pub use core::{
    Binding, CatalogError, CommandCatalog, CommandCollection, CommandParameter, Gesture,
    GestureSpace, InputScheme,
};
