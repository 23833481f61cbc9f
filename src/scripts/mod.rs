//! Script folder discovery
//!
//! ```text
//! scripts/
//! ├── scanner.rs   // background scan -> ScriptScan batch
//! └── watcher.rs   // notify-based change detection
//! ```

pub mod scanner;
pub mod watcher;

pub use scanner::{ScanError, ScanHandle, ScriptScanner, DEFAULT_EXTENSIONS};
pub use watcher::ScriptFolderWatcher;

#[cfg(test)]
mod tests;
