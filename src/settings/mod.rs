//! Settings surface over the command catalog
//!
//! # Architecture
//!
//! - **Model**: `CommandCatalog` (in the `core` module)
//! - **View**: supplied by the host application
//! - **Controller**: mediates between Model and View (in `controller.rs`)
//!
//! ```text
//! settings/
//! ├── controller.rs     // list, filter, edit, clone, scheme presets
//! └── edit_session.rs   // one command's gestures under edit
//! ```

pub mod controller;
pub mod edit_session;

pub use controller::{CommandRow, SettingsController, SettingsError};
pub use edit_session::GestureEditSession;

#[cfg(test)]
mod tests;
