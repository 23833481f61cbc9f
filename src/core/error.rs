//! Catalog error types

use thiserror::Error;

use crate::core::validator::ValidationError;

/// Errors raised by `CommandCatalog` operations
///
/// Every mutating operation that returns one of these leaves the catalog
/// unchanged.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No command with this name
    #[error("Command not found: {0}")]
    NotFound(String),

    /// `can_execute` returned false
    #[error("Command cannot be executed right now: {0}")]
    NotExecutable(String),

    /// Cloning a non-cloneable command, or removing a non-clone
    #[error("Invalid clone operation on '{name}': {reason}")]
    InvalidClone { name: String, reason: String },

    /// Share link points at a command that does not exist
    #[error("Share target '{target}' of '{command}' does not exist")]
    ShareTargetMissing { command: String, target: String },

    /// A command may not share its own parameter
    #[error("Command '{0}' cannot share its own parameter")]
    SelfShare(String),

    /// Registration of an already existing name
    #[error("Command already registered: {0}")]
    DuplicateName(String),

    /// Parameter write with a different shape than the command's parameter
    #[error("Parameter of '{command}' is {expected}, got {actual}")]
    ParameterMismatch {
        command: String,
        expected: String,
        actual: String,
    },

    /// Parameter access on a command without a parameter
    #[error("Command '{0}' has no parameter")]
    NoParameter(String),

    #[error(transparent)]
    InvalidName(#[from] ValidationError),

    /// The action behind the command failed
    #[error("Command '{name}' failed: {source}")]
    ActionFailed {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}
