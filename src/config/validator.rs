//! Snapshot validation
//!
//! Checks a `CommandCollection` before it is written and reports issues in
//! a structured report the transaction uses to allow or block the commit.
//!
//! - **Error**: blocks the commit (a command name that could never be restored)
//! - **Warning**: allowed but logged (malformed gesture fields, conflicts)
//! - **Info**: informational (unknown commands, newer parameter versions)
//!
//! # Example
//! ```
//! use command_table::config::validator::SnapshotValidator;
//! use command_table::core::{CommandCollection, CommandMemento};
//!
//! let mut commands = CommandCollection::new();
//! let mut memento = CommandMemento::default();
//! memento.set_key_gestures("Ctrl+O");
//! commands.insert("OpenFile", memento);
//!
//! let report = SnapshotValidator::new().validate(&commands);
//! assert!(!report.has_errors());
//! ```

use std::collections::HashSet;

use crate::core::{
    memento::MementoError, validator, CommandBindings, CommandCollection, CommandMemento,
    CommandName, ConflictIndex,
};

/// Validation severity level
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValidationLevel {
    /// Blocks commit
    Error,
    /// Allows commit - suspicious but restorable
    Warning,
    /// Information only
    Info,
}

/// A single validation issue found in a snapshot
#[derive(Clone, Debug)]
pub struct ValidationIssue {
    /// Command entry the issue belongs to (comma-joined for conflicts)
    pub command: String,
    pub validation_level: ValidationLevel,
    pub message: String,
    pub suggestion: Option<String>,
}

/// Complete validation report for a snapshot
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Error-level issues block commits
    pub fn has_errors(&self) -> bool {
        self.count(ValidationLevel::Error) > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.count(ValidationLevel::Warning) > 0
    }

    pub fn count(&self, level: ValidationLevel) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.validation_level == level)
            .count()
    }

    pub fn add_error(&mut self, command: &str, message: String) {
        self.push(command, ValidationLevel::Error, message, None);
    }

    pub fn add_warning(&mut self, command: &str, message: String, suggestion: Option<String>) {
        self.push(command, ValidationLevel::Warning, message, suggestion);
    }

    pub fn add_info(&mut self, command: &str, message: String) {
        self.push(command, ValidationLevel::Info, message, None);
    }

    fn push(
        &mut self,
        command: &str,
        validation_level: ValidationLevel,
        message: String,
        suggestion: Option<String>,
    ) {
        self.issues.push(ValidationIssue {
            command: command.to_string(),
            validation_level,
            message,
            suggestion,
        });
    }
}

/// Snapshot validator
///
/// With a set of known command names it also reports entries the catalog
/// will skip on restore.
#[derive(Debug, Default)]
pub struct SnapshotValidator {
    known_commands: Option<HashSet<String>>,
}

impl SnapshotValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports entries whose base name is not among `names`
    pub fn with_known_commands<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_commands = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Validates every entry of the collection
    pub fn validate(&self, commands: &CommandCollection) -> ValidationReport {
        let mut report = ValidationReport::new();
        let mut index = ConflictIndex::new();

        for (name, memento) in commands.iter() {
            let id = CommandName::parse(name);
            if let Err(e) = validator::validate_command_name(id.base()) {
                report.add_error(name, e.to_string());
                continue;
            }

            if let Some(known) = &self.known_commands {
                if !known.contains(id.base()) {
                    report.add_info(name, "unknown command, skipped on restore".to_string());
                }
            }

            let bindings = self.check_fields(name, memento, &mut report);
            index.add_command(name, &bindings);
        }

        for conflict in index.find_conflicts() {
            report.add_warning(
                &conflict.commands.join(","),
                format!(
                    "{} gesture '{}' is bound more than once",
                    conflict.space, conflict.gesture
                ),
                Some("resolve the conflict in the settings".to_string()),
            );
        }

        report
    }

    /// Decodes each field; malformed ones are reported and left unbound
    fn check_fields(
        &self,
        name: &str,
        memento: &CommandMemento,
        report: &mut ValidationReport,
    ) -> CommandBindings {
        let mut bindings = CommandBindings::default();

        match memento.decode_keys() {
            Ok(keys) => bindings.keys = keys,
            Err(e) => report.add_warning(name, format!("key gestures: {}", e), None),
        }
        match memento.decode_pointer() {
            Ok(pointer) => bindings.pointer = pointer,
            Err(e) => report.add_warning(name, format!("pointer gesture: {}", e), None),
        }
        match memento.decode_touch() {
            Ok(touch) => bindings.touch = touch,
            Err(e) => report.add_warning(name, format!("touch zones: {}", e), None),
        }

        match memento.decode_parameter() {
            Ok(_) => {}
            Err(e @ MementoError::UnsupportedParameterVersion { .. }) => {
                report.add_info(name, format!("{}, parameter ignored", e))
            }
            Err(e) => report.add_warning(name, e.to_string(), None),
        }

        bindings
    }
}
