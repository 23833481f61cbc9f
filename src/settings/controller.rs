//! Settings controller - Mediates between the catalog (Model) and a settings surface (View)
//!
//! # Responsibilities
//!
//! - Enumerate commands with rendered bindings and conflict annotations
//! - Filter/search commands
//! - Apply binding and parameter edits, returning live conflict feedback
//! - Clone management and input scheme presets
//!
//! # Architecture
//!
//! The controller holds a shared reference to the catalog but knows nothing
//! about widgets. Everything runs on the control context, so the catalog is
//! shared through `Rc<RefCell<_>>` and every borrow ends before a method
//! returns.

use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;
use tracing::info;

use crate::core::{
    Binding, CatalogError, CommandCatalog, CommandCollection, CommandParameter, ConflictIndex,
    ConflictRecord, Gesture, GestureParseError, GestureSpace, InputScheme, RestoreReport,
};
use crate::settings::edit_session::GestureEditSession;

/// Errors surfaced to the settings surface
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Text typed into a binding field did not parse
    #[error(transparent)]
    Gesture(#[from] GestureParseError),
}

/// One command as presented in a settings list
#[derive(Clone, Debug, PartialEq)]
pub struct CommandRow {
    pub name: String,
    pub group: String,
    pub text: String,
    pub remarks: String,
    pub keys: String,
    pub pointer: String,
    pub touch: String,
    pub parameter: Option<CommandParameter>,
    /// Command whose parameter this one uses
    pub shared_with: Option<String>,
    pub is_clone: bool,
    pub cloneable: bool,
    /// Per-gesture conflicts; `commands` lists the *other* commands
    pub conflicts: Vec<ConflictRecord>,
}

impl CommandRow {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    fn matches(&self, query: &str) -> bool {
        [
            &self.name,
            &self.text,
            &self.group,
            &self.keys,
            &self.pointer,
            &self.touch,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(query))
    }
}

/// Settings controller over a shared catalog
pub struct SettingsController {
    catalog: Rc<RefCell<CommandCatalog>>,
}

impl SettingsController {
    pub fn new(catalog: Rc<RefCell<CommandCatalog>>) -> Self {
        Self { catalog }
    }

    /// Shared handle to the underlying catalog
    pub fn catalog(&self) -> Rc<RefCell<CommandCatalog>> {
        Rc::clone(&self.catalog)
    }

    /// All commands in display order
    pub fn rows(&self) -> Vec<CommandRow> {
        let catalog = self.catalog.borrow();
        let index = ConflictIndex::from_catalog(&catalog);

        catalog
            .iter()
            .map(|command| {
                let name = command.name();
                let bindings = command.bindings();

                let conflicts = GestureSpace::ALL
                    .into_iter()
                    .flat_map(|space| bindings.gestures(space))
                    .filter_map(|gesture| {
                        let commands = index.query(&gesture, name);
                        (!commands.is_empty()).then(|| ConflictRecord {
                            space: gesture.space(),
                            gesture,
                            commands,
                        })
                    })
                    .collect();

                CommandRow {
                    name: name.to_string(),
                    group: command.group().to_string(),
                    text: command.text().to_string(),
                    remarks: command.remarks().to_string(),
                    keys: bindings.keys.to_string(),
                    pointer: bindings.pointer.to_string(),
                    touch: bindings.touch.to_string(),
                    parameter: catalog.parameter(name).ok().flatten().cloned(),
                    shared_with: command
                        .share_target()
                        .filter(|target| catalog.contains(target))
                        .map(str::to_string),
                    is_clone: command.is_clone(),
                    cloneable: command.is_cloneable(),
                    conflicts,
                }
            })
            .collect()
    }

    /// Filters rows by search query
    ///
    /// Searches name, display text, group and rendered bindings,
    /// case-insensitively. An empty query returns every row.
    pub fn filter_rows(&self, query: &str) -> Vec<CommandRow> {
        let rows = self.rows();
        if query.trim().is_empty() {
            return rows;
        }

        let query = query.trim().to_lowercase();
        rows.into_iter().filter(|row| row.matches(&query)).collect()
    }

    /// Assigns one binding slot; returns the conflicts of the new value
    pub fn submit_binding(
        &self,
        name: &str,
        binding: Binding,
    ) -> Result<Vec<ConflictRecord>, CatalogError> {
        let mut catalog = self.catalog.borrow_mut();
        let conflicts = catalog.conflicts_for_binding(name, &binding);
        catalog.set_binding(name, binding)?;
        Ok(conflicts)
    }

    /// Parses `text` in `space` and assigns it
    pub fn submit_binding_text(
        &self,
        name: &str,
        space: GestureSpace,
        text: &str,
    ) -> Result<Vec<ConflictRecord>, SettingsError> {
        let binding = Binding::parse(space, text)?;
        Ok(self.submit_binding(name, binding)?)
    }

    pub fn submit_parameter(
        &self,
        name: &str,
        value: CommandParameter,
    ) -> Result<(), CatalogError> {
        self.catalog.borrow_mut().set_parameter(name, value)
    }

    pub fn reset_parameter(&self, name: &str) -> Result<(), CatalogError> {
        self.catalog.borrow_mut().reset_parameter(name)
    }

    pub fn create_clone(&self, source: &str) -> Result<String, CatalogError> {
        self.catalog.borrow_mut().create_clone(source)
    }

    pub fn remove_clone(&self, name: &str) -> Result<(), CatalogError> {
        self.catalog.borrow_mut().remove_clone(name)
    }

    /// Resets every binding and parameter to an input scheme's defaults
    pub fn apply_scheme(&self, scheme: InputScheme) -> RestoreReport {
        let mut catalog = self.catalog.borrow_mut();
        let defaults = catalog.generate_defaults(scheme);
        let report = catalog.restore(&defaults);
        info!(%scheme, applied = report.applied.len(), "input scheme applied");
        report
    }

    /// Applies a saved snapshot
    pub fn restore(&self, snapshot: &CommandCollection) -> RestoreReport {
        self.catalog.borrow_mut().restore(snapshot)
    }

    /// Snapshot of the current state for saving
    pub fn snapshot(&self) -> CommandCollection {
        self.catalog.borrow().create_memento()
    }

    pub fn resolve_conflict(
        &self,
        gesture: &Gesture,
        keep: &[&str],
    ) -> Result<Vec<String>, CatalogError> {
        self.catalog.borrow_mut().resolve_conflict(gesture, keep)
    }

    /// Every gesture bound by more than one command
    pub fn conflicts(&self) -> Vec<ConflictRecord> {
        self.catalog.borrow().conflict_index().find_conflicts()
    }

    pub fn command_count(&self) -> usize {
        self.catalog.borrow().len()
    }

    pub fn conflict_count(&self) -> usize {
        self.conflicts().len()
    }

    /// Opens an edit session for one command
    pub fn edit(&self, name: &str) -> Result<GestureEditSession, CatalogError> {
        GestureEditSession::new(self.catalog(), name)
    }
}
