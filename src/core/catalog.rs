//! The command catalog
//!
//! `CommandCatalog` owns every `Command` and is the only way to mutate
//! bindings, parameters, share links and clones. It lives on a single
//! control context (it is deliberately `!Send`); background work such as
//! script scanning produces plain data that is applied here in one batch.
//!
//! # Change tracking
//! `change_count()` grows by exactly one per structural batch (registration,
//! clone creation/removal, restore, script refresh) so dependents can
//! invalidate caches by comparing counters instead of listening for events.
//!
//! # Failure atomicity
//! Every fallible mutator validates all of its inputs before touching any
//! command, so an `Err` always leaves the catalog as it was.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::core::builtin::{self, ActionProvider, OBSOLETE_COMMANDS, SHARE_PAIRS};
use crate::core::command::{
    Command, CommandAction, CommandArgs, CommandContext, CommandDefinition, CommandKind,
    CommandName,
};
use crate::core::conflict::{ConflictIndex, ConflictRecord};
use crate::core::error::CatalogError;
use crate::core::gesture::{
    Binding, CommandBindings, Gesture, GestureSpace, KeyGestureSet, PointerGestureSequence,
    TouchZoneSet,
};
use crate::core::memento::{CommandCollection, CommandMemento, ObsoleteCommand};
use crate::core::parameter::{CommandParameter, ParameterSource};
use crate::core::scheme::InputScheme;
use crate::core::script::{
    script_command_name, ScriptAction, ScriptBacking, ScriptDeclaration, ScriptRefresh,
    ScriptRunner, ScriptScan, SCRIPT_GROUP,
};
use crate::core::validator;

/// Sort key for enumeration
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CommandOrder {
    /// Groups in table order, commands in display order within a group
    #[default]
    Group,
    /// Full command name
    Name,
    /// Display text
    Text,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// A sorted view over the catalog; iterate it as often as needed
#[derive(Clone, Debug)]
pub struct Enumeration<'a> {
    commands: Vec<&'a Command>,
}

impl<'a> Enumeration<'a> {
    pub fn iter(&self) -> impl Iterator<Item = &'a Command> + '_ {
        self.commands.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn names(&self) -> Vec<&'a str> {
        self.commands.iter().map(|c| c.name()).collect()
    }
}

impl<'a> IntoIterator for Enumeration<'a> {
    type Item = &'a Command;
    type IntoIter = std::vec::IntoIter<&'a Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.into_iter()
    }
}

/// A snapshot field that could not be applied and was recovered
#[derive(Clone, Debug, PartialEq)]
pub struct RecoveredField {
    pub command: String,
    /// Binding space of the field; None for the parameter
    pub space: Option<GestureSpace>,
    pub message: String,
}

/// Outcome of `CommandCatalog::restore`
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RestoreReport {
    /// Commands whose state was overwritten from the snapshot
    pub applied: Vec<String>,
    /// Snapshot entries with no matching command
    pub skipped: Vec<String>,
    /// Clones recreated from `Base:N` entries
    pub created_clones: Vec<String>,
    /// `(old, new)` obsolete-name renames; `new` is empty when dropped
    pub renamed: Vec<(String, String)>,
    /// Fields that were malformed and left unbound/untouched
    pub recovered: Vec<RecoveredField>,
}

/// Outcome of `CommandCatalog::apply_script_scan`
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScriptRefreshReport {
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub removed: Vec<String>,
    /// Scripts that could not be registered (name collision or invalid name)
    pub skipped: Vec<String>,
}

/// Owns every command and all cross-command relations
pub struct CommandCatalog {
    commands: HashMap<String, Command>,
    default_memento: CommandCollection,
    obsolete_commands: Vec<ObsoleteCommand>,
    script_runner: Option<Rc<dyn ScriptRunner>>,
    change_count: u64,
}

impl CommandCatalog {
    /// An empty catalog with no defaults
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
            default_memento: CommandCollection::new(),
            obsolete_commands: Vec::new(),
            script_runner: None,
            change_count: 0,
        }
    }

    /// Builds a catalog from definitions and captures them as the defaults
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = CommandDefinition>,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        catalog.register_all(definitions)?;
        catalog.capture_defaults();
        catalog.change_count = 0;
        Ok(catalog)
    }

    /// The application's built-in command table with its share pairs
    pub fn with_builtin_commands(provider: &dyn ActionProvider) -> Result<Self, CatalogError> {
        let mut catalog = Self::from_definitions(builtin::builtin_definitions(provider))?;

        for (dependent, owner) in SHARE_PAIRS {
            catalog.set_share(dependent, owner)?;
        }
        catalog.obsolete_commands = OBSOLETE_COMMANDS.to_vec();
        catalog.capture_defaults();
        catalog.change_count = 0;

        info!(commands = catalog.len(), "built-in command table loaded");
        Ok(catalog)
    }

    /// Records the current state as the baseline for `generate_defaults`
    pub fn capture_defaults(&mut self) {
        self.default_memento = self.create_memento();
    }

    /// Adds renames applied to snapshots by `restore`
    pub fn set_obsolete_commands(&mut self, obsolete: Vec<ObsoleteCommand>) {
        self.obsolete_commands = obsolete;
    }

    /// Installs the host's script runner; existing script commands pick it up
    pub fn set_script_runner(&mut self, runner: Option<Rc<dyn ScriptRunner>>) {
        self.script_runner = runner;
        let runner = self.script_runner.clone();
        for command in self.commands.values_mut() {
            if let CommandKind::Script(backing) = &command.kind {
                command.action = Rc::new(ScriptAction::new(
                    backing.path().to_path_buf(),
                    runner.clone(),
                ));
            }
        }
    }

    pub fn change_count(&self) -> u64 {
        self.change_count
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Looks up a command by full name
    pub fn get(&self, name: &str) -> Result<&Command, CatalogError> {
        self.commands
            .get(name)
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut Command, CatalogError> {
        self.commands
            .get_mut(name)
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))
    }

    /// All commands in display order
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.enumerate(CommandOrder::Group, SortDirection::Ascending)
            .into_iter()
    }

    /// Command names in display order
    pub fn names(&self) -> Vec<String> {
        self.iter().map(|c| c.name().to_string()).collect()
    }

    /// Sorted view of the catalog
    pub fn enumerate(&self, order: CommandOrder, direction: SortDirection) -> Enumeration<'_> {
        let mut commands: Vec<&Command> = self.commands.values().collect();

        match order {
            CommandOrder::Group => {
                let mut group_rank: HashMap<&str, usize> = HashMap::new();
                for command in commands.iter().copied() {
                    let rank = group_rank.entry(command.group()).or_insert(command.order);
                    *rank = (*rank).min(command.order);
                }
                commands.sort_by_key(|c| (group_rank.get(c.group()).copied(), c.order));
            }
            CommandOrder::Name => commands.sort_by(|a, b| a.name().cmp(b.name())),
            CommandOrder::Text => {
                commands.sort_by(|a, b| a.text().cmp(b.text()).then(a.order.cmp(&b.order)))
            }
        }

        if direction == SortDirection::Descending {
            commands.reverse();
        }

        Enumeration { commands }
    }

    // ---- registration -------------------------------------------------

    /// Registers one command
    pub fn register(&mut self, definition: CommandDefinition) -> Result<(), CatalogError> {
        self.register_all([definition])
    }

    /// Registers a batch of commands; all names are validated first
    pub fn register_all(
        &mut self,
        definitions: impl IntoIterator<Item = CommandDefinition>,
    ) -> Result<(), CatalogError> {
        let definitions: Vec<CommandDefinition> = definitions.into_iter().collect();

        let mut seen = HashSet::new();
        for definition in &definitions {
            validator::validate_command_name(&definition.name)?;
            if self.commands.contains_key(&definition.name)
                || !seen.insert(definition.name.as_str())
            {
                return Err(CatalogError::DuplicateName(definition.name.clone()));
            }
        }

        let count = definitions.len();
        let start = self.commands.len();
        for (offset, definition) in definitions.into_iter().enumerate() {
            let command = Command::from_definition(definition, start + offset);
            self.commands.insert(command.name().to_string(), command);
        }

        self.reorder();
        self.change_count += 1;
        debug!(count, "commands registered");
        Ok(())
    }

    /// Reassigns display order: built-ins in registration order with clones
    /// directly after their namespace, then scripts by name and clone number
    fn reorder(&mut self) {
        let namespace_order: HashMap<String, usize> = self
            .commands
            .values()
            .filter(|c| !c.is_clone())
            .map(|c| (c.id.base().to_string(), c.order))
            .collect();

        let mut keys: Vec<(bool, usize, String, u32, String)> = self
            .commands
            .values()
            .map(|c| {
                let is_script = c.is_script();
                let (rank, base) = if is_script {
                    (0, c.id.base().to_string())
                } else {
                    let rank = namespace_order.get(c.id.base()).copied().unwrap_or(c.order);
                    (rank, String::new())
                };
                (is_script, rank, base, c.id.number(), c.name.clone())
            })
            .collect();
        keys.sort();

        for (index, (.., name)) in keys.into_iter().enumerate() {
            if let Some(command) = self.commands.get_mut(&name) {
                command.order = index;
            }
        }
    }

    // ---- bindings -----------------------------------------------------

    /// Replaces one binding slot of a command
    pub fn set_binding(&mut self, name: &str, binding: Binding) -> Result<(), CatalogError> {
        let command = self.get_mut(name)?;
        debug!(command = name, space = %binding.space(), value = %binding, "binding changed");
        command.bindings.set(binding);
        Ok(())
    }

    /// Replaces all three slots at once
    pub fn set_bindings(
        &mut self,
        name: &str,
        bindings: CommandBindings,
    ) -> Result<(), CatalogError> {
        let command = self.get_mut(name)?;
        command.bindings = bindings;
        Ok(())
    }

    pub fn set_key_gestures(
        &mut self,
        name: &str,
        keys: KeyGestureSet,
    ) -> Result<(), CatalogError> {
        self.set_binding(name, Binding::Keys(keys))
    }

    pub fn set_pointer_gesture(
        &mut self,
        name: &str,
        sequence: PointerGestureSequence,
    ) -> Result<(), CatalogError> {
        self.set_binding(name, Binding::Pointer(sequence))
    }

    pub fn set_touch_zones(&mut self, name: &str, zones: TouchZoneSet) -> Result<(), CatalogError> {
        self.set_binding(name, Binding::Touch(zones))
    }

    /// Changes the display text of a command
    pub fn set_text(&mut self, name: &str, text: &str) -> Result<(), CatalogError> {
        self.get_mut(name)?.text = text.to_string();
        Ok(())
    }

    // ---- conflicts ----------------------------------------------------

    /// Every other command bound to `gesture`, in display order
    ///
    /// A linear scan over the catalog; see `conflict_index` for bulk work.
    pub fn query_conflicts(&self, gesture: &Gesture, excluding: &str) -> Vec<String> {
        self.iter()
            .filter(|c| c.name() != excluding && c.bindings().binds(gesture))
            .map(|c| c.name().to_string())
            .collect()
    }

    /// Conflicts `binding` would have if it were assigned to `name`
    pub fn conflicts_for_binding(&self, name: &str, binding: &Binding) -> Vec<ConflictRecord> {
        binding
            .gestures()
            .into_iter()
            .filter_map(|gesture| {
                let commands = self.query_conflicts(&gesture, name);
                (!commands.is_empty()).then(|| ConflictRecord {
                    space: gesture.space(),
                    gesture,
                    commands,
                })
            })
            .collect()
    }

    /// Reverse index of the current bindings
    pub fn conflict_index(&self) -> ConflictIndex {
        ConflictIndex::from_catalog(self)
    }

    /// Keeps `gesture` on the commands in `keep` and unbinds it everywhere else
    ///
    /// Returns the names that lost the gesture.
    pub fn resolve_conflict(
        &mut self,
        gesture: &Gesture,
        keep: &[&str],
    ) -> Result<Vec<String>, CatalogError> {
        for name in keep {
            self.get(name)?;
        }

        let losers: Vec<String> = self
            .query_conflicts(gesture, "")
            .into_iter()
            .filter(|name| !keep.contains(&name.as_str()))
            .collect();

        for name in &losers {
            if let Some(command) = self.commands.get_mut(name) {
                command.bindings.remove_gesture(gesture);
            }
        }

        info!(%gesture, space = %gesture.space(), unbound = ?losers, "conflict resolved");
        Ok(losers)
    }

    // ---- parameters ---------------------------------------------------

    /// The command whose parameter storage backs `name`
    ///
    /// A dangling share link falls back to the command itself.
    fn parameter_owner(&self, name: &str) -> Result<&Command, CatalogError> {
        let command = self.get(name)?;
        match command.share_target.as_deref() {
            Some(target) => match self.commands.get(target) {
                Some(owner) => Ok(owner),
                None => {
                    warn!(command = name, target, "dangling share link, using own parameter");
                    Ok(command)
                }
            },
            None => Ok(command),
        }
    }

    /// Live parameter of a command, resolved through its share link
    pub fn parameter(&self, name: &str) -> Result<Option<&CommandParameter>, CatalogError> {
        Ok(self.parameter_source(name)?.map(ParameterSource::live))
    }

    /// Parameter source backing a command, resolved through its share link
    pub fn parameter_source(&self, name: &str) -> Result<Option<&ParameterSource>, CatalogError> {
        Ok(self.parameter_owner(name)?.parameter.as_ref())
    }

    fn owner_source_mut(&mut self, name: &str) -> Result<&mut ParameterSource, CatalogError> {
        let owner = self.parameter_owner(name)?.name().to_string();
        self.get_mut(&owner)?
            .parameter
            .as_mut()
            .ok_or_else(|| CatalogError::NoParameter(name.to_string()))
    }

    /// Writes the live parameter (through the share link)
    pub fn set_parameter(
        &mut self,
        name: &str,
        value: CommandParameter,
    ) -> Result<(), CatalogError> {
        let source = self.owner_source_mut(name)?;
        source.set_live(value).map_err(|rejected| CatalogError::ParameterMismatch {
            command: name.to_string(),
            expected: source.default_value().kind().to_string(),
            actual: rejected.kind().to_string(),
        })?;
        debug!(command = name, "parameter changed");
        Ok(())
    }

    /// Resets the live parameter to its default (through the share link)
    pub fn reset_parameter(&mut self, name: &str) -> Result<(), CatalogError> {
        self.owner_source_mut(name)?.reset();
        debug!(command = name, "parameter reset");
        Ok(())
    }

    /// Applies a new default parameter; see `ParameterSource::reconcile`
    pub fn reconcile_parameter(
        &mut self,
        name: &str,
        new_default: CommandParameter,
        force: bool,
    ) -> Result<bool, CatalogError> {
        let source = self.owner_source_mut(name)?;
        if !source.default_value().same_kind(&new_default) {
            return Err(CatalogError::ParameterMismatch {
                command: name.to_string(),
                expected: source.default_value().kind().to_string(),
                actual: new_default.kind().to_string(),
            });
        }
        Ok(source.reconcile(new_default, force))
    }

    // ---- sharing ------------------------------------------------------

    /// Makes `name` read and write the parameter of `target`
    ///
    /// `name` must own a parameter of the same kind as the owner's.
    /// Chains are flattened: sharing with a command that itself shares
    /// links to the final owner, and commands that shared with `name`
    /// are re-pointed to that owner.
    pub fn set_share(&mut self, name: &str, target: &str) -> Result<(), CatalogError> {
        self.get(name)?;
        let target_command = self
            .commands
            .get(target)
            .ok_or_else(|| CatalogError::ShareTargetMissing {
                command: name.to_string(),
                target: target.to_string(),
            })?;

        let owner = target_command
            .share_target
            .clone()
            .filter(|t| self.commands.contains_key(t))
            .unwrap_or_else(|| target.to_string());
        if owner == name {
            return Err(CatalogError::SelfShare(name.to_string()));
        }
        let Some(owned) = self.commands.get(&owner).and_then(|c| c.parameter.as_ref()) else {
            return Err(CatalogError::NoParameter(owner));
        };
        // The dependent falls back to its own source once the owner is gone
        let Some(own) = self.commands.get(name).and_then(|c| c.parameter.as_ref()) else {
            return Err(CatalogError::NoParameter(name.to_string()));
        };
        if !own.default_value().same_kind(owned.default_value()) {
            return Err(CatalogError::ParameterMismatch {
                command: name.to_string(),
                expected: own.default_value().kind().to_string(),
                actual: owned.default_value().kind().to_string(),
            });
        }

        for command in self.commands.values_mut() {
            if command.share_target.as_deref() == Some(name) {
                command.share_target = Some(owner.clone());
            }
        }
        if let Some(command) = self.commands.get_mut(name) {
            command.share_target = Some(owner.clone());
        }

        debug!(command = name, owner, "parameter shared");
        Ok(())
    }

    /// Gives `name` back its own parameter storage
    pub fn clear_share(&mut self, name: &str) -> Result<(), CatalogError> {
        self.get_mut(name)?.share_target = None;
        Ok(())
    }

    /// Unshares every command that pointed at one of `removed`
    fn detach_shares_to(&mut self, removed: &[String]) {
        for command in self.commands.values_mut() {
            let dangling = command
                .share_target
                .as_ref()
                .is_some_and(|target| removed.contains(target));
            if dangling {
                warn!(
                    command = command.name(),
                    target = command.share_target.as_deref().unwrap_or_default(),
                    "share target removed, command is now unshared"
                );
                command.share_target = None;
            }
        }
    }

    // ---- clones -------------------------------------------------------

    fn next_clone_name(&self, base: &str) -> CommandName {
        let mut number = 2;
        loop {
            let name = CommandName::clone_of(base, number);
            if !self.commands.contains_key(&name.to_string()) {
                return name;
            }
            number += 1;
        }
    }

    /// Default parameter for a new clone of `source`
    fn clone_parameter(&self, source: &Command) -> Option<CommandParameter> {
        source
            .parameter
            .as_ref()
            .or_else(|| {
                source
                    .share_target
                    .as_deref()
                    .and_then(|target| self.commands.get(target))
                    .and_then(|owner| owner.parameter.as_ref())
            })
            .map(|parameter| parameter.default_value().clone())
    }

    fn build_clone(&self, source: &str, id: Option<CommandName>) -> Result<Command, CatalogError> {
        let command = self.get(source)?;
        if command.is_clone() {
            return Err(CatalogError::InvalidClone {
                name: source.to_string(),
                reason: "a clone cannot be cloned".to_string(),
            });
        }
        if !command.cloneable {
            return Err(CatalogError::InvalidClone {
                name: source.to_string(),
                reason: "command is not cloneable".to_string(),
            });
        }

        let id = id.unwrap_or_else(|| self.next_clone_name(command.id.base()));
        Ok(command.clone_as(id, self.clone_parameter(command)))
    }

    /// Creates a clone of `source`; returns the clone's name
    pub fn create_clone(&mut self, source: &str) -> Result<String, CatalogError> {
        let clone = self.build_clone(source, None)?;
        let name = clone.name().to_string();

        self.commands.insert(name.clone(), clone);
        self.reorder();
        self.change_count += 1;

        info!(source, clone = %name, "clone created");
        Ok(name)
    }

    /// Removes a clone; originals cannot be removed this way
    pub fn remove_clone(&mut self, name: &str) -> Result<(), CatalogError> {
        if !self.get(name)?.is_clone() {
            return Err(CatalogError::InvalidClone {
                name: name.to_string(),
                reason: "only clones can be removed".to_string(),
            });
        }

        self.commands.remove(name);
        self.detach_shares_to(&[name.to_string()]);
        self.reorder();
        self.change_count += 1;

        info!(clone = name, "clone removed");
        Ok(())
    }

    // ---- snapshots ----------------------------------------------------

    /// Snapshot of the live catalog
    ///
    /// Shared commands persist no parameter; their owner does.
    pub fn create_memento(&self) -> CommandCollection {
        self.commands
            .values()
            .map(|command| {
                let shared = command
                    .share_target
                    .as_deref()
                    .is_some_and(|t| self.commands.contains_key(t));
                let parameter = if shared {
                    None
                } else {
                    command.parameter.as_ref().map(ParameterSource::live)
                };
                (
                    command.name().to_string(),
                    CommandMemento::capture(&command.bindings, parameter),
                )
            })
            .collect()
    }

    /// The defaults of an input scheme; never touches the live catalog
    pub fn generate_defaults(&self, scheme: InputScheme) -> CommandCollection {
        let mut collection = self.default_memento.clone();
        scheme.apply(&mut collection);
        collection
    }

    /// Overwrites bindings and parameters from a snapshot
    ///
    /// Only names present in both the catalog and the snapshot are touched.
    /// Snapshot-only names are skipped, except `Base:N` entries of cloneable
    /// commands, which are recreated as clones. Malformed fields are
    /// recovered one by one (bindings become unbound, parameters keep their
    /// live value).
    pub fn restore(&mut self, collection: &CommandCollection) -> RestoreReport {
        let mut collection = collection.clone();
        let mut report = RestoreReport {
            renamed: collection.apply_renames(&self.obsolete_commands),
            ..RestoreReport::default()
        };

        for (name, memento) in collection.iter() {
            if !self.commands.contains_key(name) {
                let id = CommandName::parse(name);
                let recreated = id.is_clone()
                    && self
                        .build_clone(id.base(), Some(id.clone()))
                        .map(|clone| self.commands.insert(name.to_string(), clone))
                        .is_ok();

                if recreated {
                    report.created_clones.push(name.to_string());
                } else {
                    debug!(command = name, "snapshot entry has no matching command, skipped");
                    report.skipped.push(name.to_string());
                    continue;
                }
            }

            report.recovered.extend(self.restore_command(name, memento));
            report.applied.push(name.to_string());
        }

        if !report.created_clones.is_empty() {
            self.reorder();
        }
        self.change_count += 1;

        info!(
            applied = report.applied.len(),
            skipped = report.skipped.len(),
            recovered = report.recovered.len(),
            "snapshot restored"
        );
        report
    }

    /// Decodes every field first, then writes the command in one step
    fn restore_command(&mut self, name: &str, memento: &CommandMemento) -> Vec<RecoveredField> {
        let mut recovered = Vec::new();
        let mut recover = |space: Option<GestureSpace>, message: String| {
            warn!(command = name, space = ?space, %message, "malformed snapshot field recovered");
            recovered.push(RecoveredField {
                command: name.to_string(),
                space,
                message,
            });
        };

        let keys = memento.decode_keys().unwrap_or_else(|e| {
            recover(Some(GestureSpace::Key), e.to_string());
            KeyGestureSet::empty()
        });
        let pointer = memento.decode_pointer().unwrap_or_else(|e| {
            recover(Some(GestureSpace::Pointer), e.to_string());
            PointerGestureSequence::empty()
        });
        let touch = memento.decode_touch().unwrap_or_else(|e| {
            recover(Some(GestureSpace::Touch), e.to_string());
            TouchZoneSet::empty()
        });
        let parameter = match memento.decode_parameter() {
            Ok(parameter) => parameter,
            Err(e) => {
                recover(None, e.to_string());
                None
            }
        };

        let Some(command) = self.commands.get_mut(name) else {
            return recovered;
        };
        command.bindings = CommandBindings::new(keys, pointer, touch);

        let shared = command.share_target.is_some();
        if let (Some(parameter), Some(source), false) =
            (parameter, command.parameter.as_mut(), shared)
        {
            if let Err(rejected) = source.set_live(parameter) {
                recover(
                    None,
                    format!(
                        "parameter is {}, expected {}",
                        rejected.kind(),
                        source.default_value().kind()
                    ),
                );
            }
        }

        recovered
    }

    // ---- dispatch -----------------------------------------------------

    fn context<'a>(&'a self, command: &'a Command, args: &'a CommandArgs) -> CommandContext<'a> {
        let parameter = self
            .parameter_owner(command.name())
            .ok()
            .and_then(|owner| owner.parameter.as_ref())
            .map(ParameterSource::live);

        CommandContext {
            command: command.name(),
            parameter,
            args,
        }
    }

    /// Side-effect-free executability check
    pub fn can_execute(&self, name: &str, args: &CommandArgs) -> Result<bool, CatalogError> {
        let command = self.get(name)?;
        Ok(command.action.can_execute(&self.context(command, args)))
    }

    /// Runs a command's action
    pub fn execute(&self, name: &str, args: &CommandArgs) -> Result<(), CatalogError> {
        let command = self.get(name)?;
        let context = self.context(command, args);

        if !command.action.can_execute(&context) {
            return Err(CatalogError::NotExecutable(name.to_string()));
        }

        debug!(command = name, by_menu = args.by_menu, "executing");
        command
            .action
            .execute(&context)
            .map_err(|source| CatalogError::ActionFailed {
                name: name.to_string(),
                source,
            })
    }

    // ---- scripts ------------------------------------------------------

    fn script_action(&self, path: &Path) -> Rc<dyn CommandAction> {
        Rc::new(ScriptAction::new(path.to_path_buf(), self.script_runner.clone()))
    }

    fn script_command(&self, name: &str, path: &Path, declaration: &ScriptDeclaration) -> Command {
        let mut definition = CommandDefinition::new(
            name,
            SCRIPT_GROUP,
            &declaration.text,
            self.script_action(path),
        )
        .with_bindings(declaration.bindings.clone())
        .with_parameter(declaration.default_parameter())
        .with_remarks(&declaration.remarks);
        definition.cloneable = declaration.cloneable;

        let mut command = Command::from_definition(definition, self.commands.len());
        command.kind = CommandKind::Script(ScriptBacking::new(
            path.to_path_buf(),
            declaration.bindings.clone(),
        ));
        command
    }

    /// Refreshes one script command (original or clone) from a declaration
    ///
    /// Bindings follow the declaration when forced, or when an original
    /// still carries the previously declared defaults. Clones keep their
    /// own bindings unless forced.
    fn refresh_script_command(command: &mut Command, declaration: &ScriptDeclaration, force: bool) {
        let is_clone = command.id.is_clone();

        command.cloneable = declaration.cloneable && !is_clone;
        command.remarks = declaration.remarks.clone();
        command.text = if is_clone {
            format!("{} {}", declaration.text, command.id.number())
        } else {
            declaration.text.clone()
        };

        if let CommandKind::Script(backing) = &mut command.kind {
            let default_bound = !is_clone && command.bindings == *backing.default_bindings();
            if force || default_bound {
                command.bindings = declaration.bindings.clone();
            }
            if !is_clone {
                backing.set_default_bindings(declaration.bindings.clone());
            }
        }

        if let Some(source) = command.parameter.as_mut() {
            source.reconcile(declaration.default_parameter(), force);
        }
    }

    /// Reconciles one script command with a (re-read) declaration
    pub fn reconcile_script_command(
        &mut self,
        name: &str,
        declaration: &ScriptDeclaration,
        force: bool,
    ) -> Result<(), CatalogError> {
        let command = self.get_mut(name)?;
        if !command.is_script() {
            return Err(CatalogError::NotFound(name.to_string()));
        }
        Self::refresh_script_command(command, declaration, force);
        Ok(())
    }

    /// Applies a folder scan in one batch
    ///
    /// Scripts whose file disappeared are removed (with their clones),
    /// known scripts are refreshed, new scripts are added default-bound.
    /// Scripts listed as unreadable are left untouched.
    pub fn apply_script_scan(
        &mut self,
        scan: ScriptScan,
        refresh: ScriptRefresh,
    ) -> ScriptRefreshReport {
        let mut report = ScriptRefreshReport::default();

        let scanned: HashSet<&Path> = scan
            .entries
            .iter()
            .map(|e| e.path.as_path())
            .chain(scan.unreadable.iter().map(PathBuf::as_path))
            .collect();
        let mut removed: Vec<String> = self
            .commands
            .values()
            .filter(|c| {
                c.script_path()
                    .is_some_and(|path| refresh.replace || !scanned.contains(path))
            })
            .map(|c| c.name().to_string())
            .collect();
        removed.sort();

        for name in &removed {
            self.commands.remove(name);
        }
        self.detach_shares_to(&removed);
        report.removed = removed;

        for entry in &scan.entries {
            let existing: Vec<String> = self
                .commands
                .values()
                .filter(|c| c.script_path() == Some(entry.path.as_path()))
                .map(|c| c.name().to_string())
                .collect();

            if !existing.is_empty() {
                for name in existing {
                    if let Some(command) = self.commands.get_mut(&name) {
                        Self::refresh_script_command(command, &entry.declaration, refresh.force);
                    }
                    report.updated.push(name);
                }
                continue;
            }

            let Some(name) = script_command_name(&entry.path) else {
                warn!(script = %entry.path.display(), "script file has no usable name");
                report.skipped.push(entry.path.display().to_string());
                continue;
            };
            if let Err(e) = validator::validate_command_name(&name) {
                warn!(script = %entry.path.display(), error = %e, "invalid script command name");
                report.skipped.push(name);
                continue;
            }
            if self.commands.contains_key(&name) {
                warn!(
                    script = %entry.path.display(),
                    command = %name,
                    "command name already in use"
                );
                report.skipped.push(name);
                continue;
            }

            let command = self.script_command(&name, &entry.path, &entry.declaration);
            self.commands.insert(name.clone(), command);
            report.added.push(name);
        }

        report.updated.sort();
        self.reorder();
        self.change_count += 1;

        info!(
            added = report.added.len(),
            updated = report.updated.len(),
            removed = report.removed.len(),
            "script commands refreshed"
        );
        report
    }
}

impl Default for CommandCatalog {
    fn default() -> Self {
        Self::new()
    }
}
