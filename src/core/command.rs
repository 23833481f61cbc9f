//! Command entries and the dispatch interface
//!
//! A `Command` is identity + display metadata + one binding per gesture
//! space + an optional parameter source + an optional share link. The
//! behaviour behind a command is reached only through the `CommandAction`
//! trait, so the catalog never depends on concrete action types.

use std::fmt;
use std::path::Path;
use std::rc::Rc;

use crate::core::gesture::CommandBindings;
use crate::core::parameter::{CommandParameter, ParameterSource};
use crate::core::script::{ScriptBacking, ScriptBindingState};

/// Command identity: base name plus clone number
///
/// Originals render as the bare base name (`ViewScrollUp`), clones as
/// `Base:N` with `N >= 2` (`ViewScrollUp:2`).
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CommandName {
    base: String,
    number: u32,
}

impl CommandName {
    /// Name of an original (non-clone) command
    pub fn new(base: &str) -> Self {
        Self {
            base: base.to_string(),
            number: 0,
        }
    }

    /// Name of clone number `number` in `base`'s namespace
    pub fn clone_of(base: &str, number: u32) -> Self {
        Self {
            base: base.to_string(),
            number,
        }
    }

    /// Splits `Base:N` into its parts; anything else is an original name
    ///
    /// Only the canonical spelling is a clone: `View:02` or `View:+2`
    /// stay original names so that a name always renders back to itself.
    pub fn parse(full_name: &str) -> Self {
        if let Some((base, suffix)) = full_name.rsplit_once(':') {
            if let Ok(number) = suffix.parse::<u32>() {
                let id = Self::clone_of(base, number);
                if number >= 2 && !base.is_empty() && id.to_string() == full_name {
                    return id;
                }
            }
        }
        Self::new(full_name)
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Clone number (0 for originals)
    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn is_clone(&self) -> bool {
        self.number >= 2
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clone() {
            write!(f, "{}:{}", self.base, self.number)
        } else {
            write!(f, "{}", self.base)
        }
    }
}

/// Caller-supplied invocation arguments
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommandArgs {
    /// Positional arguments (e.g. from a script call)
    pub args: Vec<String>,
    /// True when invoked from a menu rather than a gesture
    pub by_menu: bool,
}

/// Everything an action sees when it is asked to run
#[derive(Clone, Copy, Debug)]
pub struct CommandContext<'a> {
    /// Full name of the command being dispatched
    pub command: &'a str,
    /// Live parameter, resolved through any share link
    pub parameter: Option<&'a CommandParameter>,
    pub args: &'a CommandArgs,
}

/// Behaviour behind a command
///
/// `can_execute` must be free of side effects.
pub trait CommandAction {
    fn can_execute(&self, _context: &CommandContext<'_>) -> bool {
        true
    }

    fn execute(&self, context: &CommandContext<'_>) -> anyhow::Result<()>;
}

/// Placeholder for commands whose behaviour the host has not supplied
#[derive(Clone, Copy, Debug, Default)]
pub struct UnboundAction;

impl CommandAction for UnboundAction {
    fn can_execute(&self, _context: &CommandContext<'_>) -> bool {
        false
    }

    fn execute(&self, context: &CommandContext<'_>) -> anyhow::Result<()> {
        anyhow::bail!("no action bound to '{}'", context.command)
    }
}

/// Everything needed to register a command
pub struct CommandDefinition {
    pub name: String,
    pub group: String,
    pub text: String,
    pub remarks: String,
    pub bindings: CommandBindings,
    pub parameter: Option<CommandParameter>,
    pub cloneable: bool,
    pub action: Rc<dyn CommandAction>,
}

impl CommandDefinition {
    pub fn new(name: &str, group: &str, text: &str, action: Rc<dyn CommandAction>) -> Self {
        Self {
            name: name.to_string(),
            group: group.to_string(),
            text: text.to_string(),
            remarks: String::new(),
            bindings: CommandBindings::default(),
            parameter: None,
            cloneable: false,
            action,
        }
    }

    pub fn with_bindings(mut self, bindings: CommandBindings) -> Self {
        self.bindings = bindings;
        self
    }

    pub fn with_parameter(mut self, parameter: CommandParameter) -> Self {
        self.parameter = Some(parameter);
        self
    }

    pub fn with_remarks(mut self, remarks: &str) -> Self {
        self.remarks = remarks.to_string();
        self
    }

    pub fn cloneable(mut self) -> Self {
        self.cloneable = true;
        self
    }
}

impl fmt::Debug for CommandDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDefinition")
            .field("name", &self.name)
            .field("group", &self.group)
            .field("bindings", &self.bindings)
            .field("parameter", &self.parameter)
            .field("cloneable", &self.cloneable)
            .finish_non_exhaustive()
    }
}

/// Where a command comes from
#[derive(Clone, Debug, PartialEq)]
pub enum CommandKind {
    /// Part of the application's fixed table
    BuiltIn,
    /// Backed by a script file discovered on disk
    Script(ScriptBacking),
}

/// One entry of the catalog
///
/// Bindings and parameters are mutated only through `CommandCatalog`
/// setters; this type exposes read access.
pub struct Command {
    pub(crate) id: CommandName,
    pub(crate) name: String,
    pub(crate) group: String,
    pub(crate) text: String,
    pub(crate) remarks: String,
    pub(crate) bindings: CommandBindings,
    pub(crate) parameter: Option<ParameterSource>,
    pub(crate) share_target: Option<String>,
    pub(crate) cloneable: bool,
    pub(crate) kind: CommandKind,
    pub(crate) order: usize,
    pub(crate) action: Rc<dyn CommandAction>,
}

impl Command {
    pub(crate) fn from_definition(definition: CommandDefinition, order: usize) -> Self {
        let id = CommandName::new(&definition.name);
        Self {
            name: id.to_string(),
            id,
            group: definition.group,
            text: definition.text,
            remarks: definition.remarks,
            bindings: definition.bindings,
            parameter: definition.parameter.map(ParameterSource::new),
            share_target: None,
            cloneable: definition.cloneable,
            kind: CommandKind::BuiltIn,
            order,
            action: definition.action,
        }
    }

    /// Builds a clone: same behaviour and display text, empty bindings,
    /// a fresh unshared parameter source, never itself cloneable
    pub(crate) fn clone_as(
        &self,
        id: CommandName,
        parameter_default: Option<CommandParameter>,
    ) -> Self {
        let kind = match &self.kind {
            CommandKind::BuiltIn => CommandKind::BuiltIn,
            CommandKind::Script(backing) => CommandKind::Script(backing.for_clone()),
        };

        Self {
            name: id.to_string(),
            text: format!("{} {}", self.text, id.number()),
            id,
            group: self.group.clone(),
            remarks: self.remarks.clone(),
            bindings: CommandBindings::default(),
            parameter: parameter_default.map(ParameterSource::new),
            share_target: None,
            cloneable: false,
            kind,
            order: self.order,
            action: Rc::clone(&self.action),
        }
    }

    /// Full name (`Base` or `Base:N`)
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn command_name(&self) -> &CommandName {
        &self.id
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn remarks(&self) -> &str {
        &self.remarks
    }

    pub fn bindings(&self) -> &CommandBindings {
        &self.bindings
    }

    /// This command's own parameter source (inert while shared)
    pub fn own_parameter(&self) -> Option<&ParameterSource> {
        self.parameter.as_ref()
    }

    pub fn share_target(&self) -> Option<&str> {
        self.share_target.as_deref()
    }

    pub fn is_cloneable(&self) -> bool {
        self.cloneable
    }

    pub fn is_clone(&self) -> bool {
        self.id.is_clone()
    }

    pub fn kind(&self) -> &CommandKind {
        &self.kind
    }

    pub fn is_script(&self) -> bool {
        matches!(self.kind, CommandKind::Script(_))
    }

    pub fn script_path(&self) -> Option<&Path> {
        match &self.kind {
            CommandKind::Script(backing) => Some(backing.path()),
            CommandKind::BuiltIn => None,
        }
    }

    /// Whether a script command still carries its declared default bindings
    pub fn script_state(&self) -> Option<ScriptBindingState> {
        match &self.kind {
            CommandKind::Script(backing) => Some(backing.state_of(&self.bindings)),
            CommandKind::BuiltIn => None,
        }
    }

    /// Position in the stable display order
    pub fn order(&self) -> usize {
        self.order
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("group", &self.group)
            .field("text", &self.text)
            .field("bindings", &self.bindings)
            .field("parameter", &self.parameter)
            .field("share_target", &self.share_target)
            .field("cloneable", &self.cloneable)
            .field("kind", &self.kind)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}
