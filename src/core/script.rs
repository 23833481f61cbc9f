//! Script-backed commands
//!
//! A script file declares its command metadata in a leading comment block:
//!
//! ```text
//! // @name        Open in editor
//! // @description Opens the current page in the external editor
//! // @shortcutkey Ctrl+Shift+E
//! // @mousegesture UR
//! // @touchgesture TouchCenter
//! // @args        --new-window
//! // @cloneable
//! ```
//!
//! The declared gestures are the script command's *default* bindings. The
//! catalog remembers them per command so a later scan can tell whether the
//! user customised the bindings (see `ScriptBindingState`).

use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::warn;

use crate::core::command::{CommandAction, CommandContext};
use crate::core::gesture::{CommandBindings, GestureSpace};
use crate::core::parameter::CommandParameter;
use crate::core::parser::{self, ScriptHeader};

/// Prefix of every script command name
pub const SCRIPT_PREFIX: &str = "Script_";

/// Group shown for script commands
pub const SCRIPT_GROUP: &str = "Script";

/// Command name for a script file: `Script_<file stem>`
pub fn script_command_name(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    if stem.is_empty() {
        return None;
    }
    Some(format!("{}{}", SCRIPT_PREFIX, stem))
}

/// Metadata declared in a script file's header
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScriptDeclaration {
    /// Display text (`@name`, falls back to the file stem)
    pub text: String,
    /// `@description`
    pub remarks: String,
    /// Declared default bindings
    pub bindings: CommandBindings,
    /// Declared default argument (`@args`)
    pub args: Option<String>,
    /// `@cloneable`
    pub cloneable: bool,
}

impl ScriptDeclaration {
    /// Reads the declaration from a parsed header
    ///
    /// Malformed gesture tags are logged and leave that slot unbound; the
    /// rest of the declaration is still used.
    pub fn from_header(header: &ScriptHeader, path: &Path) -> Self {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        let mut declaration = Self {
            text: header
                .get("name")
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .unwrap_or(stem),
            remarks: header.get("description").unwrap_or_default().to_string(),
            args: header
                .get("args")
                .filter(|args| !args.is_empty())
                .map(str::to_string),
            cloneable: header.get("cloneable").is_some_and(parse_flag),
            ..Self::default()
        };

        if let Some(keys) = header.get("shortcutkey") {
            match keys.parse() {
                Ok(keys) => declaration.bindings.keys = keys,
                Err(e) => warn_malformed(path, GestureSpace::Key, &e),
            }
        }
        if let Some(pointer) = header.get("mousegesture") {
            match pointer.parse() {
                Ok(pointer) => declaration.bindings.pointer = pointer,
                Err(e) => warn_malformed(path, GestureSpace::Pointer, &e),
            }
        }
        if let Some(touch) = header.get("touchgesture") {
            match touch.parse() {
                Ok(touch) => declaration.bindings.touch = touch,
                Err(e) => warn_malformed(path, GestureSpace::Touch, &e),
            }
        }

        declaration
    }

    /// Parses the header of `content` and reads the declaration from it
    pub fn parse(content: &str, path: &Path) -> Self {
        Self::from_header(&parser::parse_script_header(content), path)
    }

    /// Default parameter of a command built from this declaration
    pub fn default_parameter(&self) -> CommandParameter {
        CommandParameter::Script {
            argument: self.args.clone(),
        }
    }
}

/// A bare `@cloneable` tag counts as true
fn parse_flag(value: &str) -> bool {
    !matches!(value.trim().to_ascii_lowercase().as_str(), "false" | "0" | "no")
}

fn warn_malformed(path: &Path, space: GestureSpace, error: &dyn std::error::Error) {
    warn!(
        script = %path.display(),
        %space,
        %error,
        "malformed gesture declaration, slot left unbound"
    );
}

/// One discovered script file
#[derive(Clone, Debug, PartialEq)]
pub struct ScriptEntry {
    pub path: PathBuf,
    pub declaration: ScriptDeclaration,
}

/// Result of one folder scan, applied to the catalog in a single batch
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScriptScan {
    pub entries: Vec<ScriptEntry>,
    /// Script files that exist but could not be read; their commands are kept
    pub unreadable: Vec<PathBuf>,
}

/// How a scan batch is applied
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ScriptRefresh {
    /// Overwrite user customisations with the declared defaults
    pub force: bool,
    /// Drop every script command before applying the batch
    pub replace: bool,
}

/// Where a script command's bindings stand relative to its declaration
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScriptBindingState {
    /// Bindings equal the last declared defaults
    DefaultBound,
    /// The user changed at least one slot
    Customized,
}

/// Script-specific state of a command
#[derive(Clone, Debug, PartialEq)]
pub struct ScriptBacking {
    path: PathBuf,
    /// Defaults captured at the last reconciliation (empty for clones)
    default_bindings: CommandBindings,
}

impl ScriptBacking {
    pub fn new(path: PathBuf, default_bindings: CommandBindings) -> Self {
        Self {
            path,
            default_bindings,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn default_bindings(&self) -> &CommandBindings {
        &self.default_bindings
    }

    pub(crate) fn set_default_bindings(&mut self, bindings: CommandBindings) {
        self.default_bindings = bindings;
    }

    pub(crate) fn for_clone(&self) -> Self {
        Self::new(self.path.clone(), CommandBindings::default())
    }

    pub fn state_of(&self, bindings: &CommandBindings) -> ScriptBindingState {
        if *bindings == self.default_bindings {
            ScriptBindingState::DefaultBound
        } else {
            ScriptBindingState::Customized
        }
    }
}

/// Host boundary that actually runs a script
pub trait ScriptRunner {
    fn run(&self, path: &Path, command: &str, argument: Option<&str>) -> anyhow::Result<()>;
}

/// Dispatch adapter from a script command to the host's runner
pub struct ScriptAction {
    path: PathBuf,
    runner: Option<Rc<dyn ScriptRunner>>,
}

impl ScriptAction {
    pub fn new(path: PathBuf, runner: Option<Rc<dyn ScriptRunner>>) -> Self {
        Self { path, runner }
    }
}

impl CommandAction for ScriptAction {
    fn can_execute(&self, _context: &CommandContext<'_>) -> bool {
        self.runner.is_some()
    }

    fn execute(&self, context: &CommandContext<'_>) -> anyhow::Result<()> {
        let Some(runner) = &self.runner else {
            anyhow::bail!("no script runner available for {}", self.path.display());
        };

        let argument = match context.parameter {
            Some(CommandParameter::Script { argument }) => argument.as_deref(),
            _ => None,
        };

        runner.run(&self.path, context.command, argument)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_command_name_uses_stem() {
        assert_eq!(
            script_command_name(Path::new("/x/scripts/Foo.nvjs")),
            Some("Script_Foo".to_string())
        );
        assert_eq!(script_command_name(Path::new("/")), None);
    }

    #[test]
    fn test_flag_values() {
        assert!(parse_flag(""));
        assert!(parse_flag("true"));
        assert!(!parse_flag("False"));
        assert!(!parse_flag("0"));
    }

    #[test]
    fn test_backing_state() {
        let defaults = CommandBindings::parse("Ctrl+Shift+F", "", "").unwrap();
        let backing = ScriptBacking::new(PathBuf::from("Foo.nvjs"), defaults.clone());

        assert_eq!(backing.state_of(&defaults), ScriptBindingState::DefaultBound);
        assert_eq!(
            backing.state_of(&CommandBindings::default()),
            ScriptBindingState::Customized
        );
    }
}
