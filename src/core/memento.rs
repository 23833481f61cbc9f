//! Serializable catalog snapshots
//!
//! A `CommandCollection` maps command names to `CommandMemento`s. Gesture
//! fields are stored as their canonical strings and the parameter as raw
//! JSON, so a damaged field can be recovered on its own when restoring
//! instead of failing the whole document.
//!
//! Unknown fields are ignored and missing fields take their defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::command::CommandName;
use crate::core::gesture::{
    CommandBindings, KeyGesture, KeyGestureSet, PointerGestureSequence, TouchZoneSet,
};
use crate::core::parameter::{CommandParameter, PARAMETER_VERSION};
use crate::core::parser::GestureParseError;

/// Decoding failure of one memento field
#[derive(Debug, Error)]
pub enum MementoError {
    #[error(transparent)]
    Gesture(#[from] GestureParseError),

    #[error("Parameter version {found} is newer than supported version {supported}")]
    UnsupportedParameterVersion { found: u32, supported: u32 },

    #[error("Undecodable parameter: {0}")]
    Parameter(#[from] serde_json::Error),
}

/// Persisted state of one command
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommandMemento {
    pub key_gestures: Vec<String>,
    pub pointer_gesture: String,
    pub touch_zones: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<serde_json::Value>,
    pub parameter_version: u32,
}

impl CommandMemento {
    /// Captures bindings and (unless shared) the live parameter
    pub fn capture(bindings: &CommandBindings, parameter: Option<&CommandParameter>) -> Self {
        Self {
            key_gestures: bindings.keys.iter().map(|g| g.to_string()).collect(),
            pointer_gesture: bindings.pointer.to_string(),
            touch_zones: bindings.touch.iter().map(|z| z.to_string()).collect(),
            parameter: parameter.and_then(|p| serde_json::to_value(p).ok()),
            parameter_version: PARAMETER_VERSION,
        }
    }

    /// Replaces the key list from a comma-separated string
    pub fn set_key_gestures(&mut self, keys: &str) {
        self.key_gestures = keys
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect();
    }

    pub fn decode_keys(&self) -> Result<KeyGestureSet, GestureParseError> {
        let gestures = self
            .key_gestures
            .iter()
            .map(|g| g.parse::<KeyGesture>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(KeyGestureSet::new(gestures))
    }

    pub fn decode_pointer(&self) -> Result<PointerGestureSequence, GestureParseError> {
        self.pointer_gesture.parse()
    }

    pub fn decode_touch(&self) -> Result<TouchZoneSet, GestureParseError> {
        self.touch_zones.join(",").parse()
    }

    /// Decodes the stored parameter, if any
    pub fn decode_parameter(&self) -> Result<Option<CommandParameter>, MementoError> {
        let Some(value) = &self.parameter else {
            return Ok(None);
        };

        if self.parameter_version > PARAMETER_VERSION {
            return Err(MementoError::UnsupportedParameterVersion {
                found: self.parameter_version,
                supported: PARAMETER_VERSION,
            });
        }

        Ok(Some(serde_json::from_value(value.clone())?))
    }
}

/// A retired command name and what replaced it
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ObsoleteCommand {
    pub obsolete: &'static str,
    /// None when the command was removed without replacement
    pub replacement: Option<&'static str>,
    /// Release in which the rename happened
    pub version: u32,
}

/// Ordered mapping of command name → memento
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CommandCollection {
    commands: BTreeMap<String, CommandMemento>,
}

impl CommandCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, memento: CommandMemento) -> Option<CommandMemento> {
        self.commands.insert(name.to_string(), memento)
    }

    pub fn get(&self, name: &str) -> Option<&CommandMemento> {
        self.commands.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut CommandMemento> {
        self.commands.get_mut(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<CommandMemento> {
        self.commands.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CommandMemento)> {
        self.commands.iter().map(|(name, memento)| (name.as_str(), memento))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    /// Moves entries stored under retired names to their replacements
    ///
    /// Clone suffixes survive the rename (`TogglePagemark:2` becomes
    /// `TogglePlaylistItem:2`). Retired names without a replacement are
    /// dropped. An entry already present under the new name wins. Returns
    /// `(old, new)` pairs; `new` is empty for dropped entries.
    pub fn apply_renames(&mut self, obsolete: &[ObsoleteCommand]) -> Vec<(String, String)> {
        let mut renamed = Vec::new();

        let stale: Vec<String> = self
            .commands
            .keys()
            .filter(|name| {
                let base = CommandName::parse(name);
                obsolete.iter().any(|o| o.obsolete == base.base())
            })
            .cloned()
            .collect();

        for old_name in stale {
            let Some(memento) = self.commands.remove(&old_name) else {
                continue;
            };
            let id = CommandName::parse(&old_name);
            let Some(entry) = obsolete.iter().find(|o| o.obsolete == id.base()) else {
                continue;
            };

            match entry.replacement {
                Some(replacement) => {
                    let new_name = if id.is_clone() {
                        CommandName::clone_of(replacement, id.number()).to_string()
                    } else {
                        replacement.to_string()
                    };
                    self.commands.entry(new_name.clone()).or_insert(memento);
                    renamed.push((old_name, new_name));
                }
                None => renamed.push((old_name, String::new())),
            }
        }

        renamed
    }
}

impl FromIterator<(String, CommandMemento)> for CommandCollection {
    fn from_iter<T: IntoIterator<Item = (String, CommandMemento)>>(iter: T) -> Self {
        Self {
            commands: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RENAMES: &[ObsoleteCommand] = &[
        ObsoleteCommand {
            obsolete: "TogglePagemark",
            replacement: Some("TogglePlaylistItem"),
            version: 39,
        },
        ObsoleteCommand {
            obsolete: "ToggleVisibleTitleBar",
            replacement: None,
            version: 39,
        },
    ];

    #[test]
    fn test_missing_fields_use_defaults() {
        let memento: CommandMemento =
            serde_json::from_str(r#"{"keyGestures":["Ctrl+O"],"future":1}"#).unwrap();

        assert_eq!(memento.key_gestures, vec!["Ctrl+O".to_string()]);
        assert_eq!(memento.pointer_gesture, "");
        assert!(memento.parameter.is_none());
    }

    #[test]
    fn test_capture_round_trip() {
        let bindings = CommandBindings::parse("Ctrl+O,F2", "UR", "TouchL1").unwrap();
        let memento = CommandMemento::capture(&bindings, None);

        assert_eq!(memento.decode_keys().unwrap(), bindings.keys);
        assert_eq!(memento.decode_pointer().unwrap(), bindings.pointer);
        assert_eq!(memento.decode_touch().unwrap(), bindings.touch);
    }

    #[test]
    fn test_newer_parameter_version_is_rejected() {
        let memento = CommandMemento {
            parameter: Some(serde_json::json!({"Type": "MovePage", "Value": {"size": 2}})),
            parameter_version: PARAMETER_VERSION + 1,
            ..CommandMemento::default()
        };

        assert!(matches!(
            memento.decode_parameter(),
            Err(MementoError::UnsupportedParameterVersion { .. })
        ));
    }

    #[test]
    fn test_renames_keep_clone_suffix() {
        let mut collection = CommandCollection::new();
        collection.insert("TogglePagemark", CommandMemento::default());
        collection.insert("TogglePagemark:2", CommandMemento::default());
        collection.insert("ToggleVisibleTitleBar", CommandMemento::default());

        let renamed = collection.apply_renames(RENAMES);

        assert_eq!(renamed.len(), 3);
        assert!(collection.contains("TogglePlaylistItem"));
        assert!(collection.contains("TogglePlaylistItem:2"));
        assert!(!collection.contains("ToggleVisibleTitleBar"));
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn test_serialises_as_plain_object() {
        let mut collection = CommandCollection::new();
        collection.insert("NextPage", CommandMemento::default());

        let value = serde_json::to_value(&collection).unwrap();
        assert!(value["NextPage"].is_object());
    }
}
