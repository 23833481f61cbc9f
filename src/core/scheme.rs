//! Input schemes: named presets of default key bindings
//!
//! Every scheme starts from the built-in defaults and overrides a few key
//! slots. Pointer and touch defaults are the same in all schemes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::memento::CommandCollection;

/// Named default binding preset
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum InputScheme {
    /// Standard layout
    #[default]
    TypeA,
    /// Wheel turns pages, right click opens the context menu
    TypeB,
    /// Clicks turn pages, wheel scrolls the view
    TypeC,
}

impl InputScheme {
    pub const ALL: [InputScheme; 3] = [InputScheme::TypeA, InputScheme::TypeB, InputScheme::TypeC];

    /// `(command, keys)` overrides applied on top of the built-in defaults
    pub fn key_overrides(self) -> &'static [(&'static str, &'static str)] {
        match self {
            InputScheme::TypeA => &[],
            InputScheme::TypeB => &[
                ("NextScrollPage", ""),
                ("PrevScrollPage", ""),
                ("NextPage", "Left,WheelDown"),
                ("PrevPage", "Right,WheelUp"),
                ("OpenContextMenu", "RightClick"),
            ],
            InputScheme::TypeC => &[
                ("NextScrollPage", ""),
                ("PrevScrollPage", ""),
                ("NextPage", "Left,LeftClick"),
                ("PrevPage", "Right,RightClick"),
                ("ViewScrollUp", "WheelUp"),
                ("ViewScrollDown", "WheelDown"),
            ],
        }
    }

    /// Applies the overrides in place; commands absent from `collection` are skipped
    pub fn apply(self, collection: &mut CommandCollection) {
        for (name, keys) in self.key_overrides() {
            if let Some(memento) = collection.get_mut(name) {
                memento.set_key_gestures(keys);
            }
        }
    }
}

impl fmt::Display for InputScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputScheme::TypeA => "TypeA",
            InputScheme::TypeB => "TypeB",
            InputScheme::TypeC => "TypeC",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for InputScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|scheme| scheme.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown input scheme '{}'", s.trim()))
    }
}
