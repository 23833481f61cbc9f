// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Whitelist validation for gesture tokens and command names
//!
//! Gesture strings arrive from persisted snapshots and script headers, so
//! every token is checked against a whitelist before it becomes part of a
//! typed gesture value:
//! - Key names must be a known key or mouse input
//! - Modifiers must be a known keyboard modifier or mouse-button chord
//! - Command names must not contain the clone separator or control characters
//!
//! # Philosophy
//! We use WHITELIST validation (allow known-good) rather than BLACKLIST
//! (block known-bad). Anything not explicitly listed is rejected, so a
//! malformed file can never smuggle an unknown token into a comparison.

use thiserror::Error;

use crate::core::gesture::Modifier;

/// Maximum length of a command name (base part, without clone suffix)
pub const MAX_COMMAND_NAME_LEN: usize = 128;

/// Validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Key name not in whitelist
    #[error("Invalid key name '{0}'")]
    InvalidKey(String),

    /// Modifier name not in whitelist
    #[error("Invalid modifier '{0}'")]
    InvalidModifier(String),

    /// Command name contains forbidden characters or is empty
    #[error("Invalid command name '{0}'")]
    InvalidCommandName(String),

    /// Command name exceeds maximum length
    #[error("Command name too long: {0} characters (max 128)")]
    CommandNameTooLong(usize),
}

/// Named keyboard keys in canonical spelling
const NAMED_KEYS: &[&str] = &[
    "Back", "Tab", "Clear", "Enter", "Pause", "CapsLock", "Escape", "Space",
    "PageUp", "PageDown", "End", "Home", "Left", "Up", "Right", "Down",
    "Select", "Print", "Execute", "PrintScreen", "Insert", "Delete", "Help",
    "Apps", "Sleep",
    "NumPad0", "NumPad1", "NumPad2", "NumPad3", "NumPad4",
    "NumPad5", "NumPad6", "NumPad7", "NumPad8", "NumPad9",
    "Multiply", "Add", "Separator", "Subtract", "Decimal", "Divide",
    "NumLock", "Scroll",
    "OemSemicolon", "OemPlus", "OemComma", "OemMinus", "OemPeriod",
    "OemQuestion", "OemTilde", "OemOpenBrackets", "OemPipe",
    "OemCloseBrackets", "OemQuotes", "OemBackslash",
    "BrowserBack", "BrowserForward", "BrowserRefresh", "BrowserHome",
    "VolumeMute", "VolumeDown", "VolumeUp",
    "MediaNextTrack", "MediaPreviousTrack", "MediaStop", "MediaPlayPause",
];

/// Mouse inputs that may stand in the key position of a combination
const MOUSE_INPUTS: &[&str] = &[
    "LeftClick", "RightClick", "MiddleClick",
    "LeftDoubleClick", "RightDoubleClick", "MiddleDoubleClick",
    "XButton1Click", "XButton2Click",
    "XButton1DoubleClick", "XButton2DoubleClick",
    "WheelUp", "WheelDown", "WheelLeft", "WheelRight",
];

/// Alternative spellings accepted on input (lowercase) → canonical name
const KEY_ALIASES: &[(&str, &str)] = &[
    ("esc", "Escape"),
    ("return", "Enter"),
    ("backspace", "Back"),
    ("del", "Delete"),
    ("ins", "Insert"),
    ("pgup", "PageUp"),
    ("pgdn", "PageDown"),
    ("prior", "PageUp"),
    ("next", "PageDown"),
    ("capital", "CapsLock"),
    ("menu", "Apps"),
];

/// Normalises a key token to its canonical spelling
///
/// Accepts, case-insensitively:
/// - Single letters and digits ("k" → "K")
/// - WPF-style digit names ("D1" → "1")
/// - Function keys F1-F24
/// - Named keys and mouse inputs from the whitelist
/// - Common aliases (Esc, Return, PgUp, ...)
pub fn canonical_key(token: &str) -> Result<String, ValidationError> {
    let token = token.trim();
    let invalid = || ValidationError::InvalidKey(token.to_string());

    if token.is_empty() {
        return Err(invalid());
    }

    let mut chars = token.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return if c.is_ascii_alphanumeric() {
            Ok(c.to_ascii_uppercase().to_string())
        } else {
            Err(invalid())
        };
    }

    let lower = token.to_ascii_lowercase();

    // D0..D9
    if lower.len() == 2 && lower.starts_with('d') {
        if let Some(digit) = lower.chars().nth(1).filter(char::is_ascii_digit) {
            return Ok(digit.to_string());
        }
    }

    // F1..F24
    if let Some(number) = lower.strip_prefix('f') {
        if let Ok(n) = number.parse::<u8>() {
            if (1..=24).contains(&n) && !number.starts_with('0') {
                return Ok(format!("F{}", n));
            }
        }
    }

    if let Some(name) = NAMED_KEYS
        .iter()
        .chain(MOUSE_INPUTS.iter())
        .find(|name| name.eq_ignore_ascii_case(token))
    {
        return Ok((*name).to_string());
    }

    KEY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, name)| (*name).to_string())
        .ok_or_else(invalid)
}

/// Returns true if the canonical key name is a mouse input
pub fn is_mouse_input(key: &str) -> bool {
    MOUSE_INPUTS.contains(&key)
}

/// Resolves a modifier token (case-insensitive, with aliases)
pub fn canonical_modifier(token: &str) -> Result<Modifier, ValidationError> {
    let modifier = match token.trim().to_ascii_lowercase().as_str() {
        "ctrl" | "control" => Modifier::Ctrl,
        "shift" => Modifier::Shift,
        "alt" => Modifier::Alt,
        "win" | "windows" | "meta" | "super" => Modifier::Win,
        "leftbutton" => Modifier::LeftButton,
        "rightbutton" => Modifier::RightButton,
        "middlebutton" => Modifier::MiddleButton,
        "xbutton1" => Modifier::XButton1,
        "xbutton2" => Modifier::XButton2,
        _ => return Err(ValidationError::InvalidModifier(token.trim().to_string())),
    };

    Ok(modifier)
}

/// Validates the base part of a command name
///
/// Rejects empty names, surrounding whitespace, the clone separator `:`,
/// the list separator `,` and control characters.
pub fn validate_command_name(name: &str) -> Result<(), ValidationError> {
    if name.len() > MAX_COMMAND_NAME_LEN {
        return Err(ValidationError::CommandNameTooLong(name.len()));
    }

    let valid = !name.is_empty()
        && name.trim() == name
        && !name.chars().any(|c| c == ':' || c == ',' || c.is_control());

    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidCommandName(name.to_string()))
    }
}
