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

//! src/core/parser.rs
//!
//! Gesture string and script header parser
//!
//! This module turns persisted strings into validated gesture values:
//! - Key combination lists: `Ctrl+Shift+F,RightButton+WheelUp`
//! - Pointer stroke sequences: `UR`, `LDC`, `↑→`, `UClick`
//! - Touch zone lists: `TouchL1,TouchCenter`
//! - Script header tags: `// @shortcutkey Ctrl+Shift+F`
//!
//! # Architecture
//! The parser uses nom combinators for the syntax and hands every token to
//! `validator.rs` for whitelisting. Parsing is two-stage:
//! 1. Syntax: split the input into tokens (nom)
//! 2. Semantics: resolve each token to a typed value (validator)
//!
//! Nothing here mutates catalog state; callers decide how to recover from a
//! malformed field.

use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take_while1},
    character::complete::{alpha1, anychar, char, multispace0, space0},
    combinator::{all_consuming, map_opt, rest, value},
    multi::{many0, separated_list0, separated_list1},
    sequence::{delimited, preceded},
    IResult, Parser,
};
use thiserror::Error;

use crate::core::gesture::{
    GestureSpace, KeyGesture, KeyGestureSet, PointerGestureSequence, Stroke, TouchZone,
    TouchZoneSet,
};
use crate::core::validator::{self, ValidationError};

/// Gesture parse errors
#[derive(Debug, Error, PartialEq)]
pub enum GestureParseError {
    #[error("Malformed {space} gesture '{input}': {message}")]
    Syntax {
        space: GestureSpace,
        input: String,
        message: String,
    },

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Unknown touch zone '{0}'")]
    UnknownTouchZone(String),
}

/// Parse a single key combination such as `Ctrl+Shift+F`
pub fn parse_key_gesture(input: &str) -> Result<KeyGesture, GestureParseError> {
    let (_, tokens) = all_consuming(delimited(multispace0, key_combination, multispace0))
        .parse(input)
        .map_err(|e| syntax_error(GestureSpace::Key, input, e))?;

    build_key_gesture(&tokens)
}

/// Parse a comma-separated list of key combinations
///
/// An empty (or whitespace-only) string is the empty set.
pub fn parse_key_gesture_set(input: &str) -> Result<KeyGestureSet, GestureParseError> {
    let (_, combinations) = all_consuming(key_combination_list)
        .parse(input)
        .map_err(|e| syntax_error(GestureSpace::Key, input, e))?;

    let gestures = combinations
        .iter()
        .map(|tokens| build_key_gesture(tokens))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(KeyGestureSet::new(gestures))
}

/// Parse a pointer stroke sequence
///
/// Accepts the canonical tokens `U R D L C` in either case, arrow glyphs
/// and the word `Click`. Whitespace between strokes is ignored.
pub fn parse_pointer_sequence(input: &str) -> Result<PointerGestureSequence, GestureParseError> {
    let (_, strokes) = all_consuming(stroke_sequence)
        .parse(input)
        .map_err(|e| syntax_error(GestureSpace::Pointer, input, e))?;

    Ok(PointerGestureSequence::new(strokes))
}

/// Parse a comma-separated list of touch zones
pub fn parse_touch_zone_set(input: &str) -> Result<TouchZoneSet, GestureParseError> {
    let (_, names) = all_consuming(zone_list)
        .parse(input)
        .map_err(|e| syntax_error(GestureSpace::Touch, input, e))?;

    let zones = names
        .iter()
        .map(|name| {
            TouchZone::from_name(name)
                .ok_or_else(|| GestureParseError::UnknownTouchZone((*name).to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TouchZoneSet::new(zones))
}

/// Key name or modifier token
fn key_token(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_').parse(input)
}

/// `Mod+Mod+Key` → ["Mod", "Mod", "Key"]
fn key_combination(input: &str) -> IResult<&str, Vec<&str>> {
    separated_list1(delimited(space0, char('+'), space0), key_token).parse(input)
}

fn key_combination_list(input: &str) -> IResult<&str, Vec<Vec<&str>>> {
    delimited(
        multispace0,
        separated_list0(delimited(multispace0, char(','), multispace0), key_combination),
        multispace0,
    )
    .parse(input)
}

/// The last token is the key, everything before it a modifier
fn build_key_gesture(tokens: &[&str]) -> Result<KeyGesture, GestureParseError> {
    let Some((key, modifier_tokens)) = tokens.split_last() else {
        return Err(ValidationError::InvalidKey(String::new()).into());
    };

    let modifiers = modifier_tokens
        .iter()
        .map(|token| validator::canonical_modifier(token))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(KeyGesture::new(modifiers, key)?)
}

fn stroke(input: &str) -> IResult<&str, Stroke> {
    alt((
        value(Stroke::Click, tag_no_case("Click")),
        map_opt(anychar, Stroke::from_symbol),
    ))
    .parse(input)
}

fn stroke_sequence(input: &str) -> IResult<&str, Vec<Stroke>> {
    delimited(multispace0, many0(preceded(space0, stroke)), multispace0).parse(input)
}

fn zone_list(input: &str) -> IResult<&str, Vec<&str>> {
    delimited(
        multispace0,
        separated_list0(
            delimited(multispace0, char(','), multispace0),
            take_while1(|c: char| c.is_ascii_alphanumeric()),
        ),
        multispace0,
    )
    .parse(input)
}

fn syntax_error(
    space: GestureSpace,
    input: &str,
    err: nom::Err<nom::error::Error<&str>>,
) -> GestureParseError {
    let message = match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            format!("unexpected input at '{}'", e.input)
        }
        nom::Err::Incomplete(_) => "incomplete input".to_string(),
    };

    GestureParseError::Syntax {
        space,
        input: input.to_string(),
        message,
    }
}

/// Metadata tags found in a script file's leading comment block
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScriptHeader {
    /// `(tag, value)` pairs in file order; tag names are lowercase
    pub tags: Vec<(String, String)>,
}

impl ScriptHeader {
    /// Value of the first occurrence of `tag`
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(name, _)| name == tag)
            .map(|(_, value)| value.as_str())
    }
}

/// Parse the leading comment block of a script file
///
/// Supported forms:
/// ```text
/// // @name Open in editor
/// // @shortcutkey Ctrl+Shift+E
///
/// /**
///  * @mousegesture UR
///  */
/// ```
/// Parsing stops at the first non-blank line that is not a comment.
pub fn parse_script_header(content: &str) -> ScriptHeader {
    let mut tags = Vec::new();

    for line in content.trim_start_matches('\u{feff}').lines() {
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() {
            continue;
        }

        let Some(body) = comment_body(line_trimmed) else {
            break;
        };

        if let Ok((_, (tag, value))) = parse_tag_line(body) {
            tags.push((tag.to_ascii_lowercase(), value.trim().to_string()));
        }
    }

    ScriptHeader { tags }
}

/// Strip comment markers from a header line; None if the line is code
fn comment_body(line: &str) -> Option<&str> {
    let body = if let Some(body) = line.strip_prefix("//") {
        body
    } else if let Some(body) = line.strip_prefix("/**").or_else(|| line.strip_prefix("/*")) {
        body
    } else if line.starts_with("*/") {
        ""
    } else if let Some(body) = line.strip_prefix('*') {
        body
    } else {
        return None;
    };

    Some(body.trim_end_matches("*/"))
}

/// Parse `@tag value` → ("tag", "value")
pub fn parse_tag_line(input: &str) -> IResult<&str, (&str, &str)> {
    preceded((space0, char('@')), (alpha1, rest)).parse(input)
}
