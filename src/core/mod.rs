// Copyright 2025 bakri (tidynest@proton.me)
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

//! src/core/mod.rs
//!
//! Core business logic module
//!
//! This module contains the command model and the algorithms around it:
//! - Gesture value types for the key, pointer and touch spaces
//! - nom grammars and whitelist validation for persisted gesture strings
//! - The command catalog with clones, parameter sharing and dispatch
//! - Conflict detection across commands
//! - Snapshots, input schemes and script-declared defaults
//!
//! Nothing here performs I/O; file handling lives in `config` and
//! `scripts`, so every rule can be unit tested in isolation.

pub mod builtin;
pub mod catalog;
pub mod command;
pub mod conflict;
pub mod error;
pub mod gesture;
pub mod memento;
pub mod parameter;
pub mod parser;
pub mod scheme;
pub mod script;
pub mod validator;

pub use builtin::{ActionProvider, NoActions};
pub use catalog::{
    CommandCatalog, CommandOrder, Enumeration, RecoveredField, RestoreReport, ScriptRefreshReport,
    SortDirection,
};
pub use command::{
    Command, CommandAction, CommandArgs, CommandContext, CommandDefinition, CommandKind,
    CommandName, UnboundAction,
};
pub use conflict::{ConflictIndex, ConflictRecord};
pub use error::CatalogError;
pub use gesture::{
    Binding, CommandBindings, Gesture, GestureSpace, KeyGesture, KeyGestureSet, Modifier,
    PointerGestureBuilder, PointerGestureSequence, Stroke, TouchZone, TouchZoneSet,
};
pub use memento::{CommandCollection, CommandMemento, ObsoleteCommand};
pub use parameter::{CommandParameter, ParameterSource, PARAMETER_VERSION};
pub use parser::GestureParseError;
pub use scheme::InputScheme;
pub use script::{
    ScriptBindingState, ScriptDeclaration, ScriptEntry, ScriptRefresh, ScriptRunner, ScriptScan,
};
pub use validator::ValidationError;

#[cfg(test)]
mod tests;
