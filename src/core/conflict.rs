//! Gesture conflict detection
//!
//! A conflict exists when two or more commands bind the same gesture atom
//! in the same space: the same key combination, the same complete pointer
//! sequence, or the same touch zone. A command with several gestures in
//! one space conflicts with another if any of its gestures equals any of
//! the other's.
//!
//! `ConflictIndex` is a reverse index keyed by gesture atom. It borrows
//! nothing and is built from a catalog snapshot; because building it needs
//! `&CommandCatalog`, an index can never be used across a catalog mutation
//! without being rebuilt.
//!
//! # Performance
//! - Build: O(n) over all bound gestures
//! - Query: O(1) average case plus the size of the answer

use std::collections::HashMap;

use crate::core::catalog::CommandCatalog;
use crate::core::gesture::{CommandBindings, Gesture, GestureSpace};

/// A gesture bound by two or more commands
#[derive(Clone, Debug, PartialEq)]
pub struct ConflictRecord {
    pub gesture: Gesture,
    pub space: GestureSpace,
    /// Every command bound to the gesture, in display order
    pub commands: Vec<String>,
}

/// Reverse index: gesture atom → commands bound to it
#[derive(Clone, Debug, Default)]
pub struct ConflictIndex {
    bindings: HashMap<Gesture, Vec<String>>,
    /// Gestures in first-seen order, for deterministic output
    order: Vec<Gesture>,
}

impl ConflictIndex {
    /// Creates an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes every command of the catalog in display order
    pub fn from_catalog(catalog: &CommandCatalog) -> Self {
        let mut index = Self::new();
        for command in catalog.iter() {
            index.add_command(command.name(), command.bindings());
        }
        index
    }

    /// Adds all gestures of one command
    pub fn add_command(&mut self, name: &str, bindings: &CommandBindings) {
        for space in GestureSpace::ALL {
            for gesture in bindings.gestures(space) {
                if !self.bindings.contains_key(&gesture) {
                    self.order.push(gesture.clone());
                }
                let names = self.bindings.entry(gesture).or_default();
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
    }

    /// Every command bound to `gesture` except `excluding`
    pub fn query(&self, gesture: &Gesture, excluding: &str) -> Vec<String> {
        self.bindings
            .get(gesture)
            .map(|names| names.iter().filter(|n| *n != excluding).cloned().collect())
            .unwrap_or_default()
    }

    /// True if two or more commands bind `gesture`
    pub fn has_conflict(&self, gesture: &Gesture) -> bool {
        self.bindings
            .get(gesture)
            .map(|names| names.len() > 1)
            .unwrap_or(false)
    }

    /// All gestures bound by two or more commands
    pub fn find_conflicts(&self) -> Vec<ConflictRecord> {
        self.order
            .iter()
            .filter_map(|gesture| {
                let names = self.bindings.get(gesture)?;
                (names.len() > 1).then(|| ConflictRecord {
                    gesture: gesture.clone(),
                    space: gesture.space(),
                    commands: names.clone(),
                })
            })
            .collect()
    }

    /// Conflicts a command would have if `bindings` were its bindings
    ///
    /// Each record lists the *other* commands bound to the gesture.
    pub fn conflicts_with(&self, name: &str, bindings: &CommandBindings) -> Vec<ConflictRecord> {
        GestureSpace::ALL
            .into_iter()
            .flat_map(|space| bindings.gestures(space))
            .filter_map(|gesture| {
                let others = self.query(&gesture, name);
                (!others.is_empty()).then(|| ConflictRecord {
                    space: gesture.space(),
                    gesture,
                    commands: others,
                })
            })
            .collect()
    }

    /// Total number of (gesture, command) pairs tracked
    pub fn total_bindings(&self) -> usize {
        self.bindings.values().map(|v| v.len()).sum()
    }
}
