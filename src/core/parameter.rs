//! Per-command parameters and drift-aware reconciliation
//!
//! A command may carry a `ParameterSource`: a `default` value captured once
//! and a `live` value the user edits. The catalog never looks inside a
//! `CommandParameter`; it only compares values structurally and checks that
//! a write keeps the same shape.
//!
//! # Reconciliation
//! When a new default arrives (e.g. a script header changed its `@args`),
//! `reconcile` updates the live value only if the user has not customised
//! it, so unmodified users pick up new defaults while explicit edits survive.

use serde::{Deserialize, Serialize};

/// Current schema version of persisted parameters
pub const PARAMETER_VERSION: u32 = 1;

/// Typed parameter payload of a command
///
/// Serialised as `{"Type": "<Variant>", "Value": {...}}`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "Type", content = "Value")]
pub enum CommandParameter {
    /// Toggle commands that can optionally cycle backwards
    Reversible { is_reverse: bool },

    /// Setting a mode that can toggle back to the previous mode
    StretchMode { is_toggle: bool },

    /// Page moves by a configurable number of pages
    MovePage { size: u32 },

    /// Scroll first, turn the page when the edge is reached
    ScrollPage {
        is_n_scroll: bool,
        /// Scroll amount in percent of the view
        scroll: u32,
        line_break_stop: bool,
    },

    /// View scrolling
    ViewScroll {
        /// Scroll amount in percent of the view
        scroll: u32,
        allow_cross_scroll: bool,
    },

    /// View scaling
    ViewScale {
        /// Scale step in percent
        scale: u32,
        is_snap_default_scale: bool,
    },

    /// View rotation
    ViewRotate { angle: i32, is_stretch: bool },

    /// Launching an external application
    ExternalApp {
        command: String,
        arguments: String,
        working_directory: Option<String>,
    },

    /// Argument handed to a script command
    Script { argument: Option<String> },
}

impl CommandParameter {
    /// Name of the variant, used to check that writes keep the same shape
    pub fn kind(&self) -> &'static str {
        match self {
            CommandParameter::Reversible { .. } => "Reversible",
            CommandParameter::StretchMode { .. } => "StretchMode",
            CommandParameter::MovePage { .. } => "MovePage",
            CommandParameter::ScrollPage { .. } => "ScrollPage",
            CommandParameter::ViewScroll { .. } => "ViewScroll",
            CommandParameter::ViewScale { .. } => "ViewScale",
            CommandParameter::ViewRotate { .. } => "ViewRotate",
            CommandParameter::ExternalApp { .. } => "ExternalApp",
            CommandParameter::Script { .. } => "Script",
        }
    }

    pub fn same_kind(&self, other: &CommandParameter) -> bool {
        self.kind() == other.kind()
    }
}

/// Default/live parameter pair of one command
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterSource {
    default: CommandParameter,
    live: CommandParameter,
}

impl ParameterSource {
    /// Captures `default` and starts with `live == default`
    pub fn new(default: CommandParameter) -> Self {
        Self {
            live: default.clone(),
            default,
        }
    }

    pub fn default_value(&self) -> &CommandParameter {
        &self.default
    }

    pub fn live(&self) -> &CommandParameter {
        &self.live
    }

    /// True when the live value has diverged from the captured default
    pub fn is_drifted(&self) -> bool {
        self.live != self.default
    }

    /// Replaces the live value
    ///
    /// Returns the rejected value if it has a different shape.
    pub fn set_live(&mut self, value: CommandParameter) -> Result<(), CommandParameter> {
        if !self.default.same_kind(&value) {
            return Err(value);
        }
        self.live = value;
        Ok(())
    }

    /// Applies a new default
    ///
    /// With `force`, or when the live value still equals the old default,
    /// both values become `new_default`. Otherwise only the baseline moves
    /// and the customised live value is kept. Returns true if `live` changed.
    pub fn reconcile(&mut self, new_default: CommandParameter, force: bool) -> bool {
        let take_live = force || !self.is_drifted();
        let changed = take_live && self.live != new_default;

        if take_live {
            self.live = new_default.clone();
        }
        self.default = new_default;

        changed
    }

    /// Overwrites the live value with the default
    pub fn reset(&mut self) {
        self.live = self.default.clone();
    }
}
