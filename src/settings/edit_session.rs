//! Single-command gesture editing
//!
//! A `GestureEditSession` copies one command's bindings, lets the user
//! change them, and writes them back on `commit`. Dropping the session
//! discards the edits. Sessions hold no lock on the catalog: two sessions
//! for different commands can be open at once and the last commit wins.
//!
//! Pointer gestures are captured stroke by stroke. While a capture is in
//! progress only the prefix is available for feedback; it is never compared
//! against other commands until the capture is finished.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::core::{
    Binding, CatalogError, CommandBindings, CommandCatalog, ConflictRecord, GestureSpace,
    KeyGesture, PointerGestureBuilder, PointerGestureSequence, Stroke, TouchZone,
};

pub struct GestureEditSession {
    catalog: Rc<RefCell<CommandCatalog>>,
    name: String,
    pending: CommandBindings,
    capture: Option<PointerGestureBuilder>,
}

impl GestureEditSession {
    /// Opens a session on `name`, starting from its current bindings
    pub fn new(catalog: Rc<RefCell<CommandCatalog>>, name: &str) -> Result<Self, CatalogError> {
        let pending = catalog.borrow().get(name)?.bindings().clone();
        Ok(Self {
            catalog,
            name: name.to_string(),
            pending,
            capture: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The edited bindings
    pub fn pending(&self) -> &CommandBindings {
        &self.pending
    }

    /// True if the pending bindings differ from the catalog's
    pub fn is_modified(&self) -> bool {
        self.catalog
            .borrow()
            .get(&self.name)
            .map(|command| *command.bindings() != self.pending)
            .unwrap_or(true)
    }

    // ---- keys ---------------------------------------------------------

    /// Adds a key combination; returns false if already present
    pub fn add_key(&mut self, gesture: KeyGesture) -> bool {
        self.pending.keys.insert(gesture)
    }

    pub fn remove_key(&mut self, gesture: &KeyGesture) -> bool {
        self.pending.keys.remove(gesture)
    }

    // ---- touch --------------------------------------------------------

    /// Returns true if the zone is now bound
    pub fn toggle_touch(&mut self, zone: TouchZone) -> bool {
        self.pending.touch.toggle(zone)
    }

    // ---- pointer ------------------------------------------------------

    /// Starts capturing a new pointer sequence
    pub fn begin_pointer_capture(&mut self) {
        self.capture = Some(PointerGestureBuilder::new());
    }

    pub fn is_capturing(&self) -> bool {
        self.capture.is_some()
    }

    /// Records one stroke and returns the prefix captured so far
    ///
    /// Returns `None` when no capture is in progress.
    pub fn push_stroke(&mut self, stroke: Stroke) -> Option<PointerGestureSequence> {
        let builder = self.capture.as_mut()?;
        builder.push(stroke);
        Some(builder.prefix())
    }

    /// Completes the capture and makes it the pending pointer binding
    ///
    /// Returns the conflicts of the finished sequence.
    pub fn finish_pointer_capture(&mut self) -> Vec<ConflictRecord> {
        if let Some(builder) = self.capture.take() {
            self.pending.pointer = builder.finish();
        }
        self.preview_conflicts(GestureSpace::Pointer)
    }

    /// Abandons the capture; the pending pointer binding is unchanged
    pub fn cancel_pointer_capture(&mut self) {
        self.capture = None;
    }

    // ---- common -------------------------------------------------------

    /// Unbinds one slot
    pub fn clear(&mut self, space: GestureSpace) {
        self.pending.set(Binding::empty(space));
        if space == GestureSpace::Pointer {
            self.capture = None;
        }
    }

    /// Conflicts the pending value of one slot would have
    ///
    /// The pointer slot reports nothing while a capture is in progress.
    pub fn preview_conflicts(&self, space: GestureSpace) -> Vec<ConflictRecord> {
        if space == GestureSpace::Pointer && self.is_capturing() {
            return Vec::new();
        }
        self.catalog
            .borrow()
            .conflicts_for_binding(&self.name, &self.pending.get(space))
    }

    /// Conflicts of all pending slots
    pub fn preview_all(&self) -> Vec<ConflictRecord> {
        GestureSpace::ALL
            .into_iter()
            .flat_map(|space| self.preview_conflicts(space))
            .collect()
    }

    /// Writes the pending bindings back; returns their conflicts
    ///
    /// An unfinished pointer capture is discarded.
    pub fn commit(mut self) -> Result<Vec<ConflictRecord>, CatalogError> {
        self.capture = None;
        let conflicts = self.preview_all();
        self.catalog
            .borrow_mut()
            .set_bindings(&self.name, self.pending.clone())?;
        debug!(command = %self.name, conflicts = conflicts.len(), "bindings committed");
        Ok(conflicts)
    }
}
