//! src/core/gesture.rs
//!
//! Gesture value spaces
//!
//! A command can be bound in three independent input spaces:
//! - `KeyGestureSet`: key combinations such as `Ctrl+Shift+F` or `RightButton+WheelUp`
//! - `PointerGestureSequence`: an ordered stroke sequence such as `UR` or `LDC`
//! - `TouchZoneSet`: tap zones such as `TouchL1,TouchR2`
//!
//! Every value is parsed into a validated type at construction time (see
//! `parser.rs`) and renders back to a canonical string, so that
//! `parse(render(x)) == x` holds for every valid value.

use std::fmt;
use std::str::FromStr;

use crate::core::parser::{self, GestureParseError};
use crate::core::validator::{self, ValidationError};

/// The three independent binding spaces
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum GestureSpace {
    /// Key combinations (keyboard and mouse buttons/wheel)
    Key,
    /// Pointer stroke sequences
    Pointer,
    /// Touch-zone taps
    Touch,
}

impl GestureSpace {
    /// All spaces in display order
    pub const ALL: [GestureSpace; 3] = [
        GestureSpace::Key,
        GestureSpace::Pointer,
        GestureSpace::Touch,
    ];
}

impl fmt::Display for GestureSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GestureSpace::Key => write!(f, "key"),
            GestureSpace::Pointer => write!(f, "pointer"),
            GestureSpace::Touch => write!(f, "touch"),
        }
    }
}

/// Modifier held while the key of a combination is pressed
///
/// Declaration order is the canonical rendering order.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Modifier {
    Ctrl,
    Shift,
    Alt,
    Win,
    LeftButton,
    RightButton,
    MiddleButton,
    XButton1,
    XButton2,
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Modifier::Ctrl => "Ctrl",
            Modifier::Shift => "Shift",
            Modifier::Alt => "Alt",
            Modifier::Win => "Win",
            Modifier::LeftButton => "LeftButton",
            Modifier::RightButton => "RightButton",
            Modifier::MiddleButton => "MiddleButton",
            Modifier::XButton1 => "XButton1",
            Modifier::XButton2 => "XButton2",
        };
        write!(f, "{}", name)
    }
}

/// A combination of modifiers and a single key (or mouse input)
///
/// # Normalisation
/// Modifiers are sorted into canonical order and de-duplicated and the key
/// is stored in its canonical spelling, so `shift+ctrl+f` and `Ctrl+Shift+F`
/// are the same value.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct KeyGesture {
    modifiers: Vec<Modifier>,
    key: String,
}

impl KeyGesture {
    /// Creates a normalised key gesture
    ///
    /// Fails if `key` is not a whitelisted key name.
    pub fn new(mut modifiers: Vec<Modifier>, key: &str) -> Result<Self, ValidationError> {
        let key = validator::canonical_key(key)?;

        modifiers.sort();
        modifiers.dedup();

        Ok(Self { modifiers, key })
    }

    /// Creates a gesture without modifiers
    pub fn key_only(key: &str) -> Result<Self, ValidationError> {
        Self::new(Vec::new(), key)
    }

    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// True if the key position holds a mouse input (click or wheel)
    pub fn is_mouse_input(&self) -> bool {
        validator::is_mouse_input(&self.key)
    }
}

impl fmt::Display for KeyGesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in &self.modifiers {
            write!(f, "{}+", modifier)?;
        }
        write!(f, "{}", self.key)
    }
}

impl FromStr for KeyGesture {
    type Err = GestureParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parser::parse_key_gesture(s)
    }
}

/// The set of key combinations bound to one command
///
/// Duplicates are dropped and insertion order is kept for display.
/// Equality ignores order.
#[derive(Clone, Debug, Default, Eq)]
pub struct KeyGestureSet {
    gestures: Vec<KeyGesture>,
}

impl KeyGestureSet {
    pub fn new(gestures: impl IntoIterator<Item = KeyGesture>) -> Self {
        let mut set = Self::default();
        for gesture in gestures {
            set.insert(gesture);
        }
        set
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.gestures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.gestures.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyGesture> {
        self.gestures.iter()
    }

    pub fn contains(&self, gesture: &KeyGesture) -> bool {
        self.gestures.contains(gesture)
    }

    /// Adds a gesture; returns false if it was already present
    pub fn insert(&mut self, gesture: KeyGesture) -> bool {
        if self.contains(&gesture) {
            return false;
        }
        self.gestures.push(gesture);
        true
    }

    /// Removes a gesture; returns false if it was not present
    pub fn remove(&mut self, gesture: &KeyGesture) -> bool {
        let before = self.gestures.len();
        self.gestures.retain(|g| g != gesture);
        self.gestures.len() != before
    }
}

impl PartialEq for KeyGestureSet {
    fn eq(&self, other: &Self) -> bool {
        self.gestures.len() == other.gestures.len()
            && self.gestures.iter().all(|g| other.contains(g))
    }
}

impl fmt::Display for KeyGestureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .gestures
            .iter()
            .map(|g| g.to_string())
            .collect::<Vec<_>>()
            .join(",");
        write!(f, "{}", rendered)
    }
}

impl FromStr for KeyGestureSet {
    type Err = GestureParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parser::parse_key_gesture_set(s)
    }
}

/// One element of a pointer gesture sequence
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Stroke {
    Up,
    Right,
    Down,
    Left,
    /// Button click at the current position
    Click,
}

impl Stroke {
    /// Canonical single-character token
    pub fn token(self) -> char {
        match self {
            Stroke::Up => 'U',
            Stroke::Right => 'R',
            Stroke::Down => 'D',
            Stroke::Left => 'L',
            Stroke::Click => 'C',
        }
    }

    /// Maps a token letter (either case) or an arrow glyph to a stroke
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            'U' | 'u' | '↑' => Some(Stroke::Up),
            'R' | 'r' | '→' => Some(Stroke::Right),
            'D' | 'd' | '↓' => Some(Stroke::Down),
            'L' | 'l' | '←' => Some(Stroke::Left),
            'C' | 'c' => Some(Stroke::Click),
            _ => None,
        }
    }

    pub fn is_direction(self) -> bool {
        self != Stroke::Click
    }
}

/// An ordered pointer stroke sequence, compared exactly
///
/// The empty sequence means "unbound".
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct PointerGestureSequence {
    strokes: Vec<Stroke>,
}

impl PointerGestureSequence {
    pub fn new(strokes: Vec<Stroke>) -> Self {
        Self { strokes }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// True if `prefix` is a (possibly equal) prefix of this sequence
    pub fn starts_with(&self, prefix: &PointerGestureSequence) -> bool {
        self.strokes.starts_with(&prefix.strokes)
    }
}

impl fmt::Display for PointerGestureSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stroke in &self.strokes {
            write!(f, "{}", stroke.token())?;
        }
        Ok(())
    }
}

impl FromStr for PointerGestureSequence {
    type Err = GestureParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parser::parse_pointer_sequence(s)
    }
}

/// Accumulates strokes reported by a recogniser during capture
///
/// A drag that keeps moving in the same direction reports that direction
/// repeatedly; consecutive identical directions collapse into one stroke.
/// Clicks are always appended.
#[derive(Clone, Debug, Default)]
pub struct PointerGestureBuilder {
    strokes: Vec<Stroke>,
}

impl PointerGestureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a stroke; returns true if the sequence grew
    pub fn push(&mut self, stroke: Stroke) -> bool {
        if stroke.is_direction() && self.strokes.last() == Some(&stroke) {
            return false;
        }
        self.strokes.push(stroke);
        true
    }

    /// The incomplete sequence captured so far (for live feedback only)
    pub fn prefix(&self) -> PointerGestureSequence {
        PointerGestureSequence::new(self.strokes.clone())
    }

    /// Completes the capture
    pub fn finish(self) -> PointerGestureSequence {
        PointerGestureSequence::new(self.strokes)
    }

    pub fn reset(&mut self) {
        self.strokes.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }
}

/// Screen zone recognised for touch taps
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TouchZone {
    TouchL1,
    TouchL2,
    TouchR1,
    TouchR2,
    TouchCenter,
}

impl TouchZone {
    pub const ALL: [TouchZone; 5] = [
        TouchZone::TouchL1,
        TouchZone::TouchL2,
        TouchZone::TouchR1,
        TouchZone::TouchR2,
        TouchZone::TouchCenter,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TouchZone::TouchL1 => "TouchL1",
            TouchZone::TouchL2 => "TouchL2",
            TouchZone::TouchR1 => "TouchR1",
            TouchZone::TouchR2 => "TouchR2",
            TouchZone::TouchCenter => "TouchCenter",
        }
    }

    /// Case-insensitive lookup by name
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|zone| zone.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for TouchZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for TouchZone {
    type Err = GestureParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| GestureParseError::UnknownTouchZone(s.trim().to_string()))
    }
}

/// The set of touch zones bound to one command (order-insensitive equality)
#[derive(Clone, Debug, Default, Eq)]
pub struct TouchZoneSet {
    zones: Vec<TouchZone>,
}

impl TouchZoneSet {
    pub fn new(zones: impl IntoIterator<Item = TouchZone>) -> Self {
        let mut set = Self::default();
        for zone in zones {
            set.insert(zone);
        }
        set
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = TouchZone> + '_ {
        self.zones.iter().copied()
    }

    pub fn contains(&self, zone: TouchZone) -> bool {
        self.zones.contains(&zone)
    }

    pub fn insert(&mut self, zone: TouchZone) -> bool {
        if self.contains(zone) {
            return false;
        }
        self.zones.push(zone);
        true
    }

    pub fn remove(&mut self, zone: TouchZone) -> bool {
        let before = self.zones.len();
        self.zones.retain(|z| *z != zone);
        self.zones.len() != before
    }

    /// Adds the zone if absent, removes it if present; returns true if now present
    pub fn toggle(&mut self, zone: TouchZone) -> bool {
        if self.remove(zone) {
            false
        } else {
            self.zones.push(zone);
            true
        }
    }
}

impl PartialEq for TouchZoneSet {
    fn eq(&self, other: &Self) -> bool {
        self.zones.len() == other.zones.len() && self.zones.iter().all(|z| other.contains(*z))
    }
}

impl fmt::Display for TouchZoneSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self.zones.iter().map(|z| z.name()).collect::<Vec<_>>().join(",");
        write!(f, "{}", rendered)
    }
}

impl FromStr for TouchZoneSet {
    type Err = GestureParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parser::parse_touch_zone_set(s)
    }
}

/// A single gesture atom in one space
///
/// This is the unit of conflict comparison: a key combination, a whole
/// pointer sequence, or one touch zone.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Gesture {
    Key(KeyGesture),
    Pointer(PointerGestureSequence),
    Touch(TouchZone),
}

impl Gesture {
    pub fn space(&self) -> GestureSpace {
        match self {
            Gesture::Key(_) => GestureSpace::Key,
            Gesture::Pointer(_) => GestureSpace::Pointer,
            Gesture::Touch(_) => GestureSpace::Touch,
        }
    }

    /// Parses a single gesture atom of the given space
    pub fn parse(space: GestureSpace, input: &str) -> Result<Self, GestureParseError> {
        match space {
            GestureSpace::Key => input.parse().map(Gesture::Key),
            GestureSpace::Pointer => input.parse().map(Gesture::Pointer),
            GestureSpace::Touch => input.parse().map(Gesture::Touch),
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gesture::Key(g) => write!(f, "{}", g),
            Gesture::Pointer(g) => write!(f, "{}", g),
            Gesture::Touch(g) => write!(f, "{}", g),
        }
    }
}

/// The complete value of one binding slot
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Binding {
    Keys(KeyGestureSet),
    Pointer(PointerGestureSequence),
    Touch(TouchZoneSet),
}

impl Binding {
    /// An unbound slot of the given space
    pub fn empty(space: GestureSpace) -> Self {
        match space {
            GestureSpace::Key => Binding::Keys(KeyGestureSet::empty()),
            GestureSpace::Pointer => Binding::Pointer(PointerGestureSequence::empty()),
            GestureSpace::Touch => Binding::Touch(TouchZoneSet::empty()),
        }
    }

    pub fn space(&self) -> GestureSpace {
        match self {
            Binding::Keys(_) => GestureSpace::Key,
            Binding::Pointer(_) => GestureSpace::Pointer,
            Binding::Touch(_) => GestureSpace::Touch,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Binding::Keys(keys) => keys.is_empty(),
            Binding::Pointer(sequence) => sequence.is_empty(),
            Binding::Touch(zones) => zones.is_empty(),
        }
    }

    /// The gesture atoms of this slot (empty slots have none)
    pub fn gestures(&self) -> Vec<Gesture> {
        match self {
            Binding::Keys(keys) => keys.iter().cloned().map(Gesture::Key).collect(),
            Binding::Pointer(sequence) if sequence.is_empty() => Vec::new(),
            Binding::Pointer(sequence) => vec![Gesture::Pointer(sequence.clone())],
            Binding::Touch(zones) => zones.iter().map(Gesture::Touch).collect(),
        }
    }

    /// Parses a full slot value of the given space
    pub fn parse(space: GestureSpace, input: &str) -> Result<Self, GestureParseError> {
        match space {
            GestureSpace::Key => input.parse().map(Binding::Keys),
            GestureSpace::Pointer => input.parse().map(Binding::Pointer),
            GestureSpace::Touch => input.parse().map(Binding::Touch),
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Keys(keys) => write!(f, "{}", keys),
            Binding::Pointer(sequence) => write!(f, "{}", sequence),
            Binding::Touch(zones) => write!(f, "{}", zones),
        }
    }
}

/// The three binding slots of one command
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CommandBindings {
    pub keys: KeyGestureSet,
    pub pointer: PointerGestureSequence,
    pub touch: TouchZoneSet,
}

impl CommandBindings {
    pub fn new(keys: KeyGestureSet, pointer: PointerGestureSequence, touch: TouchZoneSet) -> Self {
        Self { keys, pointer, touch }
    }

    /// Parses all three slots strictly (any malformed slot fails the whole value)
    pub fn parse(keys: &str, pointer: &str, touch: &str) -> Result<Self, GestureParseError> {
        Ok(Self {
            keys: keys.parse()?,
            pointer: pointer.parse()?,
            touch: touch.parse()?,
        })
    }

    pub fn get(&self, space: GestureSpace) -> Binding {
        match space {
            GestureSpace::Key => Binding::Keys(self.keys.clone()),
            GestureSpace::Pointer => Binding::Pointer(self.pointer.clone()),
            GestureSpace::Touch => Binding::Touch(self.touch.clone()),
        }
    }

    pub fn set(&mut self, binding: Binding) {
        match binding {
            Binding::Keys(keys) => self.keys = keys,
            Binding::Pointer(sequence) => self.pointer = sequence,
            Binding::Touch(zones) => self.touch = zones,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.pointer.is_empty() && self.touch.is_empty()
    }

    /// Gesture atoms bound in one space
    pub fn gestures(&self, space: GestureSpace) -> Vec<Gesture> {
        self.get(space).gestures()
    }

    /// True if the gesture is bound in its space
    pub fn binds(&self, gesture: &Gesture) -> bool {
        match gesture {
            Gesture::Key(key) => self.keys.contains(key),
            Gesture::Pointer(sequence) => !sequence.is_empty() && self.pointer == *sequence,
            Gesture::Touch(zone) => self.touch.contains(*zone),
        }
    }

    /// Unbinds a single gesture; returns true if anything changed
    pub fn remove_gesture(&mut self, gesture: &Gesture) -> bool {
        match gesture {
            Gesture::Key(key) => self.keys.remove(key),
            Gesture::Pointer(sequence) => {
                if !sequence.is_empty() && self.pointer == *sequence {
                    self.pointer = PointerGestureSequence::empty();
                    true
                } else {
                    false
                }
            }
            Gesture::Touch(zone) => self.touch.remove(*zone),
        }
    }
}
