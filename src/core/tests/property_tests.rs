//! Property tests for gesture rendering and conflict queries

use proptest::prelude::*;

use super::fixtures::definition;
use crate::core::{
    CommandCatalog, Gesture, GestureSpace, KeyGesture, KeyGestureSet, Modifier,
    PointerGestureSequence, Stroke, TouchZone, TouchZoneSet,
};

const KEYS: &[&str] = &[
    "A", "K", "Z", "0", "7", "F1", "F12", "Left", "Right", "Up", "Down", "WheelUp",
];
const MODIFIERS: [Modifier; 4] = [
    Modifier::Ctrl,
    Modifier::Shift,
    Modifier::Alt,
    Modifier::Win,
];
const STROKES: [Stroke; 5] = [
    Stroke::Up,
    Stroke::Right,
    Stroke::Down,
    Stroke::Left,
    Stroke::Click,
];

fn key_gesture() -> impl Strategy<Value = KeyGesture> {
    (
        prop::sample::subsequence(MODIFIERS.to_vec(), 0..=3),
        prop::sample::select(KEYS),
    )
        .prop_map(|(modifiers, key)| KeyGesture::new(modifiers, key).unwrap())
}

fn key_set() -> impl Strategy<Value = KeyGestureSet> {
    prop::collection::vec(key_gesture(), 0..4).prop_map(KeyGestureSet::new)
}

fn pointer_sequence() -> impl Strategy<Value = PointerGestureSequence> {
    prop::collection::vec(prop::sample::select(STROKES.to_vec()), 0..6)
        .prop_map(PointerGestureSequence::new)
}

fn touch_set() -> impl Strategy<Value = TouchZoneSet> {
    prop::sample::subsequence(TouchZone::ALL.to_vec(), 0..=5).prop_map(TouchZoneSet::new)
}

proptest! {
    #[test]
    fn prop_key_set_round_trips(set in key_set()) {
        let parsed: KeyGestureSet = set.to_string().parse().unwrap();
        prop_assert_eq!(parsed, set);
    }

    #[test]
    fn prop_pointer_round_trips(sequence in pointer_sequence()) {
        let parsed: PointerGestureSequence = sequence.to_string().parse().unwrap();
        prop_assert_eq!(parsed, sequence);
    }

    #[test]
    fn prop_touch_round_trips(zones in touch_set()) {
        let parsed: TouchZoneSet = zones.to_string().parse().unwrap();
        prop_assert_eq!(parsed, zones);
    }

    #[test]
    fn prop_key_conflicts_are_symmetric(a in key_set(), b in key_set()) {
        let catalog = CommandCatalog::from_definitions([
            definition("A", &a.to_string(), "", ""),
            definition("B", &b.to_string(), "", ""),
        ])
        .unwrap();

        for gesture in catalog.get("A").unwrap().bindings().gestures(GestureSpace::Key) {
            let Gesture::Key(key) = &gesture else { continue };
            let expected = b.contains(key);
            let conflicts = catalog.query_conflicts(&gesture, "A");
            prop_assert_eq!(conflicts == vec!["B".to_string()], expected);
            if expected {
                prop_assert_eq!(catalog.query_conflicts(&gesture, "B"), vec!["A".to_string()]);
            }
        }
    }

    #[test]
    fn prop_index_agrees_with_scan(a in key_set(), b in key_set(), p in pointer_sequence()) {
        let catalog = CommandCatalog::from_definitions([
            definition("A", &a.to_string(), &p.to_string(), ""),
            definition("B", &b.to_string(), &p.to_string(), ""),
        ])
        .unwrap();
        let index = catalog.conflict_index();

        for command in catalog.iter() {
            for space in GestureSpace::ALL {
                for gesture in command.bindings().gestures(space) {
                    prop_assert_eq!(
                        index.query(&gesture, command.name()),
                        catalog.query_conflicts(&gesture, command.name())
                    );
                }
            }
        }
    }
}
