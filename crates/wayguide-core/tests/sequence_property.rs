//! Property tests for waypoint sequence ordering.

use proptest::prelude::*;

use wayguide_core::{Position, Waypoint, WaypointSequence};

fn waypoint(index: u32) -> Waypoint {
    Waypoint {
        index,
        position: Position::new("hub", index as f64, 64.0, 0.0),
        message_lines: vec![],
    }
}

proptest! {
    /// Any set of indices, in any insertion order, loads sorted
    /// ascending with contiguous slots.
    #[test]
    fn sequence_sorts_any_index_set(
        indices in proptest::collection::hash_set(0u32..10_000, 0..32)
    ) {
        let waypoints: Vec<Waypoint> = indices.iter().map(|&i| waypoint(i)).collect();
        let sequence = WaypointSequence::from_unsorted(waypoints);

        prop_assert_eq!(sequence.len(), indices.len());

        let loaded: Vec<u32> = sequence.iter().map(|w| w.index).collect();
        let mut expected: Vec<u32> = indices.into_iter().collect();
        expected.sort_unstable();
        prop_assert_eq!(loaded, expected);

        // Slots are dense: every slot up to len is addressable.
        for slot in 0..sequence.len() {
            prop_assert!(sequence.get(slot).is_some());
        }
        prop_assert!(sequence.get(sequence.len()).is_none());
    }

    /// Sorting is stable over already-sorted input.
    #[test]
    fn sorted_input_is_preserved(len in 0usize..32) {
        let waypoints: Vec<Waypoint> = (0..len as u32).map(waypoint).collect();
        let sequence = WaypointSequence::from_unsorted(waypoints);
        let loaded: Vec<u32> = sequence.iter().map(|w| w.index).collect();
        let expected: Vec<u32> = (0..len as u32).collect();
        prop_assert_eq!(loaded, expected);
    }
}
