use crate::sequence::entry::SequenceEntry;
use std::collections::BTreeMap;

/// Sequence name mapped to its frames, ascending by frame number.
pub type SequenceMap = BTreeMap<String, Vec<SequenceEntry>>;

/// Group entries by sequence name and sort each group by frame number.
///
/// The sort is stable: entries sharing a frame number keep their input
/// order, and duplicate frame numbers are retained.
pub fn group_by_sequence(entries: Vec<SequenceEntry>) -> SequenceMap {
    let mut sequences: SequenceMap = BTreeMap::new();

    for entry in entries {
        sequences
            .entry(entry.sequence_name.clone())
            .or_default()
            .push(entry);
    }

    for frames in sequences.values_mut() {
        frames.sort_by_key(|entry| entry.frame_number);
    }

    sequences
}
