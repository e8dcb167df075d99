// First-order transition tables over note events.
//
// A `TransitionTable` records, for each note event, how many times each
// other note event followed it in the source track. Building a table is a
// pure fold over the reduced note sequence: every adjacent pair adds one to
// `table[prev][next]`. A track with n notes therefore contributes exactly
// n - 1 counts, and a track with zero or one note yields an empty table.
//
// Tables use `BTreeMap` at both levels so iteration order depends only on
// the contents, never on hashing. The sampler relies on this to make
// seeded runs reproducible.
//
// `TrackModel` bundles a table with the track's side state and original
// index; `train_track` runs reduction and building for one track.

use crate::error::ChainError;
use crate::event::{NoteEvent, TrackMessage, TrackSideState};
use crate::reducer::reduce_track;
use std::collections::BTreeMap;
use tracing::debug;

/// Successor counts out of one note event.
pub type Successors = BTreeMap<NoteEvent, u32>;

/// Observed note-to-note transition counts for one track.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionTable {
    transitions: BTreeMap<NoteEvent, Successors>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a note sequence into a table, counting each adjacent pair once.
    pub fn from_notes(notes: &[NoteEvent]) -> Self {
        let mut table = TransitionTable::new();
        for pair in notes.windows(2) {
            table.record(pair[0], pair[1]);
        }
        table
    }

    /// Count one observed transition, creating the entry on first sight.
    pub fn record(&mut self, from: NoteEvent, to: NoteEvent) {
        *self
            .transitions
            .entry(from)
            .or_default()
            .entry(to)
            .or_insert(0) += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Number of distinct source states.
    pub fn state_count(&self) -> usize {
        self.transitions.len()
    }

    /// Sum of every transition count in the table.
    pub fn total_transitions(&self) -> u64 {
        self.transitions
            .values()
            .flat_map(|succ| succ.values())
            .map(|&count| u64::from(count))
            .sum()
    }

    /// Outgoing transitions of `state`, or `None` if it is a sink.
    pub fn successors(&self, state: &NoteEvent) -> Option<&Successors> {
        self.transitions.get(state)
    }

    /// All states with at least one outgoing transition, in sorted order.
    pub fn sources(&self) -> impl ExactSizeIterator<Item = &NoteEvent> {
        self.transitions.keys()
    }

    /// Count for a single `from -> to` edge (0 if never observed).
    #[cfg(test)]
    pub fn count(&self, from: &NoteEvent, to: &NoteEvent) -> u32 {
        self.transitions
            .get(from)
            .and_then(|succ| succ.get(to))
            .copied()
            .unwrap_or(0)
    }
}

/// A trained track: its transition table plus the side state to restore on
/// output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackModel {
    /// Position of the track in the source file.
    pub index: usize,
    pub table: TransitionTable,
    pub side_state: TrackSideState,
    /// Notes the reducer produced for this track.
    pub note_count: usize,
    /// Notes still sounding at end of track, dropped by the reducer.
    pub dangling: usize,
}

/// Reduce one track's messages and build its transition table.
pub fn train_track(index: usize, messages: &[TrackMessage]) -> Result<TrackModel, ChainError> {
    let reduced = reduce_track(messages)?;
    let table = TransitionTable::from_notes(&reduced.notes);

    debug!(
        track = index,
        notes = reduced.notes.len(),
        states = table.state_count(),
        transitions = table.total_transitions(),
        dangling = reduced.dangling,
        "built transition table"
    );

    Ok(TrackModel {
        index,
        table,
        side_state: reduced.side_state,
        note_count: reduced.notes.len(),
        dangling: reduced.dangling,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::MessageKind;

    fn n(pitch: u8, duration: u32) -> NoteEvent {
        NoteEvent::new(pitch, 80, duration)
    }

    fn on(delta: u32, note: u8, velocity: u8) -> TrackMessage {
        TrackMessage::new(delta, MessageKind::NoteOn { note, velocity })
    }

    fn off(delta: u32, note: u8) -> TrackMessage {
        TrackMessage::new(delta, MessageKind::NoteOff { note, velocity: 0 })
    }

    #[test]
    fn test_empty_and_single_note_tables() {
        assert!(TransitionTable::from_notes(&[]).is_empty());
        assert!(TransitionTable::from_notes(&[n(60, 10)]).is_empty());
    }

    #[test]
    fn test_counts_accumulate_on_equal_events() {
        let a = n(60, 10);
        let b = n(62, 10);
        let table = TransitionTable::from_notes(&[a, b, a, b, a]);
        assert_eq!(table.count(&a, &b), 2);
        assert_eq!(table.count(&b, &a), 2);
        assert_eq!(table.count(&a, &a), 0);
        assert_eq!(table.state_count(), 2);
    }

    #[test]
    fn test_mass_is_conserved() {
        let notes: Vec<NoteEvent> = [60, 62, 64, 62, 60, 60, 67, 62, 64]
            .iter()
            .map(|&p| n(p, 5))
            .collect();
        let table = TransitionTable::from_notes(&notes);
        assert_eq!(table.total_transitions(), notes.len() as u64 - 1);
    }

    #[test]
    fn test_construction_is_deterministic() {
        let notes = [n(60, 1), n(64, 2), n(67, 3), n(64, 2), n(60, 1)];
        assert_eq!(
            TransitionTable::from_notes(&notes),
            TransitionTable::from_notes(&notes)
        );
    }

    #[test]
    fn test_sink_has_no_successors() {
        let table = TransitionTable::from_notes(&[n(60, 10), n(72, 10)]);
        assert!(table.successors(&n(72, 10)).is_none());
        assert_eq!(table.sources().collect::<Vec<_>>(), vec![&n(60, 10)]);
    }

    #[test]
    fn test_train_track_scenario() {
        let messages = [on(0, 60, 80), off(10, 60), on(0, 64, 90), off(5, 64)];
        let model = train_track(3, &messages).unwrap();

        let first = NoteEvent::new(60, 80, 10);
        let second = NoteEvent::new(64, 90, 5);
        let mut expected = TransitionTable::new();
        expected.record(first, second);

        assert_eq!(model.index, 3);
        assert_eq!(model.note_count, 2);
        assert_eq!(model.table, expected);
        assert_eq!(model.table.total_transitions(), 1);
        assert_eq!(model.dangling, 0);
    }

    #[test]
    fn test_train_track_reports_dangling_notes() {
        let messages = [on(0, 60, 80), off(4, 60), on(0, 62, 80), on(0, 67, 70), off(6, 62)];
        let model = train_track(0, &messages).unwrap();
        assert_eq!(model.note_count, 2);
        assert_eq!(model.dangling, 1);
    }
}
