// Weighted random walk over a transition table.
//
// A melody starts at a source state chosen uniformly from the table, then
// makes up to `length - 1` attempts to extend itself. Each attempt looks up
// the successors of the current last note and draws one with probability
// proportional to its count.
//
// When the last note is a sink (no recorded successor) the attempt is
// skipped: nothing is appended but the attempt is still spent. The melody is
// therefore never longer than `length` and may be shorter. This is the
// intended policy, not an error path.
//
// The random source is always passed in, so callers choose between a seeded
// `StdRng` for reproducible output and OS entropy for fresh output.

use crate::chain::{Successors, TransitionTable};
use crate::event::NoteEvent;
use rand::Rng;
use tracing::trace;

/// A generated sequence of note events.
pub type Melody = Vec<NoteEvent>;

/// Walk `table` for at most `length` notes.
///
/// Returns `None` when the table is empty (the track contributes nothing) or
/// when `length` is zero.
pub fn sample_melody<R: Rng + ?Sized>(
    table: &TransitionTable,
    length: usize,
    rng: &mut R,
) -> Option<Melody> {
    if table.is_empty() || length == 0 {
        return None;
    }

    let start_index = rng.random_range(0..table.state_count());
    let start = *table.sources().nth(start_index)?;

    let mut melody = Vec::with_capacity(length);
    melody.push(start);
    let mut skipped = 0usize;

    for _ in 1..length {
        let current = melody[melody.len() - 1];
        let next = table
            .successors(&current)
            .and_then(|successors| draw_successor(successors, rng));

        match next {
            Some(note) => melody.push(note),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        trace!(
            skipped,
            produced = melody.len(),
            requested = length,
            "walk reached a sink"
        );
    }
    Some(melody)
}

/// Draw one successor weighted by count.
fn draw_successor<R: Rng + ?Sized>(successors: &Successors, rng: &mut R) -> Option<NoteEvent> {
    let total: u64 = successors.values().map(|&count| u64::from(count)).sum();
    if total == 0 {
        return None;
    }
    pick_weighted(successors, rng.random_range(0..total))
}

/// Select the successor whose cumulative count range contains `target`.
///
/// `target` must lie in `[0, total)`; anything at or past the total returns
/// `None`. Candidates are scanned in the table's sorted order.
pub fn pick_weighted(successors: &Successors, target: u64) -> Option<NoteEvent> {
    let mut cumulative = 0u64;
    for (&note, &count) in successors {
        cumulative += u64::from(count);
        if cumulative > target {
            return Some(note);
        }
    }
    None
}
