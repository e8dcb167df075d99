// Event reduction: raw track messages to discrete note events.
//
// Walks one track's message stream, accumulating absolute time from the
// delta of every message (meta messages included), and pairs each note-on
// with the next note-off (or zero-velocity note-on) of the same pitch. Each
// completed pair becomes a `NoteEvent` carrying the note-on velocity and the
// held duration. Program changes and channel-volume controller changes are
// tracked as side state; everything else is skipped.
//
// Pending notes are keyed by pitch alone. A second note-on for a pitch that
// is still sounding replaces the first (last start wins), and a note-off
// with nothing pending is ignored.
//
// Emission order is scan order, i.e. the order of the terminating messages.

use crate::error::ChainError;
use crate::event::{MessageKind, NoteEvent, TrackMessage, TrackSideState, VOLUME_CONTROLLER};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// A note that has sounded but not yet been released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingNote {
    start: u64,
    velocity: u8,
}

/// Output of reducing a single track.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReducedTrack {
    pub notes: Vec<NoteEvent>,
    pub side_state: TrackSideState,
    /// Notes still sounding when the track ended. They never produced an
    /// event and are dropped.
    pub dangling: usize,
}

/// Incremental reducer for one track. Feed messages in order, then call
/// `finish`.
#[derive(Debug, Default)]
pub struct EventReducer {
    elapsed: u64,
    pending: BTreeMap<u8, PendingNote>,
    notes: Vec<NoteEvent>,
    side_state: TrackSideState,
}

impl EventReducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one message. Returns the note event it completed, if any.
    pub fn feed(&mut self, msg: &TrackMessage) -> Result<Option<NoteEvent>, ChainError> {
        self.elapsed = self.elapsed.saturating_add(u64::from(msg.delta));

        match msg.kind {
            MessageKind::ProgramChange { program } => {
                self.side_state.instrument = Some(program);
            }
            MessageKind::ControlChange { control, value } if control == VOLUME_CONTROLLER => {
                self.side_state.volume = Some(value);
            }
            MessageKind::NoteOn { note, velocity } if velocity > 0 => {
                self.pending.insert(
                    note,
                    PendingNote {
                        start: self.elapsed,
                        velocity,
                    },
                );
            }
            MessageKind::NoteOn { note, .. } | MessageKind::NoteOff { note, .. } => {
                return self.release(note);
            }
            MessageKind::ControlChange { .. } | MessageKind::Meta | MessageKind::Other => {}
        }
        Ok(None)
    }

    /// Close the pending note for `pitch` at the current elapsed time.
    fn release(&mut self, pitch: u8) -> Result<Option<NoteEvent>, ChainError> {
        let Some(pending) = self.pending.remove(&pitch) else {
            return Ok(None);
        };

        let held = self
            .elapsed
            .checked_sub(pending.start)
            .ok_or(ChainError::NegativeDuration {
                pitch,
                start: pending.start,
                end: self.elapsed,
            })?;

        let duration = u32::try_from(held).unwrap_or_else(|_| {
            warn!(pitch, held, "note duration exceeds u32 ticks, saturating");
            u32::MAX
        });
        let note = NoteEvent::new(pitch, pending.velocity, duration);
        self.notes.push(note);
        Ok(Some(note))
    }

    /// Freeze the side state and hand back everything collected.
    pub fn finish(self) -> ReducedTrack {
        let dangling = self.pending.len();
        if dangling > 0 {
            debug!(
                dangling,
                elapsed = self.elapsed,
                "track ended with notes still sounding"
            );
        }
        ReducedTrack {
            notes: self.notes,
            side_state: self.side_state,
            dangling,
        }
    }
}

/// Reduce a whole track in one pass.
pub fn reduce_track(messages: &[TrackMessage]) -> Result<ReducedTrack, ChainError> {
    let mut reducer = EventReducer::new();
    for msg in messages {
        reducer.feed(msg)?;
    }
    Ok(reducer.finish())
}
