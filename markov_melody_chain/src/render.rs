// Rendering a generated melody back into a channel message stream.
//
// Each output track starts with the restored side state (program change,
// then channel volume, each only if the source track had one), followed by
// one note-on/note-off pair per note. The note-on has delta 0 and the
// note-off carries the held duration, so notes never overlap: each release
// is immediately followed by the next attack.

use crate::event::{NoteEvent, TrackSideState, VOLUME_CONTROLLER};

/// A channel message ready for the codec, with its delta time in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMessage {
    ProgramChange { channel: u8, program: u8 },
    ControlChange { channel: u8, control: u8, value: u8 },
    NoteOn {
        channel: u8,
        note: u8,
        velocity: u8,
        delta: u32,
    },
    NoteOff {
        channel: u8,
        note: u8,
        velocity: u8,
        delta: u32,
    },
}

impl OutputMessage {
    pub fn delta(&self) -> u32 {
        match *self {
            OutputMessage::ProgramChange { .. } | OutputMessage::ControlChange { .. } => 0,
            OutputMessage::NoteOn { delta, .. } | OutputMessage::NoteOff { delta, .. } => delta,
        }
    }
}

/// Render one melody on `channel`, restoring `side_state` first.
pub fn render_melody(
    channel: u8,
    side_state: TrackSideState,
    melody: &[NoteEvent],
) -> Vec<OutputMessage> {
    let mut out = Vec::with_capacity(melody.len() * 2 + 2);

    if let Some(program) = side_state.instrument {
        out.push(OutputMessage::ProgramChange { channel, program });
    }
    if let Some(value) = side_state.volume {
        out.push(OutputMessage::ControlChange {
            channel,
            control: VOLUME_CONTROLLER,
            value,
        });
    }

    for note in melody {
        out.push(OutputMessage::NoteOn {
            channel,
            note: note.pitch,
            velocity: note.velocity,
            delta: 0,
        });
        out.push(OutputMessage::NoteOff {
            channel,
            note: note.pitch,
            velocity: note.velocity,
            delta: note.duration,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_state_precedes_notes() {
        let side = TrackSideState {
            instrument: Some(52),
            volume: Some(100),
        };
        let out = render_melody(2, side, &[NoteEvent::new(60, 80, 10)]);
        assert_eq!(
            out,
            vec![
                OutputMessage::ProgramChange {
                    channel: 2,
                    program: 52,
                },
                OutputMessage::ControlChange {
                    channel: 2,
                    control: 7,
                    value: 100,
                },
                OutputMessage::NoteOn {
                    channel: 2,
                    note: 60,
                    velocity: 80,
                    delta: 0,
                },
                OutputMessage::NoteOff {
                    channel: 2,
                    note: 60,
                    velocity: 80,
                    delta: 10,
                },
            ]
        );
    }

    #[test]
    fn test_absent_side_state_is_omitted() {
        let melody = [NoteEvent::new(60, 80, 10), NoteEvent::new(64, 90, 5)];
        let out = render_melody(0, TrackSideState::default(), &melody);
        assert_eq!(out.len(), 4);
        let total: u32 = out.iter().map(OutputMessage::delta).sum();
        assert_eq!(total, 15);
        assert_eq!(
            out[2],
            OutputMessage::NoteOn {
                channel: 0,
                note: 64,
                velocity: 90,
                delta: 0,
            }
        );
    }

    #[test]
    fn test_volume_without_instrument() {
        let side = TrackSideState {
            instrument: None,
            volume: Some(30),
        };
        let out = render_melody(1, side, &[]);
        assert_eq!(
            out,
            vec![OutputMessage::ControlChange {
                channel: 1,
                control: 7,
                value: 30,
            }]
        );
    }
}
