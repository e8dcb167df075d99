// Note events and the simplified per-track message stream.
//
// `TrackMessage` is the codec-neutral view of one MIDI track event: a delta
// time plus the handful of message kinds the reducer cares about. The codec
// adapter (`markov_melody::midi`) translates real SMF events into this shape,
// so nothing in this crate ever sees binary MIDI.
//
// `NoteEvent` is the vertex type of the transition graph. It derives `Ord`
// so tables can be `BTreeMap`s, which gives a stable iteration order and
// therefore reproducible sampling under a fixed seed.

/// MIDI controller number for channel volume.
pub const VOLUME_CONTROLLER: u8 = 7;

/// One sounded note: pitch, attack velocity and held length in ticks.
///
/// Two events with the same three fields are the same graph vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NoteEvent {
    pub pitch: u8,
    pub velocity: u8,
    pub duration: u32,
}

impl NoteEvent {
    pub fn new(pitch: u8, velocity: u8, duration: u32) -> Self {
        NoteEvent {
            pitch,
            velocity,
            duration,
        }
    }
}

/// A single message from a track, with its delta time in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackMessage {
    pub delta: u32,
    pub kind: MessageKind,
}

impl TrackMessage {
    pub fn new(delta: u32, kind: MessageKind) -> Self {
        TrackMessage { delta, kind }
    }
}

/// The message kinds the reducer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Non-performance data (tempo, markers, track names, sysex).
    Meta,
    ProgramChange { program: u8 },
    ControlChange { control: u8, value: u8 },
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8, velocity: u8 },
    /// Any other channel message (pitch bend, aftertouch, ...).
    Other,
}

/// Last instrument and volume seen on a track.
///
/// Both start absent and are overwritten by every matching message, so the
/// value at end of scan is the last one in the track.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackSideState {
    pub instrument: Option<u8>,
    pub volume: Option<u8>,
}
