// MIDI file input and output.
//
// Reading: parses a Standard MIDI File with `midly` and flattens each track
// into the chain core's `TrackMessage` stream. Meta events become
// `MessageKind::Meta`; channel messages the core does not model (pitch bend,
// aftertouch) and sysex/escape packets become `MessageKind::Other`. Channel
// numbers are dropped, since the core keys pending notes by pitch only.
//
// Writing: turns rendered output message streams into an SMF Format 1
// (multi-track) file, one track per generated melody, each closed by an
// end-of-track meta event. The header timing is supplied by the caller so
// durations learned from a file keep their meaning when written back. A
// delta wider than 28 bits is carried by empty text meta events of the
// maximum delta, so long notes keep their exact length.

use markov_melody_chain::{MessageKind, OutputMessage, TrackMessage};
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u28},
};
use std::path::Path;
use tracing::debug;

use crate::error::Result;

/// Ticks per quarter note for files that have no source timing.
pub const TICKS_PER_QUARTER: u16 = 480;

/// Largest delta a track event can encode (28-bit variable-length quantity).
const MAX_DELTA: u32 = (1 << 28) - 1;

/// A parsed input file, reduced to what the chain core consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSong {
    pub timing: Timing,
    pub tracks: Vec<Vec<TrackMessage>>,
}

/// Default header timing for generated files.
pub fn default_timing() -> Timing {
    Timing::Metrical(u15::new(TICKS_PER_QUARTER))
}

/// Read and parse a MIDI file from disk.
pub fn read_midi(path: &Path) -> Result<ParsedSong> {
    let data = std::fs::read(path)?;
    parse_song(&data)
}

/// Parse SMF bytes into per-track message streams.
pub fn parse_song(data: &[u8]) -> Result<ParsedSong> {
    let smf = Smf::parse(data)?;
    let tracks = smf
        .tracks
        .iter()
        .map(|track| track.iter().map(to_track_message).collect())
        .collect();
    Ok(ParsedSong {
        timing: smf.header.timing,
        tracks,
    })
}

fn to_track_message(event: &TrackEvent<'_>) -> TrackMessage {
    let kind = match event.kind {
        TrackEventKind::Meta(_) => MessageKind::Meta,
        TrackEventKind::Midi { message, .. } => match message {
            MidiMessage::NoteOn { key, vel } => MessageKind::NoteOn {
                note: key.as_int(),
                velocity: vel.as_int(),
            },
            MidiMessage::NoteOff { key, vel } => MessageKind::NoteOff {
                note: key.as_int(),
                velocity: vel.as_int(),
            },
            MidiMessage::ProgramChange { program } => MessageKind::ProgramChange {
                program: program.as_int(),
            },
            MidiMessage::Controller { controller, value } => MessageKind::ControlChange {
                control: controller.as_int(),
                value: value.as_int(),
            },
            _ => MessageKind::Other,
        },
        TrackEventKind::SysEx(_) | TrackEventKind::Escape(_) => MessageKind::Other,
    };
    TrackMessage::new(event.delta.as_int(), kind)
}

/// Write rendered tracks to a MIDI file.
pub fn write_midi<'a>(
    path: &Path,
    timing: Timing,
    tracks: impl IntoIterator<Item = &'a [OutputMessage]>,
) -> Result<()> {
    let smf = song_to_smf(timing, tracks);
    let mut buf = Vec::new();
    smf.write_std(&mut buf)?;
    std::fs::write(path, &buf)?;
    Ok(())
}

/// Build an in-memory SMF with one track per rendered message stream.
pub fn song_to_smf<'a>(
    timing: Timing,
    tracks: impl IntoIterator<Item = &'a [OutputMessage]>,
) -> Smf<'static> {
    let mut smf = Smf::new(Header::new(Format::Parallel, timing));

    for messages in tracks {
        let mut track: Track<'static> = Vec::with_capacity(messages.len() + 1);
        for msg in messages {
            push_event(&mut track, msg);
        }
        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        });
        smf.tracks.push(track);
    }

    smf
}

/// Append `msg`, preceded by filler events if its delta needs more than 28 bits.
fn push_event(track: &mut Track<'static>, msg: &OutputMessage) {
    let mut delta = msg.delta();
    if delta > MAX_DELTA {
        debug!(delta, "splitting oversized delta across filler events");
    }
    while delta > MAX_DELTA {
        track.push(TrackEvent {
            delta: u28::new(MAX_DELTA),
            kind: TrackEventKind::Meta(MetaMessage::Text(b"")),
        });
        delta -= MAX_DELTA;
    }
    track.push(to_track_event(msg, delta));
}

fn to_track_event(msg: &OutputMessage, delta: u32) -> TrackEvent<'static> {
    let (channel, message) = match *msg {
        OutputMessage::ProgramChange { channel, program } => (
            channel,
            MidiMessage::ProgramChange {
                program: u7::new(program),
            },
        ),
        OutputMessage::ControlChange {
            channel,
            control,
            value,
        } => (
            channel,
            MidiMessage::Controller {
                controller: u7::new(control),
                value: u7::new(value),
            },
        ),
        OutputMessage::NoteOn {
            channel,
            note,
            velocity,
            ..
        } => (
            channel,
            MidiMessage::NoteOn {
                key: u7::new(note),
                vel: u7::new(velocity),
            },
        ),
        OutputMessage::NoteOff {
            channel,
            note,
            velocity,
            ..
        } => (
            channel,
            MidiMessage::NoteOff {
                key: u7::new(note),
                vel: u7::new(velocity),
            },
        ),
    };

    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Midi {
            channel: u4::new(channel),
            message,
        },
    }
}
