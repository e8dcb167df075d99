// End-to-end generation: read, train, compose, write.
//
// `train` builds one `TrackModel` per input track in file order. `compose`
// samples one melody per model with a non-empty table, assigns output
// channels 0, 1, 2, ... in that order, and renders each melody with the side
// state of the track it was learned from. Tracks with no transitions are
// dropped without using up a channel. `run` wires both to file I/O and the
// configured random source.
//
// A negative note duration anywhere in the input aborts the whole run
// before anything is written.

use crate::config::GeneratorConfig;
use crate::error::{Error, Result};
use crate::midi::{ParsedSong, read_midi, write_midi};
use markov_melody_chain::{
    Melody, OutputMessage, TrackModel, render_melody, sample_melody, train_track,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Number of MIDI channels available to generated tracks.
pub const MIDI_CHANNELS: usize = 16;

/// One generated output track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTrack {
    /// Index of the input track the melody was learned from.
    pub source_index: usize,
    pub channel: u8,
    pub melody: Melody,
    pub messages: Vec<OutputMessage>,
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub output: PathBuf,
    pub tracks_read: usize,
    pub tracks_written: usize,
    pub notes_written: usize,
}

/// Train a model for every track of a parsed song.
pub fn train(song: &ParsedSong) -> Result<Vec<TrackModel>> {
    song.tracks
        .iter()
        .enumerate()
        .map(|(index, messages)| train_track(index, messages).map_err(Error::from))
        .collect()
}

/// Sample and render one melody per non-empty model.
pub fn compose<R: Rng + ?Sized>(
    models: &[TrackModel],
    length: usize,
    rng: &mut R,
) -> Result<Vec<RenderedTrack>> {
    let playable = models.iter().filter(|model| !model.table.is_empty()).count();
    if playable > MIDI_CHANNELS {
        return Err(Error::TooManyChannels(playable));
    }

    let mut rendered = Vec::with_capacity(playable);
    for model in models {
        let Some(melody) = sample_melody(&model.table, length, rng) else {
            debug!(
                track = model.index,
                notes = model.note_count,
                "no transitions, track skipped"
            );
            continue;
        };

        // Bounded by the MIDI_CHANNELS check above.
        let channel = rendered.len() as u8;
        debug!(
            track = model.index,
            channel,
            requested = length,
            produced = melody.len(),
            "sampled melody"
        );

        let messages = render_melody(channel, model.side_state, &melody);
        rendered.push(RenderedTrack {
            source_index: model.index,
            channel,
            melody,
            messages,
        });
    }
    Ok(rendered)
}

/// Run a full generation pass as described by `config`.
pub fn run(config: &GeneratorConfig) -> Result<RunSummary> {
    config.validate()?;

    let song = read_midi(&config.input)?;
    info!(input = %config.input.display(), tracks = song.tracks.len(), "read input");

    let models = train(&song)?;
    let states: usize = models.iter().map(|model| model.table.state_count()).sum();
    let dangling: usize = models.iter().map(|model| model.dangling).sum();
    if dangling > 0 {
        warn!(dangling, "dropped notes still sounding at end of track");
    }
    info!(states, "trained transition tables");

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let rendered = compose(&models, config.length, &mut rng)?;

    write_midi(
        &config.output,
        song.timing,
        rendered.iter().map(|track| track.messages.as_slice()),
    )?;

    let summary = RunSummary {
        output: config.output.clone(),
        tracks_read: song.tracks.len(),
        tracks_written: rendered.len(),
        notes_written: rendered.iter().map(|track| track.melody.len()).sum(),
    };
    info!(
        output = %summary.output.display(),
        tracks = summary.tracks_written,
        notes = summary.notes_written,
        "wrote generated melodies"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use markov_melody_chain::{MessageKind, NoteEvent, TrackMessage, TrackSideState};

    fn scale_track(program: Option<u8>, pitches: &[u8]) -> Vec<TrackMessage> {
        let mut track = Vec::new();
        if let Some(program) = program {
            track.push(TrackMessage::new(0, MessageKind::ProgramChange { program }));
        }
        for &note in pitches {
            track.push(TrackMessage::new(0, MessageKind::NoteOn { note, velocity: 90 }));
            track.push(TrackMessage::new(60, MessageKind::NoteOff { note, velocity: 0 }));
        }
        track
    }

    fn song(tracks: Vec<Vec<TrackMessage>>) -> ParsedSong {
        ParsedSong {
            timing: crate::midi::default_timing(),
            tracks,
        }
    }

    #[test]
    fn test_side_state_follows_its_track() {
        // Track 0 has a single note, so it is skipped; track 1 must still get
        // its own instrument, on channel 0.
        let parsed = song(vec![
            scale_track(Some(10), &[60]),
            scale_track(Some(41), &[60, 62, 64, 60]),
        ]);
        let models = train(&parsed).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let rendered = compose(&models, 8, &mut rng).unwrap();

        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].source_index, 1);
        assert_eq!(rendered[0].channel, 0);
        assert_eq!(
            rendered[0].messages[0],
            OutputMessage::ProgramChange {
                channel: 0,
                program: 41,
            }
        );
    }

    #[test]
    fn test_side_state_does_not_leak_between_tracks() {
        let parsed = song(vec![
            scale_track(Some(33), &[60, 62, 60]),
            scale_track(None, &[70, 72, 70]),
        ]);
        let models = train(&parsed).unwrap();
        assert_eq!(models[1].side_state, TrackSideState::default());

        let rendered = compose(&models, 4, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(rendered.len(), 2);
        assert!(matches!(rendered[1].messages[0], OutputMessage::NoteOn { channel: 1, .. }));
    }

    #[test]
    fn test_melodies_respect_length() {
        let scale = scale_track(None, &[60, 62, 64, 65, 67, 65, 64, 62, 60]);
        let parsed = song(vec![scale]);
        let models = train(&parsed).unwrap();
        let rendered = compose(&models, 12, &mut StdRng::seed_from_u64(11)).unwrap();

        let melody = &rendered[0].melody;
        assert!(!melody.is_empty() && melody.len() <= 12);
        assert!(melody.iter().all(|note| note.duration == 60));
        assert_eq!(rendered[0].messages.len(), melody.len() * 2);
        assert_eq!(
            rendered[0].messages[1],
            OutputMessage::NoteOff {
                channel: 0,
                note: melody[0].pitch,
                velocity: 90,
                delta: 60,
            }
        );
        assert_eq!(melody[0], NoteEvent::new(melody[0].pitch, 90, 60));
    }

    #[test]
    fn test_too_many_channels() {
        let tracks = (0..17).map(|_| scale_track(None, &[60, 62])).collect();
        let models = train(&song(tracks)).unwrap();
        let result = compose(&models, 4, &mut StdRng::seed_from_u64(0));
        assert!(matches!(result, Err(Error::TooManyChannels(17))));
    }

    #[test]
    fn test_empty_tracks_do_not_count_toward_channels() {
        let mut tracks: Vec<Vec<TrackMessage>> = (0..10).map(|_| Vec::new()).collect();
        tracks.extend((0..16).map(|_| scale_track(None, &[60, 62])));
        let models = train(&song(tracks)).unwrap();
        let rendered = compose(&models, 4, &mut StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(rendered.len(), 16);
        assert_eq!(rendered[15].channel, 15);
        assert_eq!(rendered[15].source_index, 25);
    }

    #[test]
    fn test_train_reports_dangling_per_track() {
        let note = 67;
        let mut held = scale_track(None, &[60, 62]);
        held.push(TrackMessage::new(0, MessageKind::NoteOn { note, velocity: 90 }));
        let models = train(&song(vec![scale_track(None, &[60, 62]), held])).unwrap();
        assert_eq!(models[0].dangling, 0);
        assert_eq!(models[1].dangling, 1);
        assert_eq!(models[1].note_count, 2);
    }
}
