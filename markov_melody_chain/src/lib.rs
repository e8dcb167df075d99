// Markov melody core.
//
// Turns one MIDI track's message stream into a first-order Markov chain over
// note events, and walks that chain to produce new melodies. The crate knows
// nothing about the SMF binary format: it consumes and produces the
// simplified streams in `event.rs` and `render.rs`, and the codec adapter in
// `markov_melody` does the translation.
//
// Pipeline per track:
// - reducer.rs: raw messages -> note events (pitch, velocity, duration) plus
//   the track's last instrument and volume
// - chain.rs: note events -> transition table of observed successor counts
// - sampler.rs: transition table -> generated melody by weighted random walk
// - render.rs: generated melody -> note-on/note-off output messages
//
// Tracks never share state, and the only randomness is the generator handed
// to the sampler, so a fixed seed reproduces a run exactly.

pub mod chain;
pub mod error;
pub mod event;
pub mod reducer;
pub mod render;
pub mod sampler;

pub use chain::{TrackModel, TransitionTable, train_track};
pub use error::ChainError;
pub use event::{MessageKind, NoteEvent, TrackMessage, TrackSideState};
pub use reducer::{EventReducer, ReducedTrack, reduce_track};
pub use render::{OutputMessage, render_melody};
pub use sampler::{Melody, sample_melody};
