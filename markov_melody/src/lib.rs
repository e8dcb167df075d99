// Markov melody generator.
//
// Learns a note-transition Markov chain from every track of a MIDI file and
// writes a new MIDI file with one freshly sampled melody per track. The
// chain logic itself lives in `markov_melody_chain`; this crate adds the
// file format, configuration and the run pipeline.
//
// Architecture:
// - midi.rs: SMF parsing into per-track message streams and SMF writing of
//   rendered melodies (via `midly`)
// - pipeline.rs: train every track, sample and render melodies, assign
//   output channels, write the result
// - config.rs: run configuration, JSON loading and validation
// - error.rs: crate-wide error type
//
// The generator is deterministic given a seed.

pub mod config;
pub mod error;
pub mod midi;
pub mod pipeline;

pub use config::GeneratorConfig;
pub use error::{Error, Result};
pub use pipeline::{RunSummary, run};
