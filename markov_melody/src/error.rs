// Error type for the generator.
//
// Wraps the chain core's errors together with codec, I/O and configuration
// failures so `?` propagates from any stage of a run.

use markov_melody_chain::ChainError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("MIDI: {0}")]
    Midi(#[from] midly::Error),

    #[error("Config file: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("{0} tracks produced melodies, but MIDI only has 16 channels")]
    TooManyChannels(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
