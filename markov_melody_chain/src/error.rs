// Errors raised by the chain core.
//
// The only failure the core recognizes is a note whose release happens
// before its start. Everything else about the incoming stream (unmatched
// note-offs, unknown message kinds, tracks without notes) is tolerated and
// handled in-line by the reducer and sampler.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// A note-off resolved to an elapsed time earlier than its note-on.
    /// Only malformed timing can produce this; processing of the file stops.
    #[error("negative duration for pitch {pitch}: started at tick {start}, released at {end}")]
    NegativeDuration { pitch: u8, start: u64, end: u64 },
}
