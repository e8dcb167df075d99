// Run configuration.
//
// A run needs an input file, an output file, a melody length applied to
// every track, and optionally a seed. Values come from an optional JSON file
// (`GeneratorConfig::load`) with command-line flags layered on top by
// `main.rs`. Missing JSON fields fall back to the defaults below.
//
// Without a seed the generator draws from OS entropy and runs are not
// reproducible; with one, the same input always yields the same output.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Melody length used when none is configured.
pub const DEFAULT_LENGTH: usize = 200;

/// Output path used when none is configured.
pub const DEFAULT_OUTPUT: &str = "output.mid";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// MIDI file to learn transitions from.
    pub input: PathBuf,
    /// Where the generated MIDI file is written.
    pub output: PathBuf,
    /// Requested notes per generated track. Tracks whose walk reaches a sink
    /// come out shorter.
    pub length: usize,
    /// Seed for the sampler. `None` means OS entropy.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            input: PathBuf::new(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            length: DEFAULT_LENGTH,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: GeneratorConfig = serde_json::from_str(&data)?;
        Ok(config)
    }

    /// Reject configurations a run cannot use.
    pub fn validate(&self) -> Result<()> {
        if self.input.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("no input file given".into()));
        }
        if self.length == 0 {
            return Err(Error::InvalidConfig("melody length must be at least 1".into()));
        }
        Ok(())
    }
}
