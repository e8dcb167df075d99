// Markov melody generator — CLI entry point.
//
// Reads a MIDI file, learns one note-transition chain per track, samples a
// new melody from each and writes them to a multi-track MIDI file.
//
// Usage:
//   cargo run -p markov_melody -- <input.mid> [-o output.mid] [-n LENGTH]
//     [--seed N] [--config run.json]
//
// Flags override the corresponding fields of the JSON config. Log verbosity
// follows RUST_LOG (default: info).

use clap::Parser;
use markov_melody::{GeneratorConfig, run};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "generate")]
#[command(about = "Generate new melodies from the note transitions of a MIDI file")]
#[command(version)]
struct Cli {
    /// MIDI file to learn from
    input: Option<PathBuf>,

    /// Where to write the generated MIDI file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Notes to generate per track
    #[arg(short = 'n', long)]
    length: Option<usize>,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file with default settings
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> markov_melody::Result<GeneratorConfig> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::load(path)?,
            None => GeneratorConfig::default(),
        };
        if let Some(input) = self.input {
            config.input = input;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(length) = self.length {
            config.length = length;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = Cli::parse().into_config().and_then(|config| run(&config));
    match result {
        Ok(summary) => {
            println!(
                "Wrote {} tracks ({} notes) to {}",
                summary.tracks_written,
                summary.notes_written,
                summary.output.display()
            );
            println!("Play with: timidity {} (or any MIDI player)", summary.output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
