//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use tingxie_settings::TingxieSettings;

/// Transcribe an audio or video file with Groq Whisper and print the
/// transcript as JSON, normalized to Traditional Chinese.
#[derive(Parser, Debug)]
#[command(name = "tingxie", version, about)]
pub struct Cli {
    /// Audio or video file to transcribe.
    pub source: PathBuf,

    /// Settings file (default: `~/.tingxie/settings.json`).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Spoken language hint such as `zh` or `en`; detected when omitted.
    #[arg(long)]
    pub language: Option<String>,

    /// Write the transcript JSON to this file instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Chunks transcribed at once (overrides settings).
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..=64))]
    pub concurrency: Option<u16>,

    /// Log filter such as `debug` (overrides settings; `RUST_LOG` still wins).
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    /// Apply command-line overrides on top of loaded settings.
    pub fn apply_to(&self, settings: &mut TingxieSettings) {
        if let Some(n) = self.concurrency {
            settings.transcription.concurrency = usize::from(n);
        }
        if let Some(level) = &self.log_level {
            settings.logging.level.clone_from(level);
        }
    }
}
