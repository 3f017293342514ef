//! # tingxie
//!
//! Transcribes one media file: loads settings, initializes logging, wires
//! the Groq and ffmpeg adapters into a transcription session, and writes the
//! transcript JSON. Ctrl-C stops the run and still writes the partial result.

#![deny(unsafe_code)]

mod app;
mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use tingxie_core::logging::init_subscriber;
use tingxie_settings::{load_settings_with_report, settings_path};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let config_path = args.config.clone().unwrap_or_else(settings_path);
    let (mut settings, rejected) = load_settings_with_report(&config_path)
        .with_context(|| format!("failed to load settings from {}", config_path.display()))?;
    args.apply_to(&mut settings);
    settings.validate().context("invalid settings")?;

    init_subscriber(&settings.logging.level, settings.logging.json);
    for r in &rejected {
        r.log();
    }
    info!(config = %config_path.display(), source = %args.source.display(), "tingxie starting");

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    let _signal = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping after in-flight requests");
            interrupt.cancel();
        }
    });

    let session = app::build_session(&settings, cancel)?;
    let transcript = session
        .run(&args.source, args.language.as_deref())
        .await
        .with_context(|| format!("failed to transcribe {}", args.source.display()))?;

    if transcript.cancelled {
        warn!(segments = transcript.segments.len(), "writing partial transcript");
    }
    app::write_transcript(&transcript, args.output.as_deref())
}
