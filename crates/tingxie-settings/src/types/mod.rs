//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase", default)]`: field names are
//! camelCase in JSON and missing fields take their [`Default`] value, so a
//! settings file only needs the keys it changes.

mod groq;
mod transcription;

pub use groq::*;
pub use transcription::*;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings type.
///
/// ```json
/// {
///   "groq": { "apiKeys": ["gsk_a", "gsk_b"] },
///   "transcription": { "chunkDurationSecs": 300, "concurrency": 2 },
///   "logging": { "level": "debug" }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TingxieSettings {
    /// Groq provider endpoints, models and credentials.
    pub groq: GroqSettings,
    /// Chunking, retry and routing behavior.
    pub transcription: TranscriptionSettings,
    /// Log output.
    pub logging: LoggingSettings,
}

impl TingxieSettings {
    /// Reject values the orchestrator cannot run with.
    pub fn validate(&self) -> Result<()> {
        let t = &self.transcription;
        if t.chunk_duration_secs == 0 {
            return Err(SettingsError::invalid(
                "transcription.chunkDurationSecs",
                "must be greater than 0",
            ));
        }
        if t.max_attempts == 0 {
            return Err(SettingsError::invalid(
                "transcription.maxAttempts",
                "must be at least 1",
            ));
        }
        if t.concurrency == 0 {
            return Err(SettingsError::invalid(
                "transcription.concurrency",
                "must be at least 1",
            ));
        }
        if t.max_upload_bytes == 0 {
            return Err(SettingsError::invalid(
                "transcription.maxUploadBytes",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// Log output settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Emit one JSON object per line instead of compact text.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}
