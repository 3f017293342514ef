//! Chunking, retry and routing settings.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tingxie_core::RetryPolicy;
use tingxie_core::retry::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_RATE_LIMIT_FALLBACK_SECS, DEFAULT_RETRY_AFTER_MARGIN_SECS,
    DEFAULT_TRANSIENT_RETRY_SECS,
};

/// Groq's upload ceiling for audio files.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 25 * 1024 * 1024;
/// Length of each slice when a source must be split.
pub const DEFAULT_CHUNK_DURATION_SECS: u64 = 600;

/// Orchestrator behavior.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranscriptionSettings {
    /// Sources larger than this are split into chunks.
    pub max_upload_bytes: u64,
    /// Duration of each chunk in seconds.
    pub chunk_duration_secs: u64,
    /// Attempts per chunk before it is recorded as failed.
    pub max_attempts: u32,
    /// Chunks transcribed at once (1 = strictly sequential).
    pub concurrency: usize,
    /// Also translate every segment when a chunk takes the translation path.
    pub translate_segments: bool,
    /// Backoff when all keys are rate limited and no hint was given.
    pub rate_limit_fallback_secs: u64,
    /// Added to the provider's retry hint.
    pub retry_after_margin_secs: u64,
    /// Delay before retrying any other failure.
    pub transient_retry_secs: u64,
    /// Target script variant for normalization (e.g. `zh-TW`).
    pub target_variant: String,
    /// `ffmpeg` executable.
    pub ffmpeg_path: String,
    /// `ffprobe` executable.
    pub ffprobe_path: String,
    /// Parent of per-session work directories (system temp dir when unset).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            chunk_duration_secs: DEFAULT_CHUNK_DURATION_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            concurrency: 1,
            translate_segments: false,
            rate_limit_fallback_secs: DEFAULT_RATE_LIMIT_FALLBACK_SECS,
            retry_after_margin_secs: DEFAULT_RETRY_AFTER_MARGIN_SECS,
            transient_retry_secs: DEFAULT_TRANSIENT_RETRY_SECS,
            target_variant: "zh-TW".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            temp_dir: None,
        }
    }
}

impl TranscriptionSettings {
    /// The driver's attempt budget and wait timings.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            rate_limit_fallback: Duration::from_secs(self.rate_limit_fallback_secs),
            retry_after_margin: Duration::from_secs(self.retry_after_margin_secs),
            transient_delay: Duration::from_secs(self.transient_retry_secs),
        }
    }
}
