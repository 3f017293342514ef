//! Collaborator traits the orchestrator depends on.
//!
//! The orchestrator never talks to a provider, converter or media tool
//! directly; it goes through these seams so that adapters (Groq, ffmpeg) and
//! test fakes are interchangeable.

use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use tingxie_core::{Credential, RecognitionError, RecognitionResult};

use crate::errors::MediaError;

/// One recognition call for one chunk.
#[derive(Clone, Debug)]
pub struct RecognitionRequest<'a> {
    /// Encoded audio bytes of the chunk, read once and shared by every
    /// attempt.
    pub audio: Bytes,
    /// File name hint (the provider infers the container from it).
    pub filename: &'a str,
    /// Language hint, e.g. `"zh"`. `None` lets the provider detect it.
    pub language: Option<&'a str>,
}

/// Speech-recognition provider.
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Transcribe one chunk with the given credential.
    ///
    /// Errors must carry the raw provider message so the retry-after hint
    /// can be recovered from it.
    async fn recognize(
        &self,
        credential: &Credential,
        request: RecognitionRequest<'_>,
    ) -> Result<RecognitionResult, RecognitionError>;
}

/// Converts recognized text into the target script.
#[async_trait]
pub trait TextNormalizer: Send + Sync {
    /// Convert between script variants of the same language. Returns the
    /// input unchanged when conversion is not possible.
    fn to_target_script(&self, text: &str) -> String;

    /// Translate text in another language into the target script. Never
    /// fails: on any error the input is returned unchanged.
    async fn translate_to_target_script(&self, text: &str) -> String;
}

/// Audio inspection and slicing.
#[async_trait]
pub trait MediaTool: Send + Sync {
    /// Duration of the media file in seconds, or `0.0` if it cannot be read.
    async fn probe_duration(&self, path: &Path) -> f64;

    /// Write `duration` seconds of `source`, starting at `start`, to `output`.
    async fn slice(
        &self,
        source: &Path,
        start: f64,
        duration: f64,
        output: &Path,
    ) -> Result<(), MediaError>;
}
