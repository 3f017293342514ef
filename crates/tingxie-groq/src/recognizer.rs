//! Groq Whisper speech recognition (`/audio/transcriptions`).

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tingxie_core::{Credential, RecognitionError, RecognitionResult, Segment, UNKNOWN_LANGUAGE};
use tingxie_transcription::{RecognitionRequest, Recognizer};
use tracing::debug;

use crate::client::{GroqClient, check_status};
use crate::errors::GroqError;

/// Whisper transcription through Groq's OpenAI-compatible endpoint.
pub struct GroqRecognizer {
    client: GroqClient,
    model: String,
}

impl GroqRecognizer {
    /// Create a recognizer using `model` (e.g. `whisper-large-v3`).
    pub fn new(client: GroqClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    async fn transcribe(
        &self,
        credential: &Credential,
        request: RecognitionRequest<'_>,
    ) -> Result<RecognitionResult, GroqError> {
        let len = request.audio.len() as u64;
        let file = Part::stream_with_length(request.audio, len)
            .file_name(request.filename.to_string())
            .mime_str(mime_for(request.filename))?;

        let mut form = Form::new()
            .part("file", file)
            .text("model", self.model.clone())
            .text("response_format", "verbose_json")
            .text("temperature", "0");
        if let Some(language) = request.language {
            form = form.text("language", language.to_string());
        }

        debug!(
            model = %self.model,
            file = request.filename,
            bytes = len,
            "sending audio to groq"
        );

        let response = self
            .client
            .http()
            .post(self.client.url("/audio/transcriptions"))
            .bearer_auth(credential.expose())
            .multipart(form)
            .send()
            .await?;
        let response = check_status(response).await?;
        let body: VerboseTranscription = response.json().await?;
        Ok(body.into_result())
    }
}

#[async_trait]
impl Recognizer for GroqRecognizer {
    async fn recognize(
        &self,
        credential: &Credential,
        request: RecognitionRequest<'_>,
    ) -> Result<RecognitionResult, RecognitionError> {
        self.transcribe(credential, request)
            .await
            .map_err(RecognitionError::from)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

/// `response_format=verbose_json` body.
#[derive(Debug, Deserialize)]
struct VerboseTranscription {
    #[serde(default)]
    text: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    segments: Vec<VerboseSegment>,
}

#[derive(Debug, Deserialize)]
struct VerboseSegment {
    start: f64,
    end: f64,
    #[serde(default)]
    text: String,
}

impl VerboseTranscription {
    fn into_result(self) -> RecognitionResult {
        let language = self
            .language
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string());
        RecognitionResult {
            language,
            text: self.text.trim().to_string(),
            segments: self
                .segments
                .into_iter()
                .map(|s| Segment::new(s.start, s.end, s.text.trim()))
                .collect(),
            duration: self.duration,
        }
    }
}

/// Content type for an upload, from its extension.
fn mime_for(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "wav" => "audio/wav",
        "mp3" | "mpga" | "mpeg" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "mp4" => "video/mp4",
        "ogg" | "opus" => "audio/ogg",
        "webm" => "audio/webm",
        "flac" => "audio/flac",
        _ => "application/octet-stream",
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
