//! Fakes shared by the integration tests.

#![allow(dead_code, missing_docs, unused_results)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tingxie_core::{Credential, RecognitionError, RecognitionResult, Segment};
use tingxie_transcription::{
    Collaborators, MediaError, MediaTool, RecognitionRequest, Recognizer, Sleeper, TextNormalizer,
};
use tokio_util::sync::CancellationToken;

/// How the fake recognizer answers for one chunk file.
#[derive(Clone)]
pub enum Reply {
    /// Succeed with this language, text and one chunk-relative segment.
    Text(&'static str, &'static str),
    /// Fail every attempt with an HTTP 500.
    AlwaysFail,
}

/// Answers per file name and records every call.
#[derive(Default)]
pub struct FakeRecognizer {
    replies: HashMap<String, Reply>,
    pub calls: Mutex<Vec<(String, String)>>,
    /// Cancelled after the first successful call.
    pub cancel_after_first: Option<CancellationToken>,
}

impl FakeRecognizer {
    pub fn new(replies: &[(&str, Reply)]) -> Self {
        Self {
            replies: replies
                .iter()
                .map(|(name, reply)| ((*name).to_string(), reply.clone()))
                .collect(),
            ..Default::default()
        }
    }

    pub fn cancelling(mut self, token: CancellationToken) -> Self {
        self.cancel_after_first = Some(token);
        self
    }

    pub fn files_called(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(file, _)| file.clone()).collect()
    }
}

#[async_trait]
impl Recognizer for FakeRecognizer {
    async fn recognize(
        &self,
        credential: &Credential,
        request: RecognitionRequest<'_>,
    ) -> Result<RecognitionResult, RecognitionError> {
        self.calls
            .lock()
            .push((request.filename.to_string(), credential.expose().to_string()));
        match self.replies.get(request.filename) {
            Some(Reply::Text(language, text)) => {
                if let Some(token) = &self.cancel_after_first {
                    token.cancel();
                }
                Ok(RecognitionResult {
                    language: (*language).to_string(),
                    text: (*text).to_string(),
                    segments: vec![Segment::new(0.0, 5.0, *text)],
                    duration: Some(600.0),
                })
            }
            Some(Reply::AlwaysFail) | None => Err(RecognitionError::http(500, "upstream error")),
        }
    }
}

/// Leaves text untouched.
pub struct IdentityNormalizer;

#[async_trait]
impl TextNormalizer for IdentityNormalizer {
    fn to_target_script(&self, text: &str) -> String {
        text.to_string()
    }

    async fn translate_to_target_script(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Reports a fixed duration and writes a small placeholder file per slice.
pub struct FakeMedia {
    pub duration: f64,
}

#[async_trait]
impl MediaTool for FakeMedia {
    async fn probe_duration(&self, _path: &Path) -> f64 {
        self.duration
    }

    async fn slice(
        &self,
        _source: &Path,
        _start: f64,
        _duration: f64,
        output: &Path,
    ) -> Result<(), MediaError> {
        tokio::fs::write(output, b"RIFF....WAVE").await.map_err(|source| MediaError::Spawn {
            program: "fake".into(),
            source,
        })
    }
}

/// Records requested waits and returns at once.
#[derive(Default)]
pub struct RecordingSleeper {
    pub waits: Mutex<Vec<Duration>>,
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration, _cancel: &CancellationToken) {
        self.waits.lock().push(duration);
    }
}

pub fn credentials(keys: &[&str]) -> Vec<Credential> {
    keys.iter().map(|k| Credential::new(*k)).collect()
}

pub fn collaborators(
    recognizer: Arc<FakeRecognizer>,
    duration: f64,
    sleeper: Arc<RecordingSleeper>,
) -> Collaborators {
    Collaborators {
        recognizer,
        normalizer: Arc::new(IdentityNormalizer),
        media: Arc::new(FakeMedia { duration }),
        sleeper,
    }
}
