//! Drives one chunk through recognition with credential rotation and backoff.
//!
//! Per attempt the driver reads the pool's current slot and calls the
//! recognizer. A rate-limited attempt marks the slot as tried for the current
//! episode and rotates; if the new slot has not been tried yet the next attempt
//! starts immediately. Once every slot has been tried (or the pool cannot
//! rotate) the driver waits for the provider's retry hint plus a margin, or
//! the fallback, then clears the episode. Any other failure waits a fixed
//! delay and retries with the same credential. No wait follows the final
//! attempt.

use std::collections::HashSet;
use std::sync::Arc;

use bytes::Bytes;
use tingxie_core::script::{self, ScriptRoute};
use tingxie_core::{
    AudioChunk, ChunkOutcome, FailureClass, RecognitionError, RecognitionResult, RetryPolicy,
    Segment,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::errors::DriverError;
use crate::pool::CredentialPool;
use crate::ports::{RecognitionRequest, Recognizer, TextNormalizer};
use crate::sleeper::Sleeper;

/// Transcribes single chunks against a shared credential pool.
pub struct ChunkDriver {
    pool: Arc<CredentialPool>,
    recognizer: Arc<dyn Recognizer>,
    normalizer: Arc<dyn TextNormalizer>,
    sleeper: Arc<dyn Sleeper>,
    policy: RetryPolicy,
    translate_segments: bool,
    cancel: CancellationToken,
}

impl ChunkDriver {
    /// Create a driver.
    ///
    /// `translate_segments` decides whether segment texts on the translation
    /// path are translated one by one or kept as recognized.
    pub fn new(
        pool: Arc<CredentialPool>,
        recognizer: Arc<dyn Recognizer>,
        normalizer: Arc<dyn TextNormalizer>,
        sleeper: Arc<dyn Sleeper>,
        policy: RetryPolicy,
        translate_segments: bool,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            pool,
            recognizer,
            normalizer,
            sleeper,
            policy,
            translate_segments,
            cancel,
        }
    }

    /// Transcribe one chunk within the policy's attempt budget.
    ///
    /// Returns a failed outcome (not an error) when the chunk file cannot be
    /// read or every attempt failed.
    pub async fn transcribe(
        &self,
        chunk: &AudioChunk,
        language: Option<&str>,
    ) -> Result<ChunkOutcome, DriverError> {
        let audio = match tokio::fs::read(&chunk.path).await {
            Ok(audio) => Bytes::from(audio),
            Err(error) => {
                warn!(chunk = chunk.index, path = %chunk.path.display(), %error, "cannot read chunk");
                return Ok(ChunkOutcome::failed());
            }
        };
        let filename = chunk.file_name();
        let max_attempts = self.policy.max_attempts.max(1);
        let mut tried: HashSet<usize> = HashSet::new();

        for attempt in 1..=max_attempts {
            if self.cancel.is_cancelled() {
                return Err(DriverError::Cancelled);
            }
            let (slot, credential) = self.pool.current_slot()?;
            let request = RecognitionRequest {
                audio: audio.clone(),
                filename: &filename,
                language,
            };
            debug!(chunk = chunk.index, attempt, slot, "recognizing chunk");

            let result = tokio::select! {
                biased;
                () = self.cancel.cancelled() => return Err(DriverError::Cancelled),
                result = self.recognizer.recognize(&credential, request) => result,
            };

            let error = match result {
                Ok(recognized) => {
                    info!(chunk = chunk.index, attempt, language = %recognized.language, "chunk recognized");
                    return Ok(self.finish(chunk, recognized).await);
                }
                Err(error) => error,
            };

            let last = attempt == max_attempts;
            match error.class() {
                FailureClass::RateLimit => {
                    let _ = tried.insert(slot);
                    if self.pool.rotate() {
                        let (next, _) = self.pool.current_slot()?;
                        if !tried.contains(&next) {
                            info!(chunk = chunk.index, attempt, slot, next, "rate limited, rotating credential");
                            continue;
                        }
                    }
                    if last {
                        break;
                    }
                    let wait = self.policy.rate_limit_wait(&error.message);
                    warn!(
                        chunk = chunk.index,
                        attempt,
                        slot,
                        wait_secs = wait.as_secs_f64(),
                        "all credentials rate limited, backing off"
                    );
                    self.sleeper.sleep(wait, &self.cancel).await;
                    tried.clear();
                }
                FailureClass::Transient => {
                    if last {
                        break;
                    }
                    self.log_transient(chunk, attempt, slot, &error);
                    self.sleeper
                        .sleep(self.policy.transient_delay, &self.cancel)
                        .await;
                }
            }
        }

        warn!(chunk = chunk.index, attempts = max_attempts, "chunk failed after all attempts");
        Ok(ChunkOutcome::failed())
    }

    fn log_transient(&self, chunk: &AudioChunk, attempt: u32, slot: usize, error: &RecognitionError) {
        warn!(
            chunk = chunk.index,
            attempt,
            slot,
            wait_secs = self.policy.transient_delay.as_secs_f64(),
            %error,
            "recognition failed, retrying"
        );
    }

    /// Route text through normalization or translation, then move segments
    /// onto the source timeline.
    async fn finish(&self, chunk: &AudioChunk, recognized: RecognitionResult) -> ChunkOutcome {
        let RecognitionResult {
            language,
            text,
            segments,
            duration,
        } = recognized;

        let (text, mut segments) = match script::classify(&language, &text) {
            ScriptRoute::Normalize => {
                let text = self.normalizer.to_target_script(&text);
                let segments = segments
                    .into_iter()
                    .map(|s| Segment {
                        text: self.normalizer.to_target_script(&s.text),
                        ..s
                    })
                    .collect::<Vec<_>>();
                (text, segments)
            }
            ScriptRoute::Translate => {
                let text = self.normalizer.translate_to_target_script(&text).await;
                let segments = if self.translate_segments {
                    let mut translated = Vec::with_capacity(segments.len());
                    for s in segments {
                        let text = self.normalizer.translate_to_target_script(&s.text).await;
                        translated.push(Segment { text, ..s });
                    }
                    translated
                } else {
                    segments
                };
                (text, segments)
            }
        };

        if segments.is_empty() && !text.trim().is_empty() {
            let end = duration.filter(|d| *d > 0.0).unwrap_or(chunk.duration);
            segments.push(Segment::new(0.0, end, text.clone()));
        }

        ChunkOutcome {
            success: true,
            language,
            segments: segments.into_iter().map(|s| s.shifted(chunk.offset)).collect(),
            text,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
