//! Core data model shared by the planner, driver, assembler and adapters.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Language code used when the provider did not report one, or nothing succeeded.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

// ─────────────────────────────────────────────────────────────────────────────
// Credential
// ─────────────────────────────────────────────────────────────────────────────

/// Opaque provider token used to authenticate one recognition request.
///
/// Cheap to clone. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential(Arc<str>);

impl Credential {
    /// Wrap a raw token.
    pub fn new(token: impl Into<Arc<str>>) -> Self {
        Self(token.into())
    }

    /// The raw token, for building an `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tail: String = self
            .0
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        write!(f, "Credential(…{tail})")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Audio chunk
// ─────────────────────────────────────────────────────────────────────────────

/// A bounded span of the source audio, sent to the recognizer on its own.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioChunk {
    /// Position in the plan (0-based). Assembly orders by this.
    pub index: usize,
    /// File holding the chunk's audio.
    pub path: PathBuf,
    /// Start of the chunk on the full-source timeline, in seconds.
    pub offset: f64,
    /// Nominal duration in seconds (0 when unknown).
    pub duration: f64,
    /// `true` when the file was materialized for this session and may be
    /// deleted once processed. The caller's original source is never ephemeral.
    pub ephemeral: bool,
}

impl AudioChunk {
    /// A chunk that is the whole, unsplit source.
    pub fn whole_source(path: impl Into<PathBuf>, duration: f64) -> Self {
        Self {
            index: 0,
            path: path.into(),
            offset: 0.0,
            duration,
            ephemeral: false,
        }
    }

    /// File name hint for the recognizer (falls back to `audio.wav`).
    pub fn file_name(&self) -> String {
        file_name_or_default(&self.path)
    }
}

fn file_name_or_default(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map_or_else(|| "audio.wav".to_string(), str::to_string)
}

// ─────────────────────────────────────────────────────────────────────────────
// Segments and results
// ─────────────────────────────────────────────────────────────────────────────

/// A timed piece of recognized text. Invariant: `end >= start`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    /// Recognized (and possibly normalized) text.
    pub text: String,
}

impl Segment {
    /// Build a segment, clamping `end` so it never precedes `start`.
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end: end.max(start),
            text: text.into(),
        }
    }

    /// Move the segment onto the full-source timeline.
    #[must_use]
    pub fn shifted(mut self, offset: f64) -> Self {
        self.start += offset;
        self.end += offset;
        self
    }
}

/// What the recognizer returned for one chunk, chunk-relative.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecognitionResult {
    /// Detected language code, e.g. `"zh"`, `"en"`, or `"unknown"`.
    pub language: String,
    /// Full recognized text.
    pub text: String,
    /// Timed sub-segments, in order.
    pub segments: Vec<Segment>,
    /// Audio duration reported by the provider, if any.
    pub duration: Option<f64>,
}

/// Result of driving one chunk to completion or exhaustion.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkOutcome {
    /// Whether recognition eventually succeeded.
    pub success: bool,
    /// Detected language (`"unknown"` on failure).
    pub language: String,
    /// Segments already shifted onto the source timeline and text-processed.
    pub segments: Vec<Segment>,
    /// Processed chunk text (`""` on failure).
    pub text: String,
}

impl ChunkOutcome {
    /// The outcome recorded for a chunk that used every attempt.
    pub fn failed() -> Self {
        Self {
            success: false,
            language: UNKNOWN_LANGUAGE.to_string(),
            segments: Vec::new(),
            text: String::new(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Transcript
// ─────────────────────────────────────────────────────────────────────────────

/// Final output of a transcription session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    /// Chunk texts joined by a single space, in chunk order.
    pub text: String,
    /// Language of the last successful chunk, or `"unknown"`.
    pub language: String,
    /// Segments over the whole source timeline.
    pub segments: Vec<Segment>,
    /// Set when the session was cancelled before every chunk ran.
    #[serde(default)]
    pub cancelled: bool,
}

impl Transcript {
    /// A transcript with no content.
    pub fn empty() -> Self {
        Self {
            text: String::new(),
            language: UNKNOWN_LANGUAGE.to_string(),
            segments: Vec::new(),
            cancelled: false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
