//! Error types for the orchestrator.

use std::path::PathBuf;

use thiserror::Error;

/// The credential pool has no credentials.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("credential pool is empty")]
pub struct PoolEmpty;

/// Errors that end a chunk's retry loop without an outcome.
///
/// Exhausting the attempt budget is not an error: it yields a failed
/// [`ChunkOutcome`](tingxie_core::ChunkOutcome) instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum DriverError {
    /// No credential is available to authenticate a request.
    #[error("credential pool is empty")]
    PoolEmpty,
    /// The session was cancelled before the chunk finished.
    #[error("transcription cancelled")]
    Cancelled,
}

impl From<PoolEmpty> for DriverError {
    fn from(_: PoolEmpty) -> Self {
        Self::PoolEmpty
    }
}

/// Errors surfaced by [`TranscriptionSession::run`](crate::TranscriptionSession::run).
#[derive(Debug, Error)]
pub enum SessionError {
    /// No API keys are configured.
    #[error("no credentials configured (set GROQ_API_KEY or GROQ_API_KEYS)")]
    NoCredentials,
    /// Filesystem failure before any chunk could run.
    #[error("{context}: {source}")]
    Io {
        /// What the session was doing.
        context: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the media slicing tool.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The tool binary could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The tool ran but exited unsuccessfully.
    #[error("{program} exited with {code:?}: {stderr}")]
    Failed {
        /// Program that failed.
        program: String,
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
        /// Tail of the tool's stderr.
        stderr: String,
    },
    /// The tool reported success but produced no audio.
    #[error("no audio written to {}", .0.display())]
    EmptyOutput(PathBuf),
}
