//! One end-to-end transcription of a source file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::StreamExt;
use tingxie_core::{AudioChunk, ChunkOutcome, Transcript};
use tingxie_settings::TranscriptionSettings;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::assembler::assemble_indexed;
use crate::driver::ChunkDriver;
use crate::errors::{DriverError, SessionError};
use crate::planner::ChunkPlanner;
use crate::pool::CredentialPool;
use crate::ports::{MediaTool, Recognizer, TextNormalizer};
use crate::sleeper::Sleeper;

/// External services a session calls out to.
#[derive(Clone)]
pub struct Collaborators {
    /// Speech-recognition provider.
    pub recognizer: Arc<dyn Recognizer>,
    /// Script conversion and translation.
    pub normalizer: Arc<dyn TextNormalizer>,
    /// Probing and slicing.
    pub media: Arc<dyn MediaTool>,
    /// Backoff waits.
    pub sleeper: Arc<dyn Sleeper>,
}

/// Plans, drives and reassembles the transcription of one source.
///
/// Each run gets its own work directory for chunk files, removed when the
/// run ends. Cancelling the token stops the run after in-flight attempts and
/// returns whatever was transcribed so far.
pub struct TranscriptionSession {
    pool: Arc<CredentialPool>,
    planner: ChunkPlanner,
    driver: ChunkDriver,
    concurrency: usize,
    temp_root: Option<PathBuf>,
}

impl TranscriptionSession {
    /// Build a session from settings, a shared pool and its collaborators.
    pub fn new(
        settings: &TranscriptionSettings,
        pool: Arc<CredentialPool>,
        collaborators: Collaborators,
        cancel: CancellationToken,
    ) -> Self {
        let Collaborators {
            recognizer,
            normalizer,
            media,
            sleeper,
        } = collaborators;
        let planner = ChunkPlanner::new(
            media,
            settings.max_upload_bytes,
            settings.chunk_duration_secs as f64,
        );
        let driver = ChunkDriver::new(
            Arc::clone(&pool),
            recognizer,
            normalizer,
            sleeper,
            settings.retry_policy(),
            settings.translate_segments,
            cancel,
        );
        Self {
            pool,
            planner,
            driver,
            concurrency: settings.concurrency.max(1),
            temp_root: settings.temp_dir.clone(),
        }
    }

    /// Transcribe `source`, optionally hinting the spoken language.
    pub async fn run(
        &self,
        source: &Path,
        language: Option<&str>,
    ) -> Result<Transcript, SessionError> {
        let session_id = Uuid::now_v7();
        let span = info_span!("transcription", %session_id, source = %source.display());
        self.run_inner(source, language).instrument(span).await
    }

    async fn run_inner(
        &self,
        source: &Path,
        language: Option<&str>,
    ) -> Result<Transcript, SessionError> {
        if self.pool.is_empty() {
            return Err(SessionError::NoCredentials);
        }

        let work_dir = self.create_work_dir()?;
        let chunks = self
            .planner
            .plan_source(source, work_dir.path())
            .await
            .map_err(|source_err| SessionError::Io {
                context: format!("failed to read source {}", source.display()),
                source: source_err,
            })?;
        info!(chunks = chunks.len(), concurrency = self.concurrency, "transcription started");

        let (outcomes, cancelled) = if self.concurrency > 1 {
            self.drive_concurrent(&chunks, language).await?
        } else {
            self.drive_sequential(&chunks, language).await?
        };

        let completed = outcomes.len();
        let transcript = assemble_indexed(outcomes, cancelled);
        if cancelled {
            warn!(completed, total = chunks.len(), "transcription cancelled");
        } else {
            info!(chunks = completed, language = %transcript.language, "transcription finished");
        }

        if let Err(error) = work_dir.close() {
            warn!(%error, "failed to remove work directory");
        }
        Ok(transcript)
    }

    fn create_work_dir(&self) -> Result<tempfile::TempDir, SessionError> {
        let builder = {
            let mut b = tempfile::Builder::new();
            let _ = b.prefix("tingxie-");
            b
        };
        let dir = match &self.temp_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };
        dir.map_err(|source| SessionError::Io {
            context: "failed to create work directory".into(),
            source,
        })
    }

    async fn drive_sequential(
        &self,
        chunks: &[AudioChunk],
        language: Option<&str>,
    ) -> Result<(Vec<(usize, ChunkOutcome)>, bool), SessionError> {
        let mut outcomes = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            match self.drive_chunk(chunk, language).await {
                Ok(outcome) => outcomes.push((chunk.index, outcome)),
                Err(DriverError::Cancelled) => return Ok((outcomes, true)),
                Err(DriverError::PoolEmpty) => return Err(SessionError::NoCredentials),
            }
        }
        Ok((outcomes, false))
    }

    async fn drive_concurrent(
        &self,
        chunks: &[AudioChunk],
        language: Option<&str>,
    ) -> Result<(Vec<(usize, ChunkOutcome)>, bool), SessionError> {
        let mut results = futures::stream::iter(chunks)
            .map(|chunk| async move { (chunk.index, self.drive_chunk(chunk, language).await) })
            .buffer_unordered(self.concurrency);

        let mut outcomes = Vec::with_capacity(chunks.len());
        let mut cancelled = false;
        while let Some((index, result)) = results.next().await {
            match result {
                Ok(outcome) => outcomes.push((index, outcome)),
                Err(DriverError::Cancelled) => cancelled = true,
                Err(DriverError::PoolEmpty) => return Err(SessionError::NoCredentials),
            }
        }
        Ok((outcomes, cancelled))
    }

    /// Drive one chunk, then delete its file if the planner created it.
    async fn drive_chunk(
        &self,
        chunk: &AudioChunk,
        language: Option<&str>,
    ) -> Result<ChunkOutcome, DriverError> {
        let result = self.driver.transcribe(chunk, language).await;
        if chunk.ephemeral {
            if let Err(error) = tokio::fs::remove_file(&chunk.path).await {
                warn!(chunk = chunk.index, path = %chunk.path.display(), %error, "failed to remove chunk file");
            }
        }
        result
    }
}
