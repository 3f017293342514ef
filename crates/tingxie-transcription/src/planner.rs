//! Splits a source into chunks the provider will accept.

use std::path::Path;
use std::sync::Arc;

use tingxie_core::AudioChunk;
use tracing::{debug, info, warn};

use crate::errors::MediaError;
use crate::ports::MediaTool;

/// Upper bound on chunks per source. A probe claiming more is not trusted.
pub const MAX_CHUNKS: usize = 100_000;

/// Start offsets (seconds) of the chunks a source should be cut into.
///
/// Returns `None` when the source can go to the provider whole: it fits under
/// the size threshold, its duration is unknown (`<= 0` or not finite), the
/// chunk length is not positive, or the split would exceed [`MAX_CHUNKS`].
/// Otherwise there are `floor(duration / chunk) + 1` offsets
/// `0, chunk, 2*chunk, ...`.
pub fn split_offsets(
    source_size: u64,
    source_duration: f64,
    size_threshold: u64,
    chunk_duration: f64,
) -> Option<Vec<f64>> {
    if source_size <= size_threshold
        || !source_duration.is_finite()
        || source_duration <= 0.0
        || !chunk_duration.is_finite()
        || chunk_duration <= 0.0
    {
        return None;
    }
    let whole_chunks = (source_duration / chunk_duration).floor();
    if whole_chunks >= MAX_CHUNKS as f64 {
        warn!(
            duration_secs = source_duration,
            chunk_secs = chunk_duration,
            max_chunks = MAX_CHUNKS,
            "implausible chunk count, not splitting"
        );
        return None;
    }
    let count = whole_chunks as usize + 1;
    Some((0..count).map(|i| i as f64 * chunk_duration).collect())
}

/// File name of the `index`-th materialized chunk.
pub fn chunk_file_name(index: usize) -> String {
    format!("chunk_{index:03}.wav")
}

/// Builds the chunk plan for a source, materializing slices when needed.
pub struct ChunkPlanner {
    media: Arc<dyn MediaTool>,
    size_threshold: u64,
    chunk_duration: f64,
}

impl ChunkPlanner {
    /// Create a planner with the provider's size limit and the slice length.
    pub fn new(media: Arc<dyn MediaTool>, size_threshold: u64, chunk_duration: f64) -> Self {
        Self {
            media,
            size_threshold,
            chunk_duration,
        }
    }

    /// Read the source's size and duration, then [`plan`](Self::plan) it.
    ///
    /// Fails only when the source's metadata cannot be read.
    pub async fn plan_source(
        &self,
        source: &Path,
        work_dir: &Path,
    ) -> std::io::Result<Vec<AudioChunk>> {
        let size = tokio::fs::metadata(source).await?.len();
        let duration = self.media.probe_duration(source).await;
        debug!(path = %source.display(), size, duration, "probed source");
        Ok(self.plan(source, size, duration, work_dir).await)
    }

    /// Produce the ordered chunks for a source of known size and duration.
    ///
    /// Chunks that fail to materialize are dropped. If none survive, the
    /// original source is returned as a single chunk.
    pub async fn plan(
        &self,
        source: &Path,
        source_size: u64,
        source_duration: f64,
        work_dir: &Path,
    ) -> Vec<AudioChunk> {
        let Some(offsets) = split_offsets(
            source_size,
            source_duration,
            self.size_threshold,
            self.chunk_duration,
        ) else {
            return vec![AudioChunk::whole_source(source, source_duration.max(0.0))];
        };

        info!(
            chunks = offsets.len(),
            chunk_secs = self.chunk_duration,
            size = source_size,
            "splitting source"
        );

        let mut chunks = Vec::with_capacity(offsets.len());
        for (index, offset) in offsets.into_iter().enumerate() {
            let path = work_dir.join(chunk_file_name(index));
            match self.materialize(source, offset, &path).await {
                Ok(()) => chunks.push(AudioChunk {
                    index,
                    path,
                    offset,
                    duration: self.chunk_duration.min(source_duration - offset).max(0.0),
                    ephemeral: true,
                }),
                Err(error) => {
                    warn!(chunk = index, offset, %error, "dropping chunk that failed to materialize");
                }
            }
        }

        if chunks.is_empty() {
            warn!(path = %source.display(), "no chunk could be materialized, sending source whole");
            return vec![AudioChunk::whole_source(source, source_duration)];
        }
        chunks
    }

    async fn materialize(&self, source: &Path, offset: f64, path: &Path) -> Result<(), MediaError> {
        self.media
            .slice(source, offset, self.chunk_duration, path)
            .await?;
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.len() > 0 => Ok(()),
            _ => Err(MediaError::EmptyOutput(path.to_path_buf())),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use proptest::prelude::*;
    use tingxie_core::logging::capture_logs;
    use tracing::Level;

    use super::*;

    /// Writes a few bytes per slice, except for the listed start offsets.
    #[derive(Default)]
    struct FakeMedia {
        duration: f64,
        fail_at: HashSet<u64>,
        empty_at: HashSet<u64>,
        slices: Mutex<Vec<(f64, f64)>>,
    }

    #[async_trait]
    impl MediaTool for FakeMedia {
        async fn probe_duration(&self, _path: &Path) -> f64 {
            self.duration
        }

        async fn slice(
            &self,
            _source: &Path,
            start: f64,
            duration: f64,
            output: &Path,
        ) -> Result<(), MediaError> {
            self.slices.lock().push((start, duration));
            let key = start as u64;
            if self.fail_at.contains(&key) {
                return Err(MediaError::Failed {
                    program: "ffmpeg".into(),
                    code: Some(1),
                    stderr: "boom".into(),
                });
            }
            let bytes: &[u8] = if self.empty_at.contains(&key) { b"" } else { b"RIFF" };
            tokio::fs::write(output, bytes).await.unwrap();
            Ok(())
        }
    }

    fn planner(media: FakeMedia, threshold: u64, chunk: f64) -> (ChunkPlanner, Arc<FakeMedia>) {
        let media = Arc::new(media);
        let dyn_media: Arc<dyn MediaTool> = media.clone();
        (ChunkPlanner::new(dyn_media, threshold, chunk), media)
    }

    #[test]
    fn small_source_is_not_split() {
        assert_eq!(split_offsets(100, 3600.0, 100, 600.0), None);
    }

    #[test]
    fn unknown_duration_is_not_split() {
        assert_eq!(split_offsets(1000, 0.0, 100, 600.0), None);
    }

    #[test]
    fn non_positive_chunk_is_not_split() {
        assert_eq!(split_offsets(1000, 60.0, 100, 0.0), None);
    }

    #[test]
    fn split_counts_partial_tail() {
        assert_eq!(
            split_offsets(1000, 1500.0, 100, 600.0),
            Some(vec![0.0, 600.0, 1200.0])
        );
    }

    #[test]
    fn huge_or_non_finite_duration_is_not_split() {
        let (logs, _guard) = capture_logs();
        assert_eq!(split_offsets(1000, 1e300, 100, 600.0), None);
        assert_eq!(split_offsets(1000, f64::MAX, 100, 1e-300), None);
        assert!(logs.has_event(Level::WARN, "implausible chunk count"));

        assert_eq!(split_offsets(1000, f64::INFINITY, 100, 600.0), None);
        assert_eq!(split_offsets(1000, f64::NAN, 100, 600.0), None);
        assert_eq!(split_offsets(1000, 60.0, 100, f64::NAN), None);
    }

    #[test]
    fn split_just_under_cap_is_kept() {
        let duration = (MAX_CHUNKS - 1) as f64 * 10.0;
        let offsets = split_offsets(1000, duration, 100, 10.0).unwrap();
        assert_eq!(offsets.len(), MAX_CHUNKS);
    }

    #[test]
    fn chunk_names_are_zero_padded() {
        assert_eq!(chunk_file_name(0), "chunk_000.wav");
        assert_eq!(chunk_file_name(12), "chunk_012.wav");
    }

    proptest! {
        #[test]
        fn split_offsets_are_evenly_spaced(
            duration in 1.0f64..100_000.0,
            chunk in 10.0f64..5_000.0,
        ) {
            let offsets = split_offsets(2, duration, 1, chunk).unwrap();
            prop_assert_eq!(offsets.len(), (duration / chunk).floor() as usize + 1);
            for (i, offset) in offsets.iter().enumerate() {
                prop_assert!((offset - i as f64 * chunk).abs() < 1e-6);
            }
        }

        #[test]
        fn under_threshold_always_whole(size in 0u64..1_000_000, extra in 0u64..1_000_000) {
            prop_assert_eq!(split_offsets(size, 1_000.0, size + extra, 10.0), None);
        }
    }

    #[tokio::test]
    async fn plan_small_source_single_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let (p, media) = planner(FakeMedia::default(), 1_000, 600.0);
        let chunks = p.plan(Path::new("/in/a.mp3"), 500, 42.0, dir.path()).await;

        assert_eq!(chunks, vec![AudioChunk::whole_source("/in/a.mp3", 42.0)]);
        assert!(media.slices.lock().is_empty());
    }

    #[tokio::test]
    async fn plan_splits_into_ephemeral_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let (p, media) = planner(FakeMedia::default(), 1_000, 600.0);
        let chunks = p.plan(Path::new("/in/a.mp3"), 5_000, 1500.0, dir.path()).await;

        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.ephemeral));
        assert_eq!(chunks[1].offset, 600.0);
        assert_eq!(chunks[2].duration, 300.0);
        assert_eq!(chunks[2].path, dir.path().join("chunk_002.wav"));
        assert_eq!(
            *media.slices.lock(),
            vec![(0.0, 600.0), (600.0, 600.0), (1200.0, 600.0)]
        );
    }

    #[tokio::test]
    async fn failed_and_empty_slices_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let media = FakeMedia {
            fail_at: HashSet::from([600]),
            empty_at: HashSet::from([1200]),
            ..Default::default()
        };
        let (p, _) = planner(media, 1_000, 600.0);
        let chunks = p.plan(Path::new("/in/a.mp3"), 5_000, 1500.0, dir.path()).await;

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].index, 0);
    }

    #[tokio::test]
    async fn all_slices_failing_degrades_to_source() {
        let dir = tempfile::tempdir().unwrap();
        let media = FakeMedia {
            fail_at: HashSet::from([0, 600]),
            ..Default::default()
        };
        let (p, _) = planner(media, 1_000, 600.0);
        let chunks = p.plan(Path::new("/in/a.mp3"), 5_000, 900.0, dir.path()).await;

        assert_eq!(chunks, vec![AudioChunk::whole_source("/in/a.mp3", 900.0)]);
    }

    #[tokio::test]
    async fn plan_source_reads_size_and_probes() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("talk.mp3");
        std::fs::write(&source, vec![0u8; 64]).unwrap();
        let media = FakeMedia {
            duration: 130.0,
            ..Default::default()
        };
        let (p, _) = planner(media, 32, 60.0);

        let chunks = p.plan_source(&source, dir.path()).await.unwrap();
        let offsets: Vec<f64> = chunks.iter().map(|c| c.offset).collect();
        assert_eq!(offsets, vec![0.0, 60.0, 120.0]);
    }

    #[tokio::test]
    async fn plan_source_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let (p, _) = planner(FakeMedia::default(), 32, 60.0);
        let err = p
            .plan_source(&dir.path().join("missing.mp3"), dir.path())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
