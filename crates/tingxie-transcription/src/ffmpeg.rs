//! [`MediaTool`] backed by the `ffmpeg` and `ffprobe` executables.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::errors::MediaError;
use crate::ports::MediaTool;

/// Longest stderr tail kept in a [`MediaError::Failed`].
const STDERR_TAIL_CHARS: usize = 400;

/// Runs `ffprobe` to measure sources and `ffmpeg` to cut 16 kHz mono WAV slices.
#[derive(Clone, Debug)]
pub struct FfmpegMediaTool {
    ffmpeg: String,
    ffprobe: String,
}

impl FfmpegMediaTool {
    /// Use the given executables (names on `PATH` or absolute paths).
    pub fn new(ffmpeg: impl Into<String>, ffprobe: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }
}

impl Default for FfmpegMediaTool {
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe")
    }
}

#[async_trait]
impl MediaTool for FfmpegMediaTool {
    async fn probe_duration(&self, path: &Path) -> f64 {
        let output = Command::new(&self.ffprobe)
            .args(["-v", "error", "-show_entries", "format=duration"])
            .args(["-of", "default=noprint_wrappers=1:nokey=1"])
            .arg(path)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await;

        match output {
            Ok(out) if out.status.success() => {
                let stdout = String::from_utf8_lossy(&out.stdout);
                parse_duration(&stdout).unwrap_or_else(|| {
                    warn!(path = %path.display(), output = %stdout.trim(), "unparseable duration");
                    0.0
                })
            }
            Ok(out) => {
                warn!(
                    path = %path.display(),
                    code = ?out.status.code(),
                    stderr = %stderr_tail(&out.stderr),
                    "ffprobe failed"
                );
                0.0
            }
            Err(error) => {
                warn!(program = %self.ffprobe, %error, "failed to run ffprobe");
                0.0
            }
        }
    }

    async fn slice(
        &self,
        source: &Path,
        start: f64,
        duration: f64,
        output: &Path,
    ) -> Result<(), MediaError> {
        debug!(source = %source.display(), start, duration, output = %output.display(), "slicing");
        let (start, duration) = (start.to_string(), duration.to_string());
        let result = Command::new(&self.ffmpeg)
            .args(["-y", "-ss", start.as_str(), "-t", duration.as_str(), "-i"])
            .arg(source)
            .args(["-vn", "-ac", "1", "-ar", "16000", "-c:a", "pcm_s16le"])
            .arg(output)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| MediaError::Spawn {
                program: self.ffmpeg.clone(),
                source,
            })?;

        if result.status.success() {
            Ok(())
        } else {
            Err(MediaError::Failed {
                program: self.ffmpeg.clone(),
                code: result.status.code(),
                stderr: stderr_tail(&result.stderr),
            })
        }
    }
}

/// Parse `ffprobe`'s bare duration output (`"123.456\n"`).
pub fn parse_duration(stdout: &str) -> Option<f64> {
    stdout
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d >= 0.0)
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    let skip = text.chars().count().saturating_sub(STDERR_TAIL_CHARS);
    text.chars().skip(skip).collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_duration_values() {
        assert_eq!(parse_duration("123.456\n"), Some(123.456));
        assert_eq!(parse_duration("0"), Some(0.0));
        assert_eq!(parse_duration("N/A"), None);
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("-1"), None);
    }

    #[test]
    fn stderr_tail_keeps_end() {
        let long = format!("{}END", "x".repeat(1000));
        let tail = stderr_tail(long.as_bytes());
        assert_eq!(tail.chars().count(), STDERR_TAIL_CHARS);
        assert!(tail.ends_with("END"));
    }

    #[tokio::test]
    async fn missing_ffprobe_probes_zero() {
        let tool = FfmpegMediaTool::new("ffmpeg", "/nonexistent/ffprobe");
        assert_eq!(tool.probe_duration(Path::new("/tmp/a.mp3")).await, 0.0);
    }

    #[tokio::test]
    async fn missing_ffmpeg_is_spawn_error() {
        let tool = FfmpegMediaTool::new("/nonexistent/ffmpeg", "ffprobe");
        let err = tool
            .slice(Path::new("/tmp/a.mp3"), 0.0, 600.0, Path::new("/tmp/out.wav"))
            .await
            .unwrap_err();
        assert_matches!(err, MediaError::Spawn { program, .. } if program == "/nonexistent/ffmpeg");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_tool_reports_exit_code() {
        // `false` ignores its arguments and exits 1.
        let tool = FfmpegMediaTool::new("false", "false");
        let err = tool
            .slice(Path::new("/tmp/a.mp3"), 0.0, 600.0, Path::new("/tmp/out.wav"))
            .await
            .unwrap_err();
        assert_matches!(err, MediaError::Failed { code: Some(1), .. });
        assert_eq!(tool.probe_duration(Path::new("/tmp/a.mp3")).await, 0.0);
    }
}
