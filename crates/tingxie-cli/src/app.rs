//! Wiring of settings, adapters and the session.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tingxie_core::Transcript;
use tingxie_groq::{GroqClient, GroqRecognizer, GroqTextNormalizer, GroqTranslator, ScriptConverter};
use tingxie_settings::TingxieSettings;
use tingxie_transcription::{
    Collaborators, CredentialPool, FfmpegMediaTool, TokioSleeper, TranscriptionSession,
};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Build a session backed by Groq and ffmpeg.
pub fn build_session(
    settings: &TingxieSettings,
    cancel: CancellationToken,
) -> Result<TranscriptionSession> {
    let pool = Arc::new(CredentialPool::new(settings.groq.credentials()));
    info!(
        credentials = pool.size(),
        whisper_model = %settings.groq.whisper_model,
        base_url = %settings.groq.base_url,
        "groq adapters configured"
    );

    let client = GroqClient::from_settings(&settings.groq).context("failed to build HTTP client")?;
    let recognizer = GroqRecognizer::new(client.clone(), &settings.groq.whisper_model);
    let translator = GroqTranslator::new(
        client,
        &settings.groq.translation_model,
        Arc::clone(&pool),
    );
    let normalizer = GroqTextNormalizer::new(
        ScriptConverter::new(&settings.transcription.target_variant),
        translator,
    );
    let media = FfmpegMediaTool::new(
        &settings.transcription.ffmpeg_path,
        &settings.transcription.ffprobe_path,
    );

    Ok(TranscriptionSession::new(
        &settings.transcription,
        pool,
        Collaborators {
            recognizer: Arc::new(recognizer),
            normalizer: Arc::new(normalizer),
            media: Arc::new(media),
            sleeper: Arc::new(TokioSleeper),
        },
        cancel,
    ))
}

/// Write the transcript as pretty JSON to `output`, or stdout when `None`.
pub fn write_transcript(transcript: &Transcript, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(transcript).context("failed to serialize transcript")?;
    match output {
        Some(path) => {
            std::fs::write(path, format!("{json}\n"))
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "transcript written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}").context("failed to write transcript to stdout")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tingxie_core::Segment;

    use super::*;

    #[test]
    fn transcript_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let transcript = Transcript {
            text: "你好 世界".into(),
            language: "zh".into(),
            segments: vec![Segment::new(0.0, 1.5, "你好")],
            cancelled: false,
        };

        write_transcript(&transcript, Some(&path)).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"cancelled\": false"));
        let parsed: Transcript = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, transcript);
    }

    #[test]
    fn unwritable_output_is_error() {
        let err = write_transcript(&Transcript::empty(), Some(Path::new("/nonexistent/dir/out.json")))
            .unwrap_err();
        assert!(err.to_string().contains("failed to write"));
    }

    #[tokio::test]
    async fn session_without_keys_reports_no_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.wav");
        std::fs::write(&source, b"RIFF").unwrap();

        let session = build_session(&TingxieSettings::default(), CancellationToken::new()).unwrap();
        let err = session.run(&source, None).await.unwrap_err();
        assert!(matches!(err, tingxie_transcription::SessionError::NoCredentials));
    }
}
