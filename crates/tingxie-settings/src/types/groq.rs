//! Groq provider settings.

use std::fmt;

use serde::{Deserialize, Serialize};
use tingxie_core::Credential;

/// Groq (OpenAI-compatible) endpoint, models and API keys.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroqSettings {
    /// API keys, rotated in this order when a key is rate limited.
    pub api_keys: Vec<String>,
    /// API base URL (no trailing slash needed).
    pub base_url: String,
    /// Speech-recognition model.
    pub whisper_model: String,
    /// Chat model used to translate non-Chinese transcripts.
    pub translation_model: String,
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for GroqSettings {
    fn default() -> Self {
        Self {
            api_keys: Vec::new(),
            base_url: "https://api.groq.com/openai/v1".to_string(),
            whisper_model: "whisper-large-v3".to_string(),
            translation_model: "llama-3.3-70b-versatile".to_string(),
            request_timeout_ms: 300_000,
        }
    }
}

impl fmt::Debug for GroqSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroqSettings")
            .field("api_keys", &format_args!("[{} redacted]", self.api_keys.len()))
            .field("base_url", &self.base_url)
            .field("whisper_model", &self.whisper_model)
            .field("translation_model", &self.translation_model)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish()
    }
}

impl GroqSettings {
    /// Configured keys as credentials: trimmed, blanks skipped, first
    /// occurrence wins on duplicates.
    pub fn credentials(&self) -> Vec<Credential> {
        let mut seen: Vec<&str> = Vec::new();
        for key in &self.api_keys {
            let key = key.trim();
            if !key.is_empty() && !seen.contains(&key) {
                seen.push(key);
            }
        }
        seen.into_iter().map(Credential::new).collect()
    }
}
