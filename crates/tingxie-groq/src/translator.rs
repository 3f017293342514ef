//! Translation into Taiwan Traditional Chinese via Groq chat completions.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tingxie_transcription::CredentialPool;
use tracing::debug;

use crate::client::{GroqClient, check_status};
use crate::errors::GroqError;

/// Instruction sent as the system message of every translation request.
pub const TRANSLATION_PROMPT: &str = "You are a professional translator. Translate the user's \
text into Traditional Chinese as written in Taiwan. Reply with the translation only, without \
notes or explanations.";

const TEMPERATURE: f64 = 0.1;
const MAX_TOKENS: u32 = 4096;

/// Chat-completions translator authenticated with the pool's current key.
pub struct GroqTranslator {
    client: GroqClient,
    model: String,
    pool: Arc<CredentialPool>,
}

impl GroqTranslator {
    /// Create a translator using `model` (e.g. `llama-3.3-70b-versatile`).
    pub fn new(client: GroqClient, model: impl Into<String>, pool: Arc<CredentialPool>) -> Self {
        Self {
            client,
            model: model.into(),
            pool,
        }
    }

    /// Translate `text`. Errors are returned as-is; callers decide the fallback.
    pub async fn translate(&self, text: &str) -> Result<String, GroqError> {
        let credential = self.pool.current().map_err(|_| GroqError::NoCredentials)?;
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: TRANSLATION_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        debug!(model = %self.model, chars = text.chars().count(), "translating");
        let response = self
            .client
            .http()
            .post(self.client.url("/chat/completions"))
            .bearer_auth(credential.expose())
            .json(&request)
            .send()
            .await?;
        let response = check_status(response).await?;
        let body: ChatResponse = response.json().await?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| GroqError::EmptyResponse("no translation in response".into()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
