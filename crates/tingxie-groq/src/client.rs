//! Shared HTTP plumbing for the Groq adapters.

use std::time::Duration;

use reqwest::Response;
use tingxie_settings::GroqSettings;
use tracing::debug;

use crate::error_parsing::parse_api_error;
use crate::errors::GroqError;

/// A reusable HTTP client bound to one Groq base URL.
#[derive(Clone, Debug)]
pub struct GroqClient {
    http: reqwest::Client,
    base_url: String,
}

impl GroqClient {
    /// Build a client with the configured base URL and request timeout.
    pub fn from_settings(settings: &GroqSettings) -> Result<Self, GroqError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(settings.request_timeout_ms))
            .build()?;
        Ok(Self::new(http, &settings.base_url))
    }

    /// Wrap an existing client. A trailing slash on `base_url` is ignored.
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Absolute URL for an API path such as `/audio/transcriptions`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

/// Turn a non-success response into [`GroqError::Api`]; pass others through.
pub(crate) async fn check_status(response: Response) -> Result<Response, GroqError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let info = parse_api_error(&body, status.as_u16());
    debug!(status = status.as_u16(), code = ?info.code, "groq API error");
    Err(GroqError::Api {
        status: status.as_u16(),
        message: info.message,
        code: info.code,
    })
}
