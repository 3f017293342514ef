//! Errors from Groq API calls.

use thiserror::Error;
use tingxie_core::RecognitionError;

/// A failed Groq request.
#[derive(Debug, Error)]
pub enum GroqError {
    /// The request never produced a response (connect, timeout, body read).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Provider message, verbatim.
        message: String,
        /// Provider error code, if any.
        code: Option<String>,
    },
    /// The response parsed but carried nothing usable.
    #[error("empty response: {0}")]
    EmptyResponse(String),
    /// No credential is available for the request.
    #[error("no credentials configured")]
    NoCredentials,
}

impl From<GroqError> for RecognitionError {
    fn from(err: GroqError) -> Self {
        match err {
            GroqError::Api {
                status, message, ..
            } => RecognitionError::http(status, message),
            GroqError::Http(e) => match e.status() {
                Some(status) => RecognitionError::http(status.as_u16(), e.to_string()),
                None => RecognitionError::transport(e.to_string()),
            },
            other => RecognitionError::transport(other.to_string()),
        }
    }
}
