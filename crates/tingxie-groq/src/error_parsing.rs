//! Groq API error bodies.
//!
//! Groq follows the OpenAI envelope, `{"error": {"message": "...", "type": "...",
//! "code": "..."}}`. Other shapes fall back to the raw body so that whatever
//! the provider said (including any "try again in" hint) is preserved.

use serde_json::Value;

/// Parsed API error information.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiErrorInfo {
    /// Human-readable error message, verbatim from the provider.
    pub message: String,
    /// Provider error code (e.g. `"rate_limit_exceeded"`).
    pub code: Option<String>,
}

/// Extract the message and code from an error response body.
pub fn parse_api_error(body: &str, status: u16) -> ApiErrorInfo {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        if let Some(msg) = json["error"]["message"].as_str() {
            let code = json["error"]["code"]
                .as_str()
                .or_else(|| json["error"]["type"].as_str())
                .map(String::from);
            return ApiErrorInfo {
                message: msg.to_string(),
                code,
            };
        }

        if let Some(msg) = json["detail"].as_str().or_else(|| json["message"].as_str()) {
            return ApiErrorInfo {
                message: msg.to_string(),
                code: json["code"].as_str().map(String::from),
            };
        }
    }

    let body = body.trim();
    ApiErrorInfo {
        message: if body.is_empty() {
            format!("HTTP {status}")
        } else {
            format!("HTTP {status}: {body}")
        },
        code: None,
    }
}
