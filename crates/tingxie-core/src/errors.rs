//! Recognition failures and their classification.
//!
//! The driver only needs one decision per failure: is this the provider
//! telling us to slow down, or something else worth a plain retry?

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A failed recognition call, as surfaced by a recognizer adapter.
///
/// `message` carries the provider's raw text so that wait hints such as
/// "try again in 1m30s" survive to [`crate::retry::parse_retry_after`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecognitionError {
    /// HTTP status, when the failure came from a response.
    pub status: Option<u16>,
    /// Provider or transport message.
    pub message: String,
}

impl fmt::Display for RecognitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "recognition failed ({status}): {}", self.message),
            None => write!(f, "recognition failed: {}", self.message),
        }
    }
}

impl std::error::Error for RecognitionError {}

impl RecognitionError {
    /// Failure with an HTTP status.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Failure with no response (connect error, timeout, bad body).
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    /// How the driver should react to this failure.
    pub fn class(&self) -> FailureClass {
        if self.status == Some(429) || mentions_rate_limit(&self.message) {
            FailureClass::RateLimit
        } else {
            FailureClass::Transient
        }
    }

    /// Shorthand for `class() == FailureClass::RateLimit`.
    pub fn is_rate_limited(&self) -> bool {
        self.class() == FailureClass::RateLimit
    }
}

/// Driver-facing failure category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    /// Provider throttled us: rotate credentials or wait out the window.
    RateLimit,
    /// Anything else: fixed-delay retry with the same credential.
    Transient,
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimit => write!(f, "rate_limit"),
            Self::Transient => write!(f, "transient"),
        }
    }
}

/// `rate limit`, `rate_limit`, `ratelimit`, `too many requests`, or a bare
/// `429` token. Words must be contiguous: "sample rate ... limit" is not a
/// throttle.
static RATE_LIMIT_MESSAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\brate[ _-]?limit|\btoo many requests\b|\b429\b")
        .unwrap_or_else(|e| panic!("invalid rate limit pattern: {e}"))
});

fn mentions_rate_limit(message: &str) -> bool {
    RATE_LIMIT_MESSAGE.is_match(message)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
