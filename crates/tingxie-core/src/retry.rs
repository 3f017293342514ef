//! Retry timings and provider wait-hint parsing.
//!
//! Sync-only building blocks; the async attempt loop lives in
//! `tingxie-transcription`.
//!
//! - [`RetryPolicy`]: attempt budget and the three wait durations
//! - [`parse_retry_after`]: recover the provider's "try again in 7m12.5s" hint

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Default attempts per chunk.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;
/// Wait after a rate limit when the provider gave no usable hint.
pub const DEFAULT_RATE_LIMIT_FALLBACK_SECS: u64 = 65;
/// Safety margin added on top of a parsed hint.
pub const DEFAULT_RETRY_AFTER_MARGIN_SECS: u64 = 10;
/// Wait before retrying a non-rate-limit failure.
pub const DEFAULT_TRANSIENT_RETRY_SECS: u64 = 10;

/// Attempt budget and backoff timings for one chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Attempts before a chunk is recorded as failed.
    pub max_attempts: u32,
    /// Backoff when every credential is throttled and no hint was parsed.
    pub rate_limit_fallback: Duration,
    /// Added to a parsed hint.
    pub retry_after_margin: Duration,
    /// Delay before retrying any other failure.
    pub transient_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            rate_limit_fallback: Duration::from_secs(DEFAULT_RATE_LIMIT_FALLBACK_SECS),
            retry_after_margin: Duration::from_secs(DEFAULT_RETRY_AFTER_MARGIN_SECS),
            transient_delay: Duration::from_secs(DEFAULT_TRANSIENT_RETRY_SECS),
        }
    }
}

impl RetryPolicy {
    /// How long to back off after the whole pool was throttled.
    ///
    /// Parsed hint plus margin, or the fallback when the message has no hint.
    pub fn rate_limit_wait(&self, message: &str) -> Duration {
        parse_retry_after(message).map_or(self.rate_limit_fallback, |hint| {
            hint + self.retry_after_margin
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Hint parsing
// ─────────────────────────────────────────────────────────────────────────────

static HMS_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:try again in|retry after)\s*(?:(\d+)h)?\s*(?:(\d+)m)?\s*(\d+(?:\.\d+)?)s\b",
    )
    .unwrap_or_else(|e| panic!("invalid retry hint pattern: {e}"))
});

static MS_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:try again in|retry after)\s*(\d+(?:\.\d+)?)ms\b")
        .unwrap_or_else(|e| panic!("invalid retry hint pattern: {e}"))
});

/// Extract the wait the provider asked for, without any margin.
///
/// Understands `try again in 7m12.5s`, `try again in 45.2s`,
/// `try again in 1h2m3s`, `retry after 30s` and `try again in 650ms`.
/// Returns `None` when the message carries no hint.
pub fn parse_retry_after(message: &str) -> Option<Duration> {
    if let Some(caps) = HMS_HINT.captures(message) {
        let hours: f64 = caps.get(1).map_or(Some(0.0), |m| m.as_str().parse().ok())?;
        let minutes: f64 = caps.get(2).map_or(Some(0.0), |m| m.as_str().parse().ok())?;
        let seconds: f64 = caps.get(3)?.as_str().parse().ok()?;
        return Duration::try_from_secs_f64(hours * 3600.0 + minutes * 60.0 + seconds).ok();
    }

    let caps = MS_HINT.captures(message)?;
    let millis: f64 = caps.get(1)?.as_str().parse().ok()?;
    Duration::try_from_secs_f64(millis / 1000.0).ok()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
