//! Backoff waits.

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Waits between retry attempts.
///
/// Injected into the driver so tests can observe waits without sleeping.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Wait for `duration`, returning early if `cancel` fires.
    async fn sleep(&self, duration: Duration, cancel: &CancellationToken);
}

/// Real sleeper backed by the tokio timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration, cancel: &CancellationToken) {
        tokio::select! {
            () = tokio::time::sleep(duration) => {}
            () = cancel.cancelled() => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    #[tokio::test]
    async fn sleeps_for_duration() {
        let start = Instant::now();
        TokioSleeper
            .sleep(Duration::from_millis(20), &CancellationToken::new())
            .await;
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn cancellation_ends_wait() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let _ = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let start = Instant::now();
        TokioSleeper.sleep(Duration::from_secs(60), &cancel).await;
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn already_cancelled_returns_immediately() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let start = Instant::now();
        TokioSleeper.sleep(Duration::from_secs(60), &cancel).await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
