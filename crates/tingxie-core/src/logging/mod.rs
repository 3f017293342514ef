//! Structured logging setup.
//!
//! All crates log through `tracing`. The binary calls [`init_subscriber`] once;
//! tests use [`capture_logs`] to assert on emitted events.

pub mod capture;

pub use capture::{CapturedEvent, CapturedLogs, capture_logs};

/// Install the global stderr subscriber.
///
/// `RUST_LOG` takes precedence over `level`. With `json` set, events are
/// written as one JSON object per line. Subsequent calls are no-ops.
pub fn init_subscriber(level: &str, json: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    // try_init fails only when a global subscriber is already set
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_subscriber_is_idempotent() {
        init_subscriber("warn", false);
        init_subscriber("debug", true);
    }
}
