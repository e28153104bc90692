//! Structured logging setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize a tracing subscriber with env-filter support.
///
/// Convenience for hosts and tests that have no subscriber of their own;
/// a second call is a no-op rather than a panic.
pub fn init() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "service_selector=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
