//! # ragkit-telemetry
//!
//! Logging setup for ragkit binaries and tests.
//!
//! - [`init_telemetry`] - human-readable output filtered by `RUST_LOG`
//! - [`init_json_telemetry`] - one JSON object per event, for log shippers
//! - [`init_with_storage`] - also captures spans in memory, keyed by `invocation_id`
//!
//! Every function installs a global subscriber and fails if one is already set.
//!
//! ```rust,ignore
//! ragkit_telemetry::init_telemetry("rag-chat")?;
//! tracing::info!(top_k = 5, "starting");
//! ```

pub mod memory;

pub use memory::{INVOCATION_ID, InMemoryTraceLayer, SharedTraceStorage, SpanData};

use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a human-readable subscriber.
pub fn init_telemetry(service_name: &str) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_target(true))
        .try_init()?;
    tracing::debug!(service = service_name, "telemetry initialized");
    Ok(())
}

/// Install a subscriber that writes newline-delimited JSON.
pub fn init_json_telemetry(service_name: &str) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().json().with_current_span(true).with_span_list(false))
        .try_init()?;
    tracing::debug!(service = service_name, "json telemetry initialized");
    Ok(())
}

/// Install a human-readable subscriber that also records spans into `storage`.
pub fn init_with_storage(
    service_name: &str,
    storage: SharedTraceStorage,
) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_target(true))
        .with(InMemoryTraceLayer::new(storage))
        .try_init()?;
    tracing::debug!(service = service_name, "telemetry initialized with span capture");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_fails_instead_of_panicking() {
        let first = init_telemetry("test");
        let second = init_json_telemetry("test");
        // Another test binary may already own the global subscriber.
        assert!(first.is_err() || second.is_err());
    }
}
