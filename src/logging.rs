//! Logging initialization and configuration.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "potboard=info";

/// Try to initialize the logging system.
///
/// Returns `Ok(())` if successful, or `Err` if logging has already been
/// initialized.
pub fn try_init() -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().compact())
        .try_init()
}

/// Initialize logging with an explicit filter, as resolved from configuration.
///
/// A bare level such as `debug` is scoped to this crate plus `tower_http`;
/// anything else is handed to [`EnvFilter`] as a full directive string.
pub fn init_with_filter(level: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(filter_for(level))
        .with(tracing_subscriber::fmt::layer().compact())
        .try_init()
}

fn filter_for(level: &str) -> EnvFilter {
    let directives = match level {
        "error" | "warn" | "info" | "debug" | "trace" => {
            format!("potboard={level},tower_http={level}")
        }
        other => other.to_string(),
    };
    EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_init_idempotent() {
        // First call may or may not succeed depending on test order
        let _ = try_init();
        let _ = try_init();
    }

    #[test]
    fn test_init_with_filter_after_init() {
        let _ = try_init();
        // Already initialized: must report an error rather than panic
        let _ = init_with_filter("debug");
    }

    #[test]
    fn test_filter_for_bare_level() {
        let filter = filter_for("debug");
        assert!(filter.to_string().contains("potboard=debug"));
    }

    #[test]
    fn test_filter_for_directive() {
        let filter = filter_for("potboard=trace,axum=warn");
        let rendered = filter.to_string();
        assert!(rendered.contains("potboard=trace"));
        assert!(rendered.contains("axum=warn"));
    }

    #[test]
    fn test_logging_works() {
        let _ = try_init();

        tracing::info!("test info message");
        tracing::debug!("test debug message");
        tracing::warn!("test warn message");
    }
}
