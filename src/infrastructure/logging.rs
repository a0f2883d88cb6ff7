use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level. Request spans come
/// from `TraceLayer`; events are written as they happen.
pub fn init_logging(config: &LoggingConfig) {
    let filter = build_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok(), &config.level);
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().flatten_event(true).with_current_span(true))
            .init(),
        LogFormat::Pretty => registry.with(fmt::layer().with_target(true)).init(),
    }

    tracing::info!(level = %config.level, format = ?config.format, "Logging initialized");
}

/// Directives from the environment when they parse, else the configured level
fn build_filter(env_directives: Option<String>, level: &str) -> EnvFilter {
    env_directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_level_without_env() {
        assert_eq!(build_filter(None, "debug").to_string(), "debug");
    }

    #[test]
    fn test_env_directives_win() {
        let filter = build_filter(Some("authgate=trace".to_string()), "info");
        assert_eq!(filter.to_string(), "authgate=trace");
    }
}
