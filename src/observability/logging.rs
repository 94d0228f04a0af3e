//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once at startup
//! - Select pretty or JSON output
//! - Honour RUST_LOG, falling back to the configured level

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogFormat;

/// Filter used when RUST_LOG is unset.
pub fn default_filter(level: &str) -> String {
    format!("api_gateway={level},tower_http={level}")
}

/// Install the global subscriber. Errors if one is already installed.
pub fn init_logging(level: &str, format: LogFormat) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level).into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_covers_gateway_and_middleware() {
        assert_eq!(default_filter("debug"), "api_gateway=debug,tower_http=debug");
        assert!(default_filter("warn").parse::<EnvFilter>().is_ok());
    }
}
