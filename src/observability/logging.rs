//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Configure log level from config, overridable via `RUST_LOG`

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Default filter for a configured level.
pub fn default_filter(level: &str) -> String {
    format!("explorer_server={level},tower_http={level}")
}

/// Install the global subscriber. Call once, before any other subsystem.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(&config.log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_names_crate_and_http_layer() {
        assert_eq!(default_filter("debug"), "explorer_server=debug,tower_http=debug");
        assert!(EnvFilter::try_new(default_filter("warn")).is_ok());
    }
}
