//! tracing-subscriber setup for the binary

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Filter directive: `RUST_LOG` wins, otherwise the configured level for our crates
pub fn filter_directive(config: &LoggingConfig) -> String {
    match std::env::var("RUST_LOG") {
        Ok(directive) if !directive.trim().is_empty() => directive,
        _ => default_directive(&config.level),
    }
}

fn default_directive(level: &str) -> String {
    format!("catalog_client={level},catalog_admin={level},warn", level = level)
}

/// Install the global subscriber. Safe to call more than once.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_new(filter_directive(config))
        .unwrap_or_else(|_| EnvFilter::new(default_directive("info")));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
