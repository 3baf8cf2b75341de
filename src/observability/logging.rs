//! Structured logging setup for the `txctl` binary.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::schema::ObservabilityConfig;

/// Filter used when neither `RUST_LOG` nor the config names one.
const DEFAULT_DIRECTIVES: &str = "devnet_tx=info,txctl=info";

/// Build the env filter: `RUST_LOG` wins, then the configured level.
pub fn env_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config.log_level.is_empty() {
            EnvFilter::new(DEFAULT_DIRECTIVES)
        } else {
            EnvFilter::new(format!(
                "devnet_tx={level},txctl={level}",
                level = config.log_level
            ))
        }
    })
}

/// Install the global subscriber. Logs go to stderr so stdout stays JSON-clean.
pub fn init_logging(config: &ObservabilityConfig) {
    let registry = tracing_subscriber::registry().with(env_filter(config));

    let result = if config.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    if let Err(e) = result {
        eprintln!("logging already initialised: {}", e);
    }
}
