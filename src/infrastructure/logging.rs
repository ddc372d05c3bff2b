//! Tracing subscriber setup for the gateway

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::config::{LogFormat, LoggingConfig};

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence when set; otherwise the configured level
/// applies to the gateway itself while the HTTP internals underneath it
/// (hyper, reqwest) stay at `warn` so per-connection chatter does not
/// drown the request log.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.level)));

    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Json => {
            registry
                .with(fmt::layer().json().flatten_event(true))
                .init();
        }
        LogFormat::Pretty => {
            registry
                .with(fmt::layer().compact().with_target(false))
                .init();
        }
    }
}

fn default_directives(level: &str) -> String {
    format!("{},hyper=warn,reqwest=warn", level)
}
