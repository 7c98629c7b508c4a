//! Tracing/logging initialization for the churn driver
//!
//! The library itself only emits events: pool eviction and overflow at
//! `debug`/`trace`, unmap failures at `warn`, fatal allocation at `error`.
//! Installing a subscriber is left to binaries.

use anyhow::Result;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::config::LoggingConfig;

/// Initialize the tracing subscriber based on configuration
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))?;

    let subscriber = tracing_subscriber::registry().with(filter);

    match config.format.as_str() {
        "json" => {
            let fmt_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_span_events(FmtSpan::CLOSE);
            subscriber.with(fmt_layer).try_init()?;
        }
        _ => {
            let fmt_layer = fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_span_events(FmtSpan::CLOSE);
            subscriber.with(fmt_layer).try_init()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_an_error() {
        let config = LoggingConfig {
            level: "warn".to_string(),
            format: "pretty".to_string(),
        };
        // Whichever call runs first wins the global subscriber slot.
        let _ = init_tracing(&config);
        assert!(init_tracing(&config).is_err());
    }
}
