//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins over the configured level. Production logs are JSON,
//! everything else uses the compact human-readable format.

use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log level/filter '{value}'")]
    EnvFilter {
        value: String,
        #[source]
        source: ParseError,
    },

    #[error("telemetry error: {0}")]
    Subscriber(#[source] Box<dyn std::error::Error + Send + Sync>),
}

fn env_filter(log_level: &str) -> Result<EnvFilter, TelemetryError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(log_level).map_err(|source| TelemetryError::EnvFilter {
            value: log_level.to_string(),
            source,
        }),
    }
}

/// Installs the global subscriber.
pub fn init(log_level: &str, json: bool) -> Result<(), TelemetryError> {
    let filter = env_filter(log_level)?;

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(false)
            .try_init()
            .map_err(TelemetryError::Subscriber)
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .try_init()
            .map_err(TelemetryError::Subscriber)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_directives_parse() {
        std::env::remove_var("RUST_LOG");
        assert!(env_filter("info,maturity_assessment=debug").is_ok());
    }
}
