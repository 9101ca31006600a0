//! Typed configuration from environment variables.
//!
//! Only the binary reads configuration; the queue itself has none.

use crate::error::{Error, Result};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct Config {
    pub otel_endpoint: Option<String>,
    pub log_level: String,
    pub service_name: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self> {
        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        EnvFilter::try_new(&log_level)
            .map_err(|e| Error::Config(format!("LOG_LEVEL '{log_level}' is not a valid filter: {e}")))?;

        Ok(Self {
            otel_endpoint: optional_var("OTEL_ENDPOINT"),
            log_level,
            service_name: optional_var("WORKORDERS_SERVICE_NAME")
                .unwrap_or_else(|| "workorders".to_string()),
        })
    }
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
