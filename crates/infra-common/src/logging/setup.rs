use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, fmt};

/// Configuration for the logging system
///
/// `RUST_LOG`, when set, takes precedence over `level`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level: trace, debug, info, warn or error
    pub level: String,
    /// Emit one JSON object per event
    pub json: bool,
    /// Include file and line information
    pub file_info: bool,
    /// Log span open/close events
    pub log_spans: bool,
    /// Application name used in the welcome banner
    pub app_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            json: false,
            file_info: false,
            log_spans: false,
            app_name: "voicegw".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn new(level: impl Into<String>, app_name: impl Into<String>) -> Self {
        LoggingConfig {
            level: level.into(),
            app_name: app_name.into(),
            ..Default::default()
        }
    }
}

/// Install the global tracing subscriber
///
/// Fails if the level is not recognized or a subscriber is already installed.
pub fn setup_logging(config: &LoggingConfig) -> Result<()> {
    let level = parse_log_level(&config.level)?;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::default().add_directive(LevelFilter::from_level(level).into()),
    };

    let span_events = if config.log_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let mut subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_span_events(span_events);

    if config.file_info {
        subscriber = subscriber.with_file(true).with_line_number(true);
    }

    let installed = if config.json {
        subscriber
            .with_writer(std::io::stdout)
            .json()
            .try_init()
    } else {
        subscriber.try_init()
    };

    installed.map_err(|e| Error::Logging(e.to_string()))
}

/// Parse a log level from a string
pub fn parse_log_level(level: &str) -> Result<Level> {
    Level::from_str(level.trim())
        .map_err(|_| Error::Config(format!("Invalid log level: {}", level)))
}

/// Log a welcome message with version info
pub fn log_welcome(app_name: &str, version: &str) {
    tracing::info!("Starting {} v{}", app_name, version);
}
