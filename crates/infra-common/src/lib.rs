//! Common infrastructure for the voice gateway
//!
//! Shared by every gateway crate and the `voicegw` binary:
//!
//! - [`logging`]: tracing subscriber setup
//! - [`config`]: layered configuration loading (defaults, TOML file, environment)
//! - [`errors`]: the infrastructure error type and error context helpers

pub mod config;
pub mod errors;
pub mod logging;

pub use crate::config::{ENV_PREFIX, load_config, load_config_with_prefix, to_toml_string};
pub use crate::errors::{Error, ErrorContext, ErrorExt, Result};
pub use crate::logging::{LoggingConfig, log_welcome, parse_log_level, setup_logging};
