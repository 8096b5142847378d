//! Layered configuration loading
//!
//! Values are resolved from, lowest precedence first:
//!
//! 1. the `Default` of the target type (every section is `#[serde(default)]`)
//! 2. an optional TOML file
//! 3. environment variables named `VOICEGW__<SECTION>__<KEY>`
//!
//! For example `VOICEGW__SIP__LISTEN_ADDR=0.0.0.0:5070` overrides `sip.listen_addr`.

use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::{Error, ErrorContext, ErrorExt, Result};

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "VOICEGW";

/// Load a configuration of type `T`
pub fn load_config<T>(path: Option<&Path>) -> Result<T>
where
    T: DeserializeOwned,
{
    load_config_with_prefix(path, ENV_PREFIX)
}

/// Same as [`load_config`] with an explicit environment prefix
pub fn load_config_with_prefix<T>(path: Option<&Path>, env_prefix: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let mut builder = Config::builder();

    if let Some(path) = path {
        debug!("Loading configuration file {}", path.display());
        builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix(env_prefix)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let ctx = ErrorContext::new("config", "load")
        .with_details(path.map(|p| p.display().to_string()).unwrap_or_else(|| "<env>".into()));

    builder
        .build()
        .context(ctx.clone())?
        .try_deserialize::<T>()
        .context(ctx)
}

/// Render a configuration as TOML
pub fn to_toml_string<T: Serialize>(config: &T) -> Result<String> {
    toml::to_string_pretty(config)
        .map_err(|e| Error::Config(e.to_string()))
        .with_context("config", "render")
}
