//! `voicegw` command line entry point

mod config;
mod run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use voicegw_infra_common::{load_config, log_welcome, setup_logging, to_toml_string};

use crate::config::GatewayConfig;

#[derive(Parser, Debug)]
#[command(name = "voicegw", author, version, about = "Voice call signaling gateway", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "VOICEGW_CONFIG")]
    config: Option<PathBuf>,

    /// Log level, overriding the configuration file
    #[arg(short, long, env = "VOICEGW_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Registry, its HTTP API and both signaling front-ends in one process
    All,
    /// Only the session registry HTTP API
    Registry,
    /// SIP and WebRTC front-ends against a remote registry
    Gateway,
    /// Print the effective configuration as TOML and exit
    PrintConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config: GatewayConfig = load_config(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    let command = cli.command.unwrap_or(Command::All);
    if command == Command::PrintConfig {
        print!("{}", to_toml_string(&config)?);
        return Ok(());
    }

    setup_logging(&config.logging)?;
    log_welcome(&config.logging.app_name, env!("CARGO_PKG_VERSION"));

    run::run(command, config).await
}
