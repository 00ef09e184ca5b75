//! vbox-api server binary
//!
//! Command-line entry point for the `VBoxManage list` HTTP API. For library
//! usage, see the `vbox_api` crate documentation.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use vbox_api::config::{
    CliOptions, DEFAULT_CONFIG_PATH, ResolvedParams, expand_path, load_config, resolve_params,
};

// ============================================================================
// CLI Arguments
// ============================================================================

/// HTTP API over `VBoxManage list`: runs the tool per requested directive and
/// returns its parsed output as JSON.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
struct Cli {
    /// Address to listen on. Can be set in config.
    #[arg(long, env = "VBOX_API_BIND")]
    bind: Option<String>,
    /// Port to listen on. Can be set in config.
    #[arg(long, env = "VBOX_API_PORT")]
    port: Option<u16>,
    /// `VBoxManage` executable, a name on PATH or a full path.
    #[arg(long)]
    vboxmanage: Option<String>,
    /// Kill a `VBoxManage` call that runs longer than this.
    #[arg(long)]
    command_timeout_ms: Option<u64>,
    /// Log level (trace|debug|info|warn|error). RUST_LOG takes precedence.
    #[arg(long)]
    log_level: Option<String>,
    /// Append logs to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// Config file, toml/yaml/json by extension (default ~/.config/vbox-api/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

impl CliOptions for Cli {
    fn bind(&self) -> Option<String> {
        self.bind.clone()
    }
    fn port(&self) -> Option<u16> {
        self.port
    }
    fn vboxmanage(&self) -> Option<String> {
        self.vboxmanage.clone()
    }
    fn command_timeout_ms(&self) -> Option<u64> {
        self.command_timeout_ms
    }
    fn log_level(&self) -> Option<String> {
        self.log_level.clone()
    }
    fn log_file(&self) -> Option<PathBuf> {
        self.log_file.clone()
    }
}

// ============================================================================
// Logging
// ============================================================================

fn init_tracing(params: &ResolvedParams) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&params.log_level)
            .with_context(|| format!("invalid log level: {}", params.log_level))?,
    };

    match &params.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_env_filter(filter)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter)
                .init();
        }
    }
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            if !path.exists() {
                bail!("config file {} does not exist", path.display());
            }
            load_config(path)?
        }
        None => load_config(&expand_path(DEFAULT_CONFIG_PATH))?,
    };

    let params = resolve_params(&cli, config.as_ref())?;
    init_tracing(&params)?;

    tracing::info!(
        name = vbox_api::NAME,
        version = vbox_api::VERSION,
        addr = %params.socket_addr(),
        program = %params.program,
        timeout = ?params.command_timeout,
        "vbox-api starting"
    );

    vbox_api::run(params).await
}
