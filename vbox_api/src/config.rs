//! Configuration types and loading for vbox-api.

use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use vboxmanage::DEFAULT_PROGRAM;

pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Config file location used when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "~/.config/vbox-api/config.toml";

/// Config file format. Every field is optional.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub vboxmanage: Option<String>,
    pub command_timeout_ms: Option<u64>,
    pub log_level: Option<String>,
    pub log_file: Option<String>,
}

/// Resolved runtime parameters for the server.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedParams {
    pub bind: IpAddr,
    pub port: u16,
    /// `VBoxManage` executable, a bare name looked up on `PATH` or a path.
    pub program: String,
    pub command_timeout: Duration,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl ResolvedParams {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

/// CLI options that can override config file settings.
///
/// Lets the binary hand its arguments to [`resolve_params`] without the
/// library depending on clap types.
pub trait CliOptions {
    fn bind(&self) -> Option<String>;
    fn port(&self) -> Option<u16>;
    fn vboxmanage(&self) -> Option<String>;
    fn command_timeout_ms(&self) -> Option<u64>;
    fn log_level(&self) -> Option<String>;
    fn log_file(&self) -> Option<PathBuf>;
}

pub fn expand_path(raw: impl AsRef<str>) -> PathBuf {
    let s = raw.as_ref();
    if let Some(stripped) = s.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(s)
}

/// Load `path` as YAML, TOML or JSON depending on its extension.
///
/// A file that does not exist is not an error; it yields `None`.
pub fn load_config(path: &Path) -> Result<Option<Config>> {
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let cfg: Config = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&data)
            .with_context(|| format!("failed to parse yaml config {}", path.display()))?,
        "toml" => toml::from_str(&data)
            .with_context(|| format!("failed to parse toml config {}", path.display()))?,
        _ => serde_json::from_str(&data)
            .with_context(|| format!("failed to parse json config {}", path.display()))?,
    };
    Ok(Some(cfg))
}

/// Resolve runtime parameters from CLI options and config file.
///
/// CLI options take precedence over config file settings, which take
/// precedence over the built-in defaults.
pub fn resolve_params<C: CliOptions>(cli: &C, config: Option<&Config>) -> Result<ResolvedParams> {
    let cfg = config.cloned().unwrap_or_default();

    let bind_raw = cli
        .bind()
        .or(cfg.bind)
        .unwrap_or_else(|| DEFAULT_BIND.to_string());
    let bind: IpAddr = bind_raw
        .trim()
        .parse()
        .with_context(|| format!("invalid bind address '{bind_raw}'"))?;

    let port = cli.port().or(cfg.port).unwrap_or(DEFAULT_PORT);

    let program = cli
        .vboxmanage()
        .or(cfg.vboxmanage)
        .map(|p| {
            if p.starts_with("~/") {
                expand_path(&p).display().to_string()
            } else {
                p
            }
        })
        .unwrap_or_else(|| DEFAULT_PROGRAM.to_string());
    if program.trim().is_empty() {
        return Err(anyhow!("vboxmanage program must not be empty"));
    }

    let timeout_ms = cli
        .command_timeout_ms()
        .or(cfg.command_timeout_ms)
        .unwrap_or(DEFAULT_COMMAND_TIMEOUT_MS);
    if timeout_ms == 0 {
        return Err(anyhow!("command_timeout_ms must be greater than zero"));
    }

    let log_level = cli
        .log_level()
        .or(cfg.log_level)
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

    let log_file = cli
        .log_file()
        .map(|p| p.to_str().map(expand_path).unwrap_or_else(|| p.clone()))
        .or_else(|| cfg.log_file.as_deref().map(expand_path));

    Ok(ResolvedParams {
        bind,
        port,
        program,
        command_timeout: Duration::from_millis(timeout_ms),
        log_level,
        log_file,
    })
}
