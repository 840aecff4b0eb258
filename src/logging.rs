//! Logging System
//!
//! Structured logging through `tracing`. Level, format and destination come
//! from `LoggingConfig`; `DESKFS_LOG*` environment variables override the
//! configuration file.

use crate::error::ApiError;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

const LOG_FILE_NAME: &str = "deskfs.log";

const ENV_FILTER: &str = "DESKFS_LOG";
const ENV_MODULES: &str = "DESKFS_LOG_MODULES";
const ENV_FORMAT: &str = "DESKFS_LOG_FORMAT";
const ENV_OUTPUT: &str = "DESKFS_LOG_OUTPUT";
const ENV_FILE: &str = "DESKFS_LOG_FILE";

/// Line format of emitted events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Where events are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum LogOutput {
    #[serde(rename = "stdout")]
    Stdout,
    #[serde(rename = "stderr")]
    Stderr,
    #[default]
    #[serde(rename = "file")]
    File,
    #[serde(rename = "file+stderr")]
    #[value(name = "file+stderr")]
    FileAndStderr,
    /// stdout and stderr
    #[serde(rename = "both")]
    Both,
}

impl LogOutput {
    fn writes_file(self) -> bool {
        matches!(self, LogOutput::File | LogOutput::FileAndStderr)
    }

    fn parse(raw: &str) -> Result<Self, ApiError> {
        <LogOutput as ValueEnum>::from_str(raw, true).map_err(|_| {
            ApiError::ConfigError(format!(
                "Invalid log output: {} (expected stdout, stderr, file, file+stderr or both)",
                raw
            ))
        })
    }
}

/// Logging section of the configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,

    /// trace, debug, info, warn, error or off
    pub level: String,

    pub format: LogFormat,

    pub output: LogOutput,

    /// Explicit log file; unset means the per-owner state directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    /// ANSI colours for terminal output
    pub color: bool,

    /// Per-module level overrides, e.g. `deskfs::store = "debug"`
    pub modules: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            enabled: true,
            level: "info".to_string(),
            format: LogFormat::Text,
            output: LogOutput::File,
            file: None,
            color: true,
            modules: HashMap::new(),
        }
    }
}

/// Pick the log file: explicit CLI path, then `DESKFS_LOG_FILE`, then the
/// configured path, then `<state dir>/<owner>/deskfs.log`.
pub fn resolve_log_file_path(
    cli_file: Option<PathBuf>,
    config_file: Option<PathBuf>,
    owner: Option<&str>,
) -> Result<PathBuf, ApiError> {
    let from_env = std::env::var_os(ENV_FILE).map(PathBuf::from);
    let explicit = [cli_file, from_env, config_file]
        .into_iter()
        .flatten()
        .find(|p| !p.as_os_str().is_empty());
    match explicit {
        Some(path) => Ok(path),
        None => state_log_file(owner),
    }
}

fn state_log_file(owner: Option<&str>) -> Result<PathBuf, ApiError> {
    let dirs = directories::ProjectDirs::from("", "deskfs", "deskfs").ok_or_else(|| {
        ApiError::ConfigError("No home directory to place the log file in".to_string())
    })?;
    let mut path = dirs
        .state_dir()
        .unwrap_or_else(|| dirs.data_local_dir())
        .to_path_buf();
    if let Some(owner) = owner.filter(|o| !o.is_empty()) {
        path.push(owner);
    }
    path.push(LOG_FILE_NAME);
    Ok(path)
}

/// Install the global subscriber for `owner`.
///
/// Fails if a subscriber is already installed or the settings are invalid.
pub fn init_logging(config: Option<&LoggingConfig>, owner: Option<&str>) -> Result<(), ApiError> {
    let defaults = LoggingConfig::default();
    let config = config.unwrap_or(&defaults);

    let installed = if !config.enabled {
        Registry::default()
            .with(EnvFilter::new("off"))
            .with(fmt::layer().with_writer(std::io::sink))
            .try_init()
    } else {
        let filter = env_filter(config)?;
        let format = effective_format(config);
        let output = effective_output(config)?;
        let writer = make_writer(output, || {
            resolve_log_file_path(None, config.file.clone(), owner)
        })?;
        let ansi = config.color && !output.writes_file();

        let layer = fmt::layer()
            .with_target(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(writer);
        let registry = Registry::default().with(filter);
        match format {
            LogFormat::Json => registry.with(layer.json()).try_init(),
            LogFormat::Text => registry.with(layer.with_ansi(ansi)).try_init(),
        }
    };
    installed.map_err(|e| ApiError::ConfigError(format!("Failed to install logger: {}", e)))
}

fn open_append(path: &Path) -> Result<File, ApiError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| {
            ApiError::ConfigError(format!("Cannot create log directory {}: {}", dir.display(), e))
        })?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| ApiError::ConfigError(format!("Cannot open log file {}: {}", path.display(), e)))
}

fn make_writer(
    output: LogOutput,
    log_file: impl FnOnce() -> Result<PathBuf, ApiError>,
) -> Result<BoxMakeWriter, ApiError> {
    Ok(match output {
        LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogOutput::Both => BoxMakeWriter::new(std::io::stdout.and(std::io::stderr)),
        LogOutput::File => BoxMakeWriter::new(open_append(&log_file()?)?),
        LogOutput::FileAndStderr => {
            BoxMakeWriter::new(open_append(&log_file()?)?.and(std::io::stderr))
        }
    })
}

/// `DESKFS_LOG` replaces everything; otherwise the configured level plus
/// per-module overrides from the config and `DESKFS_LOG_MODULES`.
fn env_filter(config: &LoggingConfig) -> Result<EnvFilter, ApiError> {
    if let Ok(filter) = EnvFilter::try_from_env(ENV_FILTER) {
        return Ok(filter);
    }
    if config.level == "off" {
        return Ok(EnvFilter::new("off"));
    }

    let mut overrides: Vec<(String, String)> = config
        .modules
        .iter()
        .map(|(m, l)| (m.clone(), l.clone()))
        .collect();
    if let Ok(raw) = std::env::var(ENV_MODULES) {
        overrides.extend(raw.split(',').filter_map(|pair| {
            pair.split_once('=')
                .map(|(m, l)| (m.trim().to_string(), l.trim().to_string()))
        }));
    }

    overrides
        .iter()
        .try_fold(
            EnvFilter::new(&config.level),
            |filter, (module, level)| -> Result<EnvFilter, ApiError> {
                Ok(filter.add_directive(parse_directive(module, level)?))
            },
        )
}

fn parse_directive(module: &str, level: &str) -> Result<Directive, ApiError> {
    format!("{}={}", module, level)
        .parse()
        .map_err(|e| ApiError::ConfigError(format!("Invalid log directive {}={}: {}", module, level, e)))
}

/// Unknown `DESKFS_LOG_FORMAT` values are ignored
fn effective_format(config: &LoggingConfig) -> LogFormat {
    std::env::var(ENV_FORMAT)
        .ok()
        .and_then(|raw| <LogFormat as ValueEnum>::from_str(&raw, true).ok())
        .unwrap_or(config.format)
}

fn effective_output(config: &LoggingConfig) -> Result<LogOutput, ApiError> {
    match std::env::var(ENV_OUTPUT) {
        Ok(raw) => LogOutput::parse(&raw),
        Err(_) => Ok(config.output),
    }
}
