//! XDG base directories for deskfs

use crate::error::ApiError;
use std::path::PathBuf;

const APP_DIR: &str = "deskfs";

/// `$<var>` when set and non-empty, else `$HOME/<fallback>`
fn xdg_dir(var: &str, fallback: &[&str]) -> Option<PathBuf> {
    match std::env::var_os(var) {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => std::env::var_os("HOME")
            .map(|home| fallback.iter().fold(PathBuf::from(home), |p, s| p.join(s))),
    }
}

fn required(dir: Option<PathBuf>, what: &str) -> Result<PathBuf, ApiError> {
    dir.ok_or_else(|| ApiError::ConfigError(format!("Cannot locate {} (HOME is not set)", what)))
}

/// `$XDG_DATA_HOME`, default `~/.local/share`
pub fn data_home() -> Option<PathBuf> {
    xdg_dir("XDG_DATA_HOME", &[".local", "share"])
}

/// `$XDG_CONFIG_HOME`, default `~/.config`
pub fn config_home() -> Result<PathBuf, ApiError> {
    required(xdg_dir("XDG_CONFIG_HOME", &[".config"]), "the config directory")
}

/// `<config home>/deskfs/config.toml`
pub fn global_config_file() -> Result<PathBuf, ApiError> {
    Ok(config_home()?.join(APP_DIR).join("config.toml"))
}

/// Default sled directory, `<data home>/deskfs/store`. Created by the
/// store on first open.
pub fn store_dir() -> Result<PathBuf, ApiError> {
    Ok(required(data_home(), "the data directory")?
        .join(APP_DIR)
        .join("store"))
}
