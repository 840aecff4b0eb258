//! Configuration
//!
//! Layered with the `config` crate. Precedence, lowest first: built-in
//! defaults, the global file (`$XDG_CONFIG_HOME/deskfs/config.toml`), an
//! explicit file passed on the command line, then `DESKFS__*` environment
//! variables (`DESKFS__STORAGE__BACKEND=sled`).

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;
mod storage;

pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;
pub use storage::{StorageBackend, StorageConfig};

use crate::logging::LoggingConfig;
use crate::terminal::DEFAULT_HISTORY_LIMIT;
use serde::{Deserialize, Serialize};

fn default_username() -> String {
    "user".to_string()
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

/// Terminal session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalConfig {
    /// Commands kept in a session's history
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeskConfig {
    /// Owner whose filesystem is opened
    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub terminal: TerminalConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
            storage: StorageConfig::default(),
            terminal: TerminalConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
