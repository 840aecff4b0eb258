//! Built-in defaults, the lowest-precedence layer.

use crate::terminal::DEFAULT_HISTORY_LIMIT;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Builder seeded with the default values every later source overrides.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("username", "user")?
        .set_default("storage.backend", "memory")?
        .set_default("storage.refetch_after_write", false)?
        .set_default("terminal.history_limit", DEFAULT_HISTORY_LIMIT as i64)?
        .set_default("logging.level", "info")
}
