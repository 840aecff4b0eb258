//! `DESKFS__SECTION__KEY` environment overlay

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment};

const PREFIX: &str = "DESKFS";
const SEPARATOR: &str = "__";

/// `DESKFS__STORAGE__BACKEND=sled` sets `storage.backend`.
///
/// Single-underscore `DESKFS_LOG*` variables are read by the logger.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let source = Environment::with_prefix(PREFIX)
        .prefix_separator(SEPARATOR)
        .separator(SEPARATOR)
        .try_parsing(true);
    Ok(builder.add_source(source))
}
