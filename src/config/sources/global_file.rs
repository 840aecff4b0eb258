//! Global config file source: `$XDG_CONFIG_HOME/deskfs/config.toml`

use crate::config::xdg;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File, FileFormat};

/// Add the global file, if it exists, to the builder.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let Ok(path) = xdg::global_config_file() else {
        return Ok(builder);
    };
    if !path.exists() {
        return Ok(builder);
    }
    let path = path
        .to_str()
        .ok_or_else(|| ConfigError::Message(format!("Non UTF-8 config path: {:?}", path)))?
        .to_string();
    Ok(builder.add_source(File::new(&path, FileFormat::Toml).required(false)))
}
