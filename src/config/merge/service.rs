//! MergeService: orchestrates sources, applies merge policy, deserializes to DeskConfig.

use crate::config::sources::{environment, global_file};
use crate::config::DeskConfig;
use config::{ConfigError, File, FileFormat};
use std::path::Path;

use super::merge_policy;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Load config from the standard sources.
    /// Precedence: defaults (lowest) -> global file -> environment (highest).
    pub fn load() -> Result<DeskConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load config with an explicit file layered over the global one.
    pub fn load_with_file(path: &Path) -> Result<DeskConfig, ConfigError> {
        let path = path
            .to_str()
            .ok_or_else(|| ConfigError::Message(format!("Non UTF-8 config path: {:?}", path)))?;

        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = builder.add_source(File::new(path, FileFormat::Toml).required(true));
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        config.try_deserialize()
    }
}
