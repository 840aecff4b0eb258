//! Entry point for loading `DeskConfig`

use super::merge::service::MergeService;
use super::DeskConfig;
use config::ConfigError;
use std::path::Path;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults, global file, environment
    pub fn load() -> Result<DeskConfig, ConfigError> {
        MergeService::load()
    }

    /// As `load`, with `path` (which must exist) between the global file
    /// and the environment.
    pub fn load_from_file(path: &Path) -> Result<DeskConfig, ConfigError> {
        MergeService::load_with_file(path)
    }

    pub fn load_optional(path: Option<&Path>) -> Result<DeskConfig, ConfigError> {
        path.map_or_else(Self::load, Self::load_from_file)
    }
}
