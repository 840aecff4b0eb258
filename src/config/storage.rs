//! StorageConfig and store construction.

use crate::config::xdg;
use crate::error::ApiError;
use crate::store::{MemoryNodeStore, NodeStore, SledNodeStore};
use crate::vfs::VfsOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Backing store for node records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Lost on exit
    #[default]
    Memory,
    /// Persisted with sled
    Sled,
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Sled database directory; None means `$XDG_DATA_HOME/deskfs/store`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Re-fetch affected subtrees after every write
    #[serde(default)]
    pub refetch_after_write: bool,
}

impl StorageConfig {
    /// Resolve the sled directory
    pub fn resolve_path(&self) -> Result<PathBuf, ApiError> {
        match &self.path {
            Some(path) if !path.as_os_str().is_empty() => Ok(path.clone()),
            _ => Ok(xdg::store_dir()?),
        }
    }

    /// Open the configured store
    pub fn open_store(&self) -> Result<Arc<dyn NodeStore>, ApiError> {
        match self.backend {
            StorageBackend::Memory => Ok(Arc::new(MemoryNodeStore::new())),
            StorageBackend::Sled => {
                let path = self.resolve_path()?;
                std::fs::create_dir_all(&path)?;
                info!(path = %path.display(), "Opening sled store");
                Ok(Arc::new(SledNodeStore::open(&path)?))
            }
        }
    }

    pub fn vfs_options(&self) -> VfsOptions {
        VfsOptions {
            refetch_after_write: self.refetch_after_write,
        }
    }
}
