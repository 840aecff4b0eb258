//! Error types
//!
//! `VfsError` is the routine, expected outcome of a filesystem call (missing
//! paths, wrong node kinds). `StorageError` covers backend failures, and
//! `ApiError` covers the ambient layers (configuration, logging, CLI).

use crate::types::NodeKind;
use thiserror::Error;

/// Errors produced by storage backends
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("record serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Errors produced by filesystem operations
#[derive(Debug, Error)]
pub enum VfsError {
    #[error("{0}: No such file or directory")]
    NotFound(String),

    #[error("{path}: expected {expected}, found {found}")]
    WrongKind {
        path: String,
        expected: NodeKind,
        found: NodeKind,
    },

    #[error("{0}: already exists")]
    AlreadyExists(String),

    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("the root directory cannot be removed or moved")]
    RootImmutable,

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl VfsError {
    pub(crate) fn wrong_kind(path: &str, expected: NodeKind, found: NodeKind) -> Self {
        VfsError::WrongKind {
            path: path.to_string(),
            expected,
            found,
        }
    }

    pub(crate) fn invalid_path(path: &str, reason: impl Into<String>) -> Self {
        VfsError::InvalidPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    /// True for the routine "path does not resolve" outcome
    pub fn is_not_found(&self) -> bool {
        matches!(self, VfsError::NotFound(_))
    }

    /// True when the failure came from the storage backend rather than the tree
    pub fn is_storage(&self) -> bool {
        matches!(self, VfsError::Storage(_))
    }
}

/// Errors produced by the ambient application layers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("filesystem error: {0}")]
    Vfs(#[from] VfsError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
