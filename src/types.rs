//! Core types shared across the filesystem engine and its stores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp attached to nodes and records
pub type Timestamp = DateTime<Utc>;

/// Digest: 256-bit blake3 hash of a snapshot or subtree
pub type Digest = [u8; 32];

/// Kind of a filesystem node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Directory,
    /// Opaque leaf carried over from persisted data; never dereferenced
    Symlink,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Directory => "directory",
            NodeKind::Symlink => "symlink",
        }
    }

    /// Default permission string for freshly created nodes of this kind
    pub fn default_permissions(&self) -> &'static str {
        match self {
            NodeKind::File => "644",
            NodeKind::Directory => "755",
            NodeKind::Symlink => "777",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default numeric owner and group id of the simulated user
pub const DEFAULT_UID: u32 = 1000;
pub const DEFAULT_GID: u32 = 1000;

/// Current time for node timestamps
pub fn now() -> Timestamp {
    Utc::now()
}
