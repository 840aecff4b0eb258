//! NodeRecord Store
//!
//! Flat, path-keyed persistence for the filesystem tree. The engine keeps the
//! authoritative in-memory snapshot and mirrors every committed mutation into
//! a `NodeStore` as a batch of record changes. On refresh the tree is rebuilt
//! from the records.

pub mod memory;
pub mod persistence;

use crate::error::StorageError;
use crate::path::CanonicalPath;
use crate::tree::node::{Node, NodeAttrs, NodeBody};
use crate::types::{NodeKind, Timestamp};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use memory::MemoryNodeStore;
pub use persistence::SledNodeStore;

/// NodeRecord: one persisted filesystem entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub owner: String,
    pub path: CanonicalPath,
    pub name: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub content: String,
    #[serde(default = "empty_metadata")]
    pub metadata: serde_json::Value,
    pub permissions: String,
    pub owner_uid: u32,
    pub group_gid: u32,
    pub size: u64,
    pub created_at: Timestamp,
    pub modified_at: Timestamp,
    pub accessed_at: Timestamp,
    pub parent: Option<CanonicalPath>,
}

fn empty_metadata() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl NodeRecord {
    /// Flatten a node (without its children) into a record
    pub fn from_node(owner: &str, path: &CanonicalPath, node: &Node) -> Self {
        NodeRecord {
            owner: owner.to_string(),
            path: path.clone(),
            name: path.name().to_string(),
            kind: node.kind(),
            content: node.content().unwrap_or_default().to_string(),
            metadata: node.attrs.metadata.clone(),
            permissions: node.attrs.permissions.clone(),
            owner_uid: node.attrs.uid,
            group_gid: node.attrs.gid,
            size: node.size(),
            created_at: node.created_at,
            modified_at: node.modified_at,
            accessed_at: node.modified_at,
            parent: path.parent(),
        }
    }

    /// Rebuild the node for this record; directories come back empty
    pub fn to_node(&self) -> Node {
        let body = match self.kind {
            NodeKind::File => NodeBody::File {
                content: self.content.clone(),
            },
            NodeKind::Symlink => NodeBody::Symlink {
                target: self.content.clone(),
            },
            NodeKind::Directory => NodeBody::Directory {
                children: Default::default(),
            },
        };
        Node {
            name: self.path.name().to_string(),
            body,
            attrs: NodeAttrs {
                permissions: self.permissions.clone(),
                uid: self.owner_uid,
                gid: self.group_gid,
                metadata: self.metadata.clone(),
            },
            created_at: self.created_at,
            modified_at: self.modified_at,
        }
    }
}

/// One change applied to a store as part of a batch
#[derive(Debug, Clone, PartialEq)]
pub enum RecordChange {
    /// Insert or replace the record at its path
    Upsert(NodeRecord),
    /// Remove the record at the path and every record below it
    RemoveSubtree(CanonicalPath),
}

impl RecordChange {
    pub fn path(&self) -> &CanonicalPath {
        match self {
            RecordChange::Upsert(record) => &record.path,
            RecordChange::RemoveSubtree(path) => path,
        }
    }
}

/// Notification that something under an owner changed.
///
/// Carries no authoritative diff: consumers re-fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub owner: String,
    pub path: CanonicalPath,
}

/// Blocking stream of change notifications
pub trait ChangeFeed: Send {
    /// Wait up to `timeout` for the next event
    fn next_timeout(&mut self, timeout: Duration) -> Option<ChangeEvent>;
}

/// NodeRecord Store interface
///
/// Implementations partition records by owner; paths are unique per owner.
/// `apply` must commit all changes of a batch or none of them.
pub trait NodeStore: Send + Sync {
    /// Backend name for logs and status output
    fn name(&self) -> &'static str;

    /// All records of `owner`, ordered by path
    fn load_all(&self, owner: &str) -> Result<Vec<NodeRecord>, StorageError>;

    /// Records at `path` and below, ordered by path
    fn load_subtree(
        &self,
        owner: &str,
        path: &CanonicalPath,
    ) -> Result<Vec<NodeRecord>, StorageError>;

    /// Atomically apply a batch of changes
    fn apply(&self, owner: &str, changes: &[RecordChange]) -> Result<(), StorageError>;

    /// Update the advisory access time of a record
    fn touch_accessed(
        &self,
        owner: &str,
        path: &CanonicalPath,
        at: Timestamp,
    ) -> Result<(), StorageError>;

    /// Subscribe to change notifications for `owner`
    fn subscribe(&self, owner: &str) -> Result<Box<dyn ChangeFeed>, StorageError>;

    /// Flush buffered writes to durable storage
    fn flush(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
