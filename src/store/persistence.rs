//! Sled-backed record store
//!
//! One sled tree per owner (`fs:<owner>`), keyed by canonical path bytes with
//! JSON-encoded `NodeRecord` values. Because keys are canonical paths, a
//! subtree is a prefix scan filtered on segment boundaries.

use crate::error::StorageError;
use crate::path::CanonicalPath;
use crate::store::{ChangeEvent, ChangeFeed, NodeRecord, NodeStore, RecordChange};
use crate::types::Timestamp;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Persistent record store on top of sled
pub struct SledNodeStore {
    db: sled::Db,
}

impl SledNodeStore {
    /// Open (or create) a store at `path`
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let db = sled::open(path)?;
        debug!(path = %path.display(), "Opened sled node store");
        Ok(Self { db })
    }

    /// Store backed by a temporary directory, removed on drop
    pub fn temporary() -> Result<Self, StorageError> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    fn tree(&self, owner: &str) -> Result<sled::Tree, StorageError> {
        Ok(self.db.open_tree(format!("fs:{}", owner))?)
    }

    fn decode(value: &[u8]) -> Result<NodeRecord, StorageError> {
        Ok(serde_json::from_slice(value)?)
    }

    fn scan_subtree(
        tree: &sled::Tree,
        path: &CanonicalPath,
    ) -> Result<Vec<(sled::IVec, NodeRecord)>, StorageError> {
        let prefix = if path.is_root() { "" } else { path.as_str() };
        let mut out = Vec::new();
        for item in tree.scan_prefix(prefix.as_bytes()) {
            let (key, value) = item?;
            let record = Self::decode(&value)?;
            if record.path.starts_with(path) {
                out.push((key, record));
            }
        }
        Ok(out)
    }
}

struct SledFeed {
    owner: String,
    subscriber: sled::Subscriber,
}

impl ChangeFeed for SledFeed {
    fn next_timeout(&mut self, timeout: Duration) -> Option<ChangeEvent> {
        let event = self.subscriber.next_timeout(timeout).ok()?;
        let key = match &event {
            sled::Event::Insert { key, .. } => key,
            sled::Event::Remove { key } => key,
        };
        let path = std::str::from_utf8(key)
            .ok()
            .and_then(|raw| CanonicalPath::parse(raw).ok())
            .unwrap_or_else(CanonicalPath::root);
        Some(ChangeEvent {
            owner: self.owner.clone(),
            path,
        })
    }
}

impl NodeStore for SledNodeStore {
    fn name(&self) -> &'static str {
        "sled"
    }

    fn load_all(&self, owner: &str) -> Result<Vec<NodeRecord>, StorageError> {
        let tree = self.tree(owner)?;
        let mut records = Vec::with_capacity(tree.len());
        for item in tree.iter() {
            let (_, value) = item?;
            records.push(Self::decode(&value)?);
        }
        Ok(records)
    }

    fn load_subtree(
        &self,
        owner: &str,
        path: &CanonicalPath,
    ) -> Result<Vec<NodeRecord>, StorageError> {
        let tree = self.tree(owner)?;
        Ok(Self::scan_subtree(&tree, path)?
            .into_iter()
            .map(|(_, record)| record)
            .collect())
    }

    fn apply(&self, owner: &str, changes: &[RecordChange]) -> Result<(), StorageError> {
        let tree = self.tree(owner)?;
        let mut batch = sled::Batch::default();
        for change in changes {
            match change {
                RecordChange::Upsert(record) => {
                    batch.insert(record.path.as_str().as_bytes(), serde_json::to_vec(record)?);
                }
                RecordChange::RemoveSubtree(path) => {
                    for (key, _) in Self::scan_subtree(&tree, path)? {
                        batch.remove(key);
                    }
                }
            }
        }
        tree.apply_batch(batch)?;
        debug!(owner, changes = changes.len(), "Applied record batch");
        Ok(())
    }

    fn touch_accessed(
        &self,
        owner: &str,
        path: &CanonicalPath,
        at: Timestamp,
    ) -> Result<(), StorageError> {
        let tree = self.tree(owner)?;
        let key = path.as_str().as_bytes();
        if let Some(value) = tree.get(key)? {
            let mut record = Self::decode(&value)?;
            record.accessed_at = at;
            tree.insert(key, serde_json::to_vec(&record)?)?;
        }
        Ok(())
    }

    fn subscribe(&self, owner: &str) -> Result<Box<dyn ChangeFeed>, StorageError> {
        let tree = self.tree(owner)?;
        Ok(Box::new(SledFeed {
            owner: owner.to_string(),
            subscriber: tree.watch_prefix(Vec::<u8>::new()),
        }))
    }

    fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }
}
