//! In-memory record store.
//!
//! Used for ephemeral sessions and tests. All data is lost when dropped.

use crate::error::StorageError;
use crate::path::CanonicalPath;
use crate::store::{ChangeEvent, ChangeFeed, NodeRecord, NodeStore, RecordChange};
use crate::types::Timestamp;
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::time::Duration;

type OwnerRecords = BTreeMap<CanonicalPath, NodeRecord>;

/// In-memory store keyed by owner, then path
#[derive(Default)]
pub struct MemoryNodeStore {
    records: RwLock<HashMap<String, OwnerRecords>>,
    subscribers: Mutex<Vec<(String, mpsc::Sender<ChangeEvent>)>>,
    offline: AtomicBool,
}

impl MemoryNodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a backend outage: writes fail with `Unavailable` while set
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of records held for `owner`
    pub fn record_count(&self, owner: &str) -> usize {
        self.records.read().get(owner).map(|r| r.len()).unwrap_or(0)
    }

    fn check_online(&self) -> Result<(), StorageError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(
                "memory store is offline".to_string(),
            ));
        }
        Ok(())
    }

    fn notify(&self, owner: &str, paths: impl IntoIterator<Item = CanonicalPath>) {
        let mut subscribers = self.subscribers.lock();
        for path in paths {
            subscribers.retain(|(subscribed, tx)| {
                if subscribed != owner {
                    return true;
                }
                tx.send(ChangeEvent {
                    owner: owner.to_string(),
                    path: path.clone(),
                })
                .is_ok()
            });
        }
    }
}

struct MemoryFeed {
    rx: mpsc::Receiver<ChangeEvent>,
}

impl ChangeFeed for MemoryFeed {
    fn next_timeout(&mut self, timeout: Duration) -> Option<ChangeEvent> {
        self.rx.recv_timeout(timeout).ok()
    }
}

impl NodeStore for MemoryNodeStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn load_all(&self, owner: &str) -> Result<Vec<NodeRecord>, StorageError> {
        self.check_online()?;
        let records = self.records.read();
        Ok(records
            .get(owner)
            .map(|r| r.values().cloned().collect())
            .unwrap_or_default())
    }

    fn load_subtree(
        &self,
        owner: &str,
        path: &CanonicalPath,
    ) -> Result<Vec<NodeRecord>, StorageError> {
        self.check_online()?;
        let records = self.records.read();
        Ok(records
            .get(owner)
            .map(|r| {
                r.values()
                    .filter(|record| record.path.starts_with(path))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn apply(&self, owner: &str, changes: &[RecordChange]) -> Result<(), StorageError> {
        self.check_online()?;
        {
            let mut records = self.records.write();
            let owned = records.entry(owner.to_string()).or_default();
            for change in changes {
                match change {
                    RecordChange::Upsert(record) => {
                        owned.insert(record.path.clone(), record.clone());
                    }
                    RecordChange::RemoveSubtree(path) => {
                        owned.retain(|key, _| !key.starts_with(path));
                    }
                }
            }
        }
        self.notify(owner, changes.iter().map(|c| c.path().clone()));
        Ok(())
    }

    fn touch_accessed(
        &self,
        owner: &str,
        path: &CanonicalPath,
        at: Timestamp,
    ) -> Result<(), StorageError> {
        self.check_online()?;
        let mut records = self.records.write();
        if let Some(record) = records.get_mut(owner).and_then(|r| r.get_mut(path)) {
            record.accessed_at = at;
        }
        Ok(())
    }

    fn subscribe(&self, owner: &str) -> Result<Box<dyn ChangeFeed>, StorageError> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.lock().push((owner.to_string(), tx));
        Ok(Box::new(MemoryFeed { rx }))
    }
}
