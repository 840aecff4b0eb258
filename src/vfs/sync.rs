//! Loading, refreshing and change subscription
//!
//! The store is re-read wholesale rather than patched: a change notification
//! only means "something changed", and the affected tree is rebuilt from the
//! records. Concurrent writers to the same owner simply overwrite each other.

use super::{FileSystem, VfsOptions};
use crate::error::VfsError;
use crate::path::CanonicalPath;
use crate::store::{ChangeFeed, NodeRecord, NodeStore, RecordChange};
use crate::tree::node::Node;
use crate::tree::seed;
use crate::tree::snapshot::Snapshot;
use crate::types::now;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Upper bound on events drained by one `poll_changes` call
const MAX_DRAINED_EVENTS: usize = 4096;

impl FileSystem {
    /// Open the filesystem of `owner` from `store`.
    ///
    /// An owner with no records gets the default tree, which is written to
    /// the store before the engine is returned.
    pub fn open(
        owner: &str,
        store: Arc<dyn NodeStore>,
        options: VfsOptions,
    ) -> Result<Self, VfsError> {
        validate_owner(owner)?;
        let records = store.load_all(owner)?;

        let snapshot = if records.is_empty() {
            info!(owner, store = store.name(), "Seeding default tree");
            let seeded = seed::default_snapshot(owner, now())?;
            let changes: Vec<RecordChange> = seeded
                .walk(&CanonicalPath::root())
                .into_iter()
                .map(|(path, node)| RecordChange::Upsert(NodeRecord::from_node(owner, &path, &node)))
                .collect();
            store.apply(owner, &changes)?;
            seeded
        } else {
            let root = build_subtree(&CanonicalPath::root(), records)
                .unwrap_or_else(|| Node::directory_at("", now()));
            Snapshot::new(root)?
        };

        debug!(owner, nodes = snapshot.node_count(), "Filesystem opened");
        Ok(FileSystem {
            owner: owner.to_string(),
            snapshot,
            store,
            options,
        })
    }

    /// Rebuild the whole tree from the store
    pub fn refresh(&mut self) -> Result<Snapshot, VfsError> {
        let records = self.store.load_all(&self.owner)?;
        let root = build_subtree(&CanonicalPath::root(), records)
            .unwrap_or_else(|| Node::directory_at("", now()));
        self.snapshot = self.snapshot.with_subtree(&CanonicalPath::root(), root)?;
        debug!(owner = %self.owner, nodes = self.snapshot.node_count(), "Refreshed tree");
        Ok(self.snapshot.clone())
    }

    /// Rebuild the subtree at `path` from the store
    pub fn refresh_subtree(&mut self, path: &str) -> Result<Snapshot, VfsError> {
        let path = CanonicalPath::parse(path)?;
        self.refetch(&path)?;
        Ok(self.snapshot.clone())
    }

    pub(super) fn refetch(&mut self, path: &CanonicalPath) -> Result<(), VfsError> {
        let parent_present = path
            .parent()
            .map(|parent| self.snapshot.get(&parent).map(|n| n.is_directory()))
            .unwrap_or(Some(true));
        if path.is_root() || parent_present != Some(true) {
            self.refresh()?;
            return Ok(());
        }

        let records = self.store.load_subtree(&self.owner, path)?;
        match build_subtree(path, records) {
            Some(node) => {
                self.snapshot = self.snapshot.with_subtree(path, node)?;
            }
            // Gone from the store: fall back to a full refresh
            None => {
                self.refresh()?;
            }
        }
        Ok(())
    }

    /// Subscribe to change notifications for this owner
    pub fn subscribe(&self) -> Result<Box<dyn ChangeFeed>, VfsError> {
        Ok(self.store.subscribe(&self.owner)?)
    }

    /// Drain pending notifications, waiting up to `timeout` for the first.
    ///
    /// Refreshes once if anything arrived and reports whether it did.
    pub fn poll_changes(
        &mut self,
        feed: &mut dyn ChangeFeed,
        timeout: Duration,
    ) -> Result<bool, VfsError> {
        let mut drained = 0;
        let mut wait = timeout;
        while drained < MAX_DRAINED_EVENTS {
            match feed.next_timeout(wait) {
                Some(event) => {
                    debug!(owner = %event.owner, path = %event.path, "Change notification");
                    drained += 1;
                    wait = Duration::ZERO;
                }
                None => break,
            }
        }
        if drained == 0 {
            return Ok(false);
        }
        self.refresh()?;
        Ok(true)
    }
}

fn validate_owner(owner: &str) -> Result<(), VfsError> {
    if owner.is_empty()
        || owner == "."
        || owner == ".."
        || owner.contains('/')
        || owner.chars().any(|c| c.is_control())
    {
        return Err(VfsError::invalid_path(
            owner,
            "owner must be a single path segment",
        ));
    }
    Ok(())
}

/// Assemble the subtree rooted at `base` from flat records.
///
/// Records are attached parents first; a record whose parent is missing or is
/// not a directory is skipped. Returns `None` if no record exists for `base`
/// (the root is synthesized when missing).
fn build_subtree(base: &CanonicalPath, mut records: Vec<NodeRecord>) -> Option<Node> {
    records.sort_by(|a, b| {
        a.path
            .depth()
            .cmp(&b.path.depth())
            .then_with(|| a.path.cmp(&b.path))
    });

    let mut root: Option<Node> = None;
    if base.is_root() && !records.iter().any(|r| r.path.is_root()) {
        root = Some(Node::directory_at("", now()));
    }

    for record in records {
        if &record.path == base {
            root = Some(record.to_node());
            continue;
        }
        let Some(top) = root.as_mut() else {
            warn!(path = %record.path, "Skipping record above refreshed subtree");
            continue;
        };
        let Some(relative) = record.path.strip_prefix(base) else {
            continue;
        };
        let segments: Vec<&str> = relative.split('/').collect();
        if !attach(top, &segments, record.to_node()) {
            warn!(path = %record.path, "Skipping orphaned record");
        }
    }
    root
}

fn attach(dir: &mut Node, segments: &[&str], node: Node) -> bool {
    let Some(children) = dir.children_mut() else {
        return false;
    };
    match segments {
        [] => false,
        [_name] => {
            children.insert(node.name.clone(), Arc::new(node));
            true
        }
        [first, rest @ ..] => match children.get_mut(*first) {
            Some(child) => attach(Arc::make_mut(child), rest, node),
            None => false,
        },
    }
}
