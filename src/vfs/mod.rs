//! Virtual filesystem engine
//!
//! `FileSystem` owns the current snapshot of one user's tree and funnels every
//! mutation through a single commit path: build the next snapshot, mirror the
//! affected records into the store, and only then publish the snapshot. A
//! failed store write leaves the previous snapshot in place.
//!
//! Expected failures (missing paths, wrong node kinds, occupied targets) are
//! returned as `VfsError` values; nothing here panics on user input.

mod sync;
mod transfer;

use crate::error::VfsError;
use crate::path::CanonicalPath;
use crate::store::{MemoryNodeStore, NodeRecord, NodeStore, RecordChange};
use crate::tree::node::{Node, NodeBody};
use crate::tree::snapshot::Snapshot;
use crate::types::{now, NodeKind, Timestamp};
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, warn};

/// Engine behaviour switches
#[derive(Debug, Clone, Default)]
pub struct VfsOptions {
    /// Re-fetch the affected subtree from the store after every committed write
    pub refetch_after_write: bool,
}

/// One row of a directory listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirEntry {
    pub name: String,
    pub kind: NodeKind,
    pub size: u64,
    pub permissions: String,
    pub modified_at: Timestamp,
}

impl DirEntry {
    fn from_node(node: &Node) -> Self {
        DirEntry {
            name: node.name.clone(),
            kind: node.kind(),
            size: node.size(),
            permissions: node.attrs.permissions.clone(),
            modified_at: node.modified_at,
        }
    }
}

/// Listing order: directories first, then by name
fn listing_order(a: &Node, b: &Node) -> Ordering {
    match (a.is_directory(), b.is_directory()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.name.cmp(&b.name),
    }
}

/// Children of a directory node in listing order
pub(crate) fn sorted_children(node: &Node) -> Vec<&Arc<Node>> {
    let mut children: Vec<&Arc<Node>> = node
        .children()
        .map(|c| c.values().collect())
        .unwrap_or_default();
    children.sort_by(|a, b| listing_order(a, b));
    children
}

/// Filesystem engine for a single owner
pub struct FileSystem {
    owner: String,
    snapshot: Snapshot,
    store: Arc<dyn NodeStore>,
    options: VfsOptions,
}

impl FileSystem {
    /// Ephemeral filesystem for `owner`, seeded with the default tree
    pub fn in_memory(owner: &str) -> Result<Self, VfsError> {
        Self::open(owner, Arc::new(MemoryNodeStore::new()), VfsOptions::default())
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Current snapshot. Cheap to clone and never affected by later writes.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.clone()
    }

    pub fn store(&self) -> &Arc<dyn NodeStore> {
        &self.store
    }

    pub fn options(&self) -> &VfsOptions {
        &self.options
    }

    /// Home directory of the owner
    pub fn home(&self) -> CanonicalPath {
        CanonicalPath::root().join("home").join(&self.owner)
    }

    // --- Queries ---

    /// Resolve a raw path to its node
    pub fn get_node(&self, path: &str) -> Result<Arc<Node>, VfsError> {
        let path = CanonicalPath::parse(path)?;
        self.snapshot.resolve(&path).cloned()
    }

    pub fn exists(&self, path: &str) -> bool {
        self.get_node(path).is_ok()
    }

    pub fn is_directory(&self, path: &str) -> bool {
        self.get_node(path).map(|n| n.is_directory()).unwrap_or(false)
    }

    pub fn is_file(&self, path: &str) -> bool {
        self.get_node(path).map(|n| n.is_file()).unwrap_or(false)
    }

    pub fn is_symlink(&self, path: &str) -> bool {
        self.get_node(path)
            .map(|n| n.kind() == NodeKind::Symlink)
            .unwrap_or(false)
    }

    /// Child names of a directory, directories first then by name
    pub fn list_directory(&self, path: &str) -> Result<Vec<String>, VfsError> {
        Ok(self
            .list_entries(path)?
            .into_iter()
            .map(|entry| entry.name)
            .collect())
    }

    /// Child entries of a directory, directories first then by name
    pub fn list_entries(&self, path: &str) -> Result<Vec<DirEntry>, VfsError> {
        let path = CanonicalPath::parse(path)?;
        let dir = self.snapshot.resolve_dir(&path)?;
        Ok(sorted_children(dir)
            .into_iter()
            .map(|child| DirEntry::from_node(child))
            .collect())
    }

    /// Text content of a file (or the stored target of a symlink).
    ///
    /// Records the access time in the store on a best-effort basis.
    pub fn read_file(&self, path: &str) -> Result<String, VfsError> {
        let path = CanonicalPath::parse(path)?;
        let node = self.snapshot.resolve(&path)?;
        let content = node
            .content()
            .ok_or_else(|| VfsError::wrong_kind(path.as_str(), NodeKind::File, node.kind()))?
            .to_string();

        if let Err(e) = self.store.touch_accessed(&self.owner, &path, now()) {
            warn!(owner = %self.owner, path = %path, error = %e, "Failed to record access time");
        }
        Ok(content)
    }

    // --- Mutations ---

    /// Create a file, replacing any node already at `path`. The parent must
    /// be an existing directory.
    pub fn create_file(&mut self, path: &str, content: &str) -> Result<Snapshot, VfsError> {
        let path = CanonicalPath::parse(path)?;
        let at = now();
        let node = Node::file_at(path.name(), content, at);
        self.place(&path, node, at)
    }

    /// Replace the content of an existing file
    pub fn update_file(&mut self, path: &str, content: &str) -> Result<Snapshot, VfsError> {
        let path = CanonicalPath::parse(path)?;
        let existing = self.snapshot.resolve(&path)?;
        if !existing.is_file() {
            return Err(VfsError::wrong_kind(
                path.as_str(),
                NodeKind::File,
                existing.kind(),
            ));
        }

        let mut updated = Node::clone(existing);
        updated.body = NodeBody::File {
            content: content.to_string(),
        };
        updated.modified_at = now();

        let changes = vec![RecordChange::Upsert(NodeRecord::from_node(
            &self.owner,
            &path,
            &updated,
        ))];
        let next = self.snapshot.with_subtree(&path, updated)?;
        debug!(path = %path, bytes = content.len(), "Updated file");
        self.commit(next, changes, &[path])
    }

    /// Create the file if it is missing, otherwise replace its content
    pub fn write_file(&mut self, path: &str, content: &str) -> Result<Snapshot, VfsError> {
        match self.get_node(path) {
            Ok(_) => self.update_file(path, content),
            Err(VfsError::NotFound(_)) => self.create_file(path, content),
            Err(e) => Err(e),
        }
    }

    /// Create an empty directory, replacing any node already at `path`.
    /// The parent must be an existing directory.
    pub fn create_directory(&mut self, path: &str) -> Result<Snapshot, VfsError> {
        let path = CanonicalPath::parse(path)?;
        let at = now();
        let node = Node::directory_at(path.name(), at);
        self.place(&path, node, at)
    }

    /// Create a directory and any missing ancestors in one commit.
    ///
    /// Succeeds without change if the directory already exists.
    pub fn create_dir_all(&mut self, path: &str) -> Result<Snapshot, VfsError> {
        let path = CanonicalPath::parse(path)?;
        let segments: Vec<&str> = path.segments().collect();

        let mut existing = CanonicalPath::root();
        let mut depth = 0;
        while let Some(segment) = segments.get(depth) {
            let candidate = existing.join(segment);
            match self.snapshot.get(&candidate) {
                Some(node) if node.is_directory() => {
                    existing = candidate;
                    depth += 1;
                }
                Some(node) => {
                    return Err(VfsError::wrong_kind(
                        candidate.as_str(),
                        NodeKind::Directory,
                        node.kind(),
                    ))
                }
                None => break,
            }
        }
        if depth == segments.len() {
            return Ok(self.snapshot.clone());
        }

        let at = now();
        let missing = &segments[depth..];
        let mut chain = Node::directory_at(missing[missing.len() - 1], at);
        for segment in missing[..missing.len() - 1].iter().rev() {
            chain = Node::directory_at(*segment, at).with_child(chain);
        }
        let top = existing.join(missing[0]);
        self.insert_node(&existing, &top, chain, at)
    }

    /// Remove a file or a directory with everything below it
    pub fn delete_node(&mut self, path: &str) -> Result<Snapshot, VfsError> {
        let path = CanonicalPath::parse(path)?;
        let parent = path.parent().ok_or(VfsError::RootImmutable)?;
        self.snapshot.resolve(&path)?;

        let at = now();
        let next = self.snapshot.without_child(&parent, path.name(), at)?;
        let mut changes = vec![RecordChange::RemoveSubtree(path.clone())];
        changes.extend(self.dir_record(&next, &parent));
        debug!(path = %path, "Deleted node");
        self.commit(next, changes, &[parent])
    }

    // --- Commit plumbing ---

    /// Insert `node` at `path`, replacing whatever occupies it.
    /// The parent must be an existing directory.
    fn place(&mut self, path: &CanonicalPath, node: Node, at: Timestamp) -> Result<Snapshot, VfsError> {
        let parent = path.parent().ok_or(VfsError::RootImmutable)?;
        self.snapshot.resolve_dir(&parent)?;
        self.insert_node(&parent, path, node, at)
    }

    fn insert_node(
        &mut self,
        parent: &CanonicalPath,
        path: &CanonicalPath,
        node: Node,
        at: Timestamp,
    ) -> Result<Snapshot, VfsError> {
        let kind = node.kind();
        let mut changes = Vec::new();
        if self.snapshot.get(path).is_some() {
            debug!(path = %path, "Replacing existing node");
            changes.push(RecordChange::RemoveSubtree(path.clone()));
        }
        let next = self.snapshot.with_child(parent, Arc::new(node), at)?;
        changes.extend(self.subtree_records(&next, path));
        changes.extend(self.dir_record(&next, parent));
        debug!(path = %path, kind = %kind, "Created node");
        self.commit(next, changes, &[parent.clone()])
    }

    /// Upserts for every node at and below `path` in `snapshot`
    fn subtree_records(&self, snapshot: &Snapshot, path: &CanonicalPath) -> Vec<RecordChange> {
        snapshot
            .walk(path)
            .into_iter()
            .map(|(p, node)| RecordChange::Upsert(NodeRecord::from_node(&self.owner, &p, &node)))
            .collect()
    }

    /// Upsert for a single directory whose timestamps changed
    fn dir_record(&self, snapshot: &Snapshot, dir: &CanonicalPath) -> Option<RecordChange> {
        snapshot
            .get(dir)
            .map(|node| RecordChange::Upsert(NodeRecord::from_node(&self.owner, dir, node)))
    }

    /// Mirror `changes` into the store, then publish `next`.
    fn commit(
        &mut self,
        next: Snapshot,
        changes: Vec<RecordChange>,
        affected: &[CanonicalPath],
    ) -> Result<Snapshot, VfsError> {
        if let Err(e) = self.store.apply(&self.owner, &changes) {
            warn!(
                owner = %self.owner,
                store = self.store.name(),
                error = %e,
                "Store write failed, keeping previous snapshot"
            );
            return Err(e.into());
        }
        self.snapshot = next;

        // Already persisted: a refetch failure must not report the write as failed
        if self.options.refetch_after_write {
            for path in affected {
                if let Err(e) = self.refetch(path) {
                    warn!(owner = %self.owner, path = %path, error = %e, "Refetch after write failed");
                }
            }
        }
        Ok(self.snapshot.clone())
    }
}
