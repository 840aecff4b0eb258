//! Immutable tree snapshots
//!
//! A `Snapshot` is a shared root reference. Mutations never touch an existing
//! snapshot: they copy the directories on the path from the root down to the
//! edited directory and share every other subtree with the previous snapshot.

use crate::error::VfsError;
use crate::path::CanonicalPath;
use crate::tree::hasher::compute_node_digest;
use crate::tree::node::{Children, Node};
use crate::types::{Digest, NodeKind, Timestamp};
use std::sync::Arc;

/// Immutable root reference produced by every committed mutation
#[derive(Debug, Clone)]
pub struct Snapshot {
    root: Arc<Node>,
    generation: u64,
}

/// Kind of difference between two snapshots at one path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

/// One difference reported by `Snapshot::diff`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeChange {
    pub path: CanonicalPath,
    pub kind: ChangeKind,
}

impl Snapshot {
    /// Wrap a root node. The root must be a directory.
    pub fn new(root: Node) -> Result<Self, VfsError> {
        if !root.is_directory() {
            return Err(VfsError::wrong_kind("/", NodeKind::Directory, root.kind()));
        }
        Ok(Snapshot {
            root: Arc::new(root),
            generation: 0,
        })
    }

    pub fn root(&self) -> &Arc<Node> {
        &self.root
    }

    /// Number of mutations applied since the tree was loaded
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True if both snapshots share the same root allocation
    pub fn same_root(&self, other: &Snapshot) -> bool {
        Arc::ptr_eq(&self.root, &other.root)
    }

    /// Resolve a canonical path. Walks one child map per segment.
    pub fn get(&self, path: &CanonicalPath) -> Option<&Arc<Node>> {
        let mut current = &self.root;
        for segment in path.segments() {
            current = current.children()?.get(segment)?;
        }
        Some(current)
    }

    /// Resolve a canonical path, reporting why resolution failed
    pub fn resolve(&self, path: &CanonicalPath) -> Result<&Arc<Node>, VfsError> {
        self.get(path)
            .ok_or_else(|| VfsError::NotFound(path.to_string()))
    }

    /// Resolve a path that must be a directory
    pub fn resolve_dir(&self, path: &CanonicalPath) -> Result<&Arc<Node>, VfsError> {
        let node = self.resolve(path)?;
        if !node.is_directory() {
            return Err(VfsError::wrong_kind(
                path.as_str(),
                NodeKind::Directory,
                node.kind(),
            ));
        }
        Ok(node)
    }

    /// Digest of the whole tree
    pub fn digest(&self) -> Digest {
        compute_node_digest(&self.root)
    }

    /// Pre-order walk of the subtree at `path`, including `path` itself
    pub fn walk(&self, path: &CanonicalPath) -> Vec<(CanonicalPath, Arc<Node>)> {
        let mut out = Vec::new();
        if let Some(node) = self.get(path) {
            walk_into(path.clone(), node, &mut out);
        }
        out
    }

    /// Number of nodes in the tree, root included
    pub fn node_count(&self) -> usize {
        self.walk(&CanonicalPath::root()).len()
    }

    /// Paths that differ between `self` (old) and `newer`.
    ///
    /// Subtrees shared by pointer are skipped without descending into them.
    pub fn diff(&self, newer: &Snapshot) -> Vec<TreeChange> {
        let mut changes = Vec::new();
        diff_nodes(&CanonicalPath::root(), &self.root, &newer.root, &mut changes);
        changes
    }

    /// Apply `edit` to the child map of the directory at `dir`.
    ///
    /// Returns the new snapshot; `self` is left untouched. The edited
    /// directory gets `modified_at = at`.
    pub(crate) fn edit_dir<F>(
        &self,
        dir: &CanonicalPath,
        at: Timestamp,
        edit: F,
    ) -> Result<Snapshot, VfsError>
    where
        F: FnOnce(&mut Children) -> Result<(), VfsError>,
    {
        let segments: Vec<&str> = dir.segments().collect();
        let root = rebuild(&self.root, &segments, 0, Some(at), edit)?;
        Ok(Snapshot {
            root,
            generation: self.generation + 1,
        })
    }

    /// Insert or replace the child `node` of directory `parent`
    pub(crate) fn with_child(
        &self,
        parent: &CanonicalPath,
        node: Arc<Node>,
        at: Timestamp,
    ) -> Result<Snapshot, VfsError> {
        self.edit_dir(parent, at, |children| {
            children.insert(node.name.clone(), node);
            Ok(())
        })
    }

    /// Remove the child `name` of directory `parent`
    pub(crate) fn without_child(
        &self,
        parent: &CanonicalPath,
        name: &str,
        at: Timestamp,
    ) -> Result<Snapshot, VfsError> {
        let missing = parent.join(name);
        self.edit_dir(parent, at, |children| match children.remove(name) {
            Some(_) => Ok(()),
            None => Err(VfsError::NotFound(missing.to_string())),
        })
    }

    /// Replace the subtree at `path` wholesale (used by refresh)
    pub(crate) fn with_subtree(
        &self,
        path: &CanonicalPath,
        node: Node,
    ) -> Result<Snapshot, VfsError> {
        match path.parent() {
            None => {
                let mut next = Snapshot::new(node)?;
                next.generation = self.generation + 1;
                Ok(next)
            }
            Some(parent) => {
                let node = Arc::new(node.renamed(path.name()));
                let segments: Vec<&str> = parent.segments().collect();
                let root = rebuild(&self.root, &segments, 0, None, move |c| {
                    c.insert(node.name.clone(), node);
                    Ok(())
                })?;
                Ok(Snapshot {
                    root,
                    generation: self.generation + 1,
                })
            }
        }
    }
}

fn walk_into(path: CanonicalPath, node: &Arc<Node>, out: &mut Vec<(CanonicalPath, Arc<Node>)>) {
    out.push((path.clone(), node.clone()));
    if let Some(children) = node.children() {
        for (name, child) in children {
            walk_into(path.join(name), child, out);
        }
    }
}

/// Copy `node` and the directories below it along `segments`, applying
/// `edit` to the last one. `touch` sets the edited directory's `modified_at`.
fn rebuild<F>(
    node: &Arc<Node>,
    segments: &[&str],
    depth: usize,
    touch: Option<Timestamp>,
    edit: F,
) -> Result<Arc<Node>, VfsError>
where
    F: FnOnce(&mut Children) -> Result<(), VfsError>,
{
    let mut copy = Node::clone(node);
    let children = copy
        .children_mut()
        .ok_or_else(|| not_a_dir(segments, depth, node.kind()))?;

    match segments.get(depth) {
        None => {
            edit(children)?;
            if let Some(at) = touch {
                copy.modified_at = at;
            }
        }
        Some(segment) => {
            let child = children
                .get(*segment)
                .ok_or_else(|| VfsError::NotFound(prefix(segments, depth + 1)))?;
            let rebuilt = rebuild(child, segments, depth + 1, touch, edit)?;
            children.insert(segment.to_string(), rebuilt);
        }
    }
    Ok(Arc::new(copy))
}

fn prefix(segments: &[&str], len: usize) -> String {
    format!("/{}", segments[..len].join("/"))
}

fn not_a_dir(segments: &[&str], depth: usize, found: NodeKind) -> VfsError {
    VfsError::wrong_kind(&prefix(segments, depth), NodeKind::Directory, found)
}

fn diff_nodes(path: &CanonicalPath, old: &Arc<Node>, new: &Arc<Node>, out: &mut Vec<TreeChange>) {
    if Arc::ptr_eq(old, new) {
        return;
    }
    match (old.children(), new.children()) {
        (Some(old_children), Some(new_children)) => {
            for (name, old_child) in old_children {
                let child_path = path.join(name);
                match new_children.get(name) {
                    Some(new_child) => diff_nodes(&child_path, old_child, new_child, out),
                    None => out.push(TreeChange {
                        path: child_path,
                        kind: ChangeKind::Removed,
                    }),
                }
            }
            for name in new_children.keys() {
                if !old_children.contains_key(name) {
                    out.push(TreeChange {
                        path: path.join(name),
                        kind: ChangeKind::Added,
                    });
                }
            }
        }
        _ => {
            if old.body != new.body || old.attrs != new.attrs {
                out.push(TreeChange {
                    path: path.clone(),
                    kind: ChangeKind::Modified,
                });
            }
        }
    }
}
