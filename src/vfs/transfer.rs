//! Move and copy

use super::{sorted_children, FileSystem};
use crate::error::VfsError;
use crate::path::CanonicalPath;
use crate::store::RecordChange;
use crate::tree::node::Node;
use crate::tree::snapshot::Snapshot;
use crate::types::now;
use std::sync::Arc;
use tracing::debug;

impl FileSystem {
    /// Relocate a node (and its subtree) to a new path.
    ///
    /// The destination parent must be an existing directory, the destination
    /// must be free, and a directory cannot be moved into itself.
    pub fn move_item(&mut self, source: &str, dest: &str) -> Result<Snapshot, VfsError> {
        let source = CanonicalPath::parse(source)?;
        let dest = CanonicalPath::parse(dest)?;
        let source_parent = source.parent().ok_or(VfsError::RootImmutable)?;
        let node = self.snapshot.resolve(&source)?.clone();

        if dest.starts_with(&source) {
            return Err(VfsError::invalid_path(
                dest.as_str(),
                format!("cannot move {} into itself", source),
            ));
        }
        let dest_parent = dest
            .parent()
            .ok_or_else(|| VfsError::AlreadyExists(dest.to_string()))?;
        self.snapshot.resolve_dir(&dest_parent)?;
        if self.snapshot.get(&dest).is_some() {
            return Err(VfsError::AlreadyExists(dest.to_string()));
        }

        let at = now();
        let mut moved = node.renamed(dest.name());
        moved.modified_at = at;

        let next = self
            .snapshot
            .without_child(&source_parent, source.name(), at)?
            .with_child(&dest_parent, Arc::new(moved), at)?;

        let mut changes = vec![RecordChange::RemoveSubtree(source.clone())];
        changes.extend(self.subtree_records(&next, &dest));
        changes.extend(self.dir_record(&next, &source_parent));
        if dest_parent != source_parent {
            changes.extend(self.dir_record(&next, &dest_parent));
        }

        debug!(from = %source, to = %dest, "Moved node");
        let mut affected = vec![source_parent];
        if !affected.contains(&dest_parent) {
            affected.push(dest_parent);
        }
        self.commit(next, changes, &affected)
    }

    /// Copy a file, or a directory recursively, to a new path.
    ///
    /// The destination is created the way `create_file` and
    /// `create_directory` create nodes, replacing whatever is there.
    /// Directory copies create the destination first and then copy each
    /// entry in listing order, committing as they go. The first failing
    /// entry aborts the copy; entries already copied stay in place.
    /// The destination may not be the source, lie inside it, or contain it.
    pub fn copy_item(&mut self, source: &str, dest: &str) -> Result<Snapshot, VfsError> {
        let source = CanonicalPath::parse(source)?;
        let dest = CanonicalPath::parse(dest)?;
        let node = self.snapshot.resolve(&source)?.clone();

        if dest.starts_with(&source) {
            return Err(VfsError::invalid_path(
                dest.as_str(),
                format!("cannot copy {} into itself", source),
            ));
        }
        // Replacing an ancestor would drop the source with it
        if source.starts_with(&dest) {
            return Err(VfsError::invalid_path(
                dest.as_str(),
                format!("cannot copy {} over its ancestor", source),
            ));
        }

        debug!(from = %source, to = %dest, "Copying node");
        self.copy_node(&node, &dest)
    }

    fn copy_node(&mut self, source: &Arc<Node>, dest: &CanonicalPath) -> Result<Snapshot, VfsError> {
        let at = now();
        let mut copy = Node::clone(source);
        copy.name = dest.name().to_string();
        copy.created_at = at;
        copy.modified_at = at;

        if let Some(children) = copy.children_mut() {
            children.clear();
        }

        let mut last = self.place(dest, copy, at)?;
        for child in sorted_children(source) {
            last = self.copy_node(child, &dest.join(&child.name))?;
        }
        Ok(last)
    }
}
