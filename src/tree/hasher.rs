//! Hash computation for filesystem nodes
//!
//! A node's digest covers its kind, name, content and (for directories) the
//! digests of its children in name order. Attributes and timestamps are not
//! hashed, so two trees with the same shape and text compare equal.

use crate::tree::node::{Node, NodeBody};
use crate::types::Digest;

/// Compute the digest of a node and its subtree
pub fn compute_node_digest(node: &Node) -> Digest {
    let mut hasher = blake3::Hasher::new();
    hasher.update(node.kind().as_str().as_bytes());
    hasher.update(&[0]);
    hasher.update(node.name.as_bytes());
    hasher.update(&[0]);

    match &node.body {
        NodeBody::File { content } | NodeBody::Symlink { target: content } => {
            hasher.update(&(content.len() as u64).to_le_bytes());
            hasher.update(content.as_bytes());
        }
        NodeBody::Directory { children } => {
            hasher.update(&(children.len() as u64).to_le_bytes());
            // BTreeMap iteration is already name-ordered
            for child in children.values() {
                hasher.update(&compute_node_digest(child));
            }
        }
    }

    *hasher.finalize().as_bytes()
}
