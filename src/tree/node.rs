//! Filesystem node types

use crate::types::{now, NodeKind, Timestamp, DEFAULT_GID, DEFAULT_UID};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Child map of a directory: name -> shared child node
pub type Children = BTreeMap<String, Arc<Node>>;

/// Payload of a node, by kind
#[derive(Debug, Clone, PartialEq)]
pub enum NodeBody {
    File { content: String },
    Directory { children: Children },
    Symlink { target: String },
}

/// Attributes carried through persistence but never enforced
#[derive(Debug, Clone, PartialEq)]
pub struct NodeAttrs {
    pub permissions: String,
    pub uid: u32,
    pub gid: u32,
    pub metadata: serde_json::Value,
}

impl NodeAttrs {
    pub fn for_kind(kind: NodeKind) -> Self {
        Self {
            permissions: kind.default_permissions().to_string(),
            uid: DEFAULT_UID,
            gid: DEFAULT_GID,
            metadata: serde_json::Value::Object(serde_json::Map::new()),
        }
    }
}

/// A file, directory or opaque symlink in the tree
///
/// Nodes are immutable once shared behind an `Arc`; mutation always builds
/// new nodes along the changed path.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub body: NodeBody,
    pub attrs: NodeAttrs,
    pub created_at: Timestamp,
    pub modified_at: Timestamp,
}

impl Node {
    pub fn file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self::file_at(name, content, now())
    }

    pub fn file_at(name: impl Into<String>, content: impl Into<String>, at: Timestamp) -> Self {
        Node {
            name: name.into(),
            body: NodeBody::File {
                content: content.into(),
            },
            attrs: NodeAttrs::for_kind(NodeKind::File),
            created_at: at,
            modified_at: at,
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self::directory_at(name, now())
    }

    pub fn directory_at(name: impl Into<String>, at: Timestamp) -> Self {
        Node {
            name: name.into(),
            body: NodeBody::Directory {
                children: Children::new(),
            },
            attrs: NodeAttrs::for_kind(NodeKind::Directory),
            created_at: at,
            modified_at: at,
        }
    }

    pub fn symlink_at(name: impl Into<String>, target: impl Into<String>, at: Timestamp) -> Self {
        Node {
            name: name.into(),
            body: NodeBody::Symlink {
                target: target.into(),
            },
            attrs: NodeAttrs::for_kind(NodeKind::Symlink),
            created_at: at,
            modified_at: at,
        }
    }

    /// Builder-style helper for seeding directories
    pub fn with_child(mut self, child: Node) -> Self {
        if let NodeBody::Directory { children } = &mut self.body {
            children.insert(child.name.clone(), Arc::new(child));
        }
        self
    }

    pub fn kind(&self) -> NodeKind {
        match self.body {
            NodeBody::File { .. } => NodeKind::File,
            NodeBody::Directory { .. } => NodeKind::Directory,
            NodeBody::Symlink { .. } => NodeKind::Symlink,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.body, NodeBody::Directory { .. })
    }

    pub fn is_file(&self) -> bool {
        matches!(self.body, NodeBody::File { .. })
    }

    /// Text of a file-like leaf (file content or symlink target)
    pub fn content(&self) -> Option<&str> {
        match &self.body {
            NodeBody::File { content } => Some(content),
            NodeBody::Symlink { target } => Some(target),
            NodeBody::Directory { .. } => None,
        }
    }

    /// Byte length of the content; 0 for directories
    pub fn size(&self) -> u64 {
        self.content().map(|c| c.len() as u64).unwrap_or(0)
    }

    pub fn children(&self) -> Option<&Children> {
        match &self.body {
            NodeBody::Directory { children } => Some(children),
            _ => None,
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Children> {
        match &mut self.body {
            NodeBody::Directory { children } => Some(children),
            _ => None,
        }
    }

    pub fn child(&self, name: &str) -> Option<&Arc<Node>> {
        self.children().and_then(|c| c.get(name))
    }

    /// Copy of this node under another name, sharing any children
    pub fn renamed(&self, name: impl Into<String>) -> Node {
        let mut node = self.clone();
        node.name = name.into();
        node
    }
}
