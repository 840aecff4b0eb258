//! Filesystem tree
//!
//! Immutable nodes behind `Arc`, snapshots with structural sharing, digests
//! for cheap comparison and the default tree a new user starts with.

pub mod hasher;
pub mod node;
pub mod seed;
pub mod snapshot;

pub use node::{Children, Node, NodeAttrs, NodeBody};
pub use snapshot::{ChangeKind, Snapshot, TreeChange};
