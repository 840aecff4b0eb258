//! deskfs: Virtual Filesystem for a Desktop Simulator
//!
//! A path-addressed tree of files and directories held as immutable
//! snapshots, mirrored into a pluggable record store, and consumed by a
//! terminal interpreter and an editor buffer model.

pub mod config;
pub mod editor;
pub mod error;
pub mod handle;
pub mod logging;
pub mod path;
pub mod store;
pub mod terminal;
pub mod tooling;
pub mod tree;
pub mod types;
pub mod vfs;

pub use error::{ApiError, StorageError, VfsError};
pub use handle::FsHandle;
pub use path::{normalize, CanonicalPath};
pub use tree::{Node, Snapshot};
pub use types::NodeKind;
pub use vfs::{DirEntry, FileSystem, VfsOptions};
