//! Shared access to a filesystem engine
//!
//! Terminal sessions and editor buffers opened by one user all work on the
//! same engine. Reads take a shared lock and only clone the current snapshot,
//! so a long-running reader never blocks on tree traversal; writes are
//! serialized behind the write lock.

use crate::error::VfsError;
use crate::tree::snapshot::Snapshot;
use crate::vfs::FileSystem;
use parking_lot::RwLock;
use std::sync::Arc;

/// Clonable handle to a single `FileSystem`
#[derive(Clone)]
pub struct FsHandle {
    inner: Arc<RwLock<FileSystem>>,
}

impl FsHandle {
    pub fn new(fs: FileSystem) -> Self {
        Self {
            inner: Arc::new(RwLock::new(fs)),
        }
    }

    /// Ephemeral in-memory filesystem for `owner`
    pub fn in_memory(owner: &str) -> Result<Self, VfsError> {
        Ok(Self::new(FileSystem::in_memory(owner)?))
    }

    /// Current snapshot, detached from later writes
    pub fn snapshot(&self) -> Snapshot {
        self.inner.read().snapshot()
    }

    pub fn owner(&self) -> String {
        self.inner.read().owner().to_string()
    }

    /// Run `f` with shared access
    pub fn read<R>(&self, f: impl FnOnce(&FileSystem) -> R) -> R {
        let guard = self.inner.read();
        f(&guard)
    }

    /// Run `f` with exclusive access
    pub fn write<R>(&self, f: impl FnOnce(&mut FileSystem) -> R) -> R {
        let mut guard = self.inner.write();
        f(&mut guard)
    }
}

impl std::fmt::Debug for FsHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsHandle")
            .field("owner", &self.owner())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_clones_share_one_engine() {
        let handle = FsHandle::in_memory("user").unwrap();
        let other = handle.clone();
        other
            .write(|fs| fs.create_file("/home/user/shared.txt", "hi"))
            .unwrap();
        assert_eq!(
            handle.read(|fs| fs.read_file("/home/user/shared.txt")).unwrap(),
            "hi"
        );
    }

    #[test]
    fn test_concurrent_writers_lose_no_updates() {
        let handle = FsHandle::in_memory("user").unwrap();

        let mut threads = vec![];
        for i in 0..8 {
            let handle = handle.clone();
            threads.push(thread::spawn(move || {
                handle
                    .write(|fs| fs.create_file(&format!("/home/user/t{}.txt", i), "x"))
                    .unwrap();
            }));
        }
        for t in threads {
            t.join().unwrap();
        }

        let names = handle.read(|fs| fs.list_directory("/home/user")).unwrap();
        for i in 0..8 {
            assert!(names.contains(&format!("t{}.txt", i)));
        }
    }

    #[test]
    fn test_snapshot_outlives_later_writes() {
        let handle = FsHandle::in_memory("user").unwrap();
        let before = handle.snapshot();
        handle
            .write(|fs| fs.delete_node("/home/user/README.md"))
            .unwrap();

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let snap = before.clone();
                thread::spawn(move || {
                    snap.get(&crate::path::CanonicalPath::parse("/home/user/README.md").unwrap())
                        .is_some()
                })
            })
            .collect();
        for r in readers {
            assert!(r.join().unwrap());
        }
        assert!(!handle.read(|fs| fs.exists("/home/user/README.md")));
    }
}
