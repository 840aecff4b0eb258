//! Engine behaviour against real and failing stores

use deskfs::store::{MemoryNodeStore, NodeStore, SledNodeStore};
use deskfs::{FileSystem, VfsOptions};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn sled_tree_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("fs.sled");

    let digest = {
        let store = Arc::new(SledNodeStore::open(&db_path).unwrap());
        let mut fs = FileSystem::open("user", store.clone(), VfsOptions::default()).unwrap();
        fs.create_directory("/home/user/notes").unwrap();
        fs.create_file("/home/user/notes/today.md", "- ship it").unwrap();
        fs.delete_node("/home/user/project.txt").unwrap();
        store.flush().unwrap();
        fs.snapshot().digest()
    };

    let store = Arc::new(SledNodeStore::open(&db_path).unwrap());
    let fs = FileSystem::open("user", store, VfsOptions::default()).unwrap();
    assert_eq!(
        fs.read_file("/home/user/notes/today.md").unwrap(),
        "- ship it"
    );
    assert!(!fs.exists("/home/user/project.txt"));
    assert_eq!(fs.snapshot().digest(), digest);
}

#[test]
fn owners_are_isolated_in_one_store() {
    let store: Arc<dyn NodeStore> = Arc::new(SledNodeStore::temporary().unwrap());
    let mut amy = FileSystem::open("amy", store.clone(), VfsOptions::default()).unwrap();
    let bob = FileSystem::open("bob", store, VfsOptions::default()).unwrap();

    amy.create_file("/home/amy/secret.txt", "s").unwrap();
    assert!(amy.exists("/home/amy/secret.txt"));
    assert!(!bob.exists("/home/amy"));
    assert!(bob.is_directory("/home/bob"));
}

#[test]
fn two_engines_converge_on_last_write() {
    let store: Arc<dyn NodeStore> = Arc::new(MemoryNodeStore::new());
    let mut first = FileSystem::open("user", store.clone(), VfsOptions::default()).unwrap();
    let mut second = FileSystem::open("user", store, VfsOptions::default()).unwrap();

    first.write_file("/home/user/shared.txt", "first").unwrap();
    second.write_file("/home/user/shared.txt", "second").unwrap();

    // Without a refresh the first engine still serves its own view
    assert_eq!(first.read_file("/home/user/shared.txt").unwrap(), "first");

    first.refresh().unwrap();
    assert_eq!(first.read_file("/home/user/shared.txt").unwrap(), "second");
    assert_eq!(first.snapshot().digest(), second.snapshot().digest());
}

#[test]
fn refetch_after_write_picks_up_concurrent_edits() {
    let store: Arc<dyn NodeStore> = Arc::new(MemoryNodeStore::new());
    let options = VfsOptions {
        refetch_after_write: true,
    };
    let mut first = FileSystem::open("user", store.clone(), options).unwrap();
    let mut second = FileSystem::open("user", store, VfsOptions::default()).unwrap();

    second
        .create_file("/home/user/Desktop/from-second.txt", "hi")
        .unwrap();
    first
        .create_file("/home/user/Desktop/from-first.txt", "yo")
        .unwrap();

    // The refetch of /home/user/Desktop brought in the other engine's file
    assert_eq!(
        first.list_directory("/home/user/Desktop").unwrap(),
        vec!["from-first.txt", "from-second.txt"]
    );
}

#[test]
fn offline_store_rejects_writes_and_keeps_snapshot() {
    let store = Arc::new(MemoryNodeStore::new());
    let mut fs = FileSystem::open("user", store.clone(), VfsOptions::default()).unwrap();
    let before = fs.snapshot();

    store.set_offline(true);
    let err = fs.create_file("/home/user/lost.txt", "x").unwrap_err();
    assert!(err.is_storage());
    assert!(!fs.exists("/home/user/lost.txt"));
    assert!(fs.snapshot().same_root(&before));

    // Reads keep working off the in-memory tree
    assert!(fs.read_file("/home/user/README.md").is_ok());

    store.set_offline(false);
    fs.create_file("/home/user/kept.txt", "y").unwrap();
    assert_eq!(fs.read_file("/home/user/kept.txt").unwrap(), "y");
}

#[test]
fn sled_notifications_drive_refresh() {
    let store: Arc<dyn NodeStore> = Arc::new(SledNodeStore::temporary().unwrap());
    let mut watcher = FileSystem::open("user", store.clone(), VfsOptions::default()).unwrap();
    let mut writer = FileSystem::open("user", store, VfsOptions::default()).unwrap();
    let mut feed = watcher.subscribe().unwrap();

    assert!(!watcher
        .poll_changes(feed.as_mut(), Duration::from_millis(10))
        .unwrap());

    writer
        .create_file("/home/user/Music/playlist.m3u", "#EXTM3U")
        .unwrap();

    assert!(watcher
        .poll_changes(feed.as_mut(), Duration::from_secs(2))
        .unwrap());
    assert_eq!(
        watcher.read_file("/home/user/Music/playlist.m3u").unwrap(),
        "#EXTM3U"
    );
}
