//! End-to-end scenarios on the default tree

use deskfs::{CanonicalPath, FileSystem, NodeKind, VfsError};

fn path(raw: &str) -> CanonicalPath {
    CanonicalPath::parse(raw).unwrap()
}

#[test]
fn recreate_src_then_delete_it() {
    let mut fs = FileSystem::in_memory("user").unwrap();

    fs.create_directory("/home/user/src").unwrap();
    fs.create_file("/home/user/src/main.js", "console.log(1)")
        .unwrap();
    assert_eq!(fs.list_directory("/home/user/src").unwrap(), vec!["main.js"]);
    assert_eq!(
        fs.read_file("/home/user/src/main.js").unwrap(),
        "console.log(1)"
    );

    fs.delete_node("/home/user/src").unwrap();
    assert!(!fs.exists("/home/user/src"));
    assert!(!fs.exists("/home/user/src/main.js"));
}

#[test]
fn rename_a_file() {
    let mut fs = FileSystem::in_memory("user").unwrap();

    fs.create_file("/home/user/a.txt", "x").unwrap();
    fs.move_item("/home/user/a.txt", "/home/user/b.txt").unwrap();
    assert!(!fs.exists("/home/user/a.txt"));
    assert_eq!(fs.read_file("/home/user/b.txt").unwrap(), "x");
}

#[test]
fn copied_directory_matches_source_recursively() {
    let mut fs = FileSystem::in_memory("user").unwrap();
    fs.create_dir_all("/home/user/src/lib/inner").unwrap();
    fs.create_file("/home/user/src/lib/mod.js", "export {}").unwrap();
    fs.create_file("/home/user/src/lib/inner/deep.txt", "deep")
        .unwrap();

    fs.copy_item("/home/user/src", "/home/user/Documents/src-copy")
        .unwrap();

    let source = fs.snapshot().walk(&path("/home/user/src"));
    let copy = fs.snapshot().walk(&path("/home/user/Documents/src-copy"));
    assert_eq!(source.len(), copy.len());
    for ((src_path, src_node), (dst_path, dst_node)) in source.iter().zip(copy.iter()) {
        assert_eq!(
            src_path.strip_prefix(&path("/home/user/src")),
            dst_path.strip_prefix(&path("/home/user/Documents/src-copy"))
        );
        assert_eq!(src_node.kind(), dst_node.kind());
        if src_node.kind() == NodeKind::File {
            assert_eq!(src_node.content(), dst_node.content());
        }
    }
}

#[test]
fn relative_and_dotted_paths_resolve_to_canonical_nodes() {
    let mut fs = FileSystem::in_memory("user").unwrap();
    fs.create_file("home/user/./Documents/../notes.md", "# hi")
        .unwrap();
    assert_eq!(fs.read_file("/home/user/notes.md").unwrap(), "# hi");
    assert!(fs.is_directory("/../../home"));
}

#[test]
fn operations_report_failures_instead_of_silently_succeeding() {
    let mut fs = FileSystem::in_memory("user").unwrap();
    let before = fs.snapshot();

    assert!(fs.create_file("/nowhere/x", "").is_err());
    assert!(fs.create_directory("/nowhere/x").is_err());
    assert!(fs.delete_node("/nowhere").is_err());
    assert!(matches!(
        fs.update_file("/home/user/ghost.txt", "x"),
        Err(VfsError::NotFound(_))
    ));
    assert!(fs.move_item("/home/user/README.md", "/nowhere/README.md").is_err());

    assert!(fs.snapshot().same_root(&before));
    assert_eq!(fs.snapshot().digest(), before.digest());
}
