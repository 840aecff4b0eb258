//! Properties every filesystem state must satisfy

use deskfs::{normalize, CanonicalPath, FileSystem, VfsError};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn fresh() -> FileSystem {
    FileSystem::in_memory("user").unwrap()
}

fn name_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_-]{1,12}".prop_filter("not a dot segment", |s| s != "." && s != "..")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn normalize_is_idempotent_over_path_like_input(raw in "(/|\\.|\\.\\.|[a-z]{1,3}){0,12}") {
        let once = normalize(&raw);
        prop_assert_eq!(normalize(&once), once.clone());
        prop_assert!(once.starts_with('/'));
        prop_assert!(once == "/" || !once.ends_with('/'));
        prop_assert!(!once.contains("//"));
    }

    #[test]
    fn created_file_reads_back(name in name_strategy(), content in any::<String>()) {
        let mut fs = fresh();
        let path = format!("/home/user/Documents/{}", name);
        fs.create_file(&path, &content).unwrap();
        prop_assert_eq!(fs.read_file(&path).unwrap(), content.clone());
        prop_assert_eq!(fs.get_node(&path).unwrap().size(), content.len() as u64);
    }

    #[test]
    fn listing_has_exactly_the_created_children(
        names in prop::collection::btree_set(name_strategy(), 0..12)
    ) {
        let mut fs = fresh();
        fs.create_directory("/tmp").unwrap();
        for (i, name) in names.iter().enumerate() {
            let path = format!("/tmp/{}", name);
            if i % 2 == 0 {
                fs.create_file(&path, "").unwrap();
            } else {
                fs.create_directory(&path).unwrap();
            }
        }
        let listed: BTreeSet<String> = fs.list_directory("/tmp").unwrap().into_iter().collect();
        prop_assert_eq!(listed, names);
    }

    #[test]
    fn deleted_node_is_gone(name in name_strategy()) {
        let mut fs = fresh();
        let path = format!("/home/user/{}-x", name);
        fs.create_file(&path, "bye").unwrap();
        fs.delete_node(&path).unwrap();
        prop_assert!(fs.read_file(&path).unwrap_err().is_not_found());
        prop_assert!(!fs.exists(&path));
    }

    #[test]
    fn copied_file_matches_source(name in name_strategy(), content in ".{0,64}") {
        let mut fs = fresh();
        let source = format!("/home/user/{}.src", name);
        let dest = format!("/home/user/Desktop/{}.dst", name);
        fs.create_file(&source, &content).unwrap();
        fs.copy_item(&source, &dest).unwrap();
        prop_assert_eq!(fs.read_file(&dest).unwrap(), content);
        prop_assert!(fs.exists(&source));
    }
}

#[test]
fn earlier_snapshot_is_unaffected_by_later_writes() {
    let mut fs = fresh();
    let before = fs.snapshot();
    let before_digest = before.digest();

    fs.create_file("/home/user/new.txt", "n").unwrap();
    fs.update_file("/home/user/README.md", "changed").unwrap();
    fs.delete_node("/home/user/src").unwrap();
    fs.move_item("/home/user/project.txt", "/home/user/Music/project.txt")
        .unwrap();

    let readme = before
        .get(&CanonicalPath::parse("/home/user/README.md").unwrap())
        .unwrap();
    assert_ne!(readme.content(), Some("changed"));
    assert!(before
        .get(&CanonicalPath::parse("/home/user/src/main.js").unwrap())
        .is_some());
    assert!(before
        .get(&CanonicalPath::parse("/home/user/new.txt").unwrap())
        .is_none());
    assert_eq!(before.digest(), before_digest);
    assert_ne!(fs.snapshot().digest(), before_digest);
}

#[test]
fn diff_lists_exactly_the_touched_paths() {
    let mut fs = fresh();
    let before = fs.snapshot();
    fs.create_file("/home/user/Desktop/todo.txt", "x").unwrap();
    let after = fs.snapshot();

    let changed: Vec<String> = before
        .diff(&after)
        .into_iter()
        .map(|c| c.path.to_string())
        .collect();
    assert!(changed.contains(&"/home/user/Desktop/todo.txt".to_string()));
    assert!(!changed.iter().any(|p| p.starts_with("/home/user/src")));
    assert!(!changed.iter().any(|p| p.starts_with("/etc")));
}

#[test]
fn lookup_is_total() {
    let fs = fresh();
    for raw in ["", "/", "///", "..", "/home/user/README.md/child", "/nope/deeper"] {
        let _ = fs.get_node(raw);
        let _ = fs.exists(raw);
    }
    assert!(matches!(
        fs.get_node("/home/\u{0}user").unwrap_err(),
        VfsError::InvalidPath { .. }
    ));
}
