//! Editor tabs working alongside a terminal on one filesystem

use deskfs::editor::Editor;
use deskfs::terminal::Shell;
use deskfs::FsHandle;

#[test]
fn edit_save_and_read_back_from_terminal() {
    let fs = FsHandle::in_memory("user").unwrap();
    let mut editor = Editor::new(fs.clone());
    let mut shell = Shell::new(fs.clone());

    let buffer = editor.open("src/main.js").unwrap();
    assert_eq!(buffer.language, "javascript");
    assert_eq!(buffer.path.as_str(), "/home/user/src/main.js");

    editor.edit("src/main.js", "console.log('edited')").unwrap();
    assert!(editor.has_unsaved_changes());
    assert_ne!(shell.execute("cat src/main.js"), "console.log('edited')");

    editor.save("src/main.js").unwrap();
    assert!(!editor.has_unsaved_changes());
    assert_eq!(shell.execute("cat src/main.js"), "console.log('edited')");
}

#[test]
fn reload_follows_terminal_writes_for_clean_buffers() {
    let fs = FsHandle::in_memory("user").unwrap();
    let mut editor = Editor::new(fs.clone());
    let mut shell = Shell::new(fs);

    editor.open("README.md").unwrap();
    editor.open("project.txt").unwrap();
    editor.edit("project.txt", "local draft").unwrap();

    shell.execute("echo fresh > README.md");
    shell.execute("echo remote > project.txt");

    assert!(editor.reload("README.md", false).unwrap());
    assert_eq!(editor.buffer("README.md").unwrap().content(), "fresh");

    // Dirty buffers win unless forced
    assert!(!editor.reload("project.txt", false).unwrap());
    assert_eq!(editor.buffer("project.txt").unwrap().content(), "local draft");
    assert!(editor.reload("project.txt", true).unwrap());
    assert_eq!(editor.buffer("project.txt").unwrap().content(), "remote");
    assert!(!editor.has_unsaved_changes());
}

#[test]
fn auto_save_and_save_all() {
    let fs = FsHandle::in_memory("user").unwrap();

    let mut auto = Editor::new(fs.clone()).with_auto_save(true);
    auto.open("/home/user/README.md").unwrap();
    auto.edit("/home/user/README.md", "# saved on edit").unwrap();
    assert!(!auto.has_unsaved_changes());
    assert_eq!(
        fs.read(|fs| fs.read_file("/home/user/README.md")).unwrap(),
        "# saved on edit"
    );

    let mut manual = Editor::new(fs.clone());
    manual.open("src/main.js").unwrap();
    manual.open("src/utils.js").unwrap();
    manual.edit("src/main.js", "a").unwrap();
    manual.edit("src/utils.js", "b").unwrap();
    assert_eq!(manual.save_all().unwrap(), 2);
    assert_eq!(manual.save_all().unwrap(), 0);
    assert_eq!(fs.read(|fs| fs.read_file("/home/user/src/utils.js")).unwrap(), "b");
}

#[test]
fn saving_a_deleted_file_recreates_it() {
    let fs = FsHandle::in_memory("user").unwrap();
    let mut editor = Editor::new(fs.clone());
    editor.open("src/utils.js").unwrap();

    fs.write(|fs| fs.delete_node("/home/user/src/utils.js")).unwrap();
    assert!(editor.reload("src/utils.js", false).unwrap_err().is_not_found());

    editor.edit("src/utils.js", "restored").unwrap();
    editor.save("src/utils.js").unwrap();
    assert_eq!(
        fs.read(|fs| fs.read_file("/home/user/src/utils.js")).unwrap(),
        "restored"
    );
}

#[test]
fn opening_a_directory_fails_without_a_tab() {
    let fs = FsHandle::in_memory("user").unwrap();
    let mut editor = Editor::new(fs);
    assert!(editor.open("Documents").is_err());
    assert!(editor.open("missing.txt").unwrap_err().is_not_found());
    assert!(editor.tabs().is_empty());
    assert!(editor.active().is_none());
}
