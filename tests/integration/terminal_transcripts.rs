//! Terminal sessions run against a shared filesystem

use deskfs::terminal::Shell;
use deskfs::FsHandle;

fn session() -> (Shell, FsHandle) {
    let fs = FsHandle::in_memory("user").unwrap();
    (Shell::new(fs.clone()), fs)
}

#[test]
fn project_setup_transcript() {
    let (mut shell, fs) = session();

    let transcript = [
        ("pwd", "/home/user"),
        ("mkdir -p projects/site/css", "Directory created: /home/user/projects/site/css"),
        ("cd projects/site", ""),
        ("pwd", "/home/user/projects/site"),
        ("echo <h1>hi</h1> > index.html", "Text written to: /home/user/projects/site/index.html"),
        ("touch css/main.css", "Created file: /home/user/projects/site/css/main.css"),
        ("cat index.html", "<h1>hi</h1>"),
        ("cd ..", ""),
        ("cp site site-backup", "Copied: /home/user/projects/site -> /home/user/projects/site-backup"),
        ("mv site-backup ~/Documents/site", "Moved: /home/user/projects/site-backup -> /home/user/Documents/site"),
        ("cd ~", ""),
    ];
    for (line, expected) in transcript {
        assert_eq!(shell.execute(line), expected, "command: {}", line);
    }

    assert_eq!(shell.prompt(), "user@ubuntu:~$ ");
    assert_eq!(
        fs.read(|fs| fs.read_file("/home/user/Documents/site/index.html"))
            .unwrap(),
        "<h1>hi</h1>"
    );
    assert!(fs.read(|fs| fs.is_file("/home/user/Documents/site/css/main.css")));
    assert!(!fs.read(|fs| fs.exists("/home/user/projects/site-backup")));
}

#[test]
fn shell_sees_writes_made_through_the_handle() {
    let (mut shell, fs) = session();
    fs.write(|fs| fs.create_file("/home/user/Desktop/todo.txt", "buy milk"))
        .unwrap();

    assert_eq!(shell.execute("cat Desktop/todo.txt"), "buy milk");
    let listing = shell.execute("ls Desktop");
    assert!(listing.lines().any(|line| line.ends_with(" todo.txt")));
}

#[test]
fn errors_leave_the_session_usable() {
    let (mut shell, _fs) = session();

    assert_eq!(
        shell.execute("cd /nowhere"),
        "cd: /nowhere: No such file or directory"
    );
    assert_eq!(shell.cwd().as_str(), "/home/user");
    assert_eq!(
        shell.execute("cat /etc"),
        "cat: /etc: Is a directory"
    );
    assert_eq!(shell.execute("rm /"), "rm: cannot remove '/': Operation not permitted");
    assert_eq!(shell.execute("sudo rm -rf /"), "sudo: command not found");
    assert_eq!(shell.execute("whoami"), "user");

    let history: Vec<&str> = shell.history().collect();
    assert_eq!(history.len(), 5);
    assert_eq!(history[0], "cd /nowhere");
}

#[test]
fn cd_tracks_pwd_in_environment() {
    let (mut shell, _fs) = session();
    shell.execute("cd /etc");
    assert_eq!(shell.env_var("PWD"), Some("/etc"));
    assert_eq!(shell.prompt(), "user@ubuntu:/etc$ ");
    shell.execute("cd");
    assert_eq!(shell.env_var("PWD"), Some("/home/user"));
}
