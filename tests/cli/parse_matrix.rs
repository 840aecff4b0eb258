use clap::{CommandFactory, Parser};
use deskfs::tooling::cli::{BackendArg, Cli, Commands};

#[test]
fn command_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn accepts_valid_invocations() {
    let valid: &[&[&str]] = &[
        &["deskfs", "shell"],
        &["deskfs", "ls"],
        &["deskfs", "ls", "/etc", "--format", "json"],
        &["deskfs", "cat", "/etc/passwd"],
        &["deskfs", "write", "notes.txt", "hello world"],
        &["deskfs", "mkdir", "-p", "a/b/c"],
        &["deskfs", "mkdir", "--parents", "a"],
        &["deskfs", "rm", "a"],
        &["deskfs", "mv", "a", "b"],
        &["deskfs", "cp", "a", "b"],
        &["deskfs", "tree", "--depth", "2"],
        &["deskfs", "status", "--format", "json"],
        &["deskfs", "watch", "--interval-ms", "50", "--count", "3"],
        &["deskfs", "config"],
        &["deskfs", "-u", "amy", "--backend", "sled", "--store", "/tmp/x", "ls"],
        &["deskfs", "--log-level", "debug", "--log-output", "stderr", "status"],
    ];
    for args in valid {
        if let Err(e) = Cli::try_parse_from(*args) {
            panic!("{:?} should parse: {}", args, e);
        }
    }
}

#[test]
fn rejects_invalid_invocations() {
    let invalid: &[&[&str]] = &[
        &["deskfs"],
        &["deskfs", "frobnicate"],
        &["deskfs", "cat"],
        &["deskfs", "write", "only-path"],
        &["deskfs", "mv", "a"],
        &["deskfs", "cp"],
        &["deskfs", "--backend", "postgres", "ls"],
        &["deskfs", "tree", "--depth", "deep"],
        &["deskfs", "watch", "--interval-ms", "-1"],
    ];
    for args in invalid {
        assert!(
            Cli::try_parse_from(*args).is_err(),
            "{:?} should be rejected",
            args
        );
    }
}

#[test]
fn parses_global_overrides() {
    let cli = Cli::try_parse_from([
        "deskfs", "--user", "bob", "--backend", "memory", "mkdir", "-p", "x/y",
    ])
    .unwrap();
    assert_eq!(cli.user.as_deref(), Some("bob"));
    assert!(matches!(cli.backend, Some(BackendArg::Memory)));
    match cli.command {
        Commands::Mkdir { path, parents } => {
            assert_eq!(path, "x/y");
            assert!(parents);
        }
        other => panic!("unexpected command {:?}", other),
    }
}

#[test]
fn subcommand_defaults() {
    let cli = Cli::try_parse_from(["deskfs", "watch"]).unwrap();
    match cli.command {
        Commands::Watch { interval_ms, count } => {
            assert_eq!(interval_ms, 500);
            assert_eq!(count, None);
        }
        other => panic!("unexpected command {:?}", other),
    }

    let cli = Cli::try_parse_from(["deskfs", "ls"]).unwrap();
    match cli.command {
        Commands::Ls { path, format } => {
            assert_eq!(path, None);
            assert_eq!(format, "text");
        }
        other => panic!("unexpected command {:?}", other),
    }
}
