//! Terminal session on top of the virtual filesystem
//!
//! A `Shell` keeps the per-session state (working directory, environment,
//! command history) and interprets one command line at a time. Every command
//! produces the text the terminal should print; failures are reported in the
//! output rather than as errors.

mod commands;

use crate::handle::FsHandle;
use crate::path::CanonicalPath;
use std::collections::{BTreeMap, VecDeque};
use tracing::debug;

/// Default number of commands kept in history
pub const DEFAULT_HISTORY_LIMIT: usize = 1000;

const DEFAULT_SHELL: &str = "/bin/bash";
const DEFAULT_PATH: &str = "/usr/local/bin:/usr/bin:/bin:/usr/local/sbin:/usr/sbin:/sbin";

/// Interactive shell session for one user
#[derive(Debug)]
pub struct Shell {
    fs: FsHandle,
    cwd: CanonicalPath,
    env: BTreeMap<String, String>,
    history: VecDeque<String>,
    history_limit: usize,
}

impl Shell {
    /// Start a session in the owner's home directory (or `/` if it is gone)
    pub fn new(fs: FsHandle) -> Self {
        let owner = fs.owner();
        let home = fs.read(|fs| {
            let home = fs.home();
            if fs.is_directory(home.as_str()) {
                home
            } else {
                CanonicalPath::root()
            }
        });

        let mut env = BTreeMap::new();
        env.insert("HOME".to_string(), home.to_string());
        env.insert("USER".to_string(), owner);
        env.insert("SHELL".to_string(), DEFAULT_SHELL.to_string());
        env.insert("PATH".to_string(), DEFAULT_PATH.to_string());
        env.insert("PWD".to_string(), home.to_string());

        Shell {
            fs,
            cwd: home,
            env,
            history: VecDeque::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Cap history at `limit` entries (at least one)
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.max(1);
        self.trim_history();
        self
    }

    pub fn cwd(&self) -> &CanonicalPath {
        &self.cwd
    }

    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }

    pub fn env_var(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }

    pub fn set_env_var(&mut self, key: &str, value: &str) {
        self.env.insert(key.to_string(), value.to_string());
    }

    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Prompt string in the usual `user@host:dir$ ` shape
    pub fn prompt(&self) -> String {
        let user = self.env_var("USER").unwrap_or("user");
        let home = self.env_var("HOME").unwrap_or("");
        let cwd = self.cwd.as_str();
        let shown = if !home.is_empty() && cwd == home {
            "~".to_string()
        } else if !home.is_empty() && cwd.starts_with(&format!("{}/", home)) {
            format!("~{}", &cwd[home.len()..])
        } else {
            cwd.to_string()
        };
        format!("{}@ubuntu:{}$ ", user, shown)
    }

    /// Run one command line and return its output
    pub fn execute(&mut self, line: &str) -> String {
        let line = line.trim();
        if line.is_empty() {
            return String::new();
        }
        self.record(line);

        let mut parts = line.split_whitespace();
        let Some(cmd) = parts.next() else {
            return String::new();
        };
        let args: Vec<&str> = parts.collect();
        debug!(command = cmd, args = args.len(), cwd = %self.cwd, "Executing terminal command");
        self.dispatch(cmd, &args, line)
    }

    fn record(&mut self, line: &str) {
        self.history.push_back(line.to_string());
        self.trim_history();
    }

    fn trim_history(&mut self) {
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }
    }

    fn set_cwd(&mut self, path: CanonicalPath) {
        self.env.insert("PWD".to_string(), path.to_string());
        self.cwd = path;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell() -> Shell {
        Shell::new(FsHandle::in_memory("user").unwrap())
    }

    #[test]
    fn test_session_starts_at_home() {
        let shell = shell();
        assert_eq!(shell.cwd().as_str(), "/home/user");
        assert_eq!(shell.env_var("HOME"), Some("/home/user"));
        assert_eq!(shell.env_var("USER"), Some("user"));
        assert_eq!(shell.env_var("PWD"), Some("/home/user"));
        assert_eq!(shell.prompt(), "user@ubuntu:~$ ");
    }

    #[test]
    fn test_history_is_capped() {
        let mut shell = shell().with_history_limit(3);
        for cmd in ["pwd", "whoami", "ls", "pwd"] {
            shell.execute(cmd);
        }
        shell.execute("   ");
        let history: Vec<&str> = shell.history().collect();
        assert_eq!(history, vec!["whoami", "ls", "pwd"]);
    }

    #[test]
    fn test_prompt_tracks_cwd() {
        let mut shell = shell();
        shell.execute("cd src");
        assert_eq!(shell.prompt(), "user@ubuntu:~/src$ ");
        shell.execute("cd /etc");
        assert_eq!(shell.prompt(), "user@ubuntu:/etc$ ");
    }
}
