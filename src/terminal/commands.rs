//! Built-in shell commands

use super::Shell;
use crate::error::VfsError;
use crate::path::CanonicalPath;
use crate::types::{now, NodeKind};

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

const HELP: &str = "Available commands:
ls [path]     - List directory contents
pwd           - Print working directory
cd [path]     - Change directory
mkdir <path>  - Create directory (-p creates parents)
rm <path>     - Remove file or directory
cp <src> <dst> - Copy file or directory
mv <src> <dst> - Move/rename file or directory
cat <file>    - Display file contents
echo <text>   - Display text or write to file (echo \"text\" > file)
touch <file>  - Create empty file or update timestamp
whoami        - Display current user
date          - Display current date and time
clear         - Clear terminal screen
help          - Show this help message";

/// Short coreutils-style reason for a failure
fn reason(err: &VfsError) -> String {
    match err {
        VfsError::NotFound(_) => "No such file or directory".to_string(),
        VfsError::WrongKind {
            expected: NodeKind::Directory,
            ..
        } => "Not a directory".to_string(),
        VfsError::WrongKind {
            found: NodeKind::Directory,
            ..
        } => "Is a directory".to_string(),
        VfsError::WrongKind { found, .. } => format!("Is a {}", found),
        VfsError::AlreadyExists(_) => "File exists".to_string(),
        VfsError::InvalidPath { reason, .. } => reason.clone(),
        VfsError::RootImmutable => "Operation not permitted".to_string(),
        VfsError::Storage(e) => format!("Input/output error ({})", e),
    }
}

/// Drop one pair of matching surrounding quotes
fn unquote(text: &str) -> &str {
    let text = text.trim();
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return &text[1..text.len() - 1];
        }
    }
    text
}

impl Shell {
    pub(super) fn dispatch(&mut self, cmd: &str, args: &[&str], line: &str) -> String {
        match cmd {
            "ls" => self.ls(args.first().copied()),
            "pwd" => self.cwd.to_string(),
            "cd" => self.cd(args.first().copied()),
            "mkdir" => self.mkdir(args),
            "rm" => match args.first() {
                Some(target) => self.rm(target),
                None => "rm: missing operand".to_string(),
            },
            "cp" => match args {
                [src, dst, ..] => self.cp(src, dst),
                _ => "cp: missing operand".to_string(),
            },
            "mv" => match args {
                [src, dst, ..] => self.mv(src, dst),
                _ => "mv: missing operand".to_string(),
            },
            "cat" => match args.first() {
                Some(target) => self.cat(target),
                None => "cat: missing operand".to_string(),
            },
            "echo" => self.echo(line.strip_prefix("echo").unwrap_or("")),
            "touch" => match args.first() {
                Some(target) => self.touch(target),
                None => "touch: missing operand".to_string(),
            },
            "whoami" => self.env_var("USER").unwrap_or("user").to_string(),
            "date" => now().format("%a %b %e %H:%M:%S UTC %Y").to_string(),
            "clear" => CLEAR_SCREEN.to_string(),
            "help" => HELP.to_string(),
            other => format!("{}: command not found", other),
        }
    }

    fn target(&self, raw: &str) -> Result<CanonicalPath, VfsError> {
        if raw == "~" {
            let home = self.env_var("HOME").unwrap_or("/");
            return CanonicalPath::parse(home);
        }
        if let Some(rest) = raw.strip_prefix("~/") {
            let home = self.env_var("HOME").unwrap_or("/");
            return CanonicalPath::parse(home).map(|h| h.join(rest));
        }
        self.cwd.resolve(raw)
    }

    /// `cp`/`mv` target: an existing directory receives the source under its own name
    fn destination(&self, source: &CanonicalPath, raw: &str) -> Result<CanonicalPath, VfsError> {
        let dest = self.target(raw)?;
        if self.fs.read(|fs| fs.is_directory(dest.as_str())) {
            return Ok(dest.join(source.name()));
        }
        Ok(dest)
    }

    fn ls(&self, arg: Option<&str>) -> String {
        let shown = arg.unwrap_or(".");
        let entries = self
            .target(shown)
            .and_then(|path| self.fs.read(|fs| fs.list_entries(path.as_str())));
        match entries {
            Ok(entries) => entries
                .iter()
                .map(|entry| {
                    let name = if entry.kind == NodeKind::Directory {
                        format!("{}/", entry.name)
                    } else {
                        entry.name.clone()
                    };
                    format!(
                        "{} {:>8} {} {}",
                        entry.permissions,
                        entry.size,
                        entry.modified_at.format("%Y-%m-%d"),
                        name
                    )
                })
                .collect::<Vec<_>>()
                .join("\n"),
            Err(e) => format!("ls: cannot access '{}': {}", shown, reason(&e)),
        }
    }

    fn cd(&mut self, arg: Option<&str>) -> String {
        let shown = arg.unwrap_or("~");
        let path = match self.target(shown) {
            Ok(path) => path,
            Err(e) => return format!("cd: {}: {}", shown, reason(&e)),
        };
        match self.fs.read(|fs| fs.get_node(path.as_str())) {
            Ok(node) if node.is_directory() => {
                self.set_cwd(path);
                String::new()
            }
            Ok(_) => format!("cd: {}: Not a directory", shown),
            Err(e) => format!("cd: {}: {}", shown, reason(&e)),
        }
    }

    fn mkdir(&mut self, args: &[&str]) -> String {
        let parents = args.contains(&"-p");
        let Some(raw) = args.iter().find(|a| **a != "-p") else {
            return "mkdir: missing operand".to_string();
        };
        let result = self.target(raw).and_then(|path| {
            self.fs.write(|fs| {
                if parents {
                    fs.create_dir_all(path.as_str())
                } else if fs.exists(path.as_str()) {
                    // The engine would replace the existing node
                    Err(VfsError::AlreadyExists(path.to_string()))
                } else {
                    fs.create_directory(path.as_str())
                }
            })?;
            Ok(path)
        });
        match result {
            Ok(path) => format!("Directory created: {}", path),
            Err(e) => format!("mkdir: cannot create directory '{}': {}", raw, reason(&e)),
        }
    }

    fn rm(&mut self, raw: &str) -> String {
        let result = self.target(raw).and_then(|path| {
            self.fs.write(|fs| fs.delete_node(path.as_str()))?;
            Ok(path)
        });
        match result {
            Ok(path) => format!("Removed: {}", path),
            Err(e) => format!("rm: cannot remove '{}': {}", raw, reason(&e)),
        }
    }

    fn cp(&mut self, src: &str, dst: &str) -> String {
        let result = self.target(src).and_then(|from| {
            let to = self.destination(&from, dst)?;
            self.fs.write(|fs| fs.copy_item(from.as_str(), to.as_str()))?;
            Ok((from, to))
        });
        match result {
            Ok((from, to)) => format!("Copied: {} -> {}", from, to),
            Err(e) => format!("cp: cannot copy '{}' to '{}': {}", src, dst, reason(&e)),
        }
    }

    fn mv(&mut self, src: &str, dst: &str) -> String {
        let result = self.target(src).and_then(|from| {
            let to = self.destination(&from, dst)?;
            self.fs.write(|fs| fs.move_item(from.as_str(), to.as_str()))?;
            Ok((from, to))
        });
        match result {
            Ok((from, to)) => format!("Moved: {} -> {}", from, to),
            Err(e) => format!("mv: cannot move '{}' to '{}': {}", src, dst, reason(&e)),
        }
    }

    fn cat(&self, raw: &str) -> String {
        let result = self
            .target(raw)
            .and_then(|path| self.fs.read(|fs| fs.read_file(path.as_str())));
        match result {
            Ok(content) => content,
            Err(e) => format!("cat: {}: {}", raw, reason(&e)),
        }
    }

    fn echo(&mut self, rest: &str) -> String {
        let Some((text, file)) = rest.split_once(" > ") else {
            return unquote(rest).to_string();
        };
        let text = unquote(text);
        let file = file.trim();
        if file.is_empty() {
            return "echo: missing file operand".to_string();
        }
        let result = self.target(file).and_then(|path| {
            self.fs.write(|fs| fs.write_file(path.as_str(), text))?;
            Ok(path)
        });
        match result {
            Ok(path) => format!("Text written to: {}", path),
            Err(e) => format!("echo: {}: {}", file, reason(&e)),
        }
    }

    fn touch(&mut self, raw: &str) -> String {
        let path = match self.target(raw) {
            Ok(path) => path,
            Err(e) => return format!("touch: cannot touch '{}': {}", raw, reason(&e)),
        };
        if self.fs.read(|fs| fs.exists(path.as_str())) {
            return format!("Updated timestamp: {}", path);
        }
        match self.fs.write(|fs| fs.create_file(path.as_str(), "")) {
            Ok(_) => format!("Created file: {}", path),
            Err(e) => format!("touch: cannot touch '{}': {}", raw, reason(&e)),
        }
    }
}
