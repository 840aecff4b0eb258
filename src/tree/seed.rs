//! Default tree for a freshly signed-in user

use crate::error::VfsError;
use crate::tree::node::Node;
use crate::tree::snapshot::Snapshot;
use crate::types::Timestamp;

/// Standard folders created in every home directory
pub const HOME_FOLDERS: [&str; 6] = [
    "Documents",
    "Downloads",
    "Pictures",
    "Music",
    "Videos",
    "Desktop",
];

const PROJECT_TXT: &str = r#"# My Ubuntu Project

This is a sample project file created in the Ubuntu OS simulator.

## Features
- Real terminal
- Code editor
- File system simulation
- Syntax highlighting
- Multiple language support

## Getting Started
1. Open the terminal
2. Navigate through the file system
3. Edit files with the code editor
4. Save your changes

Happy coding!"#;

const README_MD: &str = r#"# Ubuntu OS Simulator

Welcome to the Ubuntu OS simulator!

## Features

### Terminal
- Command history with arrow keys
- Basic Unix commands (ls, cd, pwd, cat, etc.)
- Virtual file system

### Code Editor
- Syntax highlighting for multiple languages
- File explorer
- Tab management

### Desktop Environment
- Window management
- Application launcher
- System tray
- Notifications

## Usage

Use the terminal to navigate the file system and the code editor to modify files.

Enjoy exploring this Ubuntu simulation!"#;

const MAIN_JS: &str = r#"// Main application entry point
console.log('Welcome to Ubuntu OS Simulator!');

function initializeSystem() {
    console.log('Initializing system...');
    loadDesktop();
    startServices();
    console.log('System ready!');
}

function loadDesktop() {
    console.log('Loading desktop environment...');
}

function startServices() {
    console.log('Starting system services...');
}

document.addEventListener('DOMContentLoaded', initializeSystem);"#;

const UTILS_JS: &str = r#"// Utility functions for the Ubuntu OS simulator

export function formatFileSize(bytes) {
    const sizes = ['Bytes', 'KB', 'MB', 'GB'];
    if (bytes === 0) return '0 Bytes';
    const i = Math.floor(Math.log(bytes) / Math.log(1024));
    return Math.round(bytes / Math.pow(1024, i) * 100) / 100 + ' ' + sizes[i];
}

export function debounce(func, wait) {
    let timeout;
    return function executedFunction(...args) {
        clearTimeout(timeout);
        timeout = setTimeout(() => func(...args), wait);
    };
}"#;

/// Home directory path of `username`
pub fn home_dir(username: &str) -> String {
    format!("/home/{}", username)
}

/// Contents of `/etc/passwd` for the simulated accounts
pub fn passwd(username: &str) -> String {
    format!(
        "root:x:0:0:root:/root:/bin/bash\n{u}:x:1000:1000:{u}:/home/{u}:/bin/bash\n",
        u = username
    )
}

/// Build the default tree root for `username`
pub fn default_root(username: &str, at: Timestamp) -> Node {
    let mut home = Node::directory_at(username, at);
    for folder in HOME_FOLDERS {
        home = home.with_child(Node::directory_at(folder, at));
    }
    let home = home
        .with_child(Node::file_at("project.txt", PROJECT_TXT, at))
        .with_child(Node::file_at("README.md", README_MD, at))
        .with_child(
            Node::directory_at("src", at)
                .with_child(Node::file_at("main.js", MAIN_JS, at))
                .with_child(Node::file_at("utils.js", UTILS_JS, at)),
        );

    Node::directory_at("", at)
        .with_child(Node::directory_at("home", at).with_child(home))
        .with_child(
            Node::directory_at("usr", at)
                .with_child(Node::directory_at("bin", at))
                .with_child(Node::directory_at("lib", at)),
        )
        .with_child(
            Node::directory_at("etc", at).with_child(Node::file_at("passwd", passwd(username), at)),
        )
}

/// Default snapshot for `username`
pub fn default_snapshot(username: &str, at: Timestamp) -> Result<Snapshot, VfsError> {
    Snapshot::new(default_root(username, at))
}
