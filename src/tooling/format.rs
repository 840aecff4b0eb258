//! Format listings, trees and status for the CLI.

use crate::path::CanonicalPath;
use crate::tree::snapshot::{ChangeKind, TreeChange};
use crate::tree::{Node, Snapshot};
use crate::types::NodeKind;
use crate::vfs::{sorted_children, DirEntry};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

fn display_name(name: &str, kind: NodeKind) -> String {
    match kind {
        NodeKind::Directory => format!("{}", format!("{}/", name).blue().bold()),
        NodeKind::Symlink => format!("{}", name.cyan()),
        NodeKind::File => name.to_string(),
    }
}

/// Directory listing as a table
pub fn format_listing_text(path: &str, entries: &[DirEntry]) -> String {
    if entries.is_empty() {
        return format!("{} is empty", path);
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Permissions", "Size", "Modified", "Name"]);
    for entry in entries {
        table.add_row(vec![
            entry.permissions.clone(),
            entry.size.to_string(),
            entry.modified_at.format("%Y-%m-%d %H:%M").to_string(),
            display_name(&entry.name, entry.kind),
        ]);
    }
    table.to_string()
}

/// Render the subtree at `path`, descending at most `max_depth` levels
pub fn format_tree(snapshot: &Snapshot, path: &CanonicalPath, max_depth: Option<usize>) -> String {
    let Some(node) = snapshot.get(path) else {
        return format!("{}: not found", path);
    };
    let mut out = display_name(path.as_str(), node.kind());
    let mut counts = (0usize, 0usize);
    render_children(node, "", 1, max_depth, &mut out, &mut counts);
    out.push_str(&format!(
        "\n\n{} directories, {} files",
        counts.0, counts.1
    ));
    out
}

fn render_children(
    node: &Node,
    prefix: &str,
    depth: usize,
    max_depth: Option<usize>,
    out: &mut String,
    counts: &mut (usize, usize),
) {
    if max_depth.is_some_and(|max| depth > max) {
        return;
    }
    let children = sorted_children(node);
    let last = children.len().saturating_sub(1);
    for (i, child) in children.iter().enumerate() {
        let (branch, indent) = if i == last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        out.push('\n');
        out.push_str(prefix);
        out.push_str(branch);
        out.push_str(&display_name(&child.name, child.kind()));
        if child.is_directory() {
            counts.0 += 1;
            render_children(
                child,
                &format!("{}{}", prefix, indent),
                depth + 1,
                max_depth,
                out,
                counts,
            );
        } else {
            counts.1 += 1;
        }
    }
}

/// Summary of one owner's tree
#[derive(Debug, Clone, Serialize)]
pub struct StatusSummary {
    pub owner: String,
    pub backend: String,
    pub digest: String,
    pub generation: u64,
    pub directories: usize,
    pub files: usize,
    pub symlinks: usize,
    pub bytes: u64,
}

impl StatusSummary {
    pub fn collect(owner: &str, backend: &str, snapshot: &Snapshot) -> Self {
        let mut summary = StatusSummary {
            owner: owner.to_string(),
            backend: backend.to_string(),
            digest: hex::encode(snapshot.digest()),
            generation: snapshot.generation(),
            directories: 0,
            files: 0,
            symlinks: 0,
            bytes: 0,
        };
        for (_, node) in snapshot.walk(&CanonicalPath::root()) {
            match node.kind() {
                NodeKind::Directory => summary.directories += 1,
                NodeKind::File => summary.files += 1,
                NodeKind::Symlink => summary.symlinks += 1,
            }
            summary.bytes += node.size();
        }
        summary
    }
}

pub fn format_status_text(status: &StatusSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Filesystem Status")));
    out.push_str(&format!("  Owner: {}\n", status.owner));
    out.push_str(&format!("  Store: {}\n", status.backend));
    out.push_str(&format!("  Digest: {}\n", status.digest));
    out.push_str(&format!("  Generation: {}\n\n", status.generation));

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Directories", "Files", "Symlinks", "Bytes"]);
    table.add_row(vec![
        status.directories.to_string(),
        status.files.to_string(),
        status.symlinks.to_string(),
        status.bytes.to_string(),
    ]);
    out.push_str(&table.to_string());
    out
}

/// One line per changed path, `+`/`-`/`~` prefixed
pub fn format_changes(changes: &[TreeChange]) -> String {
    changes
        .iter()
        .map(|change| match change.kind {
            ChangeKind::Added => format!("{} {}", "+".green(), change.path),
            ChangeKind::Removed => format!("{} {}", "-".red(), change.path),
            ChangeKind::Modified => format!("{} {}", "~".yellow(), change.path),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
