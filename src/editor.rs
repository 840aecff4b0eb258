//! Editor buffers backed by the virtual filesystem
//!
//! Tracks open tabs, the active tab and unsaved changes. Buffers hold their
//! own copy of the text; nothing reaches the filesystem until `save` (or
//! every edit, with auto-save on).

use crate::error::VfsError;
use crate::handle::FsHandle;
use crate::path::CanonicalPath;
use tracing::debug;

/// Editor language inferred from a file extension
pub fn language_for(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "js" | "jsx" => "javascript",
        "ts" | "tsx" => "typescript",
        "md" => "markdown",
        "json" => "json",
        "css" => "css",
        "html" => "html",
        "py" => "python",
        "rs" => "rust",
        "toml" => "toml",
        _ => "plaintext",
    }
}

/// One open file
#[derive(Debug, Clone)]
pub struct Buffer {
    pub path: CanonicalPath,
    pub language: &'static str,
    content: String,
    saved: String,
}

impl Buffer {
    pub fn content(&self) -> &str {
        &self.content
    }

    /// True if the buffer differs from what was last loaded or saved
    pub fn is_dirty(&self) -> bool {
        self.content != self.saved
    }
}

/// Open tabs for one user
#[derive(Debug)]
pub struct Editor {
    fs: FsHandle,
    base: CanonicalPath,
    tabs: Vec<Buffer>,
    active: Option<usize>,
    auto_save: bool,
}

impl Editor {
    /// Editor resolving relative paths against the owner's home directory
    pub fn new(fs: FsHandle) -> Self {
        let base = fs.read(|fs| fs.home());
        Editor {
            fs,
            base,
            tabs: Vec::new(),
            active: None,
            auto_save: false,
        }
    }

    /// Write every edit straight through to the filesystem
    pub fn with_auto_save(mut self, auto_save: bool) -> Self {
        self.auto_save = auto_save;
        self
    }

    pub fn tabs(&self) -> &[Buffer] {
        &self.tabs
    }

    pub fn active(&self) -> Option<&Buffer> {
        self.active.and_then(|i| self.tabs.get(i))
    }

    pub fn buffer(&self, path: &str) -> Option<&Buffer> {
        let path = self.base.resolve(path).ok()?;
        self.tabs.iter().find(|b| b.path == path)
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.tabs.iter().any(Buffer::is_dirty)
    }

    /// Open a file (or focus it if already open)
    pub fn open(&mut self, path: &str) -> Result<&Buffer, VfsError> {
        let path = self.base.resolve(path)?;
        let index = match self.position(&path) {
            Some(index) => index,
            None => {
                let content = self.fs.read(|fs| fs.read_file(path.as_str()))?;
                debug!(path = %path, "Opened editor tab");
                self.tabs.push(Buffer {
                    language: language_for(path.name()),
                    path,
                    saved: content.clone(),
                    content,
                });
                self.tabs.len() - 1
            }
        };
        self.active = Some(index);
        Ok(&self.tabs[index])
    }

    /// Close a tab, discarding unsaved changes. The last remaining tab
    /// becomes active if the closed one was.
    pub fn close(&mut self, path: &str) -> bool {
        let Some(index) = self.resolve_open(path) else {
            return false;
        };
        self.tabs.remove(index);
        self.active = match self.active {
            Some(active) if active == index => self.tabs.len().checked_sub(1),
            Some(active) if active > index => Some(active - 1),
            other => other,
        };
        true
    }

    /// Replace the text of an open buffer
    pub fn edit(&mut self, path: &str, content: &str) -> Result<(), VfsError> {
        let index = self
            .resolve_open(path)
            .ok_or_else(|| VfsError::NotFound(path.to_string()))?;
        self.tabs[index].content = content.to_string();
        self.active = Some(index);
        if self.auto_save {
            self.save_index(index)?;
        }
        Ok(())
    }

    /// Write an open buffer to the filesystem
    pub fn save(&mut self, path: &str) -> Result<(), VfsError> {
        let index = self
            .resolve_open(path)
            .ok_or_else(|| VfsError::NotFound(path.to_string()))?;
        self.save_index(index)
    }

    /// Save every dirty buffer, stopping at the first failure
    pub fn save_all(&mut self) -> Result<usize, VfsError> {
        let dirty: Vec<usize> = (0..self.tabs.len())
            .filter(|i| self.tabs[*i].is_dirty())
            .collect();
        for index in &dirty {
            self.save_index(*index)?;
        }
        Ok(dirty.len())
    }

    /// Re-read a clean buffer from the filesystem. Dirty buffers are kept
    /// unless `force` is set. Returns whether the buffer text changed.
    pub fn reload(&mut self, path: &str, force: bool) -> Result<bool, VfsError> {
        let index = self
            .resolve_open(path)
            .ok_or_else(|| VfsError::NotFound(path.to_string()))?;
        let buffer = &self.tabs[index];
        if buffer.is_dirty() && !force {
            return Ok(false);
        }
        let fresh = self.fs.read(|fs| fs.read_file(buffer.path.as_str()))?;
        let buffer = &mut self.tabs[index];
        let changed = buffer.content != fresh;
        buffer.saved = fresh.clone();
        buffer.content = fresh;
        Ok(changed)
    }

    fn save_index(&mut self, index: usize) -> Result<(), VfsError> {
        let buffer = &self.tabs[index];
        self.fs
            .write(|fs| fs.write_file(buffer.path.as_str(), &buffer.content))?;
        debug!(path = %buffer.path, bytes = buffer.content.len(), "Saved editor buffer");
        let buffer = &mut self.tabs[index];
        buffer.saved = buffer.content.clone();
        Ok(())
    }

    fn position(&self, path: &CanonicalPath) -> Option<usize> {
        self.tabs.iter().position(|b| &b.path == path)
    }

    fn resolve_open(&self, path: &str) -> Option<usize> {
        let path = self.base.resolve(path).ok()?;
        self.position(&path)
    }
}
