//! CLI Tooling
//!
//! Command-line interface over one owner's virtual filesystem. Every
//! subcommand opens the configured store, runs against the engine and
//! returns the text to print.

use crate::config::{ConfigLoader, DeskConfig, StorageBackend};
use crate::error::{ApiError, VfsError};
use crate::handle::FsHandle;
use crate::logging::{LogFormat, LogOutput};
use crate::path::CanonicalPath;
use crate::terminal::Shell;
use crate::tooling::format::{
    format_changes, format_listing_text, format_status_text, format_tree, StatusSummary,
};
use crate::vfs::FileSystem;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// deskfs - virtual filesystem for the desktop simulator
#[derive(Parser, Debug)]
#[command(name = "deskfs")]
#[command(about = "Snapshot-based virtual filesystem for a desktop simulator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the global config)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Owner whose filesystem is opened (overrides config)
    #[arg(long, short)]
    pub user: Option<String>,

    /// Storage backend (overrides config)
    #[arg(long, value_enum)]
    pub backend: Option<BackendArg>,

    /// Sled database directory (overrides config)
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Log output
    #[arg(long, value_enum)]
    pub log_output: Option<LogOutput>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum BackendArg {
    Memory,
    Sled,
}

impl From<BackendArg> for StorageBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Memory => StorageBackend::Memory,
            BackendArg::Sled => StorageBackend::Sled,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive terminal session
    Shell,
    /// List a directory
    Ls {
        /// Directory (defaults to the home directory)
        path: Option<String>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print a file
    Cat { path: String },
    /// Create or replace a file
    Write {
        path: String,
        /// New content
        content: String,
    },
    /// Create a directory
    Mkdir {
        path: String,
        /// Create missing parents, succeed if it exists
        #[arg(long, short)]
        parents: bool,
    },
    /// Remove a file or directory
    Rm { path: String },
    /// Move or rename
    Mv { source: String, dest: String },
    /// Copy a file or directory
    Cp { source: String, dest: String },
    /// Show a subtree
    Tree {
        /// Subtree root (defaults to the home directory)
        path: Option<String>,
        /// Maximum depth
        #[arg(long)]
        depth: Option<usize>,
    },
    /// Summarize the tree and its digest
    Status {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print changes made by other writers to the same store
    Watch {
        /// Polling interval in milliseconds
        #[arg(long, default_value = "500")]
        interval_ms: u64,
        /// Stop after this many refreshes
        #[arg(long)]
        count: Option<usize>,
    },
    /// Print the resolved configuration
    Config,
}

impl Cli {
    /// Load configuration and apply command-line overrides
    pub fn resolve_config(&self) -> Result<DeskConfig, ApiError> {
        let mut config = ConfigLoader::load_optional(self.config.as_deref())?;
        if let Some(user) = &self.user {
            config.username = user.clone();
        }
        if let Some(backend) = self.backend {
            config.storage.backend = backend.into();
        }
        if let Some(store) = &self.store {
            config.storage.path = Some(store.clone());
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.logging.format = *format;
        }
        if let Some(output) = &self.log_output {
            config.logging.output = *output;
        }
        if let Some(file) = &self.log_file {
            config.logging.file = Some(file.clone());
        }
        Ok(config)
    }
}

/// CLI context holding the opened filesystem
pub struct CliContext {
    config: DeskConfig,
    fs: FsHandle,
}

impl CliContext {
    /// Open the configured store and the owner's filesystem
    pub fn new(config: DeskConfig) -> Result<Self, ApiError> {
        let store = config.storage.open_store()?;
        let fs = FileSystem::open(&config.username, store, config.storage.vfs_options())?;
        info!(
            owner = %config.username,
            backend = ?config.storage.backend,
            "CLI context ready"
        );
        Ok(Self {
            config,
            fs: FsHandle::new(fs),
        })
    }

    pub fn config(&self) -> &DeskConfig {
        &self.config
    }

    pub fn fs(&self) -> &FsHandle {
        &self.fs
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let result = self.execute_inner(command);
        self.fs.read(|fs| fs.store().flush())?;
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Shell => self.run_shell(),
            Commands::Ls { path, format } => {
                let path = self.target(path.as_deref())?;
                let entries = self.fs.read(|fs| fs.list_entries(path.as_str()))?;
                match format.as_str() {
                    "json" => serde_json::to_string_pretty(&entries)
                        .map_err(|e| ApiError::ConfigError(format!("Failed to encode listing: {}", e))),
                    "text" => Ok(format_listing_text(path.as_str(), &entries)),
                    other => Err(invalid_format(other)),
                }
            }
            Commands::Cat { path } => {
                let path = self.target(Some(path))?;
                Ok(self.fs.read(|fs| fs.read_file(path.as_str()))?)
            }
            Commands::Write { path, content } => {
                let path = self.target(Some(path))?;
                self.fs.write(|fs| fs.write_file(path.as_str(), content))?;
                Ok(format!("Wrote {} bytes to {}", content.len(), path))
            }
            Commands::Mkdir { path, parents } => {
                let path = self.target(Some(path))?;
                self.fs.write(|fs| {
                    if *parents {
                        fs.create_dir_all(path.as_str())
                    } else if fs.exists(path.as_str()) {
                        Err(VfsError::AlreadyExists(path.to_string()))
                    } else {
                        fs.create_directory(path.as_str())
                    }
                })?;
                Ok(format!("Directory created: {}", path))
            }
            Commands::Rm { path } => {
                let path = self.target(Some(path))?;
                self.fs.write(|fs| fs.delete_node(path.as_str()))?;
                Ok(format!("Removed: {}", path))
            }
            Commands::Mv { source, dest } => {
                let source = self.target(Some(source))?;
                let dest = self.destination(&source, dest)?;
                self.fs
                    .write(|fs| fs.move_item(source.as_str(), dest.as_str()))?;
                Ok(format!("Moved: {} -> {}", source, dest))
            }
            Commands::Cp { source, dest } => {
                let source = self.target(Some(source))?;
                let dest = self.destination(&source, dest)?;
                self.fs
                    .write(|fs| fs.copy_item(source.as_str(), dest.as_str()))?;
                Ok(format!("Copied: {} -> {}", source, dest))
            }
            Commands::Tree { path, depth } => {
                let path = self.target(path.as_deref())?;
                let snapshot = self.fs.snapshot();
                snapshot.resolve(&path)?;
                Ok(format_tree(&snapshot, &path, *depth))
            }
            Commands::Status { format } => {
                let (backend, snapshot) = self
                    .fs
                    .read(|fs| (fs.store().name().to_string(), fs.snapshot()));
                let status = StatusSummary::collect(&self.config.username, &backend, &snapshot);
                match format.as_str() {
                    "json" => serde_json::to_string_pretty(&status)
                        .map_err(|e| ApiError::ConfigError(format!("Failed to encode status: {}", e))),
                    "text" => Ok(format_status_text(&status)),
                    other => Err(invalid_format(other)),
                }
            }
            Commands::Watch { interval_ms, count } => self.watch(*interval_ms, *count),
            Commands::Config => toml::to_string_pretty(&self.config)
                .map_err(|e| ApiError::ConfigError(format!("Failed to encode config: {}", e))),
        }
    }

    /// Resolve a CLI path argument; relative paths start at the home directory
    fn target(&self, raw: Option<&str>) -> Result<CanonicalPath, ApiError> {
        let home = self.fs.read(|fs| fs.home());
        match raw {
            None => Ok(home),
            Some(raw) => Ok(home.resolve(raw)?),
        }
    }

    /// An existing directory receives the source under its own name
    fn destination(&self, source: &CanonicalPath, raw: &str) -> Result<CanonicalPath, ApiError> {
        let dest = self.target(Some(raw))?;
        if self.fs.read(|fs| fs.is_directory(dest.as_str())) {
            return Ok(dest.join(source.name()));
        }
        Ok(dest)
    }

    fn run_shell(&self) -> Result<String, ApiError> {
        use dialoguer::Input;

        let mut shell =
            Shell::new(self.fs.clone()).with_history_limit(self.config.terminal.history_limit);
        println!("Type 'help' for commands, 'exit' to leave.");
        loop {
            let line: String = Input::new()
                .with_prompt(shell.prompt().trim_end().trim_end_matches('$'))
                .allow_empty(true)
                .interact_text()
                .map_err(|e| ApiError::ConfigError(format!("Failed to read input: {}", e)))?;
            let trimmed = line.trim();
            if trimmed == "exit" || trimmed == "logout" {
                break;
            }
            let output = shell.execute(trimmed);
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Ok(format!("{} commands in history", shell.history().count()))
    }

    fn watch(&self, interval_ms: u64, count: Option<usize>) -> Result<String, ApiError> {
        let mut feed = self.fs.read(|fs| fs.subscribe())?;
        let interval = Duration::from_millis(interval_ms.max(1));
        let mut refreshes = 0;
        while count.map_or(true, |max| refreshes < max) {
            let before = self.fs.snapshot();
            // Never block on the feed while holding the engine lock
            let changed = self
                .fs
                .write(|fs| fs.poll_changes(feed.as_mut(), Duration::ZERO))?;
            if !changed {
                std::thread::sleep(interval);
                continue;
            }
            refreshes += 1;
            let changes = before.diff(&self.fs.snapshot());
            if !changes.is_empty() {
                println!("{}", format_changes(&changes));
            }
        }
        Ok(format!("Observed {} refreshes", refreshes))
    }
}

fn invalid_format(format: &str) -> ApiError {
    ApiError::ConfigError(format!(
        "Invalid format: {} (must be 'text' or 'json')",
        format
    ))
}
