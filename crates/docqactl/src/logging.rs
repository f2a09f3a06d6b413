//! Logging setup
//!
//! The TUI owns the terminal, so it logs to a file found through the XDG
//! fallback chain. One-shot commands and the REPL log to stderr.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    /// Explicit path from config, else the discovered state path
    pub fn file_or_discovered(configured: Option<&Path>) -> Option<Self> {
        configured
            .map(Path::to_path_buf)
            .or_else(docqa_common::paths::discover_log_path)
            .map(Self::File)
    }
}

/// `RUST_LOG` wins over the configured level
pub fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global subscriber. Safe to call once per process.
pub fn init(target: LogTarget, level: &str) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(filter(level));

    match target {
        LogTarget::Stderr => builder
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init(),
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
        }
    }
    .map_err(|e| anyhow::anyhow!("Failed to install logger: {}", e))
}

/// Logging for the TUI: a file if possible, otherwise nothing reaches the
/// screen
pub fn init_for_tui(configured: Option<&Path>, level: &str) {
    let installed = LogTarget::file_or_discovered(configured)
        .map(|target| init(target, level).is_ok())
        .unwrap_or(false);
    if !installed {
        let _ = tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .try_init();
    }
}
