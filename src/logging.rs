use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::{LogSettings, default_log_path};

/// Environment variable holding a `tracing` filter that overrides `log.level`.
pub const LOG_ENV: &str = "SETLIST_LOG";

fn filter_directive(from_env: Option<String>, level: &str) -> String {
    match from_env {
        Some(directive) if !directive.trim().is_empty() => directive,
        _ => level.to_string(),
    }
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber, writing to a file since the terminal
/// belongs to the UI. Returns the log path, or `None` when logging is off.
pub fn init(settings: &LogSettings) -> Option<PathBuf> {
    let path = settings.file.clone().or_else(default_log_path)?;

    let file = match open_log_file(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("setlist: logging disabled, cannot open {}: {e}", path.display());
            return None;
        }
    };

    let directive = filter_directive(std::env::var(LOG_ENV).ok(), &settings.level);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|e| {
        eprintln!("setlist: bad log filter {directive:?} ({e}), using \"info\"");
        EnvFilter::new("info")
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .ok()?;

    Some(path)
}
