//! Logging init: append to `ces.log` under the XDG state dir, or stderr.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,ces=debug";
const LOG_FILE: &str = "ces.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Open `<dir>/ces.log` for appending, creating `dir` if needed.
fn open_log_file(dir: &Path) -> Result<(File, PathBuf)> {
    fs::create_dir_all(dir).with_context(|| format!("create log dir: {}", dir.display()))?;
    let path = dir.join(LOG_FILE);
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file: {}", path.display()))?;
    Ok((file, path))
}

/// Install the global subscriber writing to `~/.local/state/ces/ces.log`.
/// Errors are returned so the caller can fall back to [`init_logging_stderr`].
pub fn init_logging() -> Result<()> {
    let state_dir = xdg::BaseDirectories::with_prefix("ces")?.get_state_home();
    let (file, path) = open_log_file(&state_dir)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing subscriber: {}", e))?;

    tracing::info!("ces logging initialized at {}", path.display());
    Ok(())
}

/// Stderr-only logging. Never fails; an already installed subscriber is kept.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn log_file_created_and_appended() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("state").join("ces");
        let (mut file, path) = open_log_file(&dir).unwrap();
        assert_eq!(path, dir.join("ces.log"));
        writeln!(file, "first").unwrap();
        drop(file);

        let (mut file, _) = open_log_file(&dir).unwrap();
        writeln!(file, "second").unwrap();
        drop(file);
        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn unwritable_log_dir_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("not-a-dir");
        fs::write(&blocker, b"x").unwrap();
        assert!(open_log_file(&blocker.join("ces")).is_err());
    }
}
