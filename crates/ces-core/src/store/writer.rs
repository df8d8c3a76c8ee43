//! Atomic file replacement: write a `.part` temp file next to the target, sync, rename.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Replace `final_path` with `data` so that concurrent readers see either the
/// old content or the new content, never a partial file. The temp file lives
/// in `dir` (same filesystem as `final_path`, so the rename is atomic) and is
/// removed if anything fails before the rename.
pub fn write_atomic(dir: &Path, final_path: &Path, data: &[u8]) -> Result<()> {
    let prefix = final_path
        .file_name()
        .map(|n| format!(".{}.", n.to_string_lossy()))
        .unwrap_or_else(|| ".".to_string());

    let mut tmp = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(TEMP_SUFFIX)
        .tempfile_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;

    tmp.write_all(data).context("temp file write failed")?;
    tmp.as_file().sync_all().context("temp file sync failed")?;

    tmp.persist(final_path).map_err(|e| {
        anyhow::Error::new(e.error).context(format!(
            "failed to rename temp file to {}",
            final_path.display()
        ))
    })?;
    Ok(())
}
