//! Persist the last refresh report (JSON under XDG state dir) so `ces status` can show it.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::RefreshReport;

impl RefreshReport {
    /// Default path: `~/.local/state/ces/last_refresh.json`.
    pub fn default_path() -> Result<PathBuf> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("ces")?;
        Ok(xdg_dirs.get_state_home().join("last_refresh.json"))
    }

    /// Save to the given path (creates parent dir if needed).
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("serialize refresh report")?;
        std::fs::write(path, json)
            .with_context(|| format!("write refresh report: {}", path.display()))?;
        Ok(())
    }

    /// Load from the given path. A missing file is `Ok(None)`.
    pub fn load_from_path(path: &Path) -> Result<Option<RefreshReport>> {
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("read refresh report: {}", path.display()))
            }
        };
        let report = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse refresh report: {}", path.display()))?;
        Ok(Some(report))
    }
}
