use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Global configuration loaded from `~/.config/ces/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CesConfig {
    /// Root of the public uploads tree; cached scripts live in `<uploads_dir>/cached-scripts`.
    /// When missing, `~/.local/share/ces/uploads` is used.
    #[serde(default)]
    pub uploads_dir: Option<PathBuf>,
    /// Public URL under which `uploads_dir` is served (e.g. `https://example.com/uploads`).
    pub base_url: String,
    /// Connect timeout for upstream fetches, in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-transfer timeout for upstream fetches, in seconds.
    pub transfer_timeout_secs: u64,
    /// Interval between scheduled refreshes, in seconds (daily by default).
    pub refresh_interval_secs: u64,
    /// Emit the per-rule rewrite outcome listing after each flush.
    #[serde(default)]
    pub debug_outcomes: bool,
}

impl Default for CesConfig {
    fn default() -> Self {
        Self {
            uploads_dir: None,
            base_url: "/uploads".to_string(),
            connect_timeout_secs: 5,
            transfer_timeout_secs: 30,
            refresh_interval_secs: 24 * 60 * 60,
            debug_outcomes: false,
        }
    }
}

impl CesConfig {
    /// Resolved uploads root: the configured directory or the XDG data default.
    pub fn uploads_root(&self) -> Result<PathBuf> {
        match &self.uploads_dir {
            Some(dir) => Ok(dir.clone()),
            None => {
                let xdg_dirs = xdg::BaseDirectories::with_prefix("ces")?;
                Ok(xdg_dirs.get_data_home().join("uploads"))
            }
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1))
    }

    pub fn transfer_timeout(&self) -> Duration {
        Duration::from_secs(self.transfer_timeout_secs.max(self.connect_timeout_secs).max(1))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("ces")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<CesConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = CesConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: CesConfig = toml::from_str(&data)?;
    Ok(cfg)
}
