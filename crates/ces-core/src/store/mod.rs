//! Local cache store: one plain file per registry entry under
//! `<uploads-root>/cached-scripts/`.
//!
//! The refresh path writes, the rewrite path only checks existence. Writes go
//! through a temp file and an atomic rename, so readers never observe a
//! partially written script and no locking is needed.

mod writer;

pub use writer::{write_atomic, TEMP_SUFFIX};

use anyhow::{Context, Result};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use crate::checksum;
use crate::registry::is_safe_basename;

/// Name of the cache subdirectory under the uploads root (also the URL path segment).
pub const CACHE_SUBDIR: &str = "cached-scripts";

/// Result of [`CacheStore::write_if_changed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Unchanged,
}

/// Metadata of a cached file.
#[derive(Debug, Clone)]
pub struct CachedAsset {
    pub path: PathBuf,
    pub size: u64,
    pub modified: SystemTime,
}

impl CachedAsset {
    /// Seconds since the last write; 0 if the mtime is in the future.
    pub fn age_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(self.modified)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

#[derive(Debug)]
pub struct CacheStore {
    dir: PathBuf,
    dir_ready: AtomicBool,
}

impl CacheStore {
    /// Store rooted at `<uploads_root>/cached-scripts`. Nothing is created until the first write.
    pub fn new(uploads_root: &Path) -> Self {
        Self {
            dir: uploads_root.join(CACHE_SUBDIR),
            dir_ready: AtomicBool::new(false),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path for `basename`, or an error if it is not a single safe path segment.
    pub fn path_for(&self, basename: &str) -> Result<PathBuf> {
        if !is_safe_basename(basename) {
            anyhow::bail!("invalid cache basename: {:?}", basename);
        }
        Ok(self.dir.join(basename))
    }

    pub fn exists(&self, basename: &str) -> bool {
        self.path_for(basename).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Cached bytes, or `None` if nothing is cached under `basename`.
    pub fn read(&self, basename: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(basename)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("read cached file: {}", path.display())),
        }
    }

    /// Size and modification time, or `None` if not cached.
    pub fn stat(&self, basename: &str) -> Result<Option<CachedAsset>> {
        let path = self.path_for(basename)?;
        let meta = match std::fs::metadata(&path) {
            Ok(m) if m.is_file() => m,
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("stat: {}", path.display())),
        };
        let modified = meta
            .modified()
            .with_context(|| format!("mtime: {}", path.display()))?;
        Ok(Some(CachedAsset {
            path,
            size: meta.len(),
            modified,
        }))
    }

    /// Seconds since `basename` was last written, or `None` if not cached.
    pub fn age_secs(&self, basename: &str) -> Result<Option<u64>> {
        Ok(self.stat(basename)?.map(|a| a.age_secs()))
    }

    /// Atomically replace the cached file for `basename` with `data`.
    pub fn write(&self, basename: &str, data: &[u8]) -> Result<()> {
        let path = self.path_for(basename)?;
        self.ensure_dir()?;
        match write_atomic(&self.dir, &path, data) {
            Err(_) if !self.dir.is_dir() => {
                // Removed behind our back: recreate once and retry.
                tracing::warn!(dir = %self.dir.display(), "cache directory vanished; recreating");
                self.dir_ready.store(false, Ordering::Release);
                self.ensure_dir()?;
                write_atomic(&self.dir, &path, data)
            }
            res => res,
        }
    }

    /// SHA-256 (lowercase hex) of the cached file, or `None` if not cached.
    pub fn sha256(&self, basename: &str) -> Result<Option<String>> {
        let path = self.path_for(basename)?;
        match checksum::sha256_path(&path) {
            Ok(digest) => Ok(Some(digest)),
            Err(_) if !path.is_file() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Write only when `data` differs from what is cached (or nothing is cached).
    pub fn write_if_changed(&self, basename: &str, data: &[u8]) -> Result<WriteOutcome> {
        if let Some(current) = self.read(basename)? {
            if current == data {
                return Ok(WriteOutcome::Unchanged);
            }
        }
        self.write(basename, data)?;
        Ok(WriteOutcome::Written)
    }

    fn ensure_dir(&self) -> Result<()> {
        if self.dir_ready.load(Ordering::Acquire) {
            return Ok(());
        }
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create cache dir: {}", self.dir.display()))?;
        if !self.dir_ready.swap(true, Ordering::AcqRel) {
            tracing::debug!(dir = %self.dir.display(), "cache directory ready");
        }
        Ok(())
    }
}
