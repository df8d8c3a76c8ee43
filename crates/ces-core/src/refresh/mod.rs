//! Refresh pass: fetch every registry entry and persist changed content.
//!
//! Per-entry failures are recorded in the report and logged, never propagated,
//! so one broken upstream does not keep the others from refreshing. Running the
//! pass twice against unchanged upstreams writes nothing the second time.

mod persist;
mod report;

pub use report::{EntryRefresh, RefreshOutcome, RefreshReport};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::fetch::RemoteFetcher;
use crate::registry::{ScriptEntry, ScriptRegistry};
use crate::store::{CacheStore, WriteOutcome};

/// Refresh every entry of `registry` in order.
pub fn refresh_all(
    registry: &ScriptRegistry,
    fetcher: &dyn RemoteFetcher,
    store: &CacheStore,
) -> RefreshReport {
    let started_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let entries = registry
        .iter()
        .map(|entry| EntryRefresh {
            slug: entry.slug().to_string(),
            url: entry.external_url().to_string(),
            outcome: refresh_entry(entry, fetcher, store),
        })
        .collect();

    let report = RefreshReport {
        started_at,
        entries,
    };
    tracing::info!(
        entries = report.entries.len(),
        written = report.written(),
        failed = report.failed(),
        "refresh pass finished"
    );
    report
}

fn refresh_entry(
    entry: &ScriptEntry,
    fetcher: &dyn RemoteFetcher,
    store: &CacheStore,
) -> RefreshOutcome {
    let slug = entry.slug();
    let url = entry.external_url();

    let body = match fetcher.fetch(url) {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(slug, url, kind = %e.kind(), "fetch failed: {}", e);
            return RefreshOutcome::FetchFailed {
                reason: e.to_string(),
            };
        }
    };
    if body.is_empty() {
        tracing::warn!(slug, url, "empty response; keeping cached copy");
        return RefreshOutcome::EmptyBody;
    }

    match store.write_if_changed(entry.local_basename(), &body) {
        Ok(WriteOutcome::Written) => {
            tracing::info!(slug, bytes = body.len(), "cached script updated");
            RefreshOutcome::Written {
                bytes: body.len() as u64,
            }
        }
        Ok(WriteOutcome::Unchanged) => {
            tracing::debug!(slug, "cached script unchanged");
            RefreshOutcome::Unchanged
        }
        Err(e) => {
            tracing::warn!(slug, "cache write failed: {:#}", e);
            RefreshOutcome::WriteFailed {
                reason: format!("{:#}", e),
            }
        }
    }
}

/// The single refresh entry point shared by the periodic trigger and on-demand runs.
pub struct Refresher {
    registry: Arc<ScriptRegistry>,
    fetcher: Arc<dyn RemoteFetcher>,
    store: Arc<CacheStore>,
    report_path: Option<PathBuf>,
}

impl Refresher {
    pub fn new(
        registry: Arc<ScriptRegistry>,
        fetcher: Arc<dyn RemoteFetcher>,
        store: Arc<CacheStore>,
    ) -> Self {
        Self {
            registry,
            fetcher,
            store,
            report_path: None,
        }
    }

    /// Also save each report as JSON at `path`.
    pub fn with_report_path(mut self, path: PathBuf) -> Self {
        self.report_path = Some(path);
        self
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Run one refresh pass. Blocking; use `spawn_blocking` from async code.
    pub fn refresh_all(&self) -> RefreshReport {
        let report = refresh_all(&self.registry, self.fetcher.as_ref(), &self.store);
        if let Some(path) = &self.report_path {
            if let Err(e) = report.save_to_path(path) {
                tracing::warn!(path = %path.display(), "could not save refresh report: {:#}", e);
            }
        }
        report
    }
}
