//! Wiring shared by commands: registry, cache store, fetcher and rewriter built from config.

use anyhow::Result;
use ces_core::config::CesConfig;
use ces_core::fetch::CurlFetcher;
use ces_core::refresh::{RefreshReport, Refresher};
use ces_core::registry::ScriptRegistry;
use ces_core::rewrite::OutputRewriter;
use ces_core::store::CacheStore;
use std::sync::Arc;

pub struct Context {
    pub cfg: CesConfig,
    pub registry: Arc<ScriptRegistry>,
    pub store: Arc<CacheStore>,
}

impl Context {
    pub fn from_config(cfg: CesConfig) -> Result<Self> {
        let registry = Arc::new(ScriptRegistry::builtin()?);
        let store = Arc::new(CacheStore::new(&cfg.uploads_root()?));
        Ok(Self {
            cfg,
            registry,
            store,
        })
    }

    pub fn refresher(&self) -> Refresher {
        let refresher = Refresher::new(
            Arc::clone(&self.registry),
            Arc::new(CurlFetcher::from_config(&self.cfg)),
            Arc::clone(&self.store),
        );
        match RefreshReport::default_path() {
            Ok(path) => refresher.with_report_path(path),
            Err(e) => {
                tracing::debug!("no state dir for refresh report: {:#}", e);
                refresher
            }
        }
    }

    pub fn rewriter(&self) -> Result<OutputRewriter> {
        Ok(OutputRewriter::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.store),
            &self.cfg.base_url,
        )?)
    }
}
