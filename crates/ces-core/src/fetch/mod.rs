//! Upstream fetching of mirrored scripts.
//!
//! [`RemoteFetcher`] is the seam the refresh pass depends on; [`CurlFetcher`]
//! is the libcurl-backed implementation. Tests substitute their own fetcher
//! so no real network access is needed.

mod error;

pub use error::{FetchError, FetchErrorKind};

use std::time::Duration;

use crate::config::CesConfig;

const MAX_REDIRECTS: u32 = 5;

/// Fetches the raw bytes behind a URL. A failure is a definite "no data"
/// signal for that URL only; callers decide what to do with it.
pub trait RemoteFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Plain HTTP(S) GET via libcurl with bounded connect and transfer time.
#[derive(Debug, Clone, Copy)]
pub struct CurlFetcher {
    connect_timeout: Duration,
    transfer_timeout: Duration,
}

impl CurlFetcher {
    pub fn new(connect_timeout: Duration, transfer_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            transfer_timeout,
        }
    }

    pub fn from_config(cfg: &CesConfig) -> Self {
        Self::new(cfg.connect_timeout(), cfg.transfer_timeout())
    }
}

impl Default for CurlFetcher {
    fn default() -> Self {
        Self::from_config(&CesConfig::default())
    }
}

impl RemoteFetcher for CurlFetcher {
    /// Runs in the current thread; call from `spawn_blocking` if used from async code.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut body = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.max_redirections(MAX_REDIRECTS)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.transfer_timeout)?;

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Http(code));
        }
        tracing::debug!(url, bytes = body.len(), "fetched");
        Ok(body)
    }
}
