//! Fetch error type and its classification for diagnostics.

use std::fmt;
use thiserror::Error;

/// Error returned by a single upstream fetch (curl failure or HTTP error).
#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, DNS, connection, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
}

/// Coarse failure class, logged alongside the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Timeout,
    Connection,
    Http(u16),
    Other,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchErrorKind::Timeout => write!(f, "timeout"),
            FetchErrorKind::Connection => write!(f, "connection"),
            FetchErrorKind::Http(code) => write!(f, "http-{}", code),
            FetchErrorKind::Other => write!(f, "other"),
        }
    }
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Curl(e) => classify_curl_error(e),
            FetchError::Http(code) => FetchErrorKind::Http(*code as u16),
        }
    }
}

fn classify_curl_error(e: &curl::Error) -> FetchErrorKind {
    if e.is_operation_timedout() {
        return FetchErrorKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
    {
        return FetchErrorKind::Connection;
    }
    FetchErrorKind::Other
}
