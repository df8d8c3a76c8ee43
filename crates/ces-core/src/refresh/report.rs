//! Per-entry outcomes of a refresh pass.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RefreshOutcome {
    /// New content persisted.
    Written { bytes: u64 },
    /// Upstream bytes equal the cached bytes; nothing written.
    Unchanged,
    /// Upstream answered with an empty body; cache left as is.
    EmptyBody,
    FetchFailed { reason: String },
    WriteFailed { reason: String },
}

impl RefreshOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            RefreshOutcome::EmptyBody
                | RefreshOutcome::FetchFailed { .. }
                | RefreshOutcome::WriteFailed { .. }
        )
    }
}

impl fmt::Display for RefreshOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshOutcome::Written { bytes } => write!(f, "written ({} bytes)", bytes),
            RefreshOutcome::Unchanged => write!(f, "unchanged"),
            RefreshOutcome::EmptyBody => write!(f, "empty response, kept cache"),
            RefreshOutcome::FetchFailed { reason } => write!(f, "fetch failed: {}", reason),
            RefreshOutcome::WriteFailed { reason } => write!(f, "write failed: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRefresh {
    pub slug: String,
    pub url: String,
    #[serde(flatten)]
    pub outcome: RefreshOutcome,
}

/// Result of one `refresh_all` pass, in registry order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshReport {
    /// Unix seconds at which the pass started.
    pub started_at: u64,
    pub entries: Vec<EntryRefresh>,
}

impl RefreshReport {
    pub fn written(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, RefreshOutcome::Written { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_failure()).count()
    }

    pub fn outcome(&self, slug: &str) -> Option<&RefreshOutcome> {
        self.entries.iter().find(|e| e.slug == slug).map(|e| &e.outcome)
    }
}

impl fmt::Display for RefreshReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for e in &self.entries {
            writeln!(f, "{:<12} {}", e.slug, e.outcome)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> RefreshReport {
        RefreshReport {
            started_at: 1_700_000_000,
            entries: vec![
                EntryRefresh {
                    slug: "a".into(),
                    url: "https://x/a.js".into(),
                    outcome: RefreshOutcome::Written { bytes: 10 },
                },
                EntryRefresh {
                    slug: "b".into(),
                    url: "https://x/b.js".into(),
                    outcome: RefreshOutcome::FetchFailed {
                        reason: "HTTP 500".into(),
                    },
                },
            ],
        }
    }

    #[test]
    fn counts_and_lookup() {
        let r = report();
        assert_eq!(r.written(), 1);
        assert_eq!(r.failed(), 1);
        assert_eq!(r.outcome("a"), Some(&RefreshOutcome::Written { bytes: 10 }));
        assert!(r.outcome("c").is_none());
    }

    #[test]
    fn json_shape_is_flat() {
        let json = serde_json::to_value(report()).unwrap();
        assert_eq!(json["entries"][0]["outcome"], "written");
        assert_eq!(json["entries"][0]["bytes"], 10);
        assert_eq!(json["entries"][1]["reason"], "HTTP 500");
    }

    #[test]
    fn display_lists_each_entry() {
        let text = report().to_string();
        assert!(text.contains("written (10 bytes)"));
        assert!(text.contains("fetch failed: HTTP 500"));
    }
}
