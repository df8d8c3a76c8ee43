//! Per-pass rewrite outcomes, used for diagnostics only.

use std::fmt;

use crate::registry::RuleKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// The rule changed the document.
    Applied,
    /// Nothing to rewrite (reference absent or already rewritten).
    NoMatch,
    /// No cached copy yet; the entry was skipped.
    ColdCache,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome {
    pub slug: String,
    pub rule_kind: RuleKind,
    pub status: OutcomeStatus,
}

impl RewriteOutcome {
    pub fn applied(&self) -> bool {
        self.status == OutcomeStatus::Applied
    }
}

/// Rewritten document plus one outcome per (entry, rule), in registry order.
#[derive(Debug, Clone)]
pub struct RewriteReport<D = String> {
    pub html: D,
    pub outcomes: Vec<RewriteOutcome>,
}

impl<D> RewriteReport<D> {
    pub fn changed(&self) -> bool {
        self.outcomes.iter().any(RewriteOutcome::applied)
    }
}

impl fmt::Display for RewriteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self.status {
            OutcomeStatus::Applied => "applied",
            OutcomeStatus::NoMatch => "no match",
            OutcomeStatus::ColdCache => "skipped (not cached)",
        };
        write!(f, "{} [{}]: {}", self.slug, self.rule_kind, status)
    }
}

/// Human-readable listing of outcomes, one per line.
pub fn format_outcomes(outcomes: &[RewriteOutcome]) -> String {
    let mut out = String::new();
    for o in outcomes {
        out.push_str(&o.to_string());
        out.push('\n');
    }
    out
}
