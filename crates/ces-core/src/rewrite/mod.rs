//! Output rewriter: points references to mirrored scripts at their local copies.
//!
//! An entry is only rewritten when its cached file exists, so a cold cache
//! leaves the original remote reference in place. Every rule is checked at
//! construction to not match its own replacement, which makes a second pass
//! over already rewritten output a no-op.

mod outcome;

pub use outcome::{format_outcomes, OutcomeStatus, RewriteOutcome, RewriteReport};

use std::borrow::Cow;
use std::sync::Arc;

use crate::registry::{RegistryError, ScriptRegistry};
use crate::store::{CacheStore, CACHE_SUBDIR};

pub struct OutputRewriter {
    registry: Arc<ScriptRegistry>,
    store: Arc<CacheStore>,
    base_url: String,
}

impl OutputRewriter {
    /// `base_url` is the public URL of the uploads root; a trailing `/` is ignored.
    pub fn new(
        registry: Arc<ScriptRegistry>,
        store: Arc<CacheStore>,
        base_url: &str,
    ) -> Result<Self, RegistryError> {
        let rewriter = Self {
            registry,
            store,
            base_url: base_url.trim_end_matches('/').to_string(),
        };
        for entry in rewriter.registry.iter() {
            let local_url = rewriter.local_url(entry.local_basename());
            for rule in entry.rules() {
                let replacement = rule.render(&local_url);
                if rule.matcher().is_match(replacement.as_bytes()) {
                    return Err(RegistryError::SelfMatching {
                        slug: entry.slug().to_string(),
                        replacement,
                    });
                }
            }
        }
        Ok(rewriter)
    }

    /// Public URL of the cached copy of `basename`.
    pub fn local_url(&self, basename: &str) -> String {
        format!("{}/{}/{}", self.base_url, CACHE_SUBDIR, basename)
    }

    /// Rewrite `html`, returning the new document and per-rule outcomes.
    pub fn rewrite(&self, html: &str) -> RewriteReport {
        let report = self.rewrite_bytes(html.as_bytes());
        // Replacements are UTF-8 and matches fall on character boundaries.
        let html = String::from_utf8(report.html)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned());
        RewriteReport {
            html,
            outcomes: report.outcomes,
        }
    }

    /// Rewrite a document in any ASCII-compatible encoding. Bytes outside the
    /// matched references are kept as they are.
    pub fn rewrite_bytes(&self, html: &[u8]) -> RewriteReport<Vec<u8>> {
        let mut doc: Cow<'_, [u8]> = Cow::Borrowed(html);
        let mut outcomes = Vec::new();

        for entry in self.registry.iter() {
            let cached = self.store.exists(entry.local_basename());
            let local_url = self.local_url(entry.local_basename());
            for rule in entry.rules() {
                let status = if !cached {
                    OutcomeStatus::ColdCache
                } else {
                    let rewritten = match rule.apply(&doc, &local_url) {
                        Cow::Owned(next) if next.as_slice() != &*doc => Some(next),
                        _ => None,
                    };
                    match rewritten {
                        Some(next) => {
                            doc = Cow::Owned(next);
                            OutcomeStatus::Applied
                        }
                        None => OutcomeStatus::NoMatch,
                    }
                };
                outcomes.push(RewriteOutcome {
                    slug: entry.slug().to_string(),
                    rule_kind: rule.kind(),
                    status,
                });
            }
        }

        RewriteReport {
            html: doc.into_owned(),
            outcomes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{RewriteRule, RuleKind, ScriptEntry, LOCAL_URL_PLACEHOLDER};

    const GA_LOADER: &str = "ga.src = ('https:' == document.location.protocol ? 'https://ssl' : 'http://www') + '.google-analytics.com/ga.js';";
    const BASE: &str = "https://example.com/uploads";

    fn setup() -> (tempfile::TempDir, Arc<CacheStore>, OutputRewriter) {
        let root = tempfile::tempdir().unwrap();
        let store = Arc::new(CacheStore::new(root.path()));
        let rewriter = OutputRewriter::new(
            Arc::new(ScriptRegistry::builtin().unwrap()),
            Arc::clone(&store),
            BASE,
        )
        .unwrap();
        (root, store, rewriter)
    }

    fn page() -> String {
        format!(
            "<html><head><script src=\"//www.google-analytics.com/analytics.js\"></script>\n\
             <script>var ga = document.createElement('script'); {GA_LOADER}</script></head></html>"
        )
    }

    #[test]
    fn cold_cache_leaves_html_untouched() {
        let (_root, _store, rewriter) = setup();
        let html = page();
        let report = rewriter.rewrite(&html);
        assert_eq!(report.html, html);
        assert!(!report.changed());
        assert!(report
            .outcomes
            .iter()
            .all(|o| o.status == OutcomeStatus::ColdCache));
    }

    #[test]
    fn literal_loader_rewritten_when_cached() {
        let (_root, store, rewriter) = setup();
        store.write("ga.js", b"/* ga */").unwrap();
        let report = rewriter.rewrite(&page());
        assert!(report
            .html
            .contains("ga.src = 'https://example.com/uploads/cached-scripts/ga.js'"));
        assert!(!report.html.contains(GA_LOADER));
        // analytics.js is not cached, so its reference stays remote.
        assert!(report.html.contains("//www.google-analytics.com/analytics.js"));
        assert_eq!(
            report.outcomes,
            vec![
                RewriteOutcome {
                    slug: "analytics".into(),
                    rule_kind: RuleKind::Pattern,
                    status: OutcomeStatus::ColdCache,
                },
                RewriteOutcome {
                    slug: "ga".into(),
                    rule_kind: RuleKind::Literal,
                    status: OutcomeStatus::Applied,
                },
            ]
        );
    }

    #[test]
    fn pattern_covers_every_protocol_variant() {
        let (_root, store, rewriter) = setup();
        store.write("analytics.js", b"/* analytics */").unwrap();
        let html = "a http://www.google-analytics.com/analytics.js\n\
                    b https://www.google-analytics.com/analytics.js\n\
                    c //www.google-analytics.com/analytics.js\n\
                    d HTTPS://www.google-analytics.com/analytics.js\n";
        let report = rewriter.rewrite(html);
        let local = "https://example.com/uploads/cached-scripts/analytics.js";
        assert_eq!(
            report.html,
            format!("a {local}\nb {local}\nc {local}\nd {local}\n")
        );
        assert!(report.outcomes[0].applied());
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let (_root, store, rewriter) = setup();
        store.write("analytics.js", b"1").unwrap();
        store.write("ga.js", b"2").unwrap();
        let once = rewriter.rewrite(&page());
        assert!(once.changed());
        let twice = rewriter.rewrite(&once.html);
        assert_eq!(twice.html, once.html);
        assert!(twice
            .outcomes
            .iter()
            .all(|o| o.status == OutcomeStatus::NoMatch));
    }

    #[test]
    fn no_reference_is_a_normal_outcome() {
        let (_root, store, rewriter) = setup();
        store.write("ga.js", b"2").unwrap();
        let report = rewriter.rewrite("<p>plain</p>");
        assert_eq!(report.html, "<p>plain</p>");
        assert_eq!(report.outcomes[1].status, OutcomeStatus::NoMatch);
    }

    #[test]
    fn trailing_slash_in_base_url_ignored() {
        let root = tempfile::tempdir().unwrap();
        let rewriter = OutputRewriter::new(
            Arc::new(ScriptRegistry::builtin().unwrap()),
            Arc::new(CacheStore::new(root.path())),
            "/uploads/",
        )
        .unwrap();
        assert_eq!(rewriter.local_url("ga.js"), "/uploads/cached-scripts/ga.js");
    }

    #[test]
    fn self_matching_rule_rejected() {
        let root = tempfile::tempdir().unwrap();
        let registry = ScriptRegistry::new(vec![ScriptEntry::new(
            "x",
            "https://cdn.example.com/x.js",
            "x.js",
            vec![RewriteRule::literal("cached-scripts", LOCAL_URL_PLACEHOLDER).unwrap()],
        )])
        .unwrap();
        let err = OutputRewriter::new(
            Arc::new(registry),
            Arc::new(CacheStore::new(root.path())),
            "/uploads",
        )
        .err()
        .unwrap();
        assert!(matches!(err, RegistryError::SelfMatching { .. }));
    }

    #[test]
    fn outcome_listing_is_readable() {
        let (_root, store, rewriter) = setup();
        store.write("ga.js", b"2").unwrap();
        let listing = format_outcomes(&rewriter.rewrite(&page()).outcomes);
        assert_eq!(
            listing,
            "analytics [pattern]: skipped (not cached)\nga [literal]: applied\n"
        );
    }

    #[test]
    fn latin1_page_rewritten_byte_for_byte() {
        let (_root, store, rewriter) = setup();
        store.write("analytics.js", b"1").unwrap();
        let html = b"<p>Caf\xe9</p><script src=\"//www.google-analytics.com/analytics.js\"></script>\xa0";
        let report = rewriter.rewrite_bytes(html);
        assert_eq!(
            report.html,
            b"<p>Caf\xe9</p><script src=\"https://example.com/uploads/cached-scripts/analytics.js\"></script>\xa0"
                .to_vec()
        );
        assert!(report.outcomes[0].applied());
    }
}
