//! Script registry: the remote assets to mirror and how to rewrite references to them.
//!
//! The registry is immutable once built. Entries keep insertion order so that
//! refresh reports and rewrite diagnostics list them deterministically.

mod basename;
mod error;
mod rule;

pub use basename::is_safe_basename;
pub use error::RegistryError;
pub use rule::{Matcher, RewriteRule, RuleKind, LOCAL_URL_PLACEHOLDER};

use std::collections::{HashMap, HashSet};

/// One remote asset configured for mirroring.
#[derive(Debug, Clone)]
pub struct ScriptEntry {
    slug: String,
    external_url: String,
    local_basename: String,
    rules: Vec<RewriteRule>,
}

impl ScriptEntry {
    pub fn new(
        slug: impl Into<String>,
        external_url: impl Into<String>,
        local_basename: impl Into<String>,
        rules: Vec<RewriteRule>,
    ) -> Self {
        Self {
            slug: slug.into(),
            external_url: external_url.into(),
            local_basename: local_basename.into(),
            rules,
        }
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn external_url(&self) -> &str {
        &self.external_url
    }

    pub fn local_basename(&self) -> &str {
        &self.local_basename
    }

    pub fn rules(&self) -> &[RewriteRule] {
        &self.rules
    }

    fn validate(&self) -> Result<(), RegistryError> {
        if !is_safe_basename(&self.local_basename) {
            return Err(RegistryError::InvalidBasename(self.local_basename.clone()));
        }
        let invalid_url = |reason: String| RegistryError::InvalidUrl {
            slug: self.slug.clone(),
            url: self.external_url.clone(),
            reason,
        };
        let parsed = url::Url::parse(&self.external_url).map_err(|e| invalid_url(e.to_string()))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(invalid_url(format!("unsupported scheme `{}`", parsed.scheme())));
        }
        if self.rules.is_empty() {
            return Err(RegistryError::NoRules(self.slug.clone()));
        }
        Ok(())
    }
}

/// Ordered, validated set of [`ScriptEntry`] keyed by slug.
#[derive(Debug, Clone)]
pub struct ScriptRegistry {
    entries: Vec<ScriptEntry>,
}

impl ScriptRegistry {
    /// Builds a registry, rejecting duplicate slugs, duplicate basenames,
    /// unsafe basenames, non-HTTP URLs and entries without rules.
    pub fn new(entries: Vec<ScriptEntry>) -> Result<Self, RegistryError> {
        let mut slugs: HashSet<&str> = HashSet::new();
        let mut basenames: HashMap<&str, &str> = HashMap::new();
        for entry in &entries {
            entry.validate()?;
            if !slugs.insert(entry.slug()) {
                return Err(RegistryError::DuplicateSlug(entry.slug.clone()));
            }
            if let Some(first) = basenames.insert(entry.local_basename(), entry.slug()) {
                return Err(RegistryError::DuplicateBasename {
                    basename: entry.local_basename.clone(),
                    first: first.to_string(),
                    second: entry.slug.clone(),
                });
            }
        }
        Ok(Self { entries })
    }

    /// The built-in registry: Google Analytics `analytics.js` and legacy `ga.js`.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::new(vec![
            ScriptEntry::new(
                "analytics",
                "http://www.google-analytics.com/analytics.js",
                "analytics.js",
                vec![RewriteRule::pattern(
                    r"(?i:https?:)?//www\.google-analytics\.com/analytics\.js",
                    LOCAL_URL_PLACEHOLDER,
                )?],
            ),
            ScriptEntry::new(
                "ga",
                "http://www.google-analytics.com/ga.js",
                "ga.js",
                vec![RewriteRule::literal(
                    "ga.src = ('https:' == document.location.protocol ? 'https://ssl' : 'http://www') + '.google-analytics.com/ga.js';",
                    "ga.src = '{local_url}';",
                )?],
            ),
        ])
    }

    pub fn get(&self, slug: &str) -> Option<&ScriptEntry> {
        self.entries.iter().find(|e| e.slug == slug)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScriptEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(slug: &str, basename: &str) -> ScriptEntry {
        ScriptEntry::new(
            slug,
            format!("https://cdn.example.com/{basename}"),
            basename,
            vec![RewriteRule::literal(&format!("cdn.example.com/{basename}"), "{local_url}").unwrap()],
        )
    }

    #[test]
    fn builtin_has_two_entries_in_order() {
        let reg = ScriptRegistry::builtin().unwrap();
        let slugs: Vec<&str> = reg.iter().map(|e| e.slug()).collect();
        assert_eq!(slugs, ["analytics", "ga"]);
        assert_eq!(reg.get("ga").unwrap().local_basename(), "ga.js");
        assert_eq!(reg.get("analytics").unwrap().rules()[0].kind(), RuleKind::Pattern);
        assert_eq!(reg.get("ga").unwrap().rules()[0].kind(), RuleKind::Literal);
    }

    #[test]
    fn duplicate_basename_rejected() {
        let err = ScriptRegistry::new(vec![entry("a", "x.js"), entry("b", "x.js")]).unwrap_err();
        match err {
            RegistryError::DuplicateBasename { basename, first, second } => {
                assert_eq!(basename, "x.js");
                assert_eq!(first, "a");
                assert_eq!(second, "b");
            }
            other => panic!("expected DuplicateBasename, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_slug_rejected() {
        let err = ScriptRegistry::new(vec![entry("a", "x.js"), entry("a", "y.js")]).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateSlug(s) if s == "a"));
    }

    #[test]
    fn traversal_basename_rejected() {
        let err = ScriptRegistry::new(vec![entry("a", "../x.js")]).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidBasename(_)));
    }

    #[test]
    fn non_http_url_rejected() {
        let bad = ScriptEntry::new(
            "a",
            "file:///etc/passwd",
            "a.js",
            vec![RewriteRule::literal("x", "{local_url}").unwrap()],
        );
        let err = ScriptRegistry::new(vec![bad]).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidUrl { .. }));
    }

    #[test]
    fn entry_without_rules_rejected() {
        let bare = ScriptEntry::new("a", "https://cdn.example.com/a.js", "a.js", Vec::new());
        let err = ScriptRegistry::new(vec![bare]).unwrap_err();
        assert!(matches!(err, RegistryError::NoRules(_)));
    }

    #[test]
    fn lookup_by_slug() {
        let reg = ScriptRegistry::new(vec![entry("a", "a.js"), entry("b", "b.js")]).unwrap();
        assert_eq!(reg.len(), 2);
        assert!(reg.get("b").is_some());
        assert!(reg.get("c").is_none());
    }
}
