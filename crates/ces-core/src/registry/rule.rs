//! Rewrite rules: a matcher plus a replacement template.
//!
//! Matching runs on bytes so documents in legacy encodings are rewritten as
//! well; only the matched ranges change, every other byte is kept.

use regex::bytes::{NoExpand, Regex};
use std::borrow::Cow;
use std::fmt;

use super::RegistryError;

/// Placeholder in replacement templates that is resolved to the local URL.
pub const LOCAL_URL_PLACEHOLDER: &str = "{local_url}";

/// Which kind of matcher a rule uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Literal,
    Pattern,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Literal => write!(f, "literal"),
            RuleKind::Pattern => write!(f, "pattern"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Matcher {
    /// Exact, non-empty substring, including surrounding syntax.
    Literal(Vec<u8>),
    Pattern(Regex),
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| i + from)
}

impl Matcher {
    pub fn kind(&self) -> RuleKind {
        match self {
            Matcher::Literal(_) => RuleKind::Literal,
            Matcher::Pattern(_) => RuleKind::Pattern,
        }
    }

    pub fn is_match(&self, text: &[u8]) -> bool {
        match self {
            Matcher::Literal(needle) => find(text, needle, 0).is_some(),
            Matcher::Pattern(re) => re.is_match(text),
        }
    }

    /// Replace every match in `text` with `replacement`, inserted verbatim.
    fn replace_all<'t>(&self, text: &'t [u8], replacement: &[u8]) -> Cow<'t, [u8]> {
        match self {
            Matcher::Literal(needle) => {
                let Some(first) = find(text, needle, 0) else {
                    return Cow::Borrowed(text);
                };
                let mut out = Vec::with_capacity(text.len());
                let mut pos = 0;
                let mut next = Some(first);
                while let Some(at) = next {
                    out.extend_from_slice(&text[pos..at]);
                    out.extend_from_slice(replacement);
                    pos = at + needle.len();
                    next = find(text, needle, pos);
                }
                out.extend_from_slice(&text[pos..]);
                Cow::Owned(out)
            }
            Matcher::Pattern(re) => re.replace_all(text, NoExpand(replacement)),
        }
    }
}

/// A matcher and a replacement template containing [`LOCAL_URL_PLACEHOLDER`].
#[derive(Debug, Clone)]
pub struct RewriteRule {
    matcher: Matcher,
    template: String,
}

impl RewriteRule {
    /// Exact-substring rule.
    pub fn literal(needle: &str, template: &str) -> Result<Self, RegistryError> {
        if needle.is_empty() {
            return Err(RegistryError::EmptyLiteral);
        }
        Self::new(Matcher::Literal(needle.as_bytes().to_vec()), template)
    }

    /// Regular-expression rule (`regex` crate syntax).
    pub fn pattern(pattern: &str, template: &str) -> Result<Self, RegistryError> {
        Self::new(Matcher::Pattern(Regex::new(pattern)?), template)
    }

    fn new(matcher: Matcher, template: &str) -> Result<Self, RegistryError> {
        if !template.contains(LOCAL_URL_PLACEHOLDER) {
            return Err(RegistryError::MissingPlaceholder(template.to_string()));
        }
        Ok(Self {
            matcher,
            template: template.to_string(),
        })
    }

    pub fn kind(&self) -> RuleKind {
        self.matcher.kind()
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Replacement text with the placeholder resolved to `local_url`.
    pub fn render(&self, local_url: &str) -> String {
        self.template.replace(LOCAL_URL_PLACEHOLDER, local_url)
    }

    /// Apply the rule to `text`. Borrowed when nothing matched.
    pub fn apply<'t>(&self, text: &'t [u8], local_url: &str) -> Cow<'t, [u8]> {
        self.matcher
            .replace_all(text, self.render(local_url).as_bytes())
    }
}
