//! Registry validation errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("duplicate slug `{0}` in script registry")]
    DuplicateSlug(String),
    #[error("entries `{first}` and `{second}` share local basename `{basename}`")]
    DuplicateBasename {
        basename: String,
        first: String,
        second: String,
    },
    #[error("invalid local basename `{0}`: must be a single safe path segment")]
    InvalidBasename(String),
    #[error("invalid external URL `{url}` for `{slug}`: {reason}")]
    InvalidUrl {
        slug: String,
        url: String,
        reason: String,
    },
    #[error("entry `{0}` has no rewrite rules")]
    NoRules(String),
    #[error("literal matcher must not be empty")]
    EmptyLiteral,
    #[error("replacement template `{0}` has no `{{local_url}}` placeholder")]
    MissingPlaceholder(String),
    #[error("invalid rewrite pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
    #[error("rule for `{slug}` would match its own replacement `{replacement}`")]
    SelfMatching { slug: String, replacement: String },
}
