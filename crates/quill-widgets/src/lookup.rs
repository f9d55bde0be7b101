//! The remote collaborators the widgets depend on.
//!
//! Widgets hold these as `Arc<dyn …>` handed in at construction, so each
//! widget instance owns its own dependencies and tests can inject fakes.
//! Futures are `'static`: implementations clone whatever handle they need
//! (an HTTP client is cheap to clone) into the returned future.

use futures::future::BoxFuture;

use crate::candidate::Candidate;

/// Result of a remote lookup.
pub type LookupFuture<T> = BoxFuture<'static, Result<T, LookupError>>;

/// Why a lookup failed. Widgets never surface these to the user; they are
/// logged and the feature degrades silently.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// The request never produced a response (connection, timeout, ...).
    #[error("transport error: {0}")]
    Transport(String),
    /// The server answered with a non-success status.
    #[error("server returned status {0}")]
    Status(u16),
    /// The response body did not have the expected shape.
    #[error("malformed response: {0}")]
    Decode(String),
}

/// Tag suggestions for the tag picker.
pub trait TagSource: Send + Sync + 'static {
    /// Up to `limit` tags matching `query`, best first.
    fn suggest_tags(&self, query: &str, limit: usize) -> LookupFuture<Vec<Candidate>>;
}

/// Article titles for the link editor.
pub trait ArticleSource: Send + Sync + 'static {
    /// Up to `limit` article titles matching `query`, best first.
    fn autocomplete(&self, query: &str, limit: usize) -> LookupFuture<Vec<Candidate>>;
}

/// Checks the internal links of a whole document.
pub trait LinkChecker: Send + Sync + 'static {
    fn validate(&self, content: &str) -> LookupFuture<ValidationResult>;
}

/// Outcome of validating every `[[target]]` in a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub has_missing: bool,
    /// Targets with no article, in server order.
    pub missing: Vec<String>,
    /// Targets that resolve to an article.
    pub valid: Vec<String>,
    /// Number of link occurrences found.
    pub total: usize,
}

impl ValidationResult {
    /// A result with no missing links.
    pub fn all_valid(valid: Vec<String>) -> Self {
        Self {
            has_missing: false,
            total: valid.len(),
            missing: Vec::new(),
            valid,
        }
    }
}
