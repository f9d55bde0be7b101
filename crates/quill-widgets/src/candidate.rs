//! Suggestion candidates and query emphasis.

use std::ops::Range;

use regex::RegexBuilder;

/// One suggested value returned by a remote lookup.
///
/// `identity` is the match key: it is what gets committed, what the tag
/// picker filters against its selected set, and what a click or `Enter`
/// selects. `display_text` is what the dropdown shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub identity: String,
    pub display_text: String,
    pub meta: CandidateMeta,
}

/// Optional extras shown next to a candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateMeta {
    /// Color hint, e.g. `"#3b82f6"` or `"blue"`.
    pub color: Option<String>,
    /// Usage count.
    pub count: Option<u64>,
}

impl Candidate {
    /// A candidate whose display text is its identity.
    pub fn new(identity: impl Into<String>) -> Self {
        let identity = identity.into();
        Self {
            display_text: identity.clone(),
            identity,
            meta: CandidateMeta::default(),
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.meta.color = Some(color.into());
        self
    }

    pub fn with_count(mut self, count: u64) -> Self {
        self.meta.count = Some(count);
        self
    }
}

/// Byte ranges of `text` that match `query`, case-insensitively.
///
/// The query is matched literally: regex syntax such as `c++` or `(draft`
/// is escaped, so any user input is safe here. An empty query matches
/// nothing.
pub fn emphasis_ranges(text: &str, query: &str) -> Vec<Range<usize>> {
    if query.is_empty() {
        return Vec::new();
    }
    match RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => re.find_iter(text).map(|m| m.range()).collect(),
        Err(err) => {
            tracing::debug!(error = %err, query, "emphasis pattern rejected");
            Vec::new()
        }
    }
}

/// Split `text` into `(segment, emphasized)` pieces covering the whole string.
pub fn emphasized_segments<'a>(text: &'a str, query: &str) -> Vec<(&'a str, bool)> {
    let mut segments = Vec::new();
    let mut last = 0;
    for range in emphasis_ranges(text, query) {
        if range.start > last {
            segments.push((&text[last..range.start], false));
        }
        segments.push((&text[range.clone()], true));
        last = range.end;
    }
    if last < text.len() {
        segments.push((&text[last..], false));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_uses_identity_as_display_text() {
        let c = Candidate::new("rust").with_color("#f74c00").with_count(12);
        assert_eq!(c.display_text, "rust");
        assert_eq!(c.meta.color.as_deref(), Some("#f74c00"));
        assert_eq!(c.meta.count, Some(12));
    }

    #[test]
    fn emphasis_is_case_insensitive() {
        assert_eq!(emphasis_ranges("Python and python", "PYTH"), vec![0..4, 11..15]);
    }

    #[test]
    fn regex_syntax_in_query_is_literal() {
        assert_eq!(emphasis_ranges("c++ and c", "c++"), vec![0..3]);
        assert_eq!(emphasis_ranges("(draft) notes", "(draft"), vec![0..6]);
        assert!(emphasis_ranges("anything", ".*").is_empty());
    }

    #[test]
    fn empty_query_emphasizes_nothing() {
        assert!(emphasis_ranges("abc", "").is_empty());
        assert_eq!(emphasized_segments("abc", ""), vec![("abc", false)]);
    }

    #[test]
    fn segments_cover_the_whole_text() {
        assert_eq!(
            emphasized_segments("Learn Rust fast", "rust"),
            vec![("Learn ", false), ("Rust", true), (" fast", false)]
        );
        assert_eq!(emphasized_segments("rust", "rust"), vec![("rust", true)]);
    }
}
