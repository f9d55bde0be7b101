//! Query extraction for both widgets.
//!
//! The tag picker treats the whole (trimmed) field as the query and a
//! trailing comma as a commit signal. The link editor looks backward from
//! the cursor for the nearest unclosed `[[`.

use std::sync::LazyLock;

use regex::Regex;

/// Two-character marker that opens an internal link.
pub const OPEN_MARKER: &str = "[[";
/// Two-character marker that closes an internal link.
pub const CLOSE_MARKER: &str = "]]";
/// Separates tags in raw input and in the serialized submission value.
pub const TAG_DELIMITER: char = ',';

/// What the current tag field value asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagIntent {
    /// Nothing to look up (empty or whitespace-only).
    Empty,
    /// Look up suggestions for this text.
    Query(String),
    /// The user typed a trailing delimiter: commit this text as a tag.
    /// May be empty when the field held only a delimiter.
    Commit(String),
}

/// Classify the raw tag field value.
pub fn classify_tag_input(raw: &str) -> TagIntent {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return TagIntent::Empty;
    }
    match trimmed.strip_suffix(TAG_DELIMITER) {
        Some(rest) => TagIntent::Commit(rest.trim().to_string()),
        None => TagIntent::Query(trimmed.to_string()),
    }
}

/// An active link lookup: the marker position and the text typed after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkQuery {
    /// Char index of the first `[` of the open marker.
    pub start: usize,
    /// Text between the marker and the cursor. Never empty.
    pub query: String,
}

/// Char index of the nearest unclosed `[[` before `cursor`, if the cursor is
/// inside a trigger span.
///
/// Scans backward from the cursor: a `]` or a newline ends the search (the
/// span is closed or broken), and the first `[` must be the second half of a
/// `[[` pair. Only the nearest marker counts, so earlier closed pairs such as
/// `[[A]]` never interfere.
pub fn find_open_marker(chars: &[char], cursor: usize) -> Option<usize> {
    let cursor = cursor.min(chars.len());
    let mut i = cursor;
    while i > 0 {
        i -= 1;
        match chars[i] {
            ']' | '\n' => return None,
            '[' if i > 0 && chars[i - 1] == '[' => return Some(i - 1),
            '[' => return None,
            _ => {}
        }
    }
    None
}

/// The link lookup at `cursor`, or `None` when the cursor is not inside a
/// trigger span or nothing has been typed after the marker yet.
pub fn extract_link_query(chars: &[char], cursor: usize) -> Option<LinkQuery> {
    let start = find_open_marker(chars, cursor)?;
    let query: String = chars[start + OPEN_MARKER.len()..cursor.min(chars.len())]
        .iter()
        .collect();
    if query.is_empty() {
        return None;
    }
    Some(LinkQuery { start, query })
}

static LINK_TARGET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\[\]]+)\]\]").expect("link pattern is valid"));

/// Whether `text` holds any closed `[[...]]` the server would check,
/// including blank ones such as `[[ ]]`.
pub fn has_link_markup(text: &str) -> bool {
    LINK_TARGET.is_match(text)
}

/// Every closed `[[target]]` in `text`, in order of appearance, trimmed.
/// Blank targets are skipped.
pub fn scan_link_targets(text: &str) -> Vec<String> {
    LINK_TARGET
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|target| !target.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn query_at_end(s: &str) -> Option<String> {
        let c = chars(s);
        extract_link_query(&c, c.len()).map(|q| q.query)
    }

    #[test]
    fn trailing_comma_commits() {
        assert_eq!(classify_tag_input("foo,"), TagIntent::Commit("foo".into()));
        assert_eq!(classify_tag_input("  foo bar , "), TagIntent::Commit("foo bar".into()));
    }

    #[test]
    fn plain_text_is_a_query() {
        assert_eq!(classify_tag_input(" foo "), TagIntent::Query("foo".into()));
        assert_eq!(classify_tag_input("a,b"), TagIntent::Query("a,b".into()));
    }

    #[test]
    fn empty_and_delimiter_only_input() {
        assert_eq!(classify_tag_input("   "), TagIntent::Empty);
        assert_eq!(classify_tag_input(","), TagIntent::Commit(String::new()));
    }

    #[test]
    fn extracts_text_after_open_marker() {
        let c = chars("See [[Pyth");
        assert_eq!(
            extract_link_query(&c, c.len()),
            Some(LinkQuery {
                start: 4,
                query: "Pyth".into()
            })
        );
    }

    #[test]
    fn earlier_closed_pairs_do_not_confuse_extraction() {
        assert_eq!(query_at_end("[[A]] and [[B"), Some("B".into()));
        assert_eq!(query_at_end("[[A]] [[B]] [[C d"), Some("C d".into()));
    }

    #[test]
    fn closed_or_missing_marker_yields_nothing() {
        assert_eq!(query_at_end("[[A]] and more"), None);
        assert_eq!(query_at_end("just text"), None);
        assert_eq!(query_at_end("single [bracket"), None);
        assert_eq!(query_at_end("[[Broken\nline"), None);
    }

    #[test]
    fn empty_capture_is_not_a_query() {
        let c = chars("See [[");
        assert_eq!(extract_link_query(&c, c.len()), None);
        assert_eq!(find_open_marker(&c, c.len()), Some(4));
    }

    #[test]
    fn triple_bracket_uses_nearest_pair() {
        let c = chars("[[[abc");
        assert_eq!(extract_link_query(&c, c.len()).map(|q| q.start), Some(1));
    }

    #[test]
    fn extraction_respects_cursor_position() {
        let c = chars("[[Alpha]] tail");
        // cursor inside the closed pair, right after "Al"
        assert_eq!(
            extract_link_query(&c, 4).map(|q| q.query),
            Some("Al".to_string())
        );
        assert_eq!(extract_link_query(&c, c.len()), None);
    }

    #[test]
    fn scans_closed_link_targets() {
        assert_eq!(
            scan_link_targets("See [[Python]], [[ Rust ]] and [[unclosed"),
            vec!["Python".to_string(), "Rust".to_string()]
        );
        assert!(scan_link_targets("[[]] nothing").is_empty());
    }

    #[test]
    fn blank_targets_still_count_as_markup() {
        assert!(scan_link_targets("see [[ ]] here").is_empty());
        assert!(has_link_markup("see [[ ]] here"));
        assert!(has_link_markup("[[Rust]]"));
        assert!(!has_link_markup("[[]] and [[unclosed"));
    }
}
