//! Response shapes of the article server.
//!
//! Suggestion payloads are read leniently: entries that do not have the
//! expected shape are skipped so one bad row never hides the rest. The
//! validation payload is strict about `has_missing`, since the submit gate
//! depends on it.

use quill_widgets::{Candidate, ValidationResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub(crate) struct ValidateRequest<'a> {
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ValidateResponse {
    pub has_missing: bool,
    #[serde(default)]
    pub missing: Vec<String>,
    #[serde(default)]
    pub valid: Vec<String>,
    #[serde(default)]
    pub total: Option<usize>,
}

impl From<ValidateResponse> for ValidationResult {
    fn from(response: ValidateResponse) -> Self {
        let total = response
            .total
            .unwrap_or(response.valid.len() + response.missing.len());
        ValidationResult {
            has_missing: response.has_missing,
            missing: response.missing,
            valid: response.valid,
            total,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExistsResponse {
    pub exists: bool,
}

fn suggestion_entries(body: &Value) -> &[Value] {
    match body.get("suggestions").and_then(Value::as_array) {
        Some(entries) => entries.as_slice(),
        None => {
            tracing::debug!("response has no suggestions array");
            &[]
        }
    }
}

/// `{ suggestions: [{ tag, color, count }] }`. Bare strings are accepted as
/// tags without metadata.
pub(crate) fn tag_candidates(body: &Value) -> Vec<Candidate> {
    suggestion_entries(body)
        .iter()
        .filter_map(|entry| {
            let candidate = match entry {
                Value::String(tag) => Some(Candidate::new(tag.as_str())),
                Value::Object(fields) => fields.get("tag").and_then(Value::as_str).map(|tag| {
                    let mut candidate = Candidate::new(tag);
                    candidate.meta.color = fields
                        .get("color")
                        .and_then(Value::as_str)
                        .map(str::to_string);
                    candidate.meta.count = fields.get("count").and_then(Value::as_u64);
                    candidate
                }),
                _ => None,
            };
            let candidate = candidate.filter(|c| !c.identity.trim().is_empty());
            if candidate.is_none() {
                tracing::debug!(%entry, "skipping malformed tag suggestion");
            }
            candidate
        })
        .collect()
}

/// `{ suggestions: [title] }`.
pub(crate) fn title_candidates(body: &Value) -> Vec<Candidate> {
    suggestion_entries(body)
        .iter()
        .filter_map(|entry| match entry.as_str() {
            Some(title) if !title.trim().is_empty() => Some(Candidate::new(title)),
            _ => {
                tracing::debug!(%entry, "skipping malformed title suggestion");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn reads_tag_metadata() {
        let body = json!({"suggestions": [
            {"tag": "rust", "color": "#f74c00", "count": 12},
            {"tag": "ruby"},
        ]});
        assert_eq!(
            tag_candidates(&body),
            vec![
                Candidate::new("rust").with_color("#f74c00").with_count(12),
                Candidate::new("ruby"),
            ]
        );
    }

    #[test]
    fn skips_malformed_tag_entries() {
        let body = json!({"suggestions": [
            {"name": "wrong key"},
            42,
            {"tag": "  "},
            "plain",
            {"tag": "ok", "count": "many"},
        ]});
        assert_eq!(
            tag_candidates(&body),
            vec![Candidate::new("plain"), Candidate::new("ok")]
        );
    }

    #[test]
    fn missing_array_is_empty() {
        assert!(tag_candidates(&json!({"results": []})).is_empty());
        assert!(title_candidates(&json!([])).is_empty());
    }

    #[test]
    fn reads_titles() {
        let body = json!({"suggestions": ["Python", null, "Rust"]});
        assert_eq!(
            title_candidates(&body),
            vec![Candidate::new("Python"), Candidate::new("Rust")]
        );
    }

    #[test]
    fn validation_total_defaults_to_counted_targets() {
        let response: ValidateResponse =
            serde_json::from_value(json!({"has_missing": true, "missing": ["Go"], "valid": ["Rust"]}))
                .unwrap();
        let result = ValidationResult::from(response);
        assert_eq!(result.total, 2);
        assert_eq!(result.missing, vec!["Go".to_string()]);
    }

    #[test]
    fn validation_requires_has_missing() {
        assert!(serde_json::from_value::<ValidateResponse>(json!({"missing": []})).is_err());
    }
}
