//! Whole-document link validation with a submit gate.
//!
//! Every edit re-validates the full content. Requests carry a ticket keyed
//! by a hash of the content they were issued for, so a result is applied
//! only while the editor still holds that exact content. Content without
//! any closed `[[target]]` is settled locally.
//!
//! Submission runs its own fresh check on a separate tracker: an outcome
//! arriving after the content changed is dropped and the user submits again.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::IndexSet;

use crate::lookup::{LinkChecker, LookupError, LookupFuture, ValidationResult};
use crate::query::has_link_markup;
use crate::request::{RequestTracker, Ticket};

/// Hash identifying one version of the document.
pub fn content_hash(content: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    hasher.finish()
}

/// A validation request to run: its ticket and the pending lookup.
pub struct Check {
    pub ticket: Ticket<u64>,
    pub future: LookupFuture<ValidationResult>,
}

impl std::fmt::Debug for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Check").field("ticket", &self.ticket).finish()
    }
}

/// How a submission check started.
#[derive(Debug)]
pub enum SubmitStart {
    /// No remote check needed.
    Ready(SubmitVerdict),
    /// Await this check, then call [`LinkValidator::finish_submit`].
    Pending(Check),
}

/// Outcome of a submission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitVerdict {
    /// Every link resolves.
    Allowed,
    /// The check failed; submission proceeds anyway.
    FailedOpen,
    /// These targets are missing; submission is blocked.
    Blocked(Vec<String>),
}

impl SubmitVerdict {
    pub fn allows_submit(&self) -> bool {
        !matches!(self, SubmitVerdict::Blocked(_))
    }
}

pub struct LinkValidator {
    checker: Arc<dyn LinkChecker>,
    background: RequestTracker<u64>,
    submit: RequestTracker<u64>,
    live_hash: Option<u64>,
    checked_hash: Option<u64>,
    result: Option<ValidationResult>,
    warnings: IndexSet<String>,
    pending: bool,
}

impl LinkValidator {
    pub fn new(checker: Arc<dyn LinkChecker>) -> Self {
        Self {
            checker,
            background: RequestTracker::new(),
            submit: RequestTracker::new(),
            live_hash: None,
            checked_hash: None,
            result: None,
            warnings: IndexSet::new(),
            pending: false,
        }
    }

    /// Missing targets from the last accepted result, once each, in server order.
    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.warnings.iter().map(String::as_str)
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// The last accepted result.
    pub fn result(&self) -> Option<&ValidationResult> {
        self.result.as_ref()
    }

    /// Whether a background check for the live content is outstanding.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Whether the warnings on display were computed for `content`.
    pub fn warnings_current_for(&self, content: &str) -> bool {
        self.has_warnings() && self.checked_hash == Some(content_hash(content))
    }

    /// Record that the document now reads `content`. Returns the request to
    /// run, or `None` when the content was settled locally.
    pub fn content_changed(&mut self, content: &str) -> Option<Check> {
        let hash = content_hash(content);
        self.live_hash = Some(hash);
        self.submit.clear();
        if !has_link_markup(content) {
            self.background.set_live(hash);
            self.accept(hash, ValidationResult::default());
            return None;
        }
        let ticket = self.background.issue(hash);
        self.pending = true;
        tracing::debug!(request = ticket.id.get(), "validating links");
        Some(Check {
            ticket,
            future: self.checker.validate(content),
        })
    }

    /// Apply a background result. Returns `false` when it was stale.
    pub fn apply(
        &mut self,
        ticket: &Ticket<u64>,
        result: Result<ValidationResult, LookupError>,
    ) -> bool {
        if !self.background.is_current(ticket) {
            tracing::debug!(request = ticket.id.get(), "discarding stale validation");
            return false;
        }
        self.pending = false;
        match result {
            Ok(result) => self.accept(ticket.key, result),
            Err(err) => {
                tracing::warn!(error = %err, "link validation failed, keeping previous warnings");
            }
        }
        true
    }

    /// Start a fresh check of `content` for submission.
    pub fn begin_submit(&mut self, content: &str) -> SubmitStart {
        let hash = content_hash(content);
        self.live_hash = Some(hash);
        if !has_link_markup(content) {
            self.accept(hash, ValidationResult::default());
            return SubmitStart::Ready(SubmitVerdict::Allowed);
        }
        let ticket = self.submit.issue(hash);
        tracing::debug!(request = ticket.id.get(), "validating links before submit");
        SubmitStart::Pending(Check {
            ticket,
            future: self.checker.validate(content),
        })
    }

    /// Resolve a submission check. `None` when the content changed while it
    /// was in flight.
    pub fn finish_submit(
        &mut self,
        ticket: &Ticket<u64>,
        result: Result<ValidationResult, LookupError>,
    ) -> Option<SubmitVerdict> {
        if !self.submit.is_current(ticket) || self.live_hash != Some(ticket.key) {
            tracing::debug!(request = ticket.id.get(), "content changed during submit check");
            return None;
        }
        self.submit.clear();
        match result {
            Ok(result) => {
                self.accept(ticket.key, result);
                if self.has_warnings() {
                    Some(SubmitVerdict::Blocked(self.warnings.iter().cloned().collect()))
                } else {
                    Some(SubmitVerdict::Allowed)
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "link validation failed at submit, allowing");
                Some(SubmitVerdict::FailedOpen)
            }
        }
    }

    fn accept(&mut self, hash: u64, result: ValidationResult) {
        self.warnings = if result.has_missing {
            result.missing.iter().cloned().collect()
        } else {
            IndexSet::new()
        };
        if result.has_missing && self.warnings.is_empty() {
            tracing::debug!("server reported missing links without naming them");
        }
        self.checked_hash = Some(hash);
        self.result = Some(result);
        if self.live_hash == Some(hash) {
            self.pending = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{FailingSource, KnownArticles};
    use pretty_assertions::assert_eq;

    fn validator() -> LinkValidator {
        LinkValidator::new(Arc::new(KnownArticles::new(["Python", "Rust"])))
    }

    fn run(check: Check) -> (Ticket<u64>, Result<ValidationResult, LookupError>) {
        (check.ticket, futures::executor::block_on(check.future))
    }

    fn warnings(v: &LinkValidator) -> Vec<&str> {
        v.warnings().collect()
    }

    #[test]
    fn content_without_links_settles_locally() {
        let mut v = validator();
        assert!(v.content_changed("plain prose").is_none());
        assert!(!v.has_warnings());
        assert!(!v.is_pending());
        assert_eq!(v.result(), Some(&ValidationResult::default()));
    }

    #[test]
    fn missing_targets_become_warnings_once_each() {
        let mut v = validator();
        let check = v.content_changed("[[Go]] [[Rust]] [[Zig]] [[Go]]").unwrap();
        assert!(v.is_pending());
        let (ticket, result) = run(check);
        assert!(v.apply(&ticket, result));
        assert_eq!(warnings(&v), vec!["Go", "Zig"]);
        assert!(v.warnings_current_for("[[Go]] [[Rust]] [[Zig]] [[Go]]"));
        assert!(!v.is_pending());
    }

    #[test]
    fn stale_validation_is_discarded() {
        let mut v = validator();
        let first = v.content_changed("[[Go]]").unwrap();
        let second = v.content_changed("[[Rust]]").unwrap();
        let (t2, r2) = run(second);
        assert!(v.apply(&t2, r2));
        let (t1, r1) = run(first);
        assert!(!v.apply(&t1, r1));
        assert!(!v.has_warnings());
    }

    #[test]
    fn background_failure_keeps_previous_warnings() {
        let mut v = validator();
        let (t, r) = run(v.content_changed("[[Go]]").unwrap());
        v.apply(&t, r);
        let check = v.content_changed("[[Go]] more").unwrap();
        assert!(v.apply(&check.ticket, Err(LookupError::Status(500))));
        assert_eq!(warnings(&v), vec!["Go"]);
        assert!(!v.warnings_current_for("[[Go]] more"));
    }

    #[test]
    fn submit_blocks_on_missing_links() {
        let mut v = validator();
        let SubmitStart::Pending(check) = v.begin_submit("[[Go]] and [[Python]]") else {
            panic!("expected a remote check");
        };
        let (t, r) = run(check);
        assert_eq!(
            v.finish_submit(&t, r),
            Some(SubmitVerdict::Blocked(vec!["Go".to_string()]))
        );
    }

    #[test]
    fn submit_without_links_is_allowed_immediately() {
        let mut v = validator();
        assert!(matches!(
            v.begin_submit("nothing linked"),
            SubmitStart::Ready(SubmitVerdict::Allowed)
        ));
    }

    #[test]
    fn blank_link_is_checked_remotely() {
        let mut v = validator();
        assert!(v.content_changed("see [[ ]] here").is_some());
        let SubmitStart::Pending(check) = v.begin_submit("see [[ ]] here") else {
            panic!("expected a remote check");
        };
        let missing = ValidationResult {
            has_missing: true,
            missing: vec![" ".to_string()],
            valid: Vec::new(),
            total: 1,
        };
        assert_eq!(
            v.finish_submit(&check.ticket, Ok(missing)),
            Some(SubmitVerdict::Blocked(vec![" ".to_string()]))
        );
    }

    #[test]
    fn submit_fails_open() {
        let mut v = LinkValidator::new(Arc::new(FailingSource));
        let SubmitStart::Pending(check) = v.begin_submit("[[Go]]") else {
            panic!("expected a remote check");
        };
        let (t, r) = run(check);
        assert_eq!(v.finish_submit(&t, r), Some(SubmitVerdict::FailedOpen));
    }

    #[test]
    fn submit_outcome_dropped_after_edit() {
        let mut v = validator();
        let SubmitStart::Pending(check) = v.begin_submit("[[Go]]") else {
            panic!("expected a remote check");
        };
        v.content_changed("[[Go]] edited");
        let (t, r) = run(check);
        assert_eq!(v.finish_submit(&t, r), None);
    }

    #[test]
    fn hash_distinguishes_content() {
        assert_eq!(content_hash("abc"), content_hash("abc"));
        assert_ne!(content_hash("abc"), content_hash("abd"));
    }
}
