//! Request tickets that keep stale async results from being applied.
//!
//! Suggestion fetches and validations are never cancelled: a new keystroke
//! can issue a new request while older ones are still in flight, and they
//! may resolve in any order. Each request therefore carries a [`Ticket`]
//! naming the key (query text or content hash) that spawned it. A result is
//! applied only if its key still matches the live key at resolution time.

/// Monotonic request number, unique per tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Identifies one in-flight request and the key it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket<K> {
    pub id: RequestId,
    pub key: K,
}

/// Issues tickets and tracks the live key they are checked against.
#[derive(Debug, Clone)]
pub struct RequestTracker<K> {
    next_id: u64,
    live: Option<K>,
}

impl<K> Default for RequestTracker<K> {
    fn default() -> Self {
        Self {
            next_id: 0,
            live: None,
        }
    }
}

impl<K: Clone + PartialEq> RequestTracker<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `key` live and issue a ticket for it.
    pub fn issue(&mut self, key: K) -> Ticket<K> {
        self.next_id += 1;
        self.live = Some(key.clone());
        Ticket {
            id: RequestId(self.next_id),
            key,
        }
    }

    /// Set the live key without issuing a request.
    pub fn set_live(&mut self, key: K) {
        self.live = Some(key);
    }

    /// Nothing is live any more; every outstanding ticket becomes stale.
    pub fn clear(&mut self) {
        self.live = None;
    }

    /// The current live key.
    pub fn live(&self) -> Option<&K> {
        self.live.as_ref()
    }

    /// Whether a result for `ticket` may still be applied.
    pub fn is_current(&self, ticket: &Ticket<K>) -> bool {
        self.live.as_ref() == Some(&ticket.key)
    }

    /// Number of tickets issued so far.
    pub fn issued(&self) -> u64 {
        self.next_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_ticket_is_current() {
        let mut tracker = RequestTracker::new();
        let first = tracker.issue("py".to_string());
        let second = tracker.issue("pyt".to_string());
        assert!(first.id < second.id);
        assert!(!tracker.is_current(&first));
        assert!(tracker.is_current(&second));
    }

    #[test]
    fn ticket_becomes_current_again_when_key_returns() {
        let mut tracker = RequestTracker::new();
        let first = tracker.issue("py".to_string());
        tracker.issue("pyt".to_string());
        tracker.set_live("py".to_string());
        assert!(tracker.is_current(&first));
    }

    #[test]
    fn clear_invalidates_everything() {
        let mut tracker = RequestTracker::new();
        let ticket = tracker.issue(7u64);
        tracker.clear();
        assert!(!tracker.is_current(&ticket));
        assert_eq!(tracker.live(), None);
        assert_eq!(tracker.issued(), 1);
    }
}
