//! # Fibonacci Backoff
//!
//! Provides a Fibonacci-based backoff for failed reconciliations.
//! The sequence grows more slowly than doubling, so a Dummy whose store calls
//! keep failing is retried progressively less often without jumping straight
//! to the cap.
//!
//! Sequence with the defaults: 1s, 1s, 2s, 3s, 5s, 8s, ... 300s (max).

use cluster_store::ObjectKey;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Fibonacci backoff calculator
///
/// Each backoff is the sum of the previous two, capped at `max_secs`.
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    /// Previous backoff value in seconds
    prev_secs: u64,
    /// Current backoff value in seconds
    current_secs: u64,
    /// Maximum backoff value in seconds
    max_secs: u64,
}

impl FibonacciBackoff {
    /// Create a new Fibonacci backoff with the given bounds in seconds
    #[must_use]
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        Self {
            prev_secs: 0,
            current_secs: min_secs,
            max_secs,
        }
    }

    /// Get the next backoff duration and advance the sequence
    pub fn next_backoff(&mut self) -> Duration {
        let result = self.current_secs;

        let next = self.prev_secs.saturating_add(self.current_secs);
        self.prev_secs = self.current_secs;
        self.current_secs = std::cmp::min(next, self.max_secs);

        Duration::from_secs(result)
    }
}

/// Per-Dummy backoff state, owned by the scheduling layer.
///
/// Entries are created on the first failure and dropped on the next success,
/// so the map only holds Dummies that are currently failing.
#[derive(Debug)]
pub struct BackoffTracker {
    min_secs: u64,
    max_secs: u64,
    states: Mutex<HashMap<ObjectKey, FibonacciBackoff>>,
}

impl BackoffTracker {
    /// Create a tracker whose backoffs run from `min_secs` to `max_secs`
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        Self {
            min_secs,
            max_secs,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Next delay for `key`, advancing its sequence
    pub fn next_for(&self, key: &ObjectKey) -> Duration {
        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        states
            .entry(key.clone())
            .or_insert_with(|| FibonacciBackoff::new(self.min_secs, self.max_secs))
            .next_backoff()
    }

    /// Forget the failure history of `key` (on successful reconciliation)
    pub fn reset(&self, key: &ObjectKey) {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    /// The longest delay this tracker hands out
    pub fn max(&self) -> Duration {
        Duration::from_secs(self.max_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fibonacci_backoff_sequence() {
        let mut backoff = FibonacciBackoff::new(1, 10);

        assert_eq!(backoff.next_backoff(), Duration::from_secs(1));
        assert_eq!(backoff.next_backoff(), Duration::from_secs(1));
        assert_eq!(backoff.next_backoff(), Duration::from_secs(2));
        assert_eq!(backoff.next_backoff(), Duration::from_secs(3));
        assert_eq!(backoff.next_backoff(), Duration::from_secs(5));
        assert_eq!(backoff.next_backoff(), Duration::from_secs(8));
        assert_eq!(backoff.next_backoff(), Duration::from_secs(10)); // max
        // Next would be 18 (8+10), but should be capped
        assert_eq!(backoff.next_backoff(), Duration::from_secs(10));
    }

    #[test]
    fn test_tracker_keeps_sequences_apart() {
        let tracker = BackoffTracker::new(1, 300);
        let a = ObjectKey::cluster("a");
        let b = ObjectKey::cluster("b");

        tracker.next_for(&a);
        tracker.next_for(&a);
        assert_eq!(tracker.next_for(&a), Duration::from_secs(2));
        assert_eq!(tracker.next_for(&b), Duration::from_secs(1));

        tracker.reset(&a);
        assert_eq!(tracker.next_for(&a), Duration::from_secs(1));
        assert_eq!(tracker.max(), Duration::from_secs(300));
    }
}
