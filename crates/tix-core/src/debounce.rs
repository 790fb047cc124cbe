//! Trailing-edge debounce
//!
//! Each key holds at most one pending deadline. Scheduling again before the
//! deadline pushes it back, so a burst of notifications collapses into one
//! run after the burst goes quiet. The caller owns the clock.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Debouncer<K> {
    window: Duration,
    pending: HashMap<K, Instant>,
}

impl<K: Eq + Hash + Clone> Debouncer<K> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: HashMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// (Re)arm the timer for `key`, replacing any pending deadline
    pub fn schedule(&mut self, key: K, now: Instant) {
        self.pending.insert(key, now + self.window);
    }

    /// Remove and return every key whose deadline has passed
    pub fn due(&mut self, now: Instant) -> Vec<K> {
        let ready: Vec<K> = self
            .pending
            .iter()
            .filter(|&(_, &deadline)| deadline <= now)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &ready {
            self.pending.remove(key);
        }
        ready
    }

    /// Earliest pending deadline, for hosts that sleep until the next event
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().copied()
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    pub fn cancel(&mut self, key: &K) -> bool {
        self.pending.remove(key).is_some()
    }

    /// Drop every pending timer
    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(250);

    #[test]
    fn test_burst_collapses_to_one_run() {
        let start = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        for i in 0..20 {
            d.schedule("apply", start + Duration::from_millis(i * 10));
            assert!(d.due(start + Duration::from_millis(i * 10)).is_empty());
        }
        // Last schedule at 190ms, so nothing fires before 440ms
        assert!(d.due(start + Duration::from_millis(439)).is_empty());
        assert_eq!(d.due(start + Duration::from_millis(440)), vec!["apply"]);
        assert!(d.due(start + Duration::from_secs(10)).is_empty());
    }

    #[test]
    fn test_keys_are_independent() {
        let start = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        d.schedule(1, start);
        d.schedule(2, start + Duration::from_millis(100));
        assert_eq!(d.next_deadline(), Some(start + WINDOW));
        assert_eq!(d.due(start + WINDOW), vec![1]);
        assert!(d.is_pending(&2));
        assert!(d.cancel(&2));
        assert!(d.is_empty());
    }

    #[test]
    fn test_cancel_all() {
        let start = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        d.schedule("a", start);
        d.schedule("b", start);
        assert_eq!(d.len(), 2);
        d.cancel_all();
        assert!(d.due(start + WINDOW * 4).is_empty());
    }
}
