//! Per-run record of feed links already dispatched.
//!
//! Links are compared as exact strings. `https://a/x` and `https://a/x/` are
//! different links; no normalization is attempted.

use std::collections::HashSet;
use std::sync::Mutex;

/// Set of feed links seen during one run.
///
/// The set is guarded by a mutex so items discovered from several feeds can
/// be checked from concurrent tasks.
#[derive(Debug, Default)]
pub struct DedupTracker {
    seen: Mutex<HashSet<String>>,
}

impl DedupTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `url` has already been recorded.
    pub fn seen(&self, url: &str) -> bool {
        self.lock().contains(url)
    }

    /// Record `url` as seen.
    pub fn mark_seen(&self, url: &str) {
        self.lock().insert(url.to_string());
    }

    /// Check and record `url` under one lock.
    ///
    /// # Returns
    ///
    /// `true` the first time a link is offered, `false` on every later call.
    pub fn first_sighting(&self, url: &str) -> bool {
        self.lock().insert(url.to_string())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        // A poisoned set is still a valid set of strings.
        self.seen.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seen_then_mark() {
        let tracker = DedupTracker::new();
        assert!(!tracker.seen("https://tw.news.yahoo.com/a.html"));
        tracker.mark_seen("https://tw.news.yahoo.com/a.html");
        assert!(tracker.seen("https://tw.news.yahoo.com/a.html"));
    }

    #[test]
    fn test_first_sighting_is_idempotent() {
        let tracker = DedupTracker::new();
        assert!(tracker.first_sighting("https://x/1"));
        assert!(!tracker.first_sighting("https://x/1"));
        assert!(!tracker.first_sighting("https://x/1"));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_no_normalization() {
        let tracker = DedupTracker::new();
        assert!(tracker.first_sighting("https://x/1"));
        assert!(tracker.first_sighting("https://x/1/"));
        assert!(tracker.first_sighting("https://x/1?utm=rss"));
        assert_eq!(tracker.len(), 3);
    }
}
