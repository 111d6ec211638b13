//! Windowed Stats Refresher
//!
//! Holds the latest aggregate snapshot pulled from the backend. Refreshes
//! are triggered by push-stream activity and may be issued concurrently;
//! a monotonic sequence guard keeps the newest-issued response and
//! discards responses that land out of order. A failed refresh retains
//! the previous snapshot (stale-but-present beats a blank display).

use crate::logic::event::StatsSnapshot;

pub struct StatsTracker {
    snapshot: Option<StatsSnapshot>,
    issued: u64,
    applied: u64,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self {
            snapshot: None,
            issued: 0,
            applied: 0,
        }
    }

    /// Reserve the sequence number for a refresh about to be issued
    pub fn begin_refresh(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Apply a completed refresh.
    ///
    /// Returns false when a newer response was already applied; the stale
    /// one is discarded without touching the snapshot.
    pub fn apply(&mut self, seq: u64, snapshot: StatsSnapshot) -> bool {
        if seq <= self.applied {
            return false;
        }
        self.applied = seq;
        self.snapshot = Some(snapshot);
        true
    }

    pub fn snapshot(&self) -> Option<&StatsSnapshot> {
        self.snapshot.as_ref()
    }
}

impl Default for StatsTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::event::StatsWindow;
    use chrono::Utc;

    fn snap(total: u64) -> StatsSnapshot {
        let now = Utc::now();
        StatsSnapshot::from_counts(StatsWindow::FiveMinutes, now, now, total, 0, 0.0)
    }

    #[test]
    fn test_in_order_responses_apply() {
        let mut tracker = StatsTracker::new();
        assert!(tracker.snapshot().is_none());

        let first = tracker.begin_refresh();
        let second = tracker.begin_refresh();

        assert!(tracker.apply(first, snap(1)));
        assert!(tracker.apply(second, snap(2)));
        assert_eq!(tracker.snapshot().unwrap().total_events, 2);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut tracker = StatsTracker::new();
        let first = tracker.begin_refresh();
        let second = tracker.begin_refresh();

        // The newer request completes first
        assert!(tracker.apply(second, snap(2)));
        assert!(!tracker.apply(first, snap(1)));

        // The newest-issued response stays on display
        assert_eq!(tracker.snapshot().unwrap().total_events, 2);
    }

    #[test]
    fn test_failed_refresh_keeps_previous_snapshot() {
        let mut tracker = StatsTracker::new();
        let first = tracker.begin_refresh();
        assert!(tracker.apply(first, snap(7)));

        // A failed refresh reserves a sequence number but never applies;
        // the old snapshot remains visible
        let _failed = tracker.begin_refresh();
        assert_eq!(tracker.snapshot().unwrap().total_events, 7);
    }
}
