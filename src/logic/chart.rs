//! Time-Bucketing Aggregator
//!
//! Derives the per-minute normal/anomaly series for the chart from the
//! live buffer. The series is recomputed from scratch on every change and
//! never mutated incrementally, so it cannot drift from the buffer.

use std::collections::BTreeMap;

use chrono::{DateTime, DurationRound, Utc};

use crate::constants;
use crate::logic::event::Event;

/// One chart point: a single minute's classified counts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    /// Canonical minute (UTC, seconds truncated); the sort key
    pub minute: DateTime<Utc>,
    /// Display label, formatted from the minute as a last step
    pub label: String,
    pub normal: u64,
    pub anomaly: u64,
}

impl Bucket {
    pub fn total(&self) -> u64 {
        self.normal + self.anomaly
    }
}

/// Fold events into per-minute buckets, ascending by minute.
///
/// Events are keyed by their timestamp truncated to minute granularity
/// (canonical minute values, not display strings, so ordering holds across
/// hour and day boundaries). Only the newest buckets are kept. An empty
/// input yields an empty series.
pub fn bucketize(events: &[Event]) -> Vec<Bucket> {
    let mut grouped: BTreeMap<DateTime<Utc>, (u64, u64)> = BTreeMap::new();

    for event in events {
        let minute = match event.timestamp.duration_trunc(chrono::Duration::minutes(1)) {
            Ok(minute) => minute,
            Err(e) => {
                log::warn!("Event {} timestamp not bucketable: {}", event.id, e);
                continue;
            }
        };

        let counts = grouped.entry(minute).or_default();
        if event.label.is_anomaly() {
            counts.1 += 1;
        } else {
            counts.0 += 1;
        }
    }

    let skip = grouped.len().saturating_sub(constants::MAX_CHART_BUCKETS);
    grouped
        .into_iter()
        .skip(skip)
        .map(|(minute, (normal, anomaly))| Bucket {
            label: minute.format("%H:%M").to_string(),
            minute,
            normal,
            anomaly,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::event::Label;
    use chrono::TimeZone;

    fn ev(id: i64, h: u32, m: u32, s: u32, label: Label) -> Event {
        Event {
            id,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 14, h, m, s).unwrap(),
            label,
            score: None,
            features: Vec::new(),
            meta: None,
        }
    }

    #[test]
    fn test_empty_input_yields_empty_series() {
        assert!(bucketize(&[]).is_empty());
    }

    #[test]
    fn test_same_minute_events_share_a_bucket() {
        let buckets = bucketize(&[
            ev(1, 10, 30, 5, Label::Normal),
            ev(2, 10, 30, 42, Label::Anomaly),
            ev(3, 10, 30, 59, Label::Normal),
        ]);

        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].normal, 2);
        assert_eq!(buckets[0].anomaly, 1);
        assert_eq!(buckets[0].label, "10:30");
        assert_eq!(buckets[0].minute.format("%S").to_string(), "00");
    }

    #[test]
    fn test_adjacent_minutes_are_ascending() {
        // Input arrives newest first, as the buffer stores it
        let buckets = bucketize(&[
            ev(2, 10, 31, 0, Label::Anomaly),
            ev(1, 10, 30, 59, Label::Normal),
        ]);

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].label, "10:30");
        assert_eq!(buckets[1].label, "10:31");
        assert!(buckets[0].minute < buckets[1].minute);
    }

    #[test]
    fn test_ordering_holds_across_hour_boundary() {
        let buckets = bucketize(&[
            ev(1, 9, 59, 0, Label::Normal),
            ev(2, 10, 0, 0, Label::Normal),
        ]);

        assert_eq!(buckets[0].label, "09:59");
        assert_eq!(buckets[1].label, "10:00");
    }

    #[test]
    fn test_only_newest_twenty_buckets_kept() {
        // 25 distinct non-empty minutes
        let events: Vec<Event> = (0..25)
            .map(|i| ev(i as i64, 10, i, 0, Label::Normal))
            .collect();

        let buckets = bucketize(&events);

        assert_eq!(buckets.len(), 20);
        // Oldest five dropped; the rest ascend
        assert_eq!(buckets[0].label, "10:05");
        assert_eq!(buckets[19].label, "10:24");
        for pair in buckets.windows(2) {
            assert!(pair[0].minute < pair[1].minute);
        }
    }

    #[test]
    fn test_anomaly_counts_sum() {
        let buckets = bucketize(&[
            ev(6, 10, 31, 5, Label::Anomaly),
            ev(5, 10, 30, 10, Label::Normal),
        ]);

        let anomalies: u64 = buckets.iter().map(|b| b.anomaly).sum();
        let total: u64 = buckets.iter().map(|b| b.total()).sum();
        assert_eq!(anomalies, 1);
        assert_eq!(total, 2);
    }
}
