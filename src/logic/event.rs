//! Event & Stats Types
//!
//! Wire-format types shared by the HTTP pulls and the push stream.
//! These are the core data structures the whole monitor operates on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// LABEL
// ============================================================================

/// Classification assigned by the backend model.
///
/// The wire format is the backend's integer encoding: 0 = normal, 1 = anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Label {
    Normal,
    Anomaly,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Normal => "normal",
            Label::Anomaly => "anomaly",
        }
    }

    pub fn is_anomaly(&self) -> bool {
        matches!(self, Label::Anomaly)
    }
}

impl From<Label> for u8 {
    fn from(label: Label) -> u8 {
        match label {
            Label::Normal => 0,
            Label::Anomaly => 1,
        }
    }
}

impl TryFrom<u8> for Label {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Label::Normal),
            1 => Ok(Label::Anomaly),
            other => Err(format!("invalid label value: {}", other)),
        }
    }
}

// ============================================================================
// EVENT
// ============================================================================

/// A single classified observation recorded by the backend.
///
/// `id` is assigned by the backend, unique and monotonically non-decreasing;
/// it is the identity key inside the live buffer. Push-delivered events omit
/// `features` by contract, so the vector defaults to empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub label: Label,
    pub score: Option<f64>,
    #[serde(default)]
    pub features: Vec<f64>,
    /// Free-form annotation (IP, port, protocol, ...), opaque to the monitor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

// ============================================================================
// PUSH MESSAGES
// ============================================================================

/// Envelope for structured messages on the live stream.
///
/// The backend currently broadcasts exactly one message type. The literal
/// keep-alive reply `"pong"` is not an envelope and is filtered out before
/// decoding (see the stream connection).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum PushMessage {
    NewEvent(Event),
}

// ============================================================================
// STATS
// ============================================================================

/// Fixed trailing windows the backend can aggregate over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatsWindow {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "24h")]
    OneDay,
}

impl StatsWindow {
    pub const ALL: [StatsWindow; 4] = [
        StatsWindow::OneMinute,
        StatsWindow::FiveMinutes,
        StatsWindow::OneHour,
        StatsWindow::OneDay,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatsWindow::OneMinute => "1m",
            StatsWindow::FiveMinutes => "5m",
            StatsWindow::OneHour => "1h",
            StatsWindow::OneDay => "24h",
        }
    }
}

impl std::str::FromStr for StatsWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StatsWindow::ALL
            .into_iter()
            .find(|w| w.as_str() == s)
            .ok_or_else(|| format!("unknown stats window: '{}'", s))
    }
}

/// Aggregate over a trailing window, replaced wholesale on every
/// successful stats pull
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub window: StatsWindow,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub total_events: u64,
    pub anomaly_count: u64,
    pub anomaly_rate: f64,
    pub avg_score: f64,
}

impl StatsSnapshot {
    /// Build a snapshot from raw counts. The rate of an empty window is 0.
    pub fn from_counts(
        window: StatsWindow,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        total_events: u64,
        anomaly_count: u64,
        avg_score: f64,
    ) -> Self {
        let anomaly_rate = if total_events == 0 {
            0.0
        } else {
            anomaly_count as f64 / total_events as f64
        };

        Self {
            window,
            window_start,
            window_end,
            total_events,
            anomaly_count,
            anomaly_rate,
            avg_score,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_wire_encoding() {
        let normal: Label = serde_json::from_str("0").unwrap();
        let anomaly: Label = serde_json::from_str("1").unwrap();
        assert_eq!(normal, Label::Normal);
        assert_eq!(anomaly, Label::Anomaly);

        assert_eq!(serde_json::to_string(&Label::Normal).unwrap(), "0");
        assert_eq!(serde_json::to_string(&Label::Anomaly).unwrap(), "1");

        assert!(serde_json::from_str::<Label>("2").is_err());
    }

    #[test]
    fn test_push_envelope_decode() {
        let raw = r#"{
            "type": "new_event",
            "data": {
                "id": 6,
                "timestamp": "2024-05-14T10:32:05Z",
                "label": 1,
                "score": 3.2,
                "meta": {"source": "demo"}
            }
        }"#;

        let PushMessage::NewEvent(event) = serde_json::from_str::<PushMessage>(raw).unwrap();
        assert_eq!(event.id, 6);
        assert_eq!(event.label, Label::Anomaly);
        assert_eq!(event.score, Some(3.2));
        // Push payloads omit features by contract
        assert!(event.features.is_empty());
    }

    #[test]
    fn test_stats_window_parse() {
        assert_eq!("5m".parse::<StatsWindow>().unwrap(), StatsWindow::FiveMinutes);
        assert_eq!("24h".parse::<StatsWindow>().unwrap(), StatsWindow::OneDay);
        assert!("2h".parse::<StatsWindow>().is_err());
    }

    #[test]
    fn test_empty_window_rate_is_zero() {
        let now = Utc::now();
        let snapshot =
            StatsSnapshot::from_counts(StatsWindow::FiveMinutes, now, now, 0, 0, 0.0);
        assert_eq!(snapshot.anomaly_rate, 0.0);

        let half = StatsSnapshot::from_counts(StatsWindow::FiveMinutes, now, now, 2, 1, 1.6);
        assert_eq!(half.anomaly_rate, 0.5);
    }
}
