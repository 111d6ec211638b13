//! Central Configuration Constants
//!
//! Single source of truth for configuration defaults.
//! To point the monitor at a different backend, only edit this file
//! or set the corresponding environment variable.

use once_cell::sync::Lazy;

use crate::logic::event::StatsWindow;

/// Default backend base URL
///
/// This is the fallback URL when no environment variable is set.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Live buffer capacity: most recent events kept in memory
pub const BUFFER_CAPACITY: usize = 50;

/// Keep-alive cadence on the push stream (seconds)
pub const KEEPALIVE_INTERVAL_SECS: u64 = 30;

/// Chart depth: newest minute buckets kept by the aggregator
pub const MAX_CHART_BUCKETS: usize = 20;

/// HTTP pull timeout (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default cadence of the demo traffic generator (seconds)
pub const DEFAULT_DEMO_INTERVAL_SECS: u64 = 10;

/// Backend base URL, read from the environment once at startup
static API_BASE_URL: Lazy<String> = Lazy::new(|| {
    std::env::var("MONITOR_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string())
});

/// Get backend base URL from environment or use default
pub fn api_base_url() -> &'static str {
    &API_BASE_URL
}

/// Get the stats window from environment or use the 5-minute default
pub fn stats_window() -> StatsWindow {
    std::env::var("MONITOR_STATS_WINDOW")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(StatsWindow::FiveMinutes)
}

/// Check if the demo traffic generator is enabled
pub fn demo_ingest_enabled() -> bool {
    std::env::var("MONITOR_DEMO_INGEST")
        .map(|s| s == "1" || s.to_lowercase() == "true")
        .unwrap_or(false)
}

/// Get demo traffic cadence from environment or use default
pub fn demo_ingest_interval() -> u64 {
    std::env::var("MONITOR_DEMO_INTERVAL")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_DEMO_INTERVAL_SECS)
}
