//! Console Presentation Surface
//!
//! Pure consumer of published monitor state. Renders the connection
//! status, the windowed stats, the per-minute chart series, and the most
//! recent events whenever the state changes. Nothing here mutates the
//! monitor.

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::logic::monitor::MonitorState;

/// Rows of the event table shown per refresh
const EVENT_ROWS: usize = 10;

pub fn spawn(mut state_rx: watch::Receiver<MonitorState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while state_rx.changed().await.is_ok() {
            let state = state_rx.borrow_and_update().clone();
            render(&state);
        }
    })
}

fn render(state: &MonitorState) {
    println!();
    println!("── IDS Live Monitor ───────────────────────────────");

    let backend = match &state.health {
        Some(h) if h.model_loaded => format!("{} (model loaded)", h.status),
        Some(h) => format!("{} (model missing)", h.status),
        None => "unknown".to_string(),
    };
    let last_seen = state
        .last_event_time
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "stream: {:10} backend: {:20} last event: {}",
        state.connection.as_str(),
        backend,
        last_seen
    );

    match &state.stats {
        Some(stats) => println!(
            "window {}: {} events, {} anomalies ({:.1}%), avg score {:.2}",
            stats.window.as_str(),
            stats.total_events,
            stats.anomaly_count,
            stats.anomaly_rate * 100.0,
            stats.avg_score
        ),
        None => println!("window stats: pending"),
    }

    if state.buckets.is_empty() {
        println!("chart: no data to display");
    } else {
        for bucket in &state.buckets {
            println!(
                "  {}  normal={:<3} anomaly={:<3} total={:<3}",
                bucket.label,
                bucket.normal,
                bucket.anomaly,
                bucket.total()
            );
        }
    }

    for event in state.events.iter().take(EVENT_ROWS) {
        println!(
            "  #{:<6} {}  {:7} {}",
            event.id,
            event.timestamp.format("%H:%M:%S"),
            event.label.as_str(),
            format_score(event.score)
        );
    }
}

fn format_score(score: Option<f64>) -> String {
    match score {
        Some(value) => format!("{:.3}", value),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(Some(3.14159)), "3.142");
        assert_eq!(format_score(None), "-");
    }
}
