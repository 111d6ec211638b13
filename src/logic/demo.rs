//! Demo Traffic Generator
//!
//! Optional background task that feeds the backend's ingest endpoint with
//! synthetic feature vectors so a fresh deployment has something to show.
//! Disabled unless MONITOR_DEMO_INGEST is set; the monitor itself never
//! submits data.

use std::time::Duration;

use rand::Rng;

use crate::constants;
use crate::logic::backend::ApiClient;

/// Dimension the backend model was trained on
const FEATURE_DIM: usize = 20;

/// Roughly one in seven submissions is an extreme-valued anomaly candidate
const ANOMALY_RATIO: f64 = 0.15;

pub fn spawn(client: ApiClient) {
    let interval_secs = constants::demo_ingest_interval();
    log::info!("Demo traffic generator running ({}s interval)", interval_secs);

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            interval.tick().await;

            let (features, kind) = generate_features();
            let meta = serde_json::json!({ "source": "demo", "type": kind });

            match client.ingest(features, Some(meta)).await {
                Ok(response) => log::info!(
                    "Demo ingest accepted: id={} label={}",
                    response.id,
                    response.label.as_str()
                ),
                // A submission is a user-visible action; failures are
                // surfaced loudly, not just counted
                Err(e) => log::error!("Demo ingest failed: {}", e),
            }
        }
    });
}

/// Generate one synthetic vector: unit-range noise for normal traffic,
/// mixed extreme values for an anomaly candidate
fn generate_features() -> (Vec<f64>, &'static str) {
    let mut rng = rand::thread_rng();

    if rng.gen_bool(ANOMALY_RATIO) {
        let features = (0..FEATURE_DIM)
            .map(|_| {
                let magnitude = rng.gen_range(3.0..8.0);
                if rng.gen_bool(0.5) {
                    magnitude
                } else {
                    -magnitude
                }
            })
            .collect();
        (features, "anomaly_test")
    } else {
        let features = (0..FEATURE_DIM).map(|_| rng.gen_range(-1.0..1.0)).collect();
        (features, "normal")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_vectors_have_model_dimension() {
        for _ in 0..50 {
            let (features, kind) = generate_features();
            assert_eq!(features.len(), FEATURE_DIM);

            match kind {
                "normal" => assert!(features.iter().all(|v| v.abs() < 1.0)),
                "anomaly_test" => assert!(features.iter().all(|v| v.abs() >= 3.0)),
                other => panic!("unexpected kind: {}", other),
            }
        }
    }
}
