//! IDS Live Monitor - Main Entry Point

mod constants;
mod display;
mod logic;

use logic::backend::{ApiClient, ApiConfig};
use logic::monitor::Monitor;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let window = constants::stats_window();
    log::info!("Starting IDS Live Monitor v{}...", env!("CARGO_PKG_VERSION"));
    log::info!("  Backend: {}", constants::api_base_url());
    log::info!("  Stats window: {}", window.as_str());

    let client = ApiClient::new(ApiConfig::default());

    if constants::demo_ingest_enabled() {
        logic::demo::spawn(client.clone());
    }

    let monitor = Monitor::new(client, window);
    let renderer = display::spawn(monitor.subscribe());

    monitor.run().await;

    log::info!("Live stream ended - monitor shutting down");
    renderer.abort();
}
