//! Backend Access
//!
//! Pull side of the monitor: typed HTTP client for the dashboard API.

pub mod client;

pub use client::{ApiClient, ApiConfig, EventQuery, HealthResponse, IngestResponse};
