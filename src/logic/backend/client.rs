//! Backend API Client
//!
//! HTTP client for the IDS dashboard backend. Covers the pull side of the
//! contract: health check, event listing, windowed stats, and ingest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants;
use crate::logic::error::ApiError;
use crate::logic::event::{Event, Label, StatsSnapshot, StatsWindow};

/// Backend endpoint configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: constants::api_base_url().to_string(),
            timeout_seconds: constants::DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

// Request/Response types

#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub model_loaded: bool,
}

#[derive(Debug, Serialize)]
pub struct IngestRequest {
    pub features: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngestResponse {
    pub id: i64,
    pub label: Label,
    pub score: Option<f64>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
}

/// Filters for the event listing pull; all optional
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    pub limit: Option<usize>,
    pub min_score: Option<f64>,
    pub from_time: Option<DateTime<Utc>>,
    pub to_time: Option<DateTime<Utc>>,
    pub label: Option<Label>,
}

impl EventQuery {
    /// Query for the newest `limit` events, no other filters
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Default::default()
        }
    }

    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(min_score) = self.min_score {
            params.push(("min_score", min_score.to_string()));
        }
        if let Some(from_time) = self.from_time {
            params.push(("from_time", from_time.to_rfc3339()));
        }
        if let Some(to_time) = self.to_time {
            params.push(("to_time", to_time.to_rfc3339()));
        }
        if let Some(label) = self.label {
            params.push(("label", u8::from(label).to_string()));
        }
        params
    }
}

/// Backend API client
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ApiConfig,
    http_client: reqwest::Client,
}

impl ApiClient {
    /// Create new API client
    pub fn new(config: ApiConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            http_client,
        }
    }

    /// The WebSocket endpoint for the live event stream, derived from the
    /// base URL by scheme rewrite
    pub fn ws_url(&self) -> String {
        let ws_base = self
            .config
            .base_url
            .replacen("https://", "wss://", 1)
            .replacen("http://", "ws://", 1);
        format!("{}/api/ws/events", ws_base)
    }

    /// Check backend health
    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        let url = format!("{}/health", self.config.base_url);

        let response = self.http_client.get(&url).send().await?;

        if response.status().is_success() {
            response
                .json()
                .await
                .map_err(|e| ApiError::Decode(e.to_string()))
        } else {
            Err(ApiError::Status(response.status()))
        }
    }

    /// List recorded events, newest first
    pub async fn events(&self, query: &EventQuery) -> Result<Vec<Event>, ApiError> {
        let url = format!("{}/api/events", self.config.base_url);

        let response = self
            .http_client
            .get(&url)
            .query(&query.to_params())
            .send()
            .await?;

        if response.status().is_success() {
            response
                .json()
                .await
                .map_err(|e| ApiError::Decode(e.to_string()))
        } else {
            Err(ApiError::Status(response.status()))
        }
    }

    /// Pull aggregate statistics for a trailing window
    pub async fn stats(&self, window: StatsWindow) -> Result<StatsSnapshot, ApiError> {
        let url = format!("{}/api/stats", self.config.base_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("window", window.as_str())])
            .send()
            .await?;

        if response.status().is_success() {
            response
                .json()
                .await
                .map_err(|e| ApiError::Decode(e.to_string()))
        } else {
            Err(ApiError::Status(response.status()))
        }
    }

    /// Submit a feature vector for classification
    pub async fn ingest(
        &self,
        features: Vec<f64>,
        meta: Option<serde_json::Value>,
    ) -> Result<IngestResponse, ApiError> {
        let url = format!("{}/api/ingest", self.config.base_url);

        let request = IngestRequest { features, meta };

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await?;

        if response.status().is_success() {
            response
                .json()
                .await
                .map_err(|e| ApiError::Decode(e.to_string()))
        } else {
            Err(ApiError::Status(response.status()))
        }
    }
}
