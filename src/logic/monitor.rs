//! Monitor Orchestrator
//!
//! Owns the live buffer, the stats snapshot, and the connection state on a
//! single task. The bootstrap pull, push-stream events, and stats responses
//! all arrive as messages and are applied sequentially in arrival order, so
//! the merged view needs no locking. Consumers observe every change through
//! a watch channel.

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};

use crate::constants;
use crate::logic::backend::{ApiClient, EventQuery, HealthResponse};
use crate::logic::buffer::LiveBuffer;
use crate::logic::chart::{self, Bucket};
use crate::logic::error::ApiError;
use crate::logic::event::{Event, StatsSnapshot, StatsWindow};
use crate::logic::stats::StatsTracker;
use crate::logic::stream::{ConnectionState, StreamConnection, StreamEvent};

/// Immutable view published to consumers after every change
#[derive(Debug, Clone)]
pub struct MonitorState {
    pub connection: ConnectionState,
    pub health: Option<HealthResponse>,
    /// Buffer contents, newest first
    pub events: Vec<Event>,
    /// Per-minute chart series derived from `events`, ascending
    pub buckets: Vec<Bucket>,
    pub stats: Option<StatsSnapshot>,
    pub last_event_time: Option<DateTime<Utc>>,
}

impl Default for MonitorState {
    fn default() -> Self {
        Self {
            connection: ConnectionState::Connecting,
            health: None,
            events: Vec::new(),
            buckets: Vec::new(),
            stats: None,
            last_event_time: None,
        }
    }
}

/// Completed asynchronous pulls, delivered back to the orchestrator task
enum Pulled {
    Bootstrap(Result<Vec<Event>, ApiError>),
    Stats(u64, Result<StatsSnapshot, ApiError>),
}

pub struct Monitor {
    client: ApiClient,
    window: StatsWindow,
    buffer: LiveBuffer,
    stats: StatsTracker,
    connection: ConnectionState,
    health: Option<HealthResponse>,
    state_tx: watch::Sender<MonitorState>,
}

impl Monitor {
    pub fn new(client: ApiClient, window: StatsWindow) -> Self {
        let (state_tx, _state_rx) = watch::channel(MonitorState::default());
        Self {
            client,
            window,
            buffer: LiveBuffer::new(constants::BUFFER_CAPACITY),
            stats: StatsTracker::new(),
            connection: ConnectionState::Connecting,
            health: None,
            state_tx,
        }
    }

    /// Subscribe to published state; the receiver sees every change
    pub fn subscribe(&self) -> watch::Receiver<MonitorState> {
        self.state_tx.subscribe()
    }

    /// Drive the monitor until the live stream ends.
    ///
    /// Wiring order follows the dashboard: health check, bootstrap pull,
    /// stats refresh, then the push stream. The pulls complete in any order
    /// relative to pushed events; the handlers below keep the view
    /// consistent regardless.
    pub async fn run(mut self) {
        let (pulls_tx, mut pulls_rx) = mpsc::channel::<Pulled>(16);

        // Health check: display only, never blocks the feed
        match self.client.health().await {
            Ok(health) => {
                log::info!(
                    "Backend healthy: {} (model loaded: {})",
                    health.service,
                    health.model_loaded
                );
                self.health = Some(health);
            }
            Err(e) => log::warn!("Backend health check failed: {}", e),
        }

        // Bootstrap pull: newest events, one shot
        {
            let client = self.client.clone();
            let pulls = pulls_tx.clone();
            let limit = self.buffer.capacity();
            tokio::spawn(async move {
                let result = client.events(&EventQuery::with_limit(limit)).await;
                let _ = pulls.send(Pulled::Bootstrap(result)).await;
            });
        }

        // First stats refresh
        self.spawn_stats_refresh(&pulls_tx);

        // Push stream
        let ws_url = self.client.ws_url();
        let (handle, mut stream_rx) = match StreamConnection::open(&ws_url).await {
            Ok(pair) => pair,
            Err(e) => {
                log::error!("Live stream connect failed: {}", e);
                self.set_connection(ConnectionState::Errored);
                // Degrade to the pull-only view: apply outstanding pulls,
                // then stop. Reconnecting is an explicit external action.
                drop(pulls_tx);
                while let Some(pulled) = pulls_rx.recv().await {
                    self.on_pull(pulled);
                }
                return;
            }
        };

        self.publish();

        loop {
            tokio::select! {
                stream_event = stream_rx.recv() => match stream_event {
                    Some(event) => {
                        if self.on_stream_event(event, &pulls_tx) {
                            break;
                        }
                    }
                    None => break,
                },
                Some(pulled) = pulls_rx.recv() => self.on_pull(pulled),
            }
        }

        handle.close();

        // Apply pulls that were still in flight when the stream ended
        drop(pulls_tx);
        while let Some(pulled) = pulls_rx.recv().await {
            self.on_pull(pulled);
        }
    }

    /// Handle one stream condition. Returns true when the stream has ended.
    fn on_stream_event(&mut self, event: StreamEvent, pulls: &mpsc::Sender<Pulled>) -> bool {
        match event {
            StreamEvent::Opened => {
                log::info!("Live stream connected");
                self.set_connection(ConnectionState::Open);
                false
            }
            StreamEvent::Event(event) => {
                log::debug!("Push event {} ({})", event.id, event.label.as_str());
                self.buffer.prepend(event);
                // Event-driven refresh keeps the displayed rate close to
                // real time
                self.spawn_stats_refresh(pulls);
                self.publish();
                false
            }
            StreamEvent::Closed => {
                log::info!("Live stream closed by backend");
                self.set_connection(ConnectionState::Closed);
                true
            }
            StreamEvent::Errored(e) => {
                log::error!("Live stream error: {}", e);
                self.set_connection(ConnectionState::Errored);
                true
            }
        }
    }

    fn on_pull(&mut self, pulled: Pulled) {
        match pulled {
            Pulled::Bootstrap(Ok(events)) => {
                log::info!("Bootstrap loaded {} events", events.len());
                self.buffer.bootstrap(events);
                self.publish();
            }
            Pulled::Bootstrap(Err(e)) => {
                // Empty-state display; push events still accumulate
                log::warn!("Bootstrap pull failed: {}", e);
            }
            Pulled::Stats(seq, Ok(snapshot)) => {
                if self.stats.apply(seq, snapshot) {
                    self.publish();
                } else {
                    log::debug!("Stale stats response {} discarded", seq);
                }
            }
            Pulled::Stats(seq, Err(e)) => {
                // Previous snapshot stays on display
                log::warn!("Stats refresh {} failed: {}", seq, e);
            }
        }
    }

    fn spawn_stats_refresh(&mut self, pulls: &mpsc::Sender<Pulled>) {
        let seq = self.stats.begin_refresh();
        let client = self.client.clone();
        let window = self.window;
        let pulls = pulls.clone();
        tokio::spawn(async move {
            let result = client.stats(window).await;
            let _ = pulls.send(Pulled::Stats(seq, result)).await;
        });
    }

    fn set_connection(&mut self, state: ConnectionState) {
        self.connection = state;
        self.publish();
    }

    fn publish(&self) {
        let events = self.buffer.to_vec();
        let state = MonitorState {
            connection: self.connection,
            health: self.health.clone(),
            buckets: chart::bucketize(&events),
            stats: self.stats.snapshot().cloned(),
            last_event_time: self.buffer.last_event_time(),
            events,
        };
        self.state_tx.send_replace(state);
    }
}
