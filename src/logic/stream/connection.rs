//! Stream Connection Manager
//!
//! Owns the lifecycle of one push connection: open, keep-alive signaling,
//! inbound message decoding, error/close detection. No business logic.
//!
//! There is no automatic reconnection: on close or error the connection
//! reports the transition and stops. Re-establishing the stream is an
//! explicit external action.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use super::StreamEvent;
use crate::constants;
use crate::logic::error::StreamError;
use crate::logic::event::{Event, PushMessage};

/// Liveness token sent every interval while the connection is open
const KEEPALIVE_TOKEN: &str = "ping";

/// Reply token the backend answers keep-alives with; discarded silently
const KEEPALIVE_REPLY: &str = "pong";

/// Handle to an open push connection.
///
/// Dropping the handle closes the connection; `close` may also be called
/// explicitly and is idempotent.
pub struct StreamHandle {
    closed: Arc<AtomicBool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl StreamHandle {
    /// Cancel the keep-alive timer and detach the reader. Safe to call
    /// multiple times; only the first call performs cleanup.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
        log::info!("Live stream connection released");
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.close();
    }
}

pub struct StreamConnection;

impl StreamConnection {
    /// Open the push connection.
    ///
    /// Emits `Opened` first, then one `Event` per decoded push message,
    /// and finally `Closed` or `Errored` when the connection ends.
    pub async fn open(
        ws_url: &str,
    ) -> Result<(StreamHandle, mpsc::Receiver<StreamEvent>), StreamError> {
        log::info!("Connecting live stream: {}", ws_url);

        let (socket, _response) = connect_async(ws_url)
            .await
            .map_err(|e| StreamError::Connect(e.to_string()))?;

        let (mut write, mut read) = socket.split();
        let (events_tx, events_rx) = mpsc::channel(64);
        let closed = Arc::new(AtomicBool::new(false));

        let _ = events_tx.send(StreamEvent::Opened).await;

        // Keep-alive: send the literal token every interval while open.
        // Liveness signal only; no response is required for correctness.
        let keepalive = {
            let closed = closed.clone();
            tokio::spawn(async move {
                let mut interval =
                    tokio::time::interval(Duration::from_secs(constants::KEEPALIVE_INTERVAL_SECS));
                interval.tick().await; // first tick fires immediately
                loop {
                    interval.tick().await;
                    if closed.load(Ordering::SeqCst) {
                        break;
                    }
                    if let Err(e) = write.send(Message::Text(KEEPALIVE_TOKEN.into())).await {
                        log::warn!("Keep-alive send failed: {}", e);
                        break;
                    }
                    log::trace!("Keep-alive sent");
                }
            })
        };

        // Reader: decode inbound frames until the connection ends
        let reader = {
            let closed = closed.clone();
            let events = events_tx;
            tokio::spawn(async move {
                while let Some(frame) = read.next().await {
                    match frame {
                        Ok(Message::Text(text)) => {
                            if let Some(event) = decode_text_frame(&text) {
                                if events.send(StreamEvent::Event(event)).await.is_err() {
                                    return;
                                }
                            }
                        }
                        Ok(Message::Close(_)) => {
                            let _ = events.send(StreamEvent::Closed).await;
                            return;
                        }
                        // Transport-level ping/pong and binary frames are
                        // not part of the contract
                        Ok(_) => {}
                        Err(e) => {
                            if !closed.load(Ordering::SeqCst) {
                                let _ = events
                                    .send(StreamEvent::Errored(StreamError::Protocol(
                                        e.to_string(),
                                    )))
                                    .await;
                            }
                            return;
                        }
                    }
                }
                // Stream ended without a close frame
                if !closed.load(Ordering::SeqCst) {
                    let _ = events.send(StreamEvent::Closed).await;
                }
            })
        };

        let handle = StreamHandle {
            closed,
            tasks: Mutex::new(vec![keepalive, reader]),
        };

        Ok((handle, events_rx))
    }
}

/// Decode one inbound text frame.
///
/// Returns the embedded event, or `None` for the keep-alive reply and for
/// malformed frames (logged and dropped; a bad frame never reaches the
/// buffer and never tears down the connection).
fn decode_text_frame(text: &str) -> Option<Event> {
    match serde_json::from_str::<PushMessage>(text) {
        Ok(PushMessage::NewEvent(event)) => Some(event),
        Err(_) if text == KEEPALIVE_REPLY => None,
        Err(e) => {
            log::warn!("Undecodable stream frame dropped: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::event::Label;

    #[test]
    fn test_decode_new_event_frame() {
        let raw = r#"{"type":"new_event","data":{"id":7,"timestamp":"2024-05-14T10:32:05Z","label":0,"score":null,"meta":null}}"#;
        let event = decode_text_frame(raw).expect("frame should decode");
        assert_eq!(event.id, 7);
        assert_eq!(event.label, Label::Normal);
        assert!(event.features.is_empty());
    }

    #[test]
    fn test_keepalive_reply_is_discarded() {
        // The literal reply token is not a decode failure and never
        // produces an event
        assert!(decode_text_frame("pong").is_none());
    }

    #[test]
    fn test_malformed_frame_is_dropped() {
        assert!(decode_text_frame("{not json").is_none());
        assert!(decode_text_frame(r#"{"type":"unknown","data":{}}"#).is_none());
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let handle = StreamHandle {
            closed: Arc::new(AtomicBool::new(false)),
            tasks: Mutex::new(vec![tokio::spawn(async {})]),
        };

        assert!(!handle.is_closed());
        handle.close();
        assert!(handle.is_closed());
        // Second close performs no duplicate cleanup and does not panic
        handle.close();
        assert!(handle.is_closed());
        assert!(handle.tasks.lock().is_empty());
    }
}
