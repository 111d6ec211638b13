//! Live Event Buffer
//!
//! Ordered, bounded view of the most recent events, newest first. Fed by
//! the bootstrap pull and the push stream; owned exclusively by the
//! monitor, which applies all mutations sequentially.

use std::collections::{HashSet, VecDeque};

use chrono::{DateTime, Utc};

use crate::logic::event::Event;

pub struct LiveBuffer {
    events: VecDeque<Event>,
    capacity: usize,
    last_event_time: Option<DateTime<Utc>>,
}

impl LiveBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            last_event_time: None,
        }
    }

    /// Seed the buffer from the initial pull; `events` arrive newest first.
    ///
    /// Push events may have landed before the pull completed. Those stay at
    /// the head in arrival order and bootstrap entries are merged in behind
    /// them, deduplicated by id, so the pull can never reorder or resurrect
    /// anything ahead of a newer push.
    pub fn bootstrap(&mut self, events: Vec<Event>) {
        if self.events.is_empty() {
            self.events = events.into_iter().take(self.capacity).collect();
        } else {
            let seen: HashSet<i64> = self.events.iter().map(|e| e.id).collect();
            for event in events {
                if !seen.contains(&event.id) {
                    self.events.push_back(event);
                }
            }
            self.truncate();
        }

        if let Some(front) = self.events.front() {
            self.last_event_time = Some(front.timestamp);
        }
    }

    /// Insert a push-delivered event at the head, evicting tail overflow
    pub fn prepend(&mut self, event: Event) {
        self.last_event_time = Some(event.timestamp);
        self.events.push_front(event);
        self.truncate();
    }

    fn truncate(&mut self) {
        while self.events.len() > self.capacity {
            self.events.pop_back();
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Timestamp of the most recently arrived event, for display
    pub fn last_event_time(&self) -> Option<DateTime<Utc>> {
        self.last_event_time
    }

    /// Current contents, newest first
    pub fn to_vec(&self) -> Vec<Event> {
        self.events.iter().cloned().collect()
    }
}
