use std::collections::VecDeque;

use tokio::sync::broadcast;

use crate::events::{LogCategory, LogEntry};

pub const LOG_CAPACITY: usize = 100;
const LIVE_CHANNEL_CAPACITY: usize = 256;

pub trait EventSink {
    fn append(&mut self, entry: LogEntry);
}

/// Newest-first ring of the last `LOG_CAPACITY` engine events. Every append
/// is also mirrored to `tracing` and published to live subscribers.
#[derive(Debug)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    live_tx: broadcast::Sender<LogEntry>,
}

impl Default for EventLog {
    fn default() -> Self {
        let (live_tx, _) = broadcast::channel(LIVE_CHANNEL_CAPACITY);
        Self {
            entries: VecDeque::with_capacity(LOG_CAPACITY),
            live_tx,
        }
    }
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> impl ExactSizeIterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.live_tx.subscribe()
    }
}

impl EventSink for EventLog {
    fn append(&mut self, entry: LogEntry) {
        trace_entry(&entry);

        // Err only means nobody is subscribed.
        let _ = self.live_tx.send(entry.clone());

        self.entries.push_front(entry);
        self.entries.truncate(LOG_CAPACITY);
    }
}

fn trace_entry(entry: &LogEntry) {
    match entry.category {
        LogCategory::Error => {
            tracing::warn!(category = ?entry.category, "{}", entry.message)
        }
        _ => tracing::info!(category = ?entry.category, "{}", entry.message),
    }
}
