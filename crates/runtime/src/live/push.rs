use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use dashmap::DashMap;
use time::OffsetDateTime;
use tokio::sync::mpsc;

use super::types::{FeedEvent, Fix, PositionError, WatchOptions};
use super::{FixWatch, LocationService, WatchGuard};

struct Subscriber {
    options: WatchOptions,
    events_tx: mpsc::UnboundedSender<FeedEvent>,
}

/// Location service fed from outside, e.g. a device posting its own fixes to
/// the API. Each `watch` gets its own queue; stale fixes are dropped per
/// subscriber using that subscriber's `maximum_age`.
#[derive(Clone, Default)]
pub struct PushLocationService {
    next_id: Arc<AtomicU64>,
    subscribers: Arc<DashMap<u64, Subscriber>>,
}

impl PushLocationService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Returns how many subscribers accepted the fix.
    pub fn publish_fix(&self, fix: Fix) -> usize {
        let now = OffsetDateTime::now_utc();
        let mut delivered = 0;

        self.subscribers.retain(|id, subscriber| {
            if !fix.is_fresh(now, subscriber.options.maximum_age) {
                tracing::debug!(subscriber = id, "dropping stale fix");
                return true;
            }
            let open = subscriber.events_tx.send(FeedEvent::Fix(fix)).is_ok();
            if open {
                delivered += 1;
            }
            open
        });

        delivered
    }

    pub fn publish_error(&self, message: impl Into<String>) -> usize {
        let message = message.into();
        let mut delivered = 0;

        self.subscribers.retain(|_, subscriber| {
            let open = subscriber
                .events_tx
                .send(FeedEvent::Error(message.clone()))
                .is_ok();
            if open {
                delivered += 1;
            }
            open
        });

        delivered
    }
}

impl LocationService for PushLocationService {
    fn watch(&self, options: WatchOptions) -> Result<FixWatch, PositionError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        self.subscribers.insert(id, Subscriber { options, events_tx });
        tracing::debug!(
            subscriber = id,
            high_accuracy = options.high_accuracy,
            "location watch opened"
        );

        let subscribers = Arc::clone(&self.subscribers);
        let guard = WatchGuard::new(move || {
            subscribers.remove(&id);
            tracing::debug!(subscriber = id, "location watch closed");
        });

        Ok(FixWatch::new(events_rx, guard))
    }
}
