pub mod push;
pub mod types;

use tokio::sync::mpsc;

pub use push::PushLocationService;
pub use types::{FeedEvent, Fix, PositionError, WatchOptions, DEFAULT_MAXIMUM_AGE};

/// Platform location capability. `watch` fails with
/// [`PositionError::Unsupported`] when there is nothing to subscribe to.
pub trait LocationService: Send + Sync {
    fn watch(&self, options: WatchOptions) -> Result<FixWatch, PositionError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedLocationService;

impl LocationService for UnsupportedLocationService {
    fn watch(&self, _options: WatchOptions) -> Result<FixWatch, PositionError> {
        Err(PositionError::Unsupported)
    }
}

/// Runs its release hook exactly once, on drop.
pub struct WatchGuard {
    release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl WatchGuard {
    pub fn new(release: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }
}

impl Drop for WatchGuard {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for WatchGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchGuard")
            .field("active", &self.release.is_some())
            .finish()
    }
}

/// An open subscription. The guard half unsubscribes when dropped, so the
/// receiver can be moved into a task while the owner keeps the guard.
#[derive(Debug)]
pub struct FixWatch {
    events_rx: mpsc::UnboundedReceiver<FeedEvent>,
    guard: WatchGuard,
}

impl FixWatch {
    pub fn new(events_rx: mpsc::UnboundedReceiver<FeedEvent>, guard: WatchGuard) -> Self {
        Self { events_rx, guard }
    }

    pub async fn next_event(&mut self) -> Option<FeedEvent> {
        self.events_rx.recv().await
    }

    pub fn into_parts(self) -> (mpsc::UnboundedReceiver<FeedEvent>, WatchGuard) {
        (self.events_rx, self.guard)
    }
}
