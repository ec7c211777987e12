use std::sync::Arc;

use tokio::{
    sync::{broadcast, mpsc, Mutex},
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};

use crate::engine::{EngineError, EngineSnapshot, GreenRequest, RunTicket, SimEngine, TICK_PERIOD};
use crate::events::LogEntry;
use crate::live::{FeedEvent, LocationService, PositionError, WatchGuard, WatchOptions};
use crate::notify::SignalNotifier;
use crate::settings::{SettingsPatch, SourceKind};

struct Shared {
    engine: SimEngine,
    driver: Option<JoinHandle<()>>,
    watch_guard: Option<WatchGuard>,
}

impl Shared {
    /// Cancels the tick task and drops the live subscription. Runs under the
    /// lock, so together with the epoch bump in `SimEngine::stop` no update
    /// from the cancelled run can land afterwards.
    fn halt_driver(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.abort();
        }
        self.watch_guard = None;
    }
}

/// Async front of [`SimEngine`]: owns the position driver and fires
/// notifications. Cheap to clone; clones share one engine.
#[derive(Clone)]
pub struct SimController {
    shared: Arc<Mutex<Shared>>,
    location: Arc<dyn LocationService>,
    notifier: Arc<dyn SignalNotifier>,
}

impl SimController {
    pub fn new(
        engine: SimEngine,
        location: Arc<dyn LocationService>,
        notifier: Arc<dyn SignalNotifier>,
    ) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                engine,
                driver: None,
                watch_guard: None,
            })),
            location,
            notifier,
        }
    }

    pub async fn start(&self) -> Result<RunTicket, EngineError> {
        let mut shared = self.shared.lock().await;
        let ticket = shared.engine.start()?;

        match ticket.source {
            SourceKind::Synthetic => {
                shared.driver = Some(tokio::spawn(drive_synthetic(self.clone(), ticket.epoch)));
            }
            SourceKind::LiveFeed => match self.location.watch(WatchOptions::default()) {
                Ok(watch) => {
                    let (events_rx, guard) = watch.into_parts();
                    shared.watch_guard = Some(guard);
                    shared.driver = Some(tokio::spawn(drive_live_feed(
                        self.clone(),
                        ticket.epoch,
                        events_rx,
                    )));
                }
                Err(err) => {
                    tracing::warn!(error = %err, "live feed unavailable, run has no movement");
                    shared.engine.report_position_error(&err);
                }
            },
        }

        Ok(ticket)
    }

    pub async fn stop(&self) -> EngineSnapshot {
        let mut shared = self.shared.lock().await;
        shared.halt_driver();
        shared.engine.stop();
        shared.engine.snapshot()
    }

    pub async fn reset(&self) -> EngineSnapshot {
        let mut shared = self.shared.lock().await;
        shared.halt_driver();
        shared.engine.reset();
        shared.engine.snapshot()
    }

    pub async fn apply_settings(&self, patch: SettingsPatch) -> Result<EngineSnapshot, EngineError> {
        let mut shared = self.shared.lock().await;
        shared.engine.apply_settings(patch)?;
        Ok(shared.engine.snapshot())
    }

    pub async fn snapshot(&self) -> EngineSnapshot {
        self.shared.lock().await.engine.snapshot()
    }

    pub async fn log_entries(&self) -> Vec<LogEntry> {
        self.shared.lock().await.engine.log_entries()
    }

    pub async fn subscribe_log(&self) -> broadcast::Receiver<LogEntry> {
        self.shared.lock().await.engine.subscribe_log()
    }

    /// Read access for callers that need more than the snapshot.
    pub async fn inspect<R>(&self, read: impl FnOnce(&SimEngine) -> R) -> R {
        read(&self.shared.lock().await.engine)
    }

    fn dispatch(&self, requests: Vec<GreenRequest>) {
        for request in requests {
            let controller = self.clone();
            tokio::spawn(async move {
                let outcome = controller
                    .notifier
                    .request_green(&request.endpoint, &request.signal_id)
                    .await;
                if let Err(err) = &outcome {
                    tracing::debug!(signal_id = %request.signal_id, error = %err, "green request failed");
                }
                // Completion is recorded even if the run has since stopped.
                controller
                    .shared
                    .lock()
                    .await
                    .engine
                    .record_notification(&request, outcome);
            });
        }
    }
}

async fn drive_synthetic(controller: SimController, epoch: u64) {
    let mut ticks = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticks.tick().await;
        let requests = {
            let mut shared = controller.shared.lock().await;
            if !shared.engine.is_current_run(epoch) {
                return;
            }
            shared.engine.synthetic_tick()
        };
        controller.dispatch(requests);
    }
}

async fn drive_live_feed(
    controller: SimController,
    epoch: u64,
    mut events_rx: mpsc::UnboundedReceiver<FeedEvent>,
) {
    while let Some(event) = events_rx.recv().await {
        let requests = {
            let mut shared = controller.shared.lock().await;
            if !shared.engine.is_current_run(epoch) {
                return;
            }
            match event {
                FeedEvent::Fix(fix) => shared.engine.on_position(fix.coordinate),
                FeedEvent::Error(message) => {
                    shared
                        .engine
                        .report_position_error(&PositionError::Feed(message));
                    Vec::new()
                }
            }
        };
        controller.dispatch(requests);
    }
    tracing::debug!(epoch, "live feed closed");
}
