use std::time::Duration;

use core_sim::{CorridorLayout, RunState, Signal, SignalRegistry, SignalStatus, SyntheticPath};
use geo::{distance_meters, Coordinate};
use proximity::{ProximityChange, ProximityTracker, Transition};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::events::{LogCategory, LogEntry};
use crate::live::PositionError;
use crate::logging::{EventLog, EventSink};
use crate::notify::{green_url, NotifyError};
use crate::settings::{EngineSettings, SettingsPatch, SourceKind};

pub const TICK_PERIOD: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("simulation is already running")]
    AlreadyRunning,
    #[error("position source cannot change while running")]
    SettingsLocked,
}

/// Identifies one running period. Updates tagged with an older epoch are
/// discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTicket {
    pub epoch: u64,
    pub source: SourceKind,
}

/// Outbound "switch to green" call the driver must issue for a signal that
/// was just reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GreenRequest {
    pub signal_id: String,
    pub signal_name: String,
    pub endpoint: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalView {
    #[serde(flatten)]
    pub signal: Signal,
    pub distance_m: f64,
    pub in_range: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineSnapshot {
    pub run_state: RunState,
    pub step: u64,
    pub ambulance: Coordinate,
    pub signals: Vec<SignalView>,
    pub settings: EngineSettings,
}

/// Proximity-triggered simulation state. Synchronous: the async driver in
/// [`crate::controller`] serializes every call through one lock.
#[derive(Debug)]
pub struct SimEngine {
    layout: CorridorLayout,
    settings: EngineSettings,
    run_state: RunState,
    epoch: u64,
    ambulance: Coordinate,
    path: SyntheticPath,
    registry: SignalRegistry,
    tracker: ProximityTracker,
    log: EventLog,
}

impl Default for SimEngine {
    fn default() -> Self {
        Self::new(CorridorLayout::default(), EngineSettings::default())
    }
}

impl SimEngine {
    pub fn new(layout: CorridorLayout, settings: EngineSettings) -> Self {
        Self {
            ambulance: layout.ambulance_start,
            path: SyntheticPath::new(layout.ambulance_start),
            registry: SignalRegistry::new(layout.signals.clone()),
            tracker: ProximityTracker::default(),
            log: EventLog::new(),
            run_state: RunState::Idle,
            epoch: 0,
            layout,
            settings,
        }
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn ambulance(&self) -> Coordinate {
        self.ambulance
    }

    pub fn step(&self) -> u64 {
        self.path.step()
    }

    pub fn signals(&self) -> &[Signal] {
        self.registry.list()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn log_entries(&self) -> Vec<LogEntry> {
        self.log.entries().cloned().collect()
    }

    pub fn subscribe_log(&self) -> broadcast::Receiver<LogEntry> {
        self.log.subscribe()
    }

    pub fn is_triggered(&self, signal_id: &str) -> bool {
        self.tracker.is_triggered(signal_id)
    }

    pub fn is_current_run(&self, epoch: u64) -> bool {
        self.run_state.is_running() && self.epoch == epoch
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let signals = self
            .registry
            .list()
            .iter()
            .map(|signal| {
                let distance_m = distance_meters(self.ambulance, signal.position);
                SignalView {
                    signal: signal.clone(),
                    distance_m,
                    in_range: distance_m <= self.tracker.threshold_m(),
                }
            })
            .collect();

        EngineSnapshot {
            run_state: self.run_state,
            step: self.path.step(),
            ambulance: self.ambulance,
            signals,
            settings: self.settings.clone(),
        }
    }

    pub fn start(&mut self) -> Result<RunTicket, EngineError> {
        if self.run_state.is_running() {
            return Err(EngineError::AlreadyRunning);
        }

        self.run_state = RunState::Running;
        self.epoch += 1;
        let source = self.settings.source_kind();
        let message = match source {
            SourceKind::Synthetic => "Started simulation",
            SourceKind::LiveFeed => "Started live GPS tracking",
        };
        self.log.append(LogEntry::info(message));
        tracing::debug!(epoch = self.epoch, ?source, "run started");

        Ok(RunTicket {
            epoch: self.epoch,
            source,
        })
    }

    /// Always logs, so repeated calls are visible but otherwise harmless.
    pub fn stop(&mut self) {
        if self.run_state.is_running() {
            self.epoch += 1;
        }
        self.run_state = RunState::Idle;
        self.log.append(LogEntry::info("Stopped"));
    }

    pub fn reset(&mut self) {
        self.stop();
        self.path.reset();
        self.tracker.clear();
        self.ambulance = self.layout.ambulance_start;
        self.registry.reset_all();
        self.log.clear();
    }

    /// Advances the synthetic path by one step and evaluates the new position.
    pub fn synthetic_tick(&mut self) -> Vec<GreenRequest> {
        let position = self.path.next_position();
        self.on_position(position)
    }

    pub fn on_position(&mut self, position: Coordinate) -> Vec<GreenRequest> {
        self.ambulance = position;

        let changes = self.tracker.evaluate(
            position,
            self.registry
                .list()
                .iter()
                .map(|signal| (signal.id.as_str(), signal.position)),
        );

        changes
            .into_iter()
            .filter_map(|change| self.apply_change(change))
            .collect()
    }

    fn apply_change(&mut self, change: ProximityChange) -> Option<GreenRequest> {
        let status = match change.transition {
            Transition::Entered => SignalStatus::Green,
            Transition::Left => SignalStatus::Red,
        };
        if !self.registry.set_status(&change.site_id, status) {
            tracing::warn!(signal_id = %change.site_id, "status update for unknown signal ignored");
            return None;
        }
        let signal = self.registry.get(&change.site_id)?;
        let name = signal.name.clone();
        let address = signal.address.clone();

        match change.transition {
            Transition::Entered => {
                self.log.append(LogEntry::new(
                    LogCategory::Proximity,
                    format!(
                        "Within {}m of \"{name}\", switching to GREEN",
                        change.distance_m.round()
                    ),
                ));

                if self.settings.notifications_enabled {
                    return Some(GreenRequest {
                        signal_id: change.site_id,
                        signal_name: name,
                        endpoint: self.settings.notification_endpoint.clone(),
                    });
                }
                self.log.append(LogEntry::info(format!(
                    "Notifications disabled, would POST to {address}"
                )));
                None
            }
            Transition::Left => {
                self.log.append(LogEntry::info(format!(
                    "Left range of \"{name}\", reverting to RED"
                )));
                None
            }
        }
    }

    pub fn record_notification(&mut self, request: &GreenRequest, outcome: Result<u16, NotifyError>) {
        let entry = match outcome {
            Ok(status) => LogEntry::new(
                LogCategory::Request,
                format!(
                    "POST sent to {} for \"{}\" (HTTP {status})",
                    green_url(&request.endpoint),
                    request.signal_name
                ),
            ),
            Err(err) => LogEntry::error(format!("Failed to reach {}: {err}", request.endpoint)),
        };
        self.log.append(entry);
    }

    pub fn report_position_error(&mut self, error: &PositionError) {
        self.log.append(LogEntry::error(error.to_string()));
    }

    pub fn set_use_live_feed(&mut self, use_live_feed: bool) -> Result<(), EngineError> {
        if self.run_state.is_running() && use_live_feed != self.settings.use_live_feed {
            return Err(EngineError::SettingsLocked);
        }
        self.settings.use_live_feed = use_live_feed;
        Ok(())
    }

    pub fn set_notification_endpoint(&mut self, endpoint: impl Into<String>) {
        self.settings.notification_endpoint = endpoint.into();
    }

    pub fn set_notifications_enabled(&mut self, enabled: bool) {
        self.settings.notifications_enabled = enabled;
    }

    /// Applies all fields or none.
    pub fn apply_settings(&mut self, patch: SettingsPatch) -> Result<(), EngineError> {
        if let Some(use_live_feed) = patch.use_live_feed {
            self.set_use_live_feed(use_live_feed)?;
        }
        if let Some(endpoint) = patch.notification_endpoint {
            self.set_notification_endpoint(endpoint);
        }
        if let Some(enabled) = patch.notifications_enabled {
            self.set_notifications_enabled(enabled);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use core_sim::{CorridorLayout, RunState, SignalStatus, DEFAULT_AMBULANCE_START};
    use geo::Coordinate;

    use super::{EngineError, GreenRequest, SimEngine};
    use crate::events::LogCategory;
    use crate::live::PositionError;
    use crate::notify::NotifyError;
    use crate::settings::{EngineSettings, SettingsPatch, SourceKind};

    const MAIN_ST: Coordinate = Coordinate::new(12.9716, 77.5946);
    const HOSPITAL_JUNCTION: Coordinate = Coordinate::new(12.9740, 77.5930);
    const FAR_AWAY: Coordinate = Coordinate::new(13.0500, 77.7000);

    fn count(engine: &SimEngine, category: LogCategory) -> usize {
        engine
            .log()
            .entries()
            .filter(|entry| entry.category == category)
            .count()
    }

    fn status_of(engine: &SimEngine, id: &str) -> SignalStatus {
        engine
            .signals()
            .iter()
            .find(|signal| signal.id == id)
            .unwrap()
            .status
    }

    fn notifying_engine() -> SimEngine {
        let settings = EngineSettings {
            notifications_enabled: true,
            notification_endpoint: "http://10.0.0.7".to_string(),
            ..EngineSettings::default()
        };
        SimEngine::new(CorridorLayout::default(), settings)
    }

    #[test]
    fn no_signal_is_green_at_start() {
        let mut engine = SimEngine::default();

        let requests = engine.on_position(DEFAULT_AMBULANCE_START);

        assert!(requests.is_empty());
        assert!(engine.log().is_empty());
        assert!(engine
            .signals()
            .iter()
            .all(|signal| signal.status == SignalStatus::Red));
    }

    #[test]
    fn entering_range_turns_green_once_per_interval() {
        let mut engine = SimEngine::default();

        engine.on_position(HOSPITAL_JUNCTION);
        engine.on_position(Coordinate::new(12.9741, 77.5930));
        engine.on_position(HOSPITAL_JUNCTION);

        assert_eq!(status_of(&engine, "tl-3"), SignalStatus::Green);
        assert!(engine.is_triggered("tl-3"));
        assert_eq!(count(&engine, LogCategory::Proximity), 1);
        let newest_proximity = engine
            .log()
            .entries()
            .find(|entry| entry.category == LogCategory::Proximity)
            .unwrap();
        assert_eq!(
            newest_proximity.message,
            "Within 0m of \"Hospital Junction\", switching to GREEN"
        );
    }

    #[test]
    fn disabled_notifications_log_the_would_be_target() {
        let mut engine = SimEngine::default();

        let requests = engine.on_position(HOSPITAL_JUNCTION);

        assert!(requests.is_empty());
        let head = engine.log().entries().next().unwrap();
        assert_eq!(head.category, LogCategory::Info);
        assert_eq!(
            head.message,
            "Notifications disabled, would POST to 192.168.1.102"
        );
    }

    #[test]
    fn leaving_range_turns_red_with_one_info_entry() {
        let mut engine = SimEngine::default();
        engine.on_position(HOSPITAL_JUNCTION);

        engine.on_position(FAR_AWAY);
        engine.on_position(FAR_AWAY);

        assert_eq!(status_of(&engine, "tl-3"), SignalStatus::Red);
        assert!(!engine.is_triggered("tl-3"));
        let exits = engine
            .log()
            .entries()
            .filter(|entry| entry.message.starts_with("Left range"))
            .count();
        assert_eq!(exits, 1);
        assert_eq!(
            engine.log().entries().next().unwrap().message,
            "Left range of \"Hospital Junction\", reverting to RED"
        );
    }

    #[test]
    fn green_status_matches_triggered_set() {
        let mut engine = SimEngine::default();

        for position in [MAIN_ST, HOSPITAL_JUNCTION, FAR_AWAY, MAIN_ST] {
            engine.on_position(position);
            for signal in engine.signals() {
                assert_eq!(
                    signal.status == SignalStatus::Green,
                    engine.is_triggered(&signal.id)
                );
            }
        }
    }

    #[test]
    fn one_update_can_enter_and_leave_different_signals() {
        let mut engine = SimEngine::default();
        engine.on_position(MAIN_ST);

        engine.on_position(HOSPITAL_JUNCTION);

        assert_eq!(status_of(&engine, "tl-1"), SignalStatus::Red);
        assert_eq!(status_of(&engine, "tl-3"), SignalStatus::Green);
    }

    #[test]
    fn enabled_notifications_yield_one_request_per_entry() {
        let mut engine = notifying_engine();

        let first = engine.on_position(HOSPITAL_JUNCTION);
        let second = engine.on_position(HOSPITAL_JUNCTION);

        assert_eq!(
            first,
            vec![GreenRequest {
                signal_id: "tl-3".to_string(),
                signal_name: "Hospital Junction".to_string(),
                endpoint: "http://10.0.0.7".to_string(),
            }]
        );
        assert!(second.is_empty());
        assert_eq!(count(&engine, LogCategory::Info), 0);
    }

    #[test]
    fn notification_outcomes_are_logged_without_touching_status() {
        let mut engine = notifying_engine();
        let request = engine.on_position(HOSPITAL_JUNCTION).remove(0);

        engine.record_notification(&request, Ok(200));
        engine.record_notification(
            &request,
            Err(NotifyError::Transport("connection refused".to_string())),
        );

        let mut entries = engine.log().entries();
        let failure = entries.next().unwrap();
        let success = entries.next().unwrap();
        assert_eq!(failure.category, LogCategory::Error);
        assert_eq!(
            failure.message,
            "Failed to reach http://10.0.0.7: connection refused"
        );
        assert_eq!(success.category, LogCategory::Request);
        assert_eq!(
            success.message,
            "POST sent to http://10.0.0.7/green for \"Hospital Junction\" (HTTP 200)"
        );
        assert_eq!(status_of(&engine, "tl-3"), SignalStatus::Green);
    }

    #[test]
    fn start_logs_active_source_and_rejects_double_start() {
        let mut engine = SimEngine::default();

        let ticket = engine.start().unwrap();
        let again = engine.start();

        assert_eq!(ticket.source, SourceKind::Synthetic);
        assert_eq!(again, Err(EngineError::AlreadyRunning));
        assert_eq!(engine.run_state(), RunState::Running);
        assert_eq!(engine.log().len(), 1);
        assert_eq!(
            engine.log().entries().next().unwrap().message,
            "Started simulation"
        );
    }

    #[test]
    fn stop_twice_is_idempotent_with_one_line_per_call() {
        let mut engine = SimEngine::default();
        engine.start().unwrap();

        engine.stop();
        engine.stop();

        assert_eq!(engine.run_state(), RunState::Idle);
        let stopped = engine
            .log()
            .entries()
            .filter(|entry| entry.message == "Stopped")
            .count();
        assert_eq!(stopped, 2);
    }

    #[test]
    fn stop_invalidates_the_run_epoch() {
        let mut engine = SimEngine::default();
        let ticket = engine.start().unwrap();
        assert!(engine.is_current_run(ticket.epoch));

        engine.stop();
        assert!(!engine.is_current_run(ticket.epoch));

        let next = engine.start().unwrap();
        assert!(!engine.is_current_run(ticket.epoch));
        assert!(engine.is_current_run(next.epoch));
    }

    #[test]
    fn stop_then_start_resumes_the_synthetic_path() {
        let mut engine = SimEngine::default();
        engine.start().unwrap();
        engine.synthetic_tick();
        engine.synthetic_tick();

        engine.stop();
        engine.start().unwrap();
        engine.synthetic_tick();

        assert_eq!(engine.step(), 3);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut engine = SimEngine::default();
        engine.start().unwrap();
        engine.synthetic_tick();
        engine.on_position(HOSPITAL_JUNCTION);

        engine.reset();

        assert_eq!(engine.run_state(), RunState::Idle);
        assert_eq!(engine.ambulance(), DEFAULT_AMBULANCE_START);
        assert_eq!(engine.step(), 0);
        assert!(engine.log().is_empty());
        assert!(!engine.is_triggered("tl-3"));
        assert!(engine
            .signals()
            .iter()
            .all(|signal| signal.status == SignalStatus::Red));
    }

    #[test]
    fn source_switch_is_locked_while_running() {
        let mut engine = SimEngine::default();
        engine.start().unwrap();

        let locked = engine.apply_settings(SettingsPatch {
            use_live_feed: Some(true),
            notifications_enabled: Some(true),
            ..SettingsPatch::default()
        });
        engine.set_notification_endpoint("http://10.0.0.9");
        engine.set_notifications_enabled(true);

        assert_eq!(locked, Err(EngineError::SettingsLocked));
        assert!(!engine.settings().use_live_feed);
        assert_eq!(engine.settings().notification_endpoint, "http://10.0.0.9");
        assert!(engine.settings().notifications_enabled);

        engine.stop();
        assert_eq!(engine.set_use_live_feed(true), Ok(()));
        assert_eq!(engine.start().unwrap().source, SourceKind::LiveFeed);
    }

    #[test]
    fn position_errors_become_error_entries() {
        let mut engine = SimEngine::default();

        engine.report_position_error(&PositionError::Unsupported);
        engine.report_position_error(&PositionError::Feed("timeout".to_string()));

        let messages: Vec<&str> = engine
            .log()
            .entries()
            .map(|entry| entry.message.as_str())
            .collect();
        assert_eq!(
            messages,
            ["GPS error: timeout", "Geolocation not supported on this platform"]
        );
        assert_eq!(count(&engine, LogCategory::Error), 2);
    }

    #[test]
    fn snapshot_reports_distances_and_range() {
        let mut engine = SimEngine::default();
        engine.on_position(HOSPITAL_JUNCTION);

        let snapshot = engine.snapshot();

        assert_eq!(snapshot.ambulance, HOSPITAL_JUNCTION);
        let junction = &snapshot.signals[2];
        assert_eq!(junction.signal.id, "tl-3");
        assert_eq!(junction.distance_m, 0.0);
        assert!(junction.in_range);
        assert!(!snapshot.signals[0].in_range);
    }

    #[test]
    fn approaching_hospital_junction_on_the_synthetic_path_turns_it_green() {
        // Origin chosen so the route's first step lands on the junction.
        let origin = Coordinate::new(
            HOSPITAL_JUNCTION.lat - 0.0012,
            HOSPITAL_JUNCTION.lng - 0.0008 - 0.1_f64.sin() * 0.0005,
        );
        let layout = CorridorLayout {
            ambulance_start: origin,
            ..CorridorLayout::default()
        };
        let mut engine = SimEngine::new(layout, EngineSettings::default());
        engine.start().unwrap();

        let mut steps = 0;
        while !engine.is_triggered("tl-3") && steps < 50 {
            engine.synthetic_tick();
            steps += 1;
        }

        assert_eq!(status_of(&engine, "tl-3"), SignalStatus::Green);
        let proximity: Vec<&str> = engine
            .log()
            .entries()
            .filter(|entry| entry.category == LogCategory::Proximity)
            .map(|entry| entry.message.as_str())
            .collect();
        assert_eq!(proximity.len(), 1);
        assert!(proximity[0].contains("Hospital Junction"));
    }
}
