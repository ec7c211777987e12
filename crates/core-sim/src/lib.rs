mod config;
mod generators;
mod signals;
mod state;

pub use config::{default_signals, CorridorLayout, SignalConfig, DEFAULT_AMBULANCE_START};
pub use generators::{position_at, SyntheticPath};
pub use signals::{Signal, SignalRegistry, SignalStatus};
pub use state::RunState;

#[cfg(test)]
mod tests {
    use super::{CorridorLayout, RunState, SignalRegistry, DEFAULT_AMBULANCE_START};

    #[test]
    fn default_layout_matches_reference_corridor() {
        let layout = CorridorLayout::default();

        assert_eq!(layout.ambulance_start, DEFAULT_AMBULANCE_START);
        assert_eq!(layout.signals.len(), 3);
        assert_eq!(layout.signals[2].name, "Hospital Junction");
        assert_eq!(layout.signals[2].position.lat, 12.9740);
        assert_eq!(layout.signals[2].position.lng, 77.5930);
        assert_eq!(layout.signals[0].address, "192.168.1.100");
        assert_eq!(layout.signals[0].topic, "traffic/signal/1");
    }

    #[test]
    fn registry_built_from_layout_keeps_signal_order() {
        let layout = CorridorLayout::default();
        let registry = SignalRegistry::new(layout.signals.clone());

        assert_eq!(registry.list()[0].name, "Main St & 1st Ave");
        assert_eq!(registry.list()[1].name, "Park Rd & 2nd Ave");
    }

    #[test]
    fn run_state_defaults_to_idle() {
        assert_eq!(RunState::default(), RunState::Idle);
        assert!(!RunState::Idle.is_running());
        assert!(RunState::Running.is_running());
    }
}
