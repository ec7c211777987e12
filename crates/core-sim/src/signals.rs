use geo::Coordinate;
use serde::{Deserialize, Serialize};

use crate::config::SignalConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalStatus {
    Red,
    Yellow,
    Green,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub id: String,
    pub name: String,
    pub position: Coordinate,
    pub status: SignalStatus,
    pub address: String,
    pub topic: String,
}

impl From<&SignalConfig> for Signal {
    fn from(config: &SignalConfig) -> Self {
        Self {
            id: config.id.clone(),
            name: config.name.clone(),
            position: config.position,
            status: SignalStatus::Red,
            address: config.address.clone(),
            topic: config.topic.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalRegistry {
    defaults: Vec<SignalConfig>,
    signals: Vec<Signal>,
}

impl SignalRegistry {
    pub fn new(defaults: Vec<SignalConfig>) -> Self {
        let signals = defaults.iter().map(Signal::from).collect();
        Self { defaults, signals }
    }

    pub fn list(&self) -> &[Signal] {
        &self.signals
    }

    pub fn get(&self, id: &str) -> Option<&Signal> {
        self.signals.iter().find(|signal| signal.id == id)
    }

    /// Returns `false` when no signal has `id`; the registry is left untouched.
    pub fn set_status(&mut self, id: &str, status: SignalStatus) -> bool {
        match self.signals.iter_mut().find(|signal| signal.id == id) {
            Some(signal) => {
                signal.status = status;
                true
            }
            None => false,
        }
    }

    pub fn reset_all(&mut self) {
        self.signals = self.defaults.iter().map(Signal::from).collect();
    }
}
