use geo::Coordinate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_AMBULANCE_START: Coordinate = Coordinate::new(12.9700, 77.5920);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalConfig {
    pub id: String,
    pub name: String,
    pub position: Coordinate,
    pub address: String,
    pub topic: String,
}

impl SignalConfig {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        position: Coordinate,
        address: impl Into<String>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position,
            address: address.into(),
            topic: topic.into(),
        }
    }
}

/// Fixed world the engine is built from and restored to on reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorridorLayout {
    pub ambulance_start: Coordinate,
    pub signals: Vec<SignalConfig>,
}

impl Default for CorridorLayout {
    fn default() -> Self {
        Self {
            ambulance_start: DEFAULT_AMBULANCE_START,
            signals: default_signals(),
        }
    }
}

pub fn default_signals() -> Vec<SignalConfig> {
    vec![
        SignalConfig::new(
            "tl-1",
            "Main St & 1st Ave",
            Coordinate::new(12.9716, 77.5946),
            "192.168.1.100",
            "traffic/signal/1",
        ),
        SignalConfig::new(
            "tl-2",
            "Park Rd & 2nd Ave",
            Coordinate::new(12.9726, 77.5966),
            "192.168.1.101",
            "traffic/signal/2",
        ),
        SignalConfig::new(
            "tl-3",
            "Hospital Junction",
            Coordinate::new(12.9740, 77.5930),
            "192.168.1.102",
            "traffic/signal/3",
        ),
    ]
}
