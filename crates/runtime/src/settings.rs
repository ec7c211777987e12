use serde::{Deserialize, Serialize};

pub const DEFAULT_NOTIFICATION_ENDPOINT: &str = "http://192.168.1.100";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    Synthetic,
    LiveFeed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    pub use_live_feed: bool,
    pub notification_endpoint: String,
    pub notifications_enabled: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            use_live_feed: false,
            notification_endpoint: DEFAULT_NOTIFICATION_ENDPOINT.to_owned(),
            notifications_enabled: false,
        }
    }
}

impl EngineSettings {
    pub fn source_kind(&self) -> SourceKind {
        if self.use_live_feed {
            SourceKind::LiveFeed
        } else {
            SourceKind::Synthetic
        }
    }
}

/// Partial update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SettingsPatch {
    pub use_live_feed: Option<bool>,
    pub notification_endpoint: Option<String>,
    pub notifications_enabled: Option<bool>,
}
