use std::{
    env,
    net::{AddrParseError, SocketAddr},
};

use runtime::{settings::DEFAULT_NOTIFICATION_ENDPOINT, EngineSettings, SourceKind};

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POSITION_SOURCE: SourceKind = SourceKind::Synthetic;
const DEFAULT_LOCATION_MODE: LocationMode = LocationMode::Push;
const DEFAULT_NOTIFY_ENABLED: bool = false;

const ENV_ADDR: &str = "GREENWAVE_ADDR";
const ENV_POSITION_SOURCE: &str = "GREENWAVE_POSITION_SOURCE";
const ENV_LOCATION: &str = "GREENWAVE_LOCATION";
const ENV_NOTIFY_ENDPOINT: &str = "GREENWAVE_NOTIFY_ENDPOINT";
const ENV_NOTIFY_ENABLED: &str = "GREENWAVE_NOTIFY_ENABLED";

/// Where live fixes come from when the live position source is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationMode {
    Push,
    None,
}

impl LocationMode {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "push" => Some(Self::Push),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::None => "none",
        }
    }
}

fn parse_position_source(value: &str) -> Option<SourceKind> {
    match value {
        "synthetic" => Some(SourceKind::Synthetic),
        "live" => Some(SourceKind::LiveFeed),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub position_source: SourceKind,
    pub location: LocationMode,
    pub notify_endpoint: String,
    pub notify_enabled: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("GREENWAVE_ADDR is not a valid socket address: {0}")]
    InvalidListenAddr(#[source] AddrParseError),
    #[error("GREENWAVE_POSITION_SOURCE must be one of: synthetic, live")]
    InvalidPositionSource,
    #[error("GREENWAVE_LOCATION must be one of: push, none")]
    InvalidLocation,
    #[error("GREENWAVE_NOTIFY_ENDPOINT must not be empty or whitespace")]
    InvalidNotifyEndpoint,
    #[error("GREENWAVE_NOTIFY_ENABLED must be true or false")]
    InvalidNotifyEnabled,
    #[error("{0} contains non-unicode data")]
    NonUnicode(&'static str),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let listen_addr = match read_env(ENV_ADDR)? {
            Some(value) => value.parse().map_err(ConfigError::InvalidListenAddr)?,
            None => DEFAULT_LISTEN_ADDR
                .parse()
                .map_err(ConfigError::InvalidListenAddr)?,
        };

        let position_source = match read_env(ENV_POSITION_SOURCE)? {
            Some(value) => {
                parse_position_source(&value).ok_or(ConfigError::InvalidPositionSource)?
            }
            None => DEFAULT_POSITION_SOURCE,
        };

        let location = match read_env(ENV_LOCATION)? {
            Some(value) => LocationMode::parse(&value).ok_or(ConfigError::InvalidLocation)?,
            None => DEFAULT_LOCATION_MODE,
        };

        let notify_endpoint = match read_env(ENV_NOTIFY_ENDPOINT)? {
            Some(value) => {
                if value.trim().is_empty() {
                    return Err(ConfigError::InvalidNotifyEndpoint);
                }
                value
            }
            None => DEFAULT_NOTIFICATION_ENDPOINT.to_owned(),
        };

        let notify_enabled = match read_env(ENV_NOTIFY_ENABLED)? {
            Some(value) => parse_bool(&value).ok_or(ConfigError::InvalidNotifyEnabled)?,
            None => DEFAULT_NOTIFY_ENABLED,
        };

        Ok(Self {
            listen_addr,
            position_source,
            location,
            notify_endpoint,
            notify_enabled,
        })
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            use_live_feed: self.position_source == SourceKind::LiveFeed,
            notification_endpoint: self.notify_endpoint.clone(),
            notifications_enabled: self.notify_enabled,
        }
    }
}

fn read_env(key: &'static str) -> Result<Option<String>, ConfigError> {
    match env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::NonUnicode(key)),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
