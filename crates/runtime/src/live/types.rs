use std::time::Duration;

use geo::Coordinate;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub const DEFAULT_MAXIMUM_AGE: Duration = Duration::from_millis(1_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    pub high_accuracy: bool,
    pub maximum_age: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            maximum_age: DEFAULT_MAXIMUM_AGE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    pub coordinate: Coordinate,
    #[serde(with = "time::serde::rfc3339")]
    pub taken_at: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy_m: Option<f64>,
}

impl Fix {
    pub fn now(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            taken_at: OffsetDateTime::now_utc(),
            accuracy_m: None,
        }
    }

    pub fn is_fresh(&self, now: OffsetDateTime, maximum_age: Duration) -> bool {
        let age = now - self.taken_at;
        age <= maximum_age
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Fix(Fix),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    #[error("Geolocation not supported on this platform")]
    Unsupported,
    #[error("GPS error: {0}")]
    Feed(String),
}
