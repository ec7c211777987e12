use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogCategory {
    Proximity,
    Request,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub category: LogCategory,
    pub message: String,
}

impl LogEntry {
    pub fn new(category: LogCategory, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: OffsetDateTime::now_utc(),
            category,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(LogCategory::Info, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogCategory::Error, message)
    }
}

#[cfg(test)]
mod tests {
    use super::{LogCategory, LogEntry};

    #[test]
    fn entries_get_distinct_ids() {
        let first = LogEntry::info("Stopped");
        let second = LogEntry::info("Stopped");

        assert_ne!(first.id, second.id);
    }

    #[test]
    fn log_entry_serializes_category_and_rfc3339_timestamp() {
        let entry = LogEntry::new(LogCategory::Proximity, "Within 42m");

        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["category"], "proximity");
        assert_eq!(json["message"], "Within 42m");
        assert!(json["timestamp"].as_str().unwrap().contains('T'));

        let decoded: LogEntry = serde_json::from_value(json).unwrap();
        assert_eq!(decoded.id, entry.id);
    }
}
