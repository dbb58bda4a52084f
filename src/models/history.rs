use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::config::PayloadConfig;

/// A saved configuration.
///
/// `config` is an owned deep copy taken at save time; editing the live configuration
/// afterwards never reaches a stored entry. Entries are replaced, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Opaque key used for dedup and delete
    pub id: String,
    pub config: PayloadConfig,
    /// Creation instant in unix milliseconds
    pub timestamp: i64,
    pub name: String,
}

impl HistoryEntry {
    pub fn new(
        id: impl Into<String>,
        config: PayloadConfig,
        timestamp: i64,
        name: impl Into<String>,
    ) -> Self {
        Self { id: id.into(), config, timestamp, name: name.into() }
    }

    /// Snapshot `config` with a fresh id and the current time.
    /// Without a name, the label is `QR Code - <local date>`.
    pub fn snapshot(config: &PayloadConfig, name: Option<String>) -> Self {
        Self::snapshot_at(config, name, Utc::now())
    }

    pub fn snapshot_at(config: &PayloadConfig, name: Option<String>, now: DateTime<Utc>) -> Self {
        let name = name.unwrap_or_else(|| default_name(&now));
        Self {
            id: Uuid::new_v4().to_string(),
            config: config.clone(),
            timestamp: now.timestamp_millis(),
            name,
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}

fn default_name(now: &DateTime<Utc>) -> String {
    format!("QR Code - {}", now.with_timezone(&Local).format("%-m/%-d/%Y"))
}
