use crate::status::OtStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One patient's current theatre status.
///
/// Persisted shape: `{"uhid", "name", "status", "lastUpdated"}` where `lastUpdated` is Unix time
/// in milliseconds. It is the only timestamp kept; editing a record overwrites it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    pub uhid: String,
    pub name: String,
    pub status: OtStatus,
    pub last_updated: i64,
}

impl PatientRecord {
    /// `last_updated` as a UTC timestamp, if it is in chrono's representable range.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.last_updated)
    }

    /// Line shown in the display ticker.
    pub fn ticker_line(&self) -> String {
        format!("[{}] {} updated to {}", self.uhid, self.name, self.status)
    }
}
