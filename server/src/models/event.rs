use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Record type tag for events; combined with the channel to form the partition key.
pub const EVENT_RECORD_TYPE: &str = "event";

/// A scheduled event announced in a channel.
///
/// `id` is the chat artifact's identifier, so it is only known once the
/// presentation layer has opened a message for the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub start_time: String,
    pub created_by: String,
    pub created: String,
    pub max_participants: Option<u64>,
    pub setup: Option<String>,
}

impl Event {
    /// The instant the event starts, or `None` when the stored timestamp is not ISO-8601.
    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        parse_instant(&self.start_time)
    }

    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        self.starts_at().map_or(true, |start| start <= now)
    }
}

/// Parses an ISO-8601 timestamp.
///
/// Offsets are honoured; timestamps without one, and bare dates, are taken as UTC.
pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Formats an instant the way `created` is stored.
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
