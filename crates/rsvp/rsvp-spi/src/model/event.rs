//! Raw event models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Raw description of one event, before feature encoding.
///
/// `registered_count` is signed and `sunset_time` is the raw `HH:MM` string
/// so that the encoder, not the type, decides what is acceptable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventInput {
    pub event_date: NaiveDate,
    pub registered_count: i64,
    /// Forecast temperature in °F
    pub weather_temperature: f64,
    /// Free-form weather label, e.g. "Clear" or "Rain"
    pub weather_type: String,
    pub special_event: bool,
    pub event_name: String,
    /// Local sunset time, `HH:MM` 24h
    pub sunset_time: String,
}

/// One historical event with its realized attendance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub event: EventInput,
    /// Training target
    pub actual_attendance: f64,
}

impl EventRecord {
    pub fn new(event: EventInput, actual_attendance: f64) -> Self {
        Self {
            event,
            actual_attendance,
        }
    }
}
