//! Prediction request and response models.

use serde::{Deserialize, Serialize};

/// One event submitted for forecasting.
///
/// Fields stay loosely typed on the wire so that validation can report a
/// specific, field-level reason instead of a generic deserialization error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    /// `YYYY-MM-DD`
    pub event_date: String,
    pub registered_count: i64,
    /// °F
    pub weather_temperature: f64,
    pub weather_type: String,
    pub special_event: bool,
    pub event_name: String,
    /// `HH:MM` 24h
    pub sunset_time: String,
}

/// Forecast for one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// Primary (forest) estimate, floored at zero
    pub predicted_count: u32,
    pub lower_bound: u32,
    pub upper_bound: u32,
    /// Secondary (linear) estimate, floored at zero
    pub secondary_count: u32,
    /// Registered count scaled by the historical attendance ratio
    pub ratio_count: u32,
    /// `predicted_count / registered_count` to three decimals; absent when
    /// nobody registered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendance_ratio: Option<f64>,
    pub model_version: String,
    /// Caveats raised while encoding this request
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Observations from historical attendance ratios
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub insights: Vec<String>,
}
