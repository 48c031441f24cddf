//! Model artifact metadata.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Metadata persisted next to the fitted models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Canonical ordered feature columns shared by training and serving
    pub feature_cols: Vec<String>,
    /// Name of the training target column
    pub target: String,
    /// Version token (RFC 3339 timestamp unless overridden)
    pub model_version: String,
    /// Encoding strategy identifier
    pub encoder: String,
    /// Temperatures seen during training
    pub temperature_range: Option<TemperatureRange>,
    pub bound: BoundSpec,
    pub training_stats: TrainingStats,
}

/// Inclusive temperature range observed in the training data (°F).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub min: f64,
    pub max: f64,
}

impl TemperatureRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Fixed-standard-error prediction bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundSpec {
    pub confidence_level: f64,
    /// Normal quantile for `confidence_level`
    pub z: f64,
    /// Historical standard error of the primary model, in attendees
    pub std_error: f64,
}

impl BoundSpec {
    /// Distance from the point estimate to either edge of the bound
    pub fn half_width(&self) -> f64 {
        self.z * self.std_error
    }
}

/// Summary statistics of one numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ColumnStats {
    pub mean: f64,
    /// Sample standard deviation (n - 1)
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// Attendance-to-registration ratios over slices of the training data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AttendanceRatios {
    /// Overall sum(attendance) / sum(registered)
    pub base: f64,
    /// Keyed by weekday name ("Monday" ...); weekdays without events fall back to `base`
    pub by_weekday: BTreeMap<String, f64>,
    pub rain: f64,
    pub clear: f64,
    pub special: f64,
    pub normal: f64,
}

/// Relative importance of a feature in the primary model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub name: String,
    pub importance: f64,
}

/// Statistics gathered while training, exposed for introspection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrainingStats {
    /// Rows used for fitting
    pub total_events: usize,
    /// Rows discarded during cleaning or encoding
    pub dropped_rows: usize,
    pub mean_attendance: f64,
    pub std_attendance: f64,
    pub mean_registered: f64,
    pub temperature: ColumnStats,
    pub sunset_minutes: ColumnStats,
    pub ratios: AttendanceRatios,
    /// In-sample mean absolute error of the forest
    pub forest_mae: f64,
    /// In-sample mean absolute error of the linear model
    pub linear_mae: f64,
    /// Out-of-bag RMSE of the forest, when any row was ever out of bag
    pub forest_oob_rmse: Option<f64>,
    /// Sorted by descending importance
    pub feature_importances: Vec<FeatureImportance>,
}
