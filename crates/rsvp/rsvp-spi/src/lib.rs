//! RSVP Service Provider Interface
//!
//! Defines the contracts, error taxonomy and data models shared by the
//! training and serving halves of the attendance forecaster:
//!
//! - [`Regressor`]: opaque `fit(X, y)` / `predict(X)` capability
//! - [`FeatureEncoder`]: raw event to named numeric features
//! - [`RsvpError`]: standardized error type for all operations
//! - [`Result`]: convenient result type alias

pub mod contract;
pub mod error;
pub mod model;

// Re-export all public items at crate root for convenience
pub use contract::{FeatureEncoder, Regressor};
pub use error::{Result, RsvpError};
pub use model::{
    AttendanceRatios, BoundSpec, Caveat, CaveatKind, ColumnStats, EncodedEvent, EventInput,
    EventRecord, FeatureImportance, FeatureVector, ForestConfig, LinearConfig, ModelMetadata,
    PredictionRequest, PredictionResponse, TemperatureRange, TrainingConfig, TrainingStats,
};
