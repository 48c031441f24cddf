//! RSVP Facade
//!
//! High-level API for attendance forecasting. Re-exports all public types
//! from the rsvp stack for convenient usage.

// Re-export everything from API (which includes SPI and core)
pub use rsvp_api::*;

// Explicit re-exports for documentation
pub use rsvp_api::prelude;

// Re-export core types at root
pub use rsvp_core::encoder::{AlignedFeatures, EventCategory, TemperatureBucket};
pub use rsvp_core::{align_to_columns, check_columns};

// Re-export SPI models not surfaced by the API crate
pub use rsvp_spi::{
    AttendanceRatios, BoundSpec, ColumnStats, EncodedEvent, FeatureImportance, FeatureVector,
    TemperatureRange, TrainingStats,
};
