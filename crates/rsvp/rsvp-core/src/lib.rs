//! RSVP Core
//!
//! Core implementations for attendance forecasting: feature encoding,
//! regression models, history loading, training, artifact persistence and
//! the prediction service.

pub mod artifact;
pub mod bound;
pub mod dataset;
pub mod encoder;
pub mod regression;
pub mod service;
pub mod stats;
pub mod trainer;

// Re-export SPI types for implementations
pub use rsvp_spi::{
    Caveat, CaveatKind, EncodedEvent, EventInput, EventRecord, FeatureEncoder, FeatureVector,
    ModelMetadata, PredictionRequest, PredictionResponse, Regressor, Result, RsvpError,
    TrainingConfig,
};

// Re-export main types
pub use artifact::ModelArtifact;
pub use dataset::{load_csv, read_csv, Dataset};
pub use encoder::{align_to_columns, check_columns, AlignedFeatures, BucketedEncoder};
pub use regression::{LinearRegression, RandomForestRegressor};
pub use service::PredictionService;
pub use trainer::Trainer;
