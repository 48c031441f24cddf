//! RSVP error types
//!
//! Defines the error taxonomy shared by the encoder, trainer and
//! prediction service.

use thiserror::Error;

/// Result type alias for RSVP operations
pub type Result<T> = std::result::Result<T, RsvpError>;

/// Errors that can occur while training or serving attendance forecasts
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RsvpError {
    /// A request or raw event field is malformed or out of range
    #[error("Invalid '{field}': {reason}")]
    InputValidation { field: String, reason: String },

    /// Training data is missing required columns or is otherwise unusable
    #[error("Data quality error: {0}")]
    DataQuality(String),

    /// Too few usable rows remained after cleaning
    #[error("Insufficient data: need at least {required} usable rows, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Trained model files are absent
    #[error("Model artifact not found at {path}")]
    ArtifactMissing { path: String },

    /// Trained model files exist but cannot be read back
    #[error("Model artifact at {path} is malformed: {reason}")]
    ArtifactMalformed { path: String, reason: String },

    /// Canonical feature columns disagree with what the encoder produces
    #[error(
        "Feature columns do not match the encoder (missing: [{}], unexpected: [{}])",
        .missing.join(", "),
        .unexpected.join(", ")
    )]
    EncodingMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    /// A fitted model failed to produce a usable output
    #[error("Model execution failed: {0}")]
    ModelExecution(String),

    /// Model has not been fitted yet
    #[error("Model must be fitted before prediction")]
    NotFitted,

    /// Invalid parameter value
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Numerical computation error
    #[error("Numerical error: {0}")]
    NumericalError(String),

    /// Filesystem or stream failure
    #[error("I/O error: {0}")]
    Io(String),
}

impl RsvpError {
    /// Shorthand for a field-level [`RsvpError::InputValidation`]
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InputValidation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`RsvpError::InvalidParameter`]
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// True when the caller supplied bad input, as opposed to a server-side fault
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InputValidation { .. })
    }

    /// Training data problems: missing columns or too few usable rows
    pub fn is_data_quality(&self) -> bool {
        matches!(self, Self::DataQuality(_) | Self::InsufficientData { .. })
    }

    /// The offending field for validation errors
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InputValidation { field, .. } => Some(field),
            _ => None,
        }
    }
}
