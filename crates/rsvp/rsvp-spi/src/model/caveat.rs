//! Caveat model.

use serde::{Deserialize, Serialize};

/// Category of a non-fatal note about a degraded or defaulted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaveatKind {
    /// Event name matched no keyword; encoded as the "other" category
    UnrecognizedEventName,
    /// Temperature lies outside the range seen during training
    TemperatureOutsideTrainedRange,
    /// Active category column never appeared in the training data
    UnseenCategory,
    /// Model column the encoder cannot produce; filled with zero
    MissingFeature,
    /// Encoder column the model does not use
    UnusedFeature,
}

/// User-facing note attached to an encoding or prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caveat {
    pub kind: CaveatKind,
    pub message: String,
}

impl Caveat {
    pub fn new(kind: CaveatKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}
