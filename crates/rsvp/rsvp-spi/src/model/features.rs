//! Feature vector models.

use serde::Serialize;

use super::caveat::Caveat;
use crate::error::{Result, RsvpError};

/// Sparse encoder output for one event.
///
/// Holds the numeric columns plus the active column of every one-hot group,
/// in the encoder's vocabulary order, together with the caveats raised while
/// encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedEvent {
    features: Vec<(&'static str, f64)>,
    caveats: Vec<Caveat>,
}

impl EncodedEvent {
    pub fn new(features: Vec<(&'static str, f64)>, caveats: Vec<Caveat>) -> Self {
        Self { features, caveats }
    }

    pub fn features(&self) -> &[(&'static str, f64)] {
        &self.features
    }

    pub fn caveats(&self) -> &[Caveat] {
        &self.caveats
    }

    /// Emitted column names, in emission order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.features.iter().map(|(name, _)| *name)
    }

    /// Value of an emitted column
    pub fn get(&self, name: &str) -> Option<f64> {
        self.features
            .iter()
            .find(|(feature, _)| *feature == name)
            .map(|(_, value)| *value)
    }
}

/// Named, strictly ordered numeric model input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    names: Vec<String>,
    values: Vec<f64>,
}

impl FeatureVector {
    /// Build a vector, rejecting mismatched name/value lengths
    pub fn new(names: Vec<String>, values: Vec<f64>) -> Result<Self> {
        if names.len() != values.len() {
            return Err(RsvpError::invalid_parameter(
                "values",
                format!("expected {} values, got {}", names.len(), values.len()),
            ));
        }
        Ok(Self { names, values })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| self.values[idx])
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}
