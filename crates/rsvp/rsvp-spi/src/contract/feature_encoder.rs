//! Feature encoder contract

use crate::error::Result;
use crate::model::{EncodedEvent, EventInput};

/// Maps a raw event to named numeric features
///
/// The same encoder must be used at training and serving time. An
/// implementation is expected to be a pure function of its configuration and
/// the event: identical input always yields identical output.
pub trait FeatureEncoder: Send + Sync {
    /// Every column name this encoder can emit, in canonical order
    fn vocabulary(&self) -> &[&'static str];

    /// Columns emitted for every event (as opposed to one-hot columns that
    /// are only emitted when active)
    fn required_columns(&self) -> &[&'static str];

    /// Encode one event
    fn encode(&self, event: &EventInput) -> Result<EncodedEvent>;
}
