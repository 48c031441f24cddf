//! Data models for events, features, artifacts and predictions.

mod caveat;
mod config;
mod event;
mod features;
mod metadata;
mod prediction;

pub use caveat::*;
pub use config::*;
pub use event::*;
pub use features::*;
pub use metadata::*;
pub use prediction::*;
