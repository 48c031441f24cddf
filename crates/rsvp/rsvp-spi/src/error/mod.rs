//! Error types for RSVP forecasting

mod rsvp_error;

pub use rsvp_error::{Result, RsvpError};
