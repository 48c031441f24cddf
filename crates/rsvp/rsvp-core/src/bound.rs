//! Prediction bounds
//!
//! The bound is a fixed historical standard error: `z · σ` around the point
//! estimate, where σ is the primary model's out-of-bag RMSE measured at
//! training time.

use rsvp_spi::{BoundSpec, Result, RsvpError};

/// Normal quantile for a two-sided confidence level (approximate)
pub fn z_score(confidence_level: f64) -> f64 {
    match confidence_level {
        x if x >= 0.99 => 2.576,
        x if x >= 0.95 => 1.96,
        x if x >= 0.90 => 1.645,
        x if x >= 0.80 => 1.282,
        _ => 1.96, // default to 95%
    }
}

/// Build the persisted bound from a standard error in attendees
pub fn bound_spec(confidence_level: f64, std_error: f64) -> Result<BoundSpec> {
    if !std_error.is_finite() || std_error < 0.0 {
        return Err(RsvpError::NumericalError(format!(
            "standard error must be finite and non-negative, got {}",
            std_error
        )));
    }
    Ok(BoundSpec {
        confidence_level,
        z: z_score(confidence_level),
        std_error,
    })
}

/// Rounded, zero-floored point estimate with its bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountEstimate {
    pub point: u32,
    pub lower: u32,
    pub upper: u32,
}

/// Round a raw model output into a count
///
/// Non-finite output is a model failure, never a zero.
pub fn round_count(raw: f64) -> Result<u32> {
    if !raw.is_finite() {
        return Err(RsvpError::ModelExecution(format!(
            "model produced a non-finite value ({})",
            raw
        )));
    }
    Ok(raw.round().clamp(0.0, u32::MAX as f64) as u32)
}

/// Apply the bound to a raw point estimate
///
/// Guarantees `lower <= point <= upper`.
pub fn estimate(raw: f64, bound: &BoundSpec) -> Result<CountEstimate> {
    let point = round_count(raw)?;
    let half_width = bound.half_width();
    if !half_width.is_finite() || half_width < 0.0 {
        return Err(RsvpError::ModelExecution(format!(
            "invalid bound half-width {}",
            half_width
        )));
    }
    let center = f64::from(point);
    Ok(CountEstimate {
        point,
        lower: round_count(center - half_width)?.min(point),
        upper: round_count(center + half_width)?.max(point),
    })
}
