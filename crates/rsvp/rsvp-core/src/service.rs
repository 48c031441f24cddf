//! Prediction service
//!
//! Loads a trained artifact once and answers forecast requests against it.
//! The artifact sits behind an `Arc` and every method takes `&self`.

use std::path::Path;
use std::sync::Arc;

use chrono::Datelike;
use rsvp_spi::{
    AttendanceRatios, EventInput, FeatureEncoder, ModelMetadata, PredictionRequest,
    PredictionResponse, Regressor, Result, RsvpError,
};
use tracing::{debug, info};

use crate::artifact::ModelArtifact;
use crate::bound::{estimate, round_count};
use crate::encoder::{
    align_to_columns, check_columns, is_rain, parse_event_date, parse_sunset_minutes,
    weekday_name, BucketedEncoder, TemperatureBucket, ENCODER_ID,
};

/// Physically plausible forecast temperatures (°F)
pub const MIN_TEMPERATURE_F: f64 = -50.0;
pub const MAX_TEMPERATURE_F: f64 = 150.0;

#[derive(Debug, Clone)]
pub struct PredictionService {
    artifact: Arc<ModelArtifact>,
    encoder: BucketedEncoder,
}

impl PredictionService {
    /// Load the artifact in `dir` and verify it against the encoder
    pub fn load(dir: &Path) -> Result<Self> {
        let artifact = ModelArtifact::load(dir)?;
        let service = Self::from_artifact(artifact)?;
        info!(
            dir = %dir.display(),
            version = %service.model_version(),
            columns = service.metadata().feature_cols.len(),
            "prediction service ready"
        );
        Ok(service)
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self> {
        let encoder =
            BucketedEncoder::new().with_trained_temperature(artifact.metadata.temperature_range);
        if artifact.metadata.encoder != ENCODER_ID {
            return Err(RsvpError::EncodingMismatch {
                missing: vec![ENCODER_ID.to_string()],
                unexpected: vec![format!("encoder {}", artifact.metadata.encoder)],
            });
        }
        let columns = &artifact.metadata.feature_cols;
        check_columns(&encoder, columns)?;

        for (model, width) in [
            ("forest", artifact.forest.n_features()),
            ("linear", artifact.linear.n_features()),
        ] {
            if width != columns.len() {
                return Err(RsvpError::EncodingMismatch {
                    missing: Vec::new(),
                    unexpected: vec![format!(
                        "{} model expects {} features but metadata lists {}",
                        model,
                        width,
                        columns.len()
                    )],
                });
            }
        }

        Ok(Self {
            artifact: Arc::new(artifact),
            encoder,
        })
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.artifact.metadata
    }

    pub fn model_version(&self) -> &str {
        &self.artifact.metadata.model_version
    }

    /// Field-level validation of a request
    pub fn validate(&self, request: &PredictionRequest) -> Result<EventInput> {
        let event_date = parse_event_date(&request.event_date)?;
        if request.registered_count < 0 {
            return Err(RsvpError::invalid_input(
                "registered_count",
                format!("must be non-negative, got {}", request.registered_count),
            ));
        }
        let temperature = request.weather_temperature;
        if !temperature.is_finite() || !(MIN_TEMPERATURE_F..=MAX_TEMPERATURE_F).contains(&temperature)
        {
            return Err(RsvpError::invalid_input(
                "weather_temperature",
                format!(
                    "must be between {} and {} °F, got {}",
                    MIN_TEMPERATURE_F, MAX_TEMPERATURE_F, temperature
                ),
            ));
        }
        parse_sunset_minutes(&request.sunset_time)?;
        if request.event_name.trim().is_empty() {
            return Err(RsvpError::invalid_input("event_name", "must not be empty"));
        }

        Ok(EventInput {
            event_date,
            registered_count: request.registered_count,
            weather_temperature: temperature,
            weather_type: request.weather_type.clone(),
            special_event: request.special_event,
            event_name: request.event_name.trim().to_string(),
            sunset_time: request.sunset_time.trim().to_string(),
        })
    }

    pub fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse> {
        let event = self.validate(request)?;
        let encoded = self.encoder.encode(&event)?;
        let aligned = align_to_columns(&self.encoder, &encoded, &self.metadata().feature_cols)?;
        let row = aligned.vector.values();

        let primary = self
            .artifact
            .forest
            .predict_row(row)
            .map_err(as_model_error)?;
        let secondary = self
            .artifact
            .linear
            .predict_row(row)
            .map_err(as_model_error)?;

        let counts = estimate(primary, &self.metadata().bound)?;
        let secondary_count = round_count(secondary)?;
        let ratios = &self.metadata().training_stats.ratios;
        let ratio_count =
            round_count(event.registered_count as f64 * fallback_ratio(ratios, &event))?;
        let attendance_ratio = (event.registered_count > 0).then(|| {
            (counts.point as f64 / event.registered_count as f64 * 1000.0).round() / 1000.0
        });

        debug!(
            date = %event.event_date,
            primary,
            secondary,
            caveats = aligned.caveats.len(),
            "prediction computed"
        );

        Ok(PredictionResponse {
            predicted_count: counts.point,
            lower_bound: counts.lower,
            upper_bound: counts.upper,
            secondary_count,
            ratio_count,
            attendance_ratio,
            model_version: self.model_version().to_string(),
            warnings: aligned.caveats.into_iter().map(|c| c.message).collect(),
            insights: insights(&self.metadata().training_stats.ratios, &event),
        })
    }
}

/// Any failure inside a fitted model is a service fault, not a caller error
fn as_model_error(err: RsvpError) -> RsvpError {
    match err {
        RsvpError::ModelExecution(_) => err,
        other => RsvpError::ModelExecution(other.to_string()),
    }
}

/// Historical attendance ratio for an event.
///
/// The event-type ratio wins over the weather ratio, which wins over the
/// weekday ratio; the overall ratio is the last resort. Non-positive ratios
/// count as unknown.
fn fallback_ratio(ratios: &AttendanceRatios, event: &EventInput) -> f64 {
    let slice = if event.special_event {
        ratios.special
    } else {
        ratios.normal
    };
    let weather = if is_rain(&event.weather_type) {
        ratios.rain
    } else {
        ratios.clear
    };
    let weekday = ratios
        .by_weekday
        .get(weekday_name(event.event_date.weekday()))
        .copied()
        .unwrap_or(ratios.base);

    [slice, weather, weekday, ratios.base]
        .into_iter()
        .find(|r| r.is_finite() && *r > 0.0)
        .unwrap_or(0.0)
}

/// Notes drawn from historical attendance ratios
fn insights(ratios: &AttendanceRatios, event: &EventInput) -> Vec<String> {
    let mut notes = Vec::new();
    if ratios.base <= 0.0 {
        return notes;
    }

    let day = weekday_name(event.event_date.weekday());
    if let Some(&day_ratio) = ratios.by_weekday.get(day) {
        let relative = day_ratio / ratios.base;
        if relative > 1.05 {
            notes.push(format!(
                "{} events typically have higher attendance ({:.1}% of registrations)",
                day,
                day_ratio * 100.0
            ));
        } else if relative < 0.95 {
            notes.push(format!(
                "{} events typically have lower attendance ({:.1}% of registrations)",
                day,
                day_ratio * 100.0
            ));
        }
    }

    if is_rain(&event.weather_type) && ratios.rain < ratios.clear {
        notes.push(format!(
            "Rain has historically reduced attendance by {:.1} points",
            (ratios.clear - ratios.rain) * 100.0
        ));
    }

    if event.special_event {
        let delta = (ratios.special - ratios.normal) * 100.0;
        let direction = if delta < 0.0 { "lower" } else { "higher" };
        notes.push(format!(
            "Special events have historically had {:.1} points {} attendance",
            delta.abs(),
            direction
        ));
    }

    match TemperatureBucket::from_fahrenheit(event.weather_temperature) {
        TemperatureBucket::Cold => notes.push("Cold weather may reduce attendance".to_string()),
        TemperatureBucket::Hot => notes.push("Hot weather may reduce attendance".to_string()),
        _ => {}
    }

    notes
}
