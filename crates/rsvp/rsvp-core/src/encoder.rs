//! Feature encoding
//!
//! Turns a raw [`EventInput`] into named numeric features. The trainer and
//! the prediction service both go through [`BucketedEncoder`] and lay the
//! result out with [`align_to_columns`] against the canonical column list
//! persisted with the model, so a row means the same thing at fit time and
//! at serve time.
//!
//! Temperature is bucketed and event names are reduced to a keyword
//! category. Neither is one-hot encoded by exact value.

use chrono::{Datelike, NaiveDate, Weekday};
use rsvp_spi::{
    Caveat, CaveatKind, EncodedEvent, EventInput, FeatureEncoder, FeatureVector, Result,
    RsvpError, TemperatureRange,
};
use tracing::warn;

/// Identifier persisted in model metadata
pub const ENCODER_ID: &str = "bucketed-v1";

pub const REGISTERED_COUNT: &str = "registered_count";
pub const IS_RAIN: &str = "is_rain";
pub const IS_SPECIAL: &str = "is_special";
pub const SUNSET_MINUTES: &str = "sunset_minutes";

/// Columns every event produces
pub const NUMERIC_COLUMNS: [&str; 4] = [REGISTERED_COUNT, IS_RAIN, IS_SPECIAL, SUNSET_MINUTES];

/// Every column the encoder can emit, in canonical order
pub const VOCABULARY: [&str; 20] = [
    REGISTERED_COUNT,
    IS_RAIN,
    IS_SPECIAL,
    SUNSET_MINUTES,
    "temp_cold",
    "temp_cool",
    "temp_warm",
    "temp_hot",
    "is_monday",
    "is_tuesday",
    "is_wednesday",
    "is_thursday",
    "is_friday",
    "is_saturday",
    "is_sunday",
    "event_sherullah",
    "event_urs",
    "event_celebration",
    "event_educational",
    "event_other",
];

// ============================================================================
// Categories
// ============================================================================

/// Coarse temperature band (°F).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureBucket {
    /// Below 40
    Cold,
    /// 40 to below 60
    Cool,
    /// 60 to below 80
    Warm,
    /// 80 and above
    Hot,
}

impl TemperatureBucket {
    pub fn from_fahrenheit(temperature: f64) -> Self {
        if temperature < 40.0 {
            Self::Cold
        } else if temperature < 60.0 {
            Self::Cool
        } else if temperature < 80.0 {
            Self::Warm
        } else {
            Self::Hot
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::Cold => "temp_cold",
            Self::Cool => "temp_cool",
            Self::Warm => "temp_warm",
            Self::Hot => "temp_hot",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Cold => "cold",
            Self::Cool => "cool",
            Self::Warm => "warm",
            Self::Hot => "hot",
        }
    }
}

/// Keyword category of an event name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventCategory {
    Sherullah,
    Urs,
    /// Eid and Milad gatherings
    Celebration,
    /// Raat and Daris sessions
    Educational,
    Other,
}

impl EventCategory {
    /// Classify by case-insensitive keyword; first match wins
    pub fn classify(event_name: &str) -> Self {
        let name = event_name.to_lowercase();
        if name.contains("sherullah") {
            Self::Sherullah
        } else if name.contains("urs") {
            Self::Urs
        } else if name.contains("eid") || name.contains("milad") {
            Self::Celebration
        } else if name.contains("raat") || name.contains("daris") {
            Self::Educational
        } else {
            Self::Other
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::Sherullah => "event_sherullah",
            Self::Urs => "event_urs",
            Self::Celebration => "event_celebration",
            Self::Educational => "event_educational",
            Self::Other => "event_other",
        }
    }
}

pub fn weekday_column(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "is_monday",
        Weekday::Tue => "is_tuesday",
        Weekday::Wed => "is_wednesday",
        Weekday::Thu => "is_thursday",
        Weekday::Fri => "is_friday",
        Weekday::Sat => "is_saturday",
        Weekday::Sun => "is_sunday",
    }
}

/// English weekday name, as used in attendance ratio tables
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

// ============================================================================
// Field Parsing
// ============================================================================

/// Parse a `YYYY-MM-DD` request date
pub fn parse_event_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        RsvpError::invalid_input(
            "event_date",
            format!("'{}' is not a valid YYYY-MM-DD date", raw),
        )
    })
}

/// Parse `HH:MM` (24h) into minutes after midnight
///
/// The hour may have one or two digits, the minute exactly two.
pub fn parse_sunset_minutes(raw: &str) -> Result<u32> {
    let invalid = || {
        RsvpError::invalid_input(
            "sunset_time",
            format!("'{}' is not a valid HH:MM time (hour 0-23, minute 00-59)", raw),
        )
    };

    let (hour, minute) = raw.trim().split_once(':').ok_or_else(invalid)?;
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !digits(hour) || hour.len() > 2 || !digits(minute) || minute.len() != 2 {
        return Err(invalid());
    }

    let hour: u32 = hour.parse().map_err(|_| invalid())?;
    let minute: u32 = minute.parse().map_err(|_| invalid())?;
    if hour > 23 || minute > 59 {
        return Err(invalid());
    }
    Ok(hour * 60 + minute)
}

/// Rain indicator for a free-form weather label
pub fn is_rain(weather_type: &str) -> bool {
    matches!(weather_type.trim().to_lowercase().as_str(), "rain" | "rainy")
}

fn indicator(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}

// ============================================================================
// Encoder
// ============================================================================

/// Bucketed-temperature, keyword-category encoder.
///
/// Emits the numeric columns plus exactly one active column from each of the
/// temperature, weekday and event-category groups. Inactive siblings are
/// left out and filled with zero by [`align_to_columns`].
#[derive(Debug, Clone, Default)]
pub struct BucketedEncoder {
    trained_temperature: Option<TemperatureRange>,
}

impl BucketedEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag temperatures outside the range seen during training
    pub fn with_trained_temperature(mut self, range: Option<TemperatureRange>) -> Self {
        self.trained_temperature = range;
        self
    }

    pub fn trained_temperature(&self) -> Option<TemperatureRange> {
        self.trained_temperature
    }
}

impl FeatureEncoder for BucketedEncoder {
    fn vocabulary(&self) -> &[&'static str] {
        &VOCABULARY
    }

    fn required_columns(&self) -> &[&'static str] {
        &NUMERIC_COLUMNS
    }

    fn encode(&self, event: &EventInput) -> Result<EncodedEvent> {
        if event.registered_count < 0 {
            return Err(RsvpError::invalid_input(
                "registered_count",
                format!("must be non-negative, got {}", event.registered_count),
            ));
        }
        let temperature = event.weather_temperature;
        if !temperature.is_finite() {
            return Err(RsvpError::invalid_input(
                "weather_temperature",
                "must be a finite number",
            ));
        }
        let sunset = parse_sunset_minutes(&event.sunset_time)?;

        let mut caveats = Vec::new();

        let bucket = TemperatureBucket::from_fahrenheit(temperature);
        if let Some(range) = self.trained_temperature {
            if !range.contains(temperature) {
                caveats.push(Caveat::new(
                    CaveatKind::TemperatureOutsideTrainedRange,
                    format!(
                        "temperature {:.1}°F is outside the trained range {:.1}-{:.1}°F; encoded as {}",
                        temperature,
                        range.min,
                        range.max,
                        bucket.label()
                    ),
                ));
            }
        }

        let category = EventCategory::classify(&event.event_name);
        if category == EventCategory::Other {
            caveats.push(Caveat::new(
                CaveatKind::UnrecognizedEventName,
                format!(
                    "event name '{}' matched no known category; encoded as other",
                    event.event_name.trim()
                ),
            ));
        }

        let features = vec![
            (REGISTERED_COUNT, event.registered_count as f64),
            (IS_RAIN, indicator(is_rain(&event.weather_type))),
            (IS_SPECIAL, indicator(event.special_event)),
            (SUNSET_MINUTES, f64::from(sunset)),
            (bucket.column(), 1.0),
            (weekday_column(event.event_date.weekday()), 1.0),
            (category.column(), 1.0),
        ];

        Ok(EncodedEvent::new(features, caveats))
    }
}

// ============================================================================
// Column Alignment
// ============================================================================

/// Dense model input plus every caveat raised on the way there
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedFeatures {
    pub vector: FeatureVector,
    pub caveats: Vec<Caveat>,
}

/// Union of emitted columns over a training set, in vocabulary order
pub fn canonical_columns<'a, E, I>(encoder: &E, encoded: I) -> Vec<String>
where
    E: FeatureEncoder + ?Sized,
    I: IntoIterator<Item = &'a EncodedEvent>,
{
    let vocabulary = encoder.vocabulary();
    let mut seen = vec![false; vocabulary.len()];
    for event in encoded {
        for name in event.names() {
            if let Some(idx) = vocabulary.iter().position(|v| *v == name) {
                seen[idx] = true;
            }
        }
    }
    vocabulary
        .iter()
        .zip(seen)
        .filter(|(_, seen)| *seen)
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Lay an encoded event out in exactly `columns` order
///
/// Inactive one-hot siblings become 0 silently. A column the encoder can
/// never produce becomes 0 with a [`CaveatKind::MissingFeature`]. An emitted
/// column the model was not trained on is dropped with a
/// [`CaveatKind::UnseenCategory`] (one-hot) or [`CaveatKind::UnusedFeature`]
/// (numeric) caveat.
pub fn align_to_columns<E: FeatureEncoder + ?Sized>(
    encoder: &E,
    encoded: &EncodedEvent,
    columns: &[String],
) -> Result<AlignedFeatures> {
    let mut caveats = encoded.caveats().to_vec();
    let vocabulary = encoder.vocabulary();
    let required = encoder.required_columns();

    let mut values = Vec::with_capacity(columns.len());
    for column in columns {
        let value = match encoded.get(column) {
            Some(value) => value,
            None => {
                let known = vocabulary.contains(&column.as_str());
                if !known || required.contains(&column.as_str()) {
                    warn!(feature = %column, "model column not produced by encoder; filling with 0");
                    caveats.push(Caveat::new(
                        CaveatKind::MissingFeature,
                        format!("feature '{}' is not produced for this event and was set to 0", column),
                    ));
                }
                0.0
            }
        };
        values.push(value);
    }

    for name in encoded.names() {
        if columns.iter().any(|column| column == name) {
            continue;
        }
        if required.contains(&name) {
            warn!(feature = name, "encoded feature not used by model");
            caveats.push(Caveat::new(
                CaveatKind::UnusedFeature,
                format!("feature '{}' is not used by the model", name),
            ));
        } else {
            warn!(feature = name, "category never observed in training data");
            caveats.push(Caveat::new(
                CaveatKind::UnseenCategory,
                format!(
                    "category '{}' was never observed in training data and does not contribute to this prediction",
                    name
                ),
            ));
        }
    }

    Ok(AlignedFeatures {
        vector: FeatureVector::new(columns.to_vec(), values)?,
        caveats,
    })
}

/// Verify a persisted column list against the encoder's vocabulary
pub fn check_columns<E: FeatureEncoder + ?Sized>(encoder: &E, columns: &[String]) -> Result<()> {
    let vocabulary = encoder.vocabulary();

    let mut unexpected: Vec<String> = Vec::new();
    for (idx, column) in columns.iter().enumerate() {
        if !vocabulary.contains(&column.as_str()) {
            unexpected.push(column.clone());
        } else if columns[..idx].contains(column) {
            unexpected.push(format!("{} (duplicate)", column));
        }
    }

    let missing: Vec<String> = encoder
        .required_columns()
        .iter()
        .filter(|required| !columns.iter().any(|c| c == *required))
        .map(|required| required.to_string())
        .collect();

    if missing.is_empty() && unexpected.is_empty() {
        Ok(())
    } else {
        Err(RsvpError::EncodingMismatch {
            missing,
            unexpected,
        })
    }
}
