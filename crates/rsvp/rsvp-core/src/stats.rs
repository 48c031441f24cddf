//! Descriptive statistics and accuracy metrics over training data

use std::collections::BTreeMap;

use chrono::{Datelike, Weekday};
use rsvp_spi::{AttendanceRatios, ColumnStats, EventRecord};

use crate::encoder::{is_rain, weekday_name};

/// Arithmetic mean; 0 for empty input
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Sample standard deviation (n - 1); 0 for fewer than two values
pub fn sample_std(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    let m = mean(data);
    let variance = data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (data.len() - 1) as f64;
    variance.sqrt()
}

pub fn column_stats(data: &[f64]) -> ColumnStats {
    if data.is_empty() {
        return ColumnStats::default();
    }
    ColumnStats {
        mean: mean(data),
        std: sample_std(data),
        min: data.iter().copied().fold(f64::INFINITY, f64::min),
        max: data.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    }
}

/// Mean Absolute Error
///
/// NaN when the slices differ in length or are empty.
pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    let sum: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum();
    sum / actual.len() as f64
}

/// Root Mean Squared Error
///
/// NaN when the slices differ in length or are empty.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    let sum: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    (sum / actual.len() as f64).sqrt()
}

/// sum(attendance) / sum(registered) over the records matching `filter`
fn ratio<F>(records: &[EventRecord], filter: F) -> Option<f64>
where
    F: Fn(&EventRecord) -> bool,
{
    let (attended, registered) = records
        .iter()
        .filter(|r| filter(r))
        .fold((0.0, 0.0), |(a, r), rec| {
            (a + rec.actual_attendance, r + rec.event.registered_count as f64)
        });
    (registered > 0.0).then(|| attended / registered)
}

/// Attendance-to-registration ratios over the training slices
///
/// Slices without any registrations fall back to the overall ratio.
pub fn attendance_ratios(records: &[EventRecord]) -> AttendanceRatios {
    let base = ratio(records, |_| true).unwrap_or(0.0);
    let or_base = |value: Option<f64>| value.unwrap_or(base);

    let weekdays = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];
    let by_weekday: BTreeMap<String, f64> = weekdays
        .iter()
        .map(|&day| {
            let value = ratio(records, |r| r.event.event_date.weekday() == day);
            (weekday_name(day).to_string(), or_base(value))
        })
        .collect();

    AttendanceRatios {
        base,
        by_weekday,
        rain: or_base(ratio(records, |r| is_rain(&r.event.weather_type))),
        clear: or_base(ratio(records, |r| !is_rain(&r.event.weather_type))),
        special: or_base(ratio(records, |r| r.event.special_event)),
        normal: or_base(ratio(records, |r| !r.event.special_event)),
    }
}
