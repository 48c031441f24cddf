//! Historical event loading
//!
//! Reads the attendance history CSV into [`EventRecord`]s. Rows with a
//! missing or unparseable required field are dropped and counted, never
//! patched up.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use rsvp_spi::{EventInput, EventRecord, Result, RsvpError};
use tracing::{debug, info};

pub const DATE_COLUMN: &str = "ds";
pub const TARGET_COLUMN: &str = "y";

const N_HEADERS: usize = 8;

/// Headers the history file must carry
pub const REQUIRED_HEADERS: [&str; N_HEADERS] = [
    DATE_COLUMN,
    TARGET_COLUMN,
    "RegisteredCount",
    "WeatherTemperature",
    "WeatherType",
    "SpecialEvent",
    "EventName",
    "SunsetTime",
];

/// Cleaned historical records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub records: Vec<EventRecord>,
    /// Rows discarded while loading
    pub dropped_rows: usize,
}

impl Dataset {
    pub fn new(records: Vec<EventRecord>) -> Self {
        Self {
            records,
            dropped_rows: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Load a history CSV from disk
pub fn load_csv(path: &Path, reference_year: i32) -> Result<Dataset> {
    let file = File::open(path)
        .map_err(|e| RsvpError::Io(format!("cannot open {}: {}", path.display(), e)))?;
    let dataset = read_csv(file, reference_year)?;
    info!(
        path = %path.display(),
        rows = dataset.len(),
        dropped = dataset.dropped_rows,
        "loaded event history"
    );
    Ok(dataset)
}

/// Parse history CSV from any reader
pub fn read_csv<R: Read>(reader: R, reference_year: i32) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| RsvpError::DataQuality(format!("cannot read header row: {}", e)))?
        .clone();
    let mut index = [0usize; N_HEADERS];
    for (slot, required) in index.iter_mut().zip(REQUIRED_HEADERS) {
        *slot = headers
            .iter()
            .position(|h| h == required)
            .ok_or_else(|| {
                RsvpError::DataQuality(format!("missing required column '{}'", required))
            })?;
    }

    let mut dataset = Dataset::default();
    for (line, row) in reader.records().enumerate() {
        // header is line 1
        let line = line + 2;
        let parsed = row
            .map_err(|e| e.to_string())
            .and_then(|row| parse_row(&row, &index, reference_year));
        match parsed {
            Ok(record) => dataset.records.push(record),
            Err(reason) => {
                debug!(line, reason = %reason, "dropping history row");
                dataset.dropped_rows += 1;
            }
        }
    }
    Ok(dataset)
}

fn parse_row(
    row: &StringRecord,
    index: &[usize; N_HEADERS],
    reference_year: i32,
) -> std::result::Result<EventRecord, String> {
    let field = move |slot: usize| row.get(index[slot]).unwrap_or("");
    let required = move |slot: usize| {
        let value = field(slot);
        if value.is_empty() {
            Err(format!("{} is empty", REQUIRED_HEADERS[slot]))
        } else {
            Ok(value)
        }
    };

    let raw_date = required(0)?;
    let event_date = parse_history_date(raw_date, reference_year)
        .ok_or_else(|| format!("unparseable date '{}'", raw_date))?;
    let actual_attendance = parse_number(required(1)?, TARGET_COLUMN)?;
    if actual_attendance < 0.0 {
        return Err(format!("negative attendance {}", actual_attendance));
    }
    let registered_count = parse_count(required(2)?)?;
    let weather_temperature = parse_number(required(3)?, "WeatherTemperature")?;
    let special_event = parse_flag(field(5))?;
    let sunset_time = required(7)?.to_string();

    Ok(EventRecord::new(
        EventInput {
            event_date,
            registered_count,
            weather_temperature,
            weather_type: field(4).to_string(),
            special_event,
            event_name: field(6).to_string(),
            sunset_time,
        },
        actual_attendance,
    ))
}

/// Parse `YYYY-MM-DD`, `DD-Mon-YYYY` or `DD-Mon` (completed with `reference_year`)
pub fn parse_history_date(raw: &str, reference_year: i32) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d-%b-%Y"))
        .or_else(|_| {
            NaiveDate::parse_from_str(&format!("{}-{}", raw, reference_year), "%d-%b-%Y")
        })
        .ok()
}

fn parse_number(raw: &str, column: &str) -> std::result::Result<f64, String> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("{} '{}' is not a number", column, raw))
}

/// Whole-number count; spreadsheet exports sometimes write `500.0`
fn parse_count(raw: &str) -> std::result::Result<i64, String> {
    if let Ok(count) = raw.parse::<i64>() {
        return Ok(count);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 => Ok(v as i64),
        _ => Err(format!("RegisteredCount '{}' is not a whole number", raw)),
    }
}

fn parse_flag(raw: &str) -> std::result::Result<bool, String> {
    match raw.to_lowercase().as_str() {
        "yes" | "y" | "true" | "1" => Ok(true),
        "no" | "n" | "false" | "0" | "" => Ok(false),
        other => Err(format!("SpecialEvent '{}' is not yes/no", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str =
        "ds,y,RegisteredCount,WeatherTemperature,WeatherType,SpecialEvent,EventName,SunsetTime";

    #[test]
    fn test_read_all_date_formats() {
        let csv = format!(
            "{HEADER}\n\
             2024-03-09,180,200,45,Clear,No,Urs,18:05\n\
             10-Mar-2024,420,500,50,Rain,Yes,Sherullah,18:06\n\
             11-Mar,700,800,52,Clear,No,Daris,18:07\n"
        );
        let dataset = read_csv(csv.as_bytes(), 2025).unwrap();

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.dropped_rows, 0);
        let dates: Vec<NaiveDate> = dataset.records.iter().map(|r| r.event.event_date).collect();
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(dates[1], NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(dates[2], NaiveDate::from_ymd_opt(2025, 3, 11).unwrap());
        assert!(dataset.records[1].event.special_event);
        assert_eq!(dataset.records[1].event.weather_type, "Rain");
    }

    #[test]
    fn test_bad_rows_dropped_and_counted() {
        let csv = format!(
            "{HEADER}\n\
             2024-03-09,180,200,45,Clear,No,Urs,18:05\n\
             not-a-date,180,200,45,Clear,No,Urs,18:05\n\
             2024-03-10,,200,45,Clear,No,Urs,18:05\n\
             2024-03-11,180,abc,45,Clear,No,Urs,18:05\n\
             2024-03-12,180,200,45,Clear,Maybe,Urs,18:05\n\
             2024-03-13,180,200\n"
        );
        let dataset = read_csv(csv.as_bytes(), 2025).unwrap();

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.dropped_rows, 5);
    }

    #[test]
    fn test_missing_header_is_data_quality_error() {
        let csv = "ds,y,RegisteredCount\n2024-03-09,180,200\n";
        let err = read_csv(csv.as_bytes(), 2025).unwrap_err();
        assert!(matches!(err, RsvpError::DataQuality(ref msg) if msg.contains("WeatherTemperature")));
    }

    #[test]
    fn test_columns_may_appear_in_any_order() {
        let csv = "EventName,SunsetTime,ds,y,RegisteredCount,WeatherTemperature,WeatherType,SpecialEvent\n\
                   Urs,18:05,2024-03-09,180,200.0,45,Clear,true\n";
        let dataset = read_csv(csv.as_bytes(), 2025).unwrap();

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.records[0].event.registered_count, 200);
        assert_eq!(dataset.records[0].actual_attendance, 180.0);
        assert_eq!(dataset.records[0].event.event_name, "Urs");
    }

    #[test]
    fn test_load_csv_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        writeln!(file, "2024-03-09,180,200,45,Clear,No,Urs,18:05").unwrap();

        let dataset = load_csv(file.path(), 2025).unwrap();
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn test_load_csv_missing_file() {
        let err = load_csv(Path::new("/nonexistent/history.csv"), 2025).unwrap_err();
        assert!(matches!(err, RsvpError::Io(_)));
    }
}
