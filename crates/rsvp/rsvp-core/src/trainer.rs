//! Model training
//!
//! Encodes the cleaned history, fixes the canonical column list, fits the
//! primary forest and the secondary linear model, and packages both with
//! the metadata the prediction service needs.

use std::path::Path;

use chrono::{SecondsFormat, Utc};
use rsvp_spi::{
    EncodedEvent, FeatureEncoder, FeatureImportance, ModelMetadata, Regressor, Result, RsvpError,
    TemperatureRange, TrainingConfig, TrainingStats,
};
use tracing::{debug, info};

use crate::artifact::ModelArtifact;
use crate::bound::bound_spec;
use crate::dataset::{Dataset, TARGET_COLUMN};
use crate::encoder::{
    align_to_columns, canonical_columns, BucketedEncoder, ENCODER_ID, SUNSET_MINUTES,
};
use crate::regression::{LinearRegression, RandomForestRegressor};
use crate::stats;

/// Fits and packages models from historical events.
#[derive(Debug, Clone)]
pub struct Trainer {
    config: TrainingConfig,
    encoder: BucketedEncoder,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            encoder: BucketedEncoder::new(),
        })
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train, then persist into `dir` only if training succeeded
    pub fn train_and_save(&self, dataset: &Dataset, dir: &Path) -> Result<ModelArtifact> {
        let artifact = self.train(dataset)?;
        artifact.save(dir)?;
        Ok(artifact)
    }

    pub fn train(&self, dataset: &Dataset) -> Result<ModelArtifact> {
        let mut usable = Vec::with_capacity(dataset.len());
        let mut encoded: Vec<EncodedEvent> = Vec::with_capacity(dataset.len());
        let mut dropped = dataset.dropped_rows;
        for record in &dataset.records {
            match self.encoder.encode(&record.event) {
                Ok(event) => {
                    encoded.push(event);
                    usable.push(record.clone());
                }
                Err(e) => {
                    debug!(date = %record.event.event_date, error = %e, "dropping unencodable record");
                    dropped += 1;
                }
            }
        }

        if usable.len() < self.config.min_rows {
            return Err(RsvpError::InsufficientData {
                required: self.config.min_rows,
                actual: usable.len(),
            });
        }

        let columns = canonical_columns(&self.encoder, &encoded);
        let mut features = Vec::with_capacity(encoded.len());
        for event in &encoded {
            features.push(align_to_columns(&self.encoder, event, &columns)?.vector.into_values());
        }
        let targets: Vec<f64> = usable.iter().map(|r| r.actual_attendance).collect();

        info!(
            rows = usable.len(),
            dropped,
            columns = columns.len(),
            trees = self.config.forest.n_trees,
            "training models"
        );

        let mut forest = RandomForestRegressor::new(self.config.forest.clone())?;
        forest.fit(&features, &targets)?;
        let mut linear = LinearRegression::new(&self.config.linear)?;
        linear.fit(&features, &targets)?;

        let forest_fitted = forest.predict(&features)?;
        let linear_fitted = linear.predict(&features)?;
        let forest_mae = stats::mae(&targets, &forest_fitted);
        let linear_mae = stats::mae(&targets, &linear_fitted);

        // Out-of-bag error when available, otherwise the optimistic in-sample error
        let std_error = forest
            .oob_rmse()
            .unwrap_or_else(|| stats::rmse(&targets, &forest_fitted));
        let bound = bound_spec(self.config.confidence_level, std_error)?;

        let temperatures: Vec<f64> = usable.iter().map(|r| r.event.weather_temperature).collect();
        let temperature = stats::column_stats(&temperatures);
        let sunsets: Vec<f64> = columns
            .iter()
            .position(|c| c == SUNSET_MINUTES)
            .map(|idx| features.iter().map(|row| row[idx]).collect())
            .unwrap_or_default();
        let registered: Vec<f64> = usable
            .iter()
            .map(|r| r.event.registered_count as f64)
            .collect();

        let mut feature_importances: Vec<FeatureImportance> = columns
            .iter()
            .zip(forest.feature_importances())
            .map(|(name, &importance)| FeatureImportance {
                name: name.clone(),
                importance,
            })
            .collect();
        feature_importances.sort_by(|a, b| b.importance.total_cmp(&a.importance));

        let training_stats = TrainingStats {
            total_events: usable.len(),
            dropped_rows: dropped,
            mean_attendance: stats::mean(&targets),
            std_attendance: stats::sample_std(&targets),
            mean_registered: stats::mean(&registered),
            temperature,
            sunset_minutes: stats::column_stats(&sunsets),
            ratios: stats::attendance_ratios(&usable),
            forest_mae,
            linear_mae,
            forest_oob_rmse: forest.oob_rmse(),
            feature_importances,
        };

        let model_version = self
            .config
            .model_version
            .clone()
            .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));

        info!(
            version = %model_version,
            forest_mae,
            linear_mae,
            std_error,
            "training complete"
        );

        Ok(ModelArtifact {
            forest,
            linear,
            metadata: ModelMetadata {
                feature_cols: columns,
                target: TARGET_COLUMN.to_string(),
                model_version,
                encoder: ENCODER_ID.to_string(),
                temperature_range: Some(TemperatureRange {
                    min: temperature.min,
                    max: temperature.max,
                }),
                bound,
                training_stats,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rsvp_spi::{EventInput, EventRecord, ForestConfig};
    use tempfile::tempdir;

    fn record(day: u32, registered: i64, attended: f64, weather: &str, sunset: &str) -> EventRecord {
        EventRecord::new(
            EventInput {
                event_date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
                registered_count: registered,
                weather_temperature: 45.0 + day as f64,
                weather_type: weather.to_string(),
                special_event: false,
                event_name: "Sherullah Majlis".to_string(),
                sunset_time: sunset.to_string(),
            },
            attended,
        )
    }

    fn history() -> Dataset {
        Dataset::new(vec![
            record(1, 200, 190.0, "Clear", "18:01"),
            record(2, 200, 170.0, "Rain", "18:02"),
            record(3, 500, 470.0, "Clear", "18:03"),
            record(4, 500, 430.0, "Rain", "18:04"),
            record(5, 800, 760.0, "Clear", "18:05"),
            record(6, 800, 700.0, "Rain", "18:06"),
        ])
    }

    fn fast_config() -> TrainingConfig {
        TrainingConfig {
            forest: ForestConfig {
                n_trees: 20,
                ..ForestConfig::default()
            },
            model_version: Some("test".to_string()),
            ..TrainingConfig::default()
        }
    }

    #[test]
    fn test_train_builds_metadata() {
        let artifact = Trainer::new(fast_config()).unwrap().train(&history()).unwrap();
        let meta = &artifact.metadata;

        assert_eq!(meta.model_version, "test");
        assert_eq!(meta.encoder, ENCODER_ID);
        assert_eq!(meta.target, "y");
        assert_eq!(&meta.feature_cols[..4], &["registered_count", "is_rain", "is_special", "sunset_minutes"]);
        assert!(meta.feature_cols.contains(&"event_sherullah".to_string()));
        assert!(!meta.feature_cols.contains(&"event_urs".to_string()));
        assert_eq!(meta.training_stats.total_events, 6);
        assert_eq!(meta.temperature_range, Some(TemperatureRange { min: 46.0, max: 51.0 }));
        assert!(meta.bound.std_error >= 0.0);
        assert_eq!(meta.bound.z, 1.96);
        assert_eq!(artifact.forest.n_features(), meta.feature_cols.len());
        assert_eq!(artifact.linear.n_features(), meta.feature_cols.len());
    }

    #[test]
    fn test_unencodable_records_are_dropped() {
        let mut dataset = history();
        dataset.records.push(record(7, -5, 10.0, "Clear", "18:07"));
        dataset.records.push(record(8, 300, 250.0, "Clear", "25:99"));
        dataset.dropped_rows = 1;

        let artifact = Trainer::new(fast_config()).unwrap().train(&dataset).unwrap();
        assert_eq!(artifact.metadata.training_stats.total_events, 6);
        assert_eq!(artifact.metadata.training_stats.dropped_rows, 3);
    }

    #[test]
    fn test_insufficient_rows_writes_nothing() {
        let dataset = Dataset::new(history().records.into_iter().take(4).collect());
        let dir = tempdir().unwrap();

        let err = Trainer::new(fast_config())
            .unwrap()
            .train_and_save(&dataset, dir.path())
            .unwrap_err();

        assert_eq!(err, RsvpError::InsufficientData { required: 5, actual: 4 });
        assert!(!ModelArtifact::exists(dir.path()));
    }

    #[test]
    fn test_same_config_is_reproducible() {
        let trainer = Trainer::new(fast_config()).unwrap();
        let a = trainer.train(&history()).unwrap();
        let b = trainer.train(&history()).unwrap();
        assert_eq!(a.forest, b.forest);
        assert_eq!(a.metadata, b.metadata);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = TrainingConfig::default();
        config.min_rows = 1;
        assert!(Trainer::new(config).is_err());
    }
}
