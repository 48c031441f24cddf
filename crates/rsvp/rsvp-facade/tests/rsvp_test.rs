//! Unit tests for the rsvp crates
//!
//! Exercises individual building blocks through the facade.

use rsvp_facade::bound::{estimate, z_score};
use rsvp_facade::encoder::{parse_sunset_minutes, VOCABULARY};
use rsvp_facade::stats::{attendance_ratios, mae, rmse};
use rsvp_facade::{
    BoundSpec, EventCategory, LinearRegression, RandomForestRegressor, Regressor,
    TemperatureBucket,
};

// ============================================================================
// Bound Tests
// ============================================================================

#[test]
fn test_bound_uses_z_times_std_error() {
    let bound = BoundSpec {
        confidence_level: 0.95,
        z: z_score(0.95),
        std_error: 25.0,
    };
    let est = estimate(300.0, &bound).unwrap();

    assert_eq!(est.point, 300);
    assert_eq!(est.lower, 251);
    assert_eq!(est.upper, 349);
}

#[test]
fn test_negative_model_output_floors_to_zero() {
    let bound = BoundSpec {
        confidence_level: 0.9,
        z: z_score(0.9),
        std_error: 5.0,
    };
    let est = estimate(-3.7, &bound).unwrap();

    assert_eq!(est.point, 0);
    assert_eq!(est.lower, 0);
    assert!(est.upper >= est.point);
}

// ============================================================================
// Encoder Tests
// ============================================================================

#[test]
fn test_vocabulary_has_no_exact_value_columns() {
    assert_eq!(VOCABULARY.len(), 20);
    assert!(VOCABULARY.iter().all(|c| !c.chars().any(|ch| ch.is_ascii_digit())));
}

#[test]
fn test_sunset_edge_values() {
    assert_eq!(parse_sunset_minutes("0:00").unwrap(), 0);
    assert_eq!(parse_sunset_minutes(" 20:45 ").unwrap(), 1245);
    assert!(parse_sunset_minutes("25:99").is_err());
    assert!(parse_sunset_minutes("-1:30").is_err());
}

#[test]
fn test_category_helpers() {
    assert_eq!(TemperatureBucket::from_fahrenheit(-20.0).column(), "temp_cold");
    assert_eq!(EventCategory::classify("EID MUBARAK").column(), "event_celebration");
}

// ============================================================================
// Model Tests
// ============================================================================

#[test]
fn test_models_share_the_regressor_contract() {
    let features: Vec<Vec<f64>> = (0..12).map(|i| vec![i as f64 * 50.0]).collect();
    let targets: Vec<f64> = features.iter().map(|r| r[0] * 0.9).collect();

    let mut models: Vec<Box<dyn Regressor>> = vec![
        Box::new(RandomForestRegressor::new(Default::default()).unwrap()),
        Box::new(LinearRegression::default()),
    ];
    for model in models.iter_mut() {
        assert!(!model.is_fitted());
        model.fit(&features, &targets).unwrap();
        assert!(model.is_fitted());
        assert_eq!(model.n_features(), 1);

        let predictions = model.predict(&features).unwrap();
        assert!(mae(&targets, &predictions) < 30.0);
        assert!(rmse(&targets, &predictions) < 40.0);
    }
}

#[test]
fn test_ratios_empty_history() {
    let ratios = attendance_ratios(&[]);
    assert_eq!(ratios.base, 0.0);
    assert_eq!(ratios.rain, 0.0);
}
