//! Benchmarks for request encoding and prediction latency.

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rsvp_core::{
    align_to_columns, BucketedEncoder, Dataset, FeatureEncoder, PredictionService, Trainer,
};
use rsvp_spi::{EventInput, EventRecord, ForestConfig, PredictionRequest, TrainingConfig};

fn history(size: usize) -> Dataset {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let records = (0..size)
        .map(|i| {
            let registered = 150 + (i * 37 % 700) as i64;
            let rainy = i % 4 == 0;
            let attended = registered as f64 * if rainy { 0.86 } else { 0.94 };
            EventRecord::new(
                EventInput {
                    event_date: start + Duration::days(i as i64 * 3),
                    registered_count: registered,
                    weather_temperature: 30.0 + (i % 60) as f64,
                    weather_type: if rainy { "Rain" } else { "Clear" }.to_string(),
                    special_event: i % 7 == 0,
                    event_name: ["Sherullah", "Urs", "Eid", "Daris", "Dinner"][i % 5].to_string(),
                    sunset_time: format!("{}:{:02}", 17 + i % 4, i % 60),
                },
                attended,
            )
        })
        .collect();
    Dataset::new(records)
}

fn request() -> PredictionRequest {
    PredictionRequest {
        event_date: "2025-07-18".to_string(),
        registered_count: 480,
        weather_temperature: 74.0,
        weather_type: "Clear".to_string(),
        special_event: false,
        event_name: "Urs Mubarak".to_string(),
        sunset_time: "20:21".to_string(),
    }
}

fn bench_encoding(c: &mut Criterion) {
    let encoder = BucketedEncoder::new();
    let event = history(1).records.remove(0).event;
    let columns: Vec<String> = rsvp_core::encoder::VOCABULARY
        .iter()
        .map(|c| c.to_string())
        .collect();

    c.bench_function("encode", |b| {
        b.iter(|| encoder.encode(black_box(&event)))
    });
    c.bench_function("encode_and_align", |b| {
        b.iter(|| {
            let encoded = encoder.encode(black_box(&event)).unwrap();
            align_to_columns(&encoder, &encoded, &columns)
        })
    });
}

fn bench_prediction(c: &mut Criterion) {
    let mut group = c.benchmark_group("Predict");

    for n_trees in [10, 100].iter() {
        let config = TrainingConfig {
            forest: ForestConfig {
                n_trees: *n_trees,
                ..ForestConfig::default()
            },
            model_version: Some("bench".to_string()),
            ..TrainingConfig::default()
        };
        let artifact = Trainer::new(config).unwrap().train(&history(200)).unwrap();
        let service = PredictionService::from_artifact(artifact).unwrap();
        let req = request();

        group.bench_with_input(BenchmarkId::new("trees", n_trees), &req, |b, req| {
            b.iter(|| service.predict(black_box(req)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_encoding, bench_prediction);
criterion_main!(benches);
