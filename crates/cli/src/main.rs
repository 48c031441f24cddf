//! # rsvp-cli
//!
//! Command-line interface for training and querying RSVP attendance models.

use clap::{Parser, Subcommand};
use rsvp_api::{
    load_csv, ModelArtifact, PredictionRequest, PredictionService, Result, RsvpError, Trainer,
    TrainingConfig,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "rsvp")]
#[command(about = "RSVP attendance forecasting CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train models from historical events and write an artifact
    Train {
        /// Historical events CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Artifact directory to write
        #[arg(short, long, default_value = "artifacts")]
        output: PathBuf,

        /// Year attached to DD-Mon dates
        #[arg(long)]
        reference_year: Option<i32>,

        /// Minimum usable rows
        #[arg(long)]
        min_rows: Option<usize>,

        /// Number of trees in the forest
        #[arg(long)]
        trees: Option<usize>,

        /// Base RNG seed
        #[arg(long)]
        seed: Option<u64>,

        /// Explicit model version token
        #[arg(long)]
        model_version: Option<String>,
    },

    /// Forecast attendance for one event
    Predict {
        /// Artifact directory to load
        #[arg(short, long, default_value = "artifacts")]
        artifacts: PathBuf,

        /// Event date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Registered count
        #[arg(long, allow_hyphen_values = true)]
        registered: i64,

        /// Temperature in °F
        #[arg(long, allow_hyphen_values = true)]
        temperature: f64,

        /// Weather description
        #[arg(long)]
        weather: String,

        /// Mark as a special event
        #[arg(long)]
        special: bool,

        /// Event name
        #[arg(long)]
        name: String,

        /// Sunset time (HH:MM)
        #[arg(long)]
        sunset: String,
    },

    /// Print the metadata of a trained artifact
    Info {
        /// Artifact directory to load
        #[arg(short, long, default_value = "artifacts")]
        artifacts: PathBuf,
    },
}

fn training_config(
    reference_year: Option<i32>,
    min_rows: Option<usize>,
    trees: Option<usize>,
    seed: Option<u64>,
    model_version: Option<String>,
) -> TrainingConfig {
    let mut config = TrainingConfig::default();
    if let Some(year) = reference_year {
        config.reference_year = year;
    }
    if let Some(rows) = min_rows {
        config.min_rows = rows;
    }
    if let Some(n) = trees {
        config.forest.n_trees = n;
    }
    if let Some(seed) = seed {
        config.forest.seed = seed;
    }
    config.model_version = model_version;
    config
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| RsvpError::Io(format!("cannot serialize output: {}", e)))
}

fn run_train(input: PathBuf, output: PathBuf, config: TrainingConfig) -> Result<()> {
    let trainer = Trainer::new(config)?;
    let dataset = load_csv(&input, trainer.config().reference_year)?;
    println!(
        "Loaded {} events from {:?} ({} rows dropped)",
        dataset.len(),
        input.file_name().unwrap_or_default(),
        dataset.dropped_rows
    );

    let artifact = trainer.train_and_save(&dataset, &output)?;
    let stats = &artifact.metadata.training_stats;
    println!("Model version: {}", artifact.metadata.model_version);
    println!("Features: {}", artifact.metadata.feature_cols.len());
    println!("Forest MAE: {:.2}", stats.forest_mae);
    println!("Linear MAE: {:.2}", stats.linear_mae);
    if let Some(oob) = stats.forest_oob_rmse {
        println!("Forest OOB RMSE: {:.2}", oob);
    }
    for importance in stats.feature_importances.iter().take(5) {
        println!("  {:<20} {:.3}", importance.name, importance.importance);
    }
    println!("Artifact written to {:?}", output);
    Ok(())
}

fn run_predict(artifacts: PathBuf, request: PredictionRequest) -> Result<()> {
    let service = PredictionService::load(&artifacts)?;
    let response = service.predict(&request)?;
    println!("{}", to_json(&response)?);
    Ok(())
}

fn run_info(artifacts: PathBuf) -> Result<()> {
    let artifact = ModelArtifact::load(&artifacts)?;
    println!("{}", to_json(&artifact.metadata)?);
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Train {
            input,
            output,
            reference_year,
            min_rows,
            trees,
            seed,
            model_version,
        } => run_train(
            input,
            output,
            training_config(reference_year, min_rows, trees, seed, model_version),
        ),
        Commands::Predict {
            artifacts,
            date,
            registered,
            temperature,
            weather,
            special,
            name,
            sunset,
        } => run_predict(
            artifacts,
            PredictionRequest {
                event_date: date,
                registered_count: registered,
                weather_temperature: temperature,
                weather_type: weather,
                special_event: special,
                event_name: name,
                sunset_time: sunset,
            },
        ),
        Commands::Info { artifacts } => run_info(artifacts),
    }
}

/// Caller mistakes exit with 2, everything else with 1
fn exit_status(err: &RsvpError) -> u8 {
    if err.is_client_error() {
        2
    } else {
        1
    }
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rsvp_core=warn".into()),
        )
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(exit_status(&e))
        }
    }
}
