//! RSVP Consumer API
//!
//! Consumer configuration for serving attendance forecasts.
//!
//! This crate provides:
//! - [`ServiceConfig`], read from the process environment
//! - Re-exports from SPI and core for convenience

use std::net::SocketAddr;
use std::path::PathBuf;

// Re-export from core
pub use rsvp_core::{
    artifact, bound, dataset, encoder, regression, service, stats, trainer, load_csv, read_csv,
    BucketedEncoder, Dataset, LinearRegression, ModelArtifact, PredictionService,
    RandomForestRegressor, Trainer,
};

// Re-export from SPI
pub use rsvp_spi::{
    Caveat, CaveatKind, EventInput, EventRecord, FeatureEncoder, ForestConfig, LinearConfig,
    ModelMetadata, PredictionRequest, PredictionResponse, Regressor, Result, RsvpError,
    TrainingConfig,
};

use serde::{Deserialize, Serialize};

pub const ENV_HOST: &str = "HOST";
pub const ENV_PORT: &str = "PORT";
pub const ENV_ARTIFACT_DIR: &str = "RSVP_ARTIFACT_DIR";
pub const ENV_REQUIRE_ARTIFACT: &str = "RSVP_REQUIRE_ARTIFACT";

/// Configuration for the prediction server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// Directory holding the trained artifact
    pub artifact_dir: PathBuf,
    /// Refuse to start without a loadable artifact
    pub require_artifact: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            artifact_dir: PathBuf::from("artifacts"),
            require_artifact: false,
        }
    }
}

impl ServiceConfig {
    /// Read `HOST`, `PORT`, `RSVP_ARTIFACT_DIR` and `RSVP_REQUIRE_ARTIFACT`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(host) = lookup(ENV_HOST) {
            config.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            config.port = port.trim().parse().map_err(|_| {
                RsvpError::invalid_parameter(ENV_PORT, format!("'{}' is not a valid port", port))
            })?;
        }
        if let Some(dir) = lookup(ENV_ARTIFACT_DIR) {
            config.artifact_dir = PathBuf::from(dir);
        }
        if let Some(flag) = lookup(ENV_REQUIRE_ARTIFACT) {
            config.require_artifact = parse_bool(&flag).ok_or_else(|| {
                RsvpError::invalid_parameter(
                    ENV_REQUIRE_ARTIFACT,
                    format!("'{}' is not a boolean", flag),
                )
            })?;
        }
        Ok(config)
    }

    /// Socket address to bind
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| {
                RsvpError::invalid_parameter(
                    ENV_HOST,
                    format!("'{}:{}' is not a valid address", self.host, self.port),
                )
            })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ServiceConfig;
    pub use rsvp_core::{
        BucketedEncoder, Dataset, ModelArtifact, PredictionService, Trainer,
    };
    pub use rsvp_spi::{
        EventInput, FeatureEncoder, ModelMetadata, PredictionRequest, PredictionResponse,
        Regressor, Result, RsvpError, TrainingConfig,
    };
}
