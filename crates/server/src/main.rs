//! # rsvp-server
//!
//! REST API server for RSVP attendance forecasts.

use axum::{
    routing::{get, post},
    Json, Router,
};
use rsvp_api::{PredictionService, RsvpError, ServiceConfig};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod routes;

/// Whether a model is loaded and able to serve predictions
#[derive(Clone)]
pub enum ServiceState {
    Ready(Arc<PredictionService>),
    Unavailable(String),
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    service: ServiceState,
}

impl AppState {
    pub fn ready(service: PredictionService) -> Self {
        Self {
            service: ServiceState::Ready(Arc::new(service)),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            service: ServiceState::Unavailable(reason.into()),
        }
    }

    pub fn service(&self) -> &ServiceState {
        &self.service
    }
}

/// Liveness probe - is the server running?
async fn liveness() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Load the artifact, degrading to an unavailable state unless one is required
fn load_state(config: &ServiceConfig) -> Result<AppState, RsvpError> {
    match PredictionService::load(&config.artifact_dir) {
        Ok(service) => Ok(AppState::ready(service)),
        Err(e) if config.require_artifact => Err(e),
        Err(e) => {
            tracing::warn!(
                dir = %config.artifact_dir.display(),
                error = %e,
                "no usable model artifact; predictions unavailable"
            );
            Ok(AppState::unavailable(e.to_string()))
        }
    }
}

fn app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health endpoints
        .route("/health", get(routes::health))
        .route("/health/live", get(liveness))
        // API endpoints
        .route("/predict_event_rsvp", post(routes::predict_event_rsvp))
        .route("/model_info", get(routes::model_info))
        // Middleware layers
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file (optional - won't fail if missing)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "server=info,rsvp_core=info,tower_http=info".into()),
        )
        .init();

    let config = ServiceConfig::from_env()?;
    let state = load_state(&config)?;
    let addr = config.socket_addr()?;

    tracing::info!("rsvp-server v{} listening on {}", env!("CARGO_PKG_VERSION"), addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config(dir: PathBuf, require_artifact: bool) -> ServiceConfig {
        ServiceConfig {
            artifact_dir: dir,
            require_artifact,
            ..ServiceConfig::default()
        }
    }

    #[test]
    fn test_missing_artifact_degrades_to_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let state = load_state(&config(dir.path().join("absent"), false)).unwrap();

        match state.service() {
            ServiceState::Unavailable(reason) => assert!(reason.contains("not found")),
            ServiceState::Ready(_) => panic!("expected unavailable state"),
        }
    }

    #[test]
    fn test_missing_artifact_is_fatal_when_required() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_state(&config(dir.path().join("absent"), true));
        assert!(matches!(result, Err(RsvpError::ArtifactMissing { .. })));
    }

    #[tokio::test]
    async fn test_liveness() {
        let Json(body) = liveness().await;
        assert_eq!(body["status"], "alive");
    }

    #[test]
    fn test_router_builds() {
        let _router = app(AppState::unavailable("no model"));
    }
}
