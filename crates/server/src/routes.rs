//! API route handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rsvp_api::{ModelMetadata, PredictionRequest, PredictionResponse, PredictionService, RsvpError};
use serde::Serialize;
use std::sync::Arc;

use crate::{AppState, ServiceState};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Handler failure, mapped onto an HTTP status
#[derive(Debug)]
pub enum ApiError {
    /// Caller sent an unusable request (422)
    Validation { field: String, reason: String },
    /// No model is loaded (503)
    Unavailable(String),
    /// Server-side fault (500)
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RsvpError> for ApiError {
    fn from(err: RsvpError) -> Self {
        match err {
            RsvpError::InputValidation { field, reason } => Self::Validation { field, reason },
            RsvpError::ArtifactMissing { .. } | RsvpError::ArtifactMalformed { .. } => {
                Self::Unavailable(err.to_string())
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation {
            field: "body".to_string(),
            reason: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Validation { field, reason } => ErrorResponse {
                error: "invalid_input".to_string(),
                field: Some(field),
                reason: Some(reason),
            },
            Self::Unavailable(reason) => ErrorResponse {
                error: "model_unavailable".to_string(),
                field: None,
                reason: Some(reason),
            },
            Self::Internal(reason) => {
                tracing::error!(%reason, "prediction failed");
                ErrorResponse {
                    error: "internal_error".to_string(),
                    field: None,
                    reason: Some(reason),
                }
            }
        };
        (status, Json(body)).into_response()
    }
}

fn ready_service(state: &AppState) -> Result<&Arc<PredictionService>, ApiError> {
    match state.service() {
        ServiceState::Ready(service) => Ok(service),
        ServiceState::Unavailable(reason) => Err(ApiError::Unavailable(reason.clone())),
    }
}

pub async fn predict_event_rsvp(
    State(state): State<AppState>,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let service = ready_service(&state)?;
    let Json(request) = payload?;

    let response = service.predict(&request)?;
    tracing::info!(
        date = %request.event_date,
        registered = request.registered_count,
        predicted = response.predicted_count,
        warnings = response.warnings.len(),
        "prediction served"
    );
    Ok(Json(response))
}

pub async fn model_info(State(state): State<AppState>) -> Result<Json<ModelMetadata>, ApiError> {
    let service = ready_service(&state)?;
    Ok(Json(service.metadata().clone()))
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    match state.service() {
        ServiceState::Ready(service) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "ok",
                "model_version": service.model_version()
            })),
        ),
        ServiceState::Unavailable(reason) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "status": "unhealthy",
                "reason": reason
            })),
        ),
    }
}
