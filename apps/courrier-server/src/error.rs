//! Error types for the Courrier server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared_types::CoreError;
use template_engine::EngineError;
use thiserror::Error;

/// Server error types
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("User data source unavailable: {0}")]
    DataSource(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Missing or invalid session token")]
    Unauthorized,

    /// Required data is missing; carries the placeholder draft
    #[error("Missing data: {}", .missing.join(", "))]
    MissingData {
        missing: Vec<String>,
        warnings: Vec<String>,
        draft_html: String,
    },

    #[error("{0}")]
    PdfNotAvailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

/// Body of a 422 response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MissingDataResponse {
    success: bool,
    error: String,
    code: String,
    missing: Vec<String>,
    warnings: Vec<String>,
    draft_html: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::MissingData {
                missing,
                warnings,
                draft_html,
            } => {
                let body = MissingDataResponse {
                    success: false,
                    error: "Des informations requises sont manquantes".to_string(),
                    code: "MISSING_DATA".to_string(),
                    missing,
                    warnings,
                    draft_html,
                };
                return (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response();
            }
            ApiError::TemplateNotFound(id) => (
                StatusCode::NOT_FOUND,
                "TEMPLATE_NOT_FOUND",
                format!("Template '{}' not found", id),
            ),
            ApiError::DataSource(msg) => {
                tracing::error!("User data source error: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "DATA_SOURCE_UNAVAILABLE",
                    "User data source unavailable".to_string(),
                )
            }
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Missing or invalid session token".to_string(),
            ),
            ApiError::PdfNotAvailable(msg) => {
                (StatusCode::NOT_IMPLEMENTED, "PDF_NOT_AVAILABLE", msg)
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal error".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::TemplateNotFound(id) => ApiError::TemplateNotFound(id),
            EngineError::FormatUnavailable(msg) => ApiError::PdfNotAvailable(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::TemplateNotFound(id) => ApiError::TemplateNotFound(id),
            CoreError::DataSource(msg) => ApiError::DataSource(msg),
        }
    }
}
