//! API handlers for the Courrier server
//!
//! Provides REST endpoints for:
//! - Template listing and lookup
//! - Request analysis (routing + extraction)
//! - Document generation

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{FieldValues, RoutingAnalysis, Template};
use template_engine::{OutputFormat, TemplateInfo};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::pipeline::{route_request, run_pipeline, PipelineOutcome, PipelineRequest};
use crate::sessions::Session;
use crate::state::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "courrier-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Template list response
#[derive(Serialize)]
pub struct TemplateListResponse {
    pub success: bool,
    pub templates: Vec<TemplateInfo>,
    pub count: usize,
}

/// Handler: GET /api/templates
pub async fn handle_list_templates(State(state): State<AppState>) -> Json<TemplateListResponse> {
    let templates = state.templates.list_templates();
    let count = templates.len();

    Json(TemplateListResponse {
        success: true,
        templates,
        count,
    })
}

#[derive(Serialize)]
pub struct TemplateResponse {
    pub success: bool,
    pub template: Template,
}

/// Handler: GET /api/templates/:id
pub async fn handle_get_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TemplateResponse>, ApiError> {
    let template = state.templates.load_template(&id)?;
    Ok(Json(TemplateResponse {
        success: true,
        template,
    }))
}

/// Analyze request body
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub user_input: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub success: bool,
    pub analysis: RoutingAnalysis,
    pub template: TemplateInfo,
    pub extracted_data: FieldValues,
    /// True when the external extractor failed and only regex values are shown
    pub extraction_degraded: bool,
}

/// Handler: POST /api/documents/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let text = req.user_input.trim();
    if text.is_empty() {
        return Err(ApiError::InvalidRequest("userInput must not be empty".to_string()));
    }

    let (analysis, template) = route_request(&state, text).await?;
    let fields: Vec<_> = template.fields().cloned().collect();
    let outcome = state.extractor.extract_data_combined(text, &fields).await;

    info!(
        template = %template.id,
        confidence = analysis.confidence,
        degraded = analysis.is_degraded(),
        extracted = outcome.values.len(),
        "Request analyzed"
    );

    Ok(Json(AnalyzeResponse {
        success: true,
        template: TemplateInfo::from(&template),
        analysis,
        extracted_data: outcome.values,
        extraction_degraded: outcome.degraded,
    }))
}

/// Generate request body
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub template_id: Option<String>,
    #[serde(default)]
    pub manual_data: FieldValues,
    /// Output format: "html" or "pdf"
    #[serde(default = "default_format")]
    pub format: String,
    pub user_input: Option<String>,
}

fn default_format() -> String {
    "html".to_string()
}

/// Handler: POST /api/documents/generate
///
/// Returns the document as an attachment, or 422 with the draft when
/// required data is missing.
pub async fn handle_generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<GenerateRequest>,
) -> Result<Response, ApiError> {
    let session = authenticate(&state, &headers).await?;

    let format: OutputFormat = req.format.parse().map_err(ApiError::InvalidRequest)?;
    debug!(user = %session.user_id, format = %format, "Generate request");

    let request = PipelineRequest {
        template_id: req.template_id,
        user_input: req.user_input,
        manual_data: req.manual_data,
        format,
    };

    let outcome = run_pipeline(&state, &session.user_id, request, Utc::now()).await?;
    debug!(user = %session.user_id, stage = %outcome.stage(), "Pipeline finished");

    match outcome {
        PipelineOutcome::Rendered(document) => Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, document.mime_type),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", document.filename),
                ),
            ],
            document.body,
        )
            .into_response()),
        PipelineOutcome::MissingData {
            missing,
            warnings,
            draft_html,
        } => Err(ApiError::MissingData {
            missing,
            warnings,
            draft_html,
        }),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub success: bool,
    pub token: String,
    pub user_id: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Handler: POST /api/sessions
///
/// Exchanges a valid token (usually a long-lived fixture token) for a fresh
/// session that expires after the configured TTL.
pub async fn handle_create_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let current = authenticate(&state, &headers).await?;
    let session = state.sessions.create(&current.user_id).await;
    info!(user = %session.user_id, "Session opened");

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            success: true,
            token: session.token,
            user_id: session.user_id,
            expires_at: session.expires_at,
        }),
    ))
}

/// Handler: DELETE /api/sessions/current
pub async fn handle_logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let session = authenticate(&state, &headers).await?;
    state.sessions.expire(&session.token).await;
    info!(user = %session.user_id, "Session closed");
    Ok(StatusCode::NO_CONTENT)
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Session, ApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::Unauthorized)?;

    state.sessions.get(token).await.ok_or(ApiError::Unauthorized)
}
