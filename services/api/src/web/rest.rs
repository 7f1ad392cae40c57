//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    extract::{Extension, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use surveysmith_core::ports::PortError;
use surveysmith_core::{
    build_prompt, flatten, parse_survey_response, reconstruct, to_form_schema, to_markdown,
    EphemeralStore, GenerationConfig, SurveyDocument,
};
use tracing::{error, warn};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::auth::signup_handler,
        crate::web::auth::login_handler,
        crate::web::auth::logout_handler,
        generate_survey_handler,
        promote_survey_handler,
        list_surveys_handler,
        list_local_surveys_handler,
        get_survey_handler,
        export_markdown_handler,
        export_forms_handler,
        delete_survey_handler,
    ),
    components(
        schemas(
            crate::web::auth::SignupRequest,
            crate::web::auth::LoginRequest,
            crate::web::auth::AuthResponse,
            GenerateSurveyResponse,
            PromoteRequest,
            PromoteResponse,
            SurveySummaryResponse,
            SurveyDetailResponse,
        )
    ),
    tags(
        (name = "SurveySmith API", description = "API endpoints for AI-assisted survey generation, storage, and export.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The response payload for a completed generation. Anonymous callers get a
/// `local_`-prefixed id and `requiresAuth: true`; signed-in callers get the
/// durable id when the save succeeded.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSurveyResponse {
    pub survey_id: Option<String>,
    pub saved: bool,
    pub requires_auth: bool,
    #[schema(value_type = Object)]
    pub survey: SurveyDocument,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromoteRequest {
    pub local_survey_id: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromoteResponse {
    pub survey_id: Uuid,
}

/// A one-line listing entry, used for both the durable and ephemeral tiers.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SurveySummaryResponse {
    pub id: String,
    pub brand_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SurveyDetailResponse {
    pub id: String,
    pub brand_name: String,
    pub created_at: DateTime<Utc>,
    #[schema(value_type = Object)]
    pub survey: SurveyDocument,
}

//=========================================================================================
// Shared Helpers
//=========================================================================================

type HandlerError = (StatusCode, String);

fn map_port_error(e: PortError) -> HandlerError {
    match e {
        PortError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        PortError::Provider(msg) => (StatusCode::BAD_GATEWAY, msg),
        PortError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
        PortError::Unexpected(msg) => {
            error!("Unexpected port error: {}", msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal error occurred".to_string(),
            )
        }
    }
}

fn require_identity(user: Option<Uuid>) -> Result<Uuid, HandlerError> {
    user.ok_or((
        StatusCode::UNAUTHORIZED,
        "Sign in to access saved surveys".to_string(),
    ))
}

fn parse_survey_id(id: &str) -> Result<Uuid, HandlerError> {
    Uuid::parse_str(id).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            format!("'{}' is not a valid survey id", id),
        )
    })
}

/// Resolves a survey from either tier: `local_` ids hit the in-memory store,
/// anything else is an identity-scoped durable lookup reconstructed from its
/// stored rows.
async fn load_survey(
    state: &AppState,
    user: Option<Uuid>,
    id: &str,
) -> Result<SurveyDetailResponse, HandlerError> {
    if EphemeralStore::is_local_id(id) {
        let store = state.local_surveys.lock().await;
        let entry = store
            .get(id)
            .ok_or((StatusCode::NOT_FOUND, format!("Survey {} not found", id)))?;
        return Ok(SurveyDetailResponse {
            id: entry.id.clone(),
            brand_name: entry.config.brand_name.clone(),
            created_at: entry.created_at,
            survey: entry.document.clone(),
        });
    }

    let user_id = require_identity(user)?;
    let survey_id = parse_survey_id(id)?;
    let (request, rows) = state
        .db
        .get_survey(user_id, survey_id)
        .await
        .map_err(map_port_error)?;
    let document = reconstruct(&rows).map_err(|e| {
        error!("Stored survey {} failed reconstruction: {}", survey_id, e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Stored survey could not be reconstructed".to_string(),
        )
    })?;

    Ok(SurveyDetailResponse {
        id: request.id.to_string(),
        brand_name: request.brand_name,
        created_at: request.created_at,
        survey: document,
    })
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Generate a survey from a configuration.
///
/// Open to anonymous callers; a valid session cookie additionally persists
/// the result to the caller's account. Persistence failure does not fail the
/// request, the generated survey is returned either way.
#[utoipa::path(
    post,
    path = "/surveys/generate",
    request_body(content = serde_json::Value, description = "The generation configuration (camelCase fields)."),
    responses(
        (status = 200, description = "Survey generated", body = GenerateSurveyResponse),
        (status = 400, description = "Incomplete or invalid configuration"),
        (status = 502, description = "The generation provider failed or returned an invalid survey")
    )
)]
pub async fn generate_survey_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<Option<Uuid>>,
    Json(config): Json<GenerationConfig>,
) -> Result<impl IntoResponse, HandlerError> {
    config
        .ensure_complete()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let prompt = build_prompt(&config);
    let raw = state
        .generator
        .generate_survey(&prompt)
        .await
        .map_err(map_port_error)?;

    let document = parse_survey_response(&raw).map_err(|e| {
        error!("Provider response failed validation: {}", e);
        (
            StatusCode::BAD_GATEWAY,
            format!("The provider returned an invalid survey: {}", e),
        )
    })?;

    let response = match user {
        Some(user_id) => {
            let rows = flatten(&document);
            match state.db.create_survey(user_id, &config, &rows).await {
                Ok(survey_id) => GenerateSurveyResponse {
                    survey_id: Some(survey_id.to_string()),
                    saved: true,
                    requires_auth: false,
                    survey: document,
                },
                Err(e) => {
                    // The generated survey is still returned; the caller just
                    // does not get a durable id.
                    warn!("Failed to persist generated survey: {:?}", e);
                    GenerateSurveyResponse {
                        survey_id: None,
                        saved: false,
                        requires_auth: false,
                        survey: document,
                    }
                }
            }
        }
        None => {
            let mut store = state.local_surveys.lock().await;
            let local_id = store.save(config, document.clone());
            GenerateSurveyResponse {
                survey_id: Some(local_id),
                saved: false,
                requires_auth: true,
                survey: document,
            }
        }
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Promote an ephemeral survey to the caller's durable tier.
///
/// Unlike generation, a persistence failure here fails the request. The local
/// copy is deleted only after the durable save succeeds.
#[utoipa::path(
    post,
    path = "/surveys/local/promote",
    request_body = PromoteRequest,
    responses(
        (status = 201, description = "Survey promoted", body = PromoteResponse),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "No such local survey")
    )
)]
pub async fn promote_survey_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<PromoteRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let entry = {
        let store = state.local_surveys.lock().await;
        store
            .get(&req.local_survey_id)
            .cloned()
            .ok_or((
                StatusCode::NOT_FOUND,
                format!("Survey {} not found", req.local_survey_id),
            ))?
    };

    let rows = flatten(&entry.document);
    let survey_id = state
        .db
        .create_survey(user_id, &entry.config, &rows)
        .await
        .map_err(map_port_error)?;

    let mut store = state.local_surveys.lock().await;
    store.delete(&req.local_survey_id);

    Ok((StatusCode::CREATED, Json(PromoteResponse { survey_id })))
}

/// List the caller's saved surveys, newest first.
#[utoipa::path(
    get,
    path = "/surveys",
    responses(
        (status = 200, description = "The caller's saved surveys", body = [SurveySummaryResponse]),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn list_surveys_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    let summaries = state
        .db
        .list_surveys(user_id)
        .await
        .map_err(map_port_error)?;

    let body: Vec<SurveySummaryResponse> = summaries
        .into_iter()
        .map(|s| SurveySummaryResponse {
            id: s.id.to_string(),
            brand_name: s.brand_name,
            created_at: s.created_at,
        })
        .collect();

    Ok(Json(body))
}

/// List ephemeral surveys, oldest first.
#[utoipa::path(
    get,
    path = "/surveys/local",
    responses(
        (status = 200, description = "Ephemeral surveys", body = [SurveySummaryResponse])
    )
)]
pub async fn list_local_surveys_handler(
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let store = state.local_surveys.lock().await;
    let body: Vec<SurveySummaryResponse> = store
        .entries()
        .iter()
        .map(|entry| SurveySummaryResponse {
            id: entry.id.clone(),
            brand_name: entry.config.brand_name.clone(),
            created_at: entry.created_at,
        })
        .collect();

    Json(body)
}

/// Fetch a single survey from either tier.
#[utoipa::path(
    get,
    path = "/surveys/{id}",
    params(("id" = String, Path, description = "A durable UUID or a local_-prefixed ephemeral id.")),
    responses(
        (status = 200, description = "The survey", body = SurveyDetailResponse),
        (status = 401, description = "A durable id was requested without a session"),
        (status = 404, description = "No such survey")
    )
)]
pub async fn get_survey_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<Option<Uuid>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let detail = load_survey(&state, user, &id).await?;
    Ok(Json(detail))
}

/// Export a survey as a markdown document.
#[utoipa::path(
    get,
    path = "/surveys/{id}/export/markdown",
    params(("id" = String, Path, description = "A durable UUID or a local_-prefixed ephemeral id.")),
    responses(
        (status = 200, description = "The markdown export", content_type = "text/markdown"),
        (status = 404, description = "No such survey")
    )
)]
pub async fn export_markdown_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<Option<Uuid>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let detail = load_survey(&state, user, &id).await?;
    let markdown = to_markdown(&detail.survey);
    Ok((
        [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
        markdown,
    ))
}

/// Export a survey as a Google Forms batchUpdate request body.
#[utoipa::path(
    get,
    path = "/surveys/{id}/export/forms",
    params(("id" = String, Path, description = "A durable UUID or a local_-prefixed ephemeral id.")),
    responses(
        (status = 200, description = "The Forms API payload", content_type = "application/json"),
        (status = 404, description = "No such survey")
    )
)]
pub async fn export_forms_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<Option<Uuid>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let detail = load_survey(&state, user, &id).await?;
    let schema = to_form_schema(&detail.survey);
    Ok(([(header::CONTENT_TYPE, "application/json")], schema))
}

/// Delete a survey from either tier.
#[utoipa::path(
    delete,
    path = "/surveys/{id}",
    params(("id" = String, Path, description = "A durable UUID or a local_-prefixed ephemeral id.")),
    responses(
        (status = 204, description = "Survey deleted"),
        (status = 401, description = "A durable id was requested without a session"),
        (status = 404, description = "No such survey")
    )
)]
pub async fn delete_survey_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<Option<Uuid>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    if EphemeralStore::is_local_id(&id) {
        let mut store = state.local_surveys.lock().await;
        if !store.delete(&id) {
            return Err((StatusCode::NOT_FOUND, format!("Survey {} not found", id)));
        }
        return Ok(StatusCode::NO_CONTENT);
    }

    let user_id = require_identity(user)?;
    let survey_id = parse_survey_id(&id)?;
    state
        .db
        .delete_survey(user_id, survey_id)
        .await
        .map_err(map_port_error)?;

    Ok(StatusCode::NO_CONTENT)
}
