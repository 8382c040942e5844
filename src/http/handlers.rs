//! HTTP handlers. Thin by design: validation and translation only, with
//! all resilience/degradation behavior delegated to the core crates.

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

use crate::collab::llm::CompressOptions;
use crate::collab::store::Session;
use crate::error::SidecarError;
use crate::http::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub project: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSessionRequest {
    pub content: String,
    pub summary: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    pub project: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    20
}

pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<Json<Session>, SidecarError> {
    if req.content.trim().is_empty() {
        return Err(SidecarError::InputInvalid("content must not be empty".to_string()));
    }
    let session = state.store.create_session(&req.project, &req.content).await?;
    Ok(Json(session))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Session>, SidecarError> {
    state
        .store
        .get_session(&id)
        .await?
        .map(Json)
        .ok_or(SidecarError::SessionNotFound(id))
}

pub async fn update_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateSessionRequest>,
) -> Result<Json<Session>, SidecarError> {
    let session = state
        .store
        .update_session(&id, &req.content, req.summary.as_deref())
        .await?;
    Ok(Json(session))
}

pub async fn list_sessions(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Session>>, SidecarError> {
    let sessions = state
        .store
        .list_sessions(params.limit, params.offset, params.project.as_deref())
        .await?;
    Ok(Json(sessions))
}

pub async fn search_sessions(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Session>>, SidecarError> {
    let sessions = state.store.search_sessions(&params.q, params.limit).await?;
    Ok(Json(sessions))
}

#[derive(Debug, Deserialize)]
pub struct CompressRequest {
    pub content: String,
    pub target_ratio: Option<f64>,
}

pub async fn compress(State(state): State<AppState>, Json(req): Json<CompressRequest>) -> Result<Response, SidecarError> {
    let preset = state.governor.current_preset();
    let llm = state.llm.clone();
    let options = CompressOptions { target_ratio: req.target_ratio };
    let content = req.content.clone();

    let outcome = state
        .degradation
        .execute("llm", "compress", move || async move { llm.compress(&content, options, preset).await })
        .await?;

    Ok(outcome_response(outcome))
}

#[derive(Debug, Deserialize)]
pub struct TopicsRequest {
    pub content: String,
    #[serde(default = "default_max_topics")]
    pub max: usize,
}

fn default_max_topics() -> usize {
    5
}

pub async fn extract_topics(State(state): State<AppState>, Json(req): Json<TopicsRequest>) -> Result<Response, SidecarError> {
    let preset = state.governor.current_preset();
    let llm = state.llm.clone();
    let content = req.content.clone();
    let max = req.max;

    let outcome = state
        .degradation
        .execute("llm", "extract_topics", move || async move { llm.extract_topics(&content, max, preset).await })
        .await?;

    Ok(outcome_response(outcome))
}

fn outcome_response<T>(outcome: sidecar_degradation::Outcome<T>) -> Response
where
    T: Serialize,
{
    use axum::http::{header, StatusCode};

    match outcome {
        sidecar_degradation::Outcome::Fresh(value) => {
            (StatusCode::OK, Json(value)).into_response()
        }
        sidecar_degradation::Outcome::Degraded(bytes) => {
            let mut response = (StatusCode::OK, bytes).into_response();
            response
                .headers_mut()
                .insert("x-degraded", axum::http::HeaderValue::from_static("true"));
            response.headers_mut().insert(header::CONTENT_TYPE, axum::http::HeaderValue::from_static("application/json"));
            response
        }
    }
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    match &state.prometheus {
        Some(handle) => handle.render().into_response(),
        None => "metrics collection is disabled".into_response(),
    }
}
