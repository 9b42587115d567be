// HTTP request handlers
use crate::application::history_service::{DateRange, WorkoutHistory};
use crate::application::session_service::{IngestReport, SetTransition};
use crate::domain::pose::KeypointFrame;
use crate::domain::profile::{ProfileUpdate, UserProfile};
use crate::domain::rep::AngleSample;
use crate::domain::workout::{SessionStatus, WorkoutRecord};
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    pub user_id: String,
    #[serde(default)]
    pub exercise_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SamplesRequest {
    pub samples: Vec<AngleSample>,
}

#[derive(Debug, Deserialize)]
pub struct FramesRequest {
    pub frames: Vec<KeypointFrame>,
}

/// Optional RFC 3339 window, applied only when both ends are given
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn start_session(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartSessionRequest>,
) -> Result<(StatusCode, Json<SessionStatus>), ApiError> {
    let user_id = request.user_id.trim();
    if user_id.is_empty() {
        return Err(ApiError::BadRequest("userId must not be empty".to_string()));
    }

    let status = state
        .session_service
        .start_session(user_id, request.exercise_type)
        .await;
    Ok((StatusCode::CREATED, Json(status)))
}

pub async fn session_status(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionStatus>, ApiError> {
    Ok(Json(state.session_service.status(&id).await?))
}

pub async fn ingest_samples(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<SamplesRequest>,
) -> Result<Json<IngestReport>, ApiError> {
    let report = state
        .session_service
        .ingest_samples(&id, &request.samples)
        .await?;
    Ok(Json(report))
}

pub async fn ingest_frames(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<FramesRequest>,
) -> Result<Json<IngestReport>, ApiError> {
    let report = state
        .session_service
        .ingest_frames(&id, &request.frames)
        .await?;
    Ok(Json(report))
}

pub async fn abandon_rep(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionStatus>, ApiError> {
    Ok(Json(state.session_service.abandon_rep(&id).await?))
}

pub async fn finish_set(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<SetTransition>, ApiError> {
    Ok(Json(state.session_service.finish_set(&id).await?))
}

pub async fn finish_session(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<WorkoutRecord>, ApiError> {
    Ok(Json(state.session_service.finish_session(&id).await?))
}

pub async fn workout_history(
    Path(user_id): Path<String>,
    Query(query): Query<HistoryQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<WorkoutHistory>, ApiError> {
    let range = DateRange::from_bounds(query.from, query.to);
    Ok(Json(state.history_service.history(&user_id, range).await?))
}

pub async fn get_profile(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<UserProfile>, ApiError> {
    Ok(Json(state.profile_service.get_or_create(&user_id).await?))
}

pub async fn update_profile(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<UserProfile>, ApiError> {
    Ok(Json(state.profile_service.update(&user_id, update).await?))
}
