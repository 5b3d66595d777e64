//! HTTP request handlers
//!
//! Each session endpoint looks up (or lazily creates) the session and
//! forwards to its [`SessionHandle`](crate::session::SessionHandle).

use super::AppState;
use crate::error::CommandError;
use crate::session::{
    EnqueueOutcome, MoveOutcome, PlayNowOutcome, QueueSnapshot, SessionHandle, StartOutcome,
    StopOutcome, VolumeOutcome,
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use jukebox_common::{SessionId, Track};
use serde::{Deserialize, Serialize};

type ApiResult<T> = Result<Json<T>, CommandError>;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
    port: u16,
}

#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    sessions: Vec<SessionId>,
}

#[derive(Debug, Deserialize)]
pub struct PlayRequest {
    query: String,
    requester: String,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    from: usize,
    to: usize,
}

#[derive(Debug, Deserialize)]
pub struct VolumeRequest {
    volume: i64, // 0-100 user-facing scale
}

#[derive(Debug, Serialize)]
pub struct TrackResponse {
    track: Track,
}

#[derive(Debug, Serialize)]
pub struct CurrentResponse {
    current: Option<Track>,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    count: usize,
}

// ============================================================================
// Health
// ============================================================================

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "jukebox-player".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        port: state.port,
    })
}

/// GET /sessions
pub async fn list_sessions(State(state): State<AppState>) -> Json<SessionListResponse> {
    Json(SessionListResponse {
        sessions: state.registry.session_ids().await,
    })
}

async fn session(state: &AppState, session_id: String) -> SessionHandle {
    state
        .registry
        .get_or_create(&SessionId::from(session_id))
        .await
}

// ============================================================================
// Queries
// ============================================================================

/// GET /sessions/:session_id/queue
pub async fn get_queue(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<QueueSnapshot> {
    let snapshot = session(&state, session_id).await.snapshot().await?;
    Ok(Json(snapshot))
}

/// GET /sessions/:session_id/current
pub async fn get_current(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<CurrentResponse> {
    let current = session(&state, session_id).await.current().await?;
    Ok(Json(CurrentResponse { current }))
}

// ============================================================================
// Enqueue and playback control
// ============================================================================

/// POST /sessions/:session_id/play
pub async fn play(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    payload: Result<Json<PlayRequest>, JsonRejection>,
) -> ApiResult<EnqueueOutcome> {
    let Json(req) = payload?;
    let handle = session(&state, session_id).await;
    Ok(Json(handle.play(&req.query, &req.requester).await?))
}

/// POST /sessions/:session_id/play-next
pub async fn play_next(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    payload: Result<Json<PlayRequest>, JsonRejection>,
) -> ApiResult<EnqueueOutcome> {
    let Json(req) = payload?;
    let handle = session(&state, session_id).await;
    Ok(Json(handle.play_next(&req.query, &req.requester).await?))
}

/// POST /sessions/:session_id/play-now
pub async fn play_now(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    payload: Result<Json<PlayRequest>, JsonRejection>,
) -> ApiResult<PlayNowOutcome> {
    let Json(req) = payload?;
    let handle = session(&state, session_id).await;
    Ok(Json(handle.play_now(&req.query, &req.requester).await?))
}

/// POST /sessions/:session_id/start
pub async fn start(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<StartOutcome> {
    Ok(Json(session(&state, session_id).await.start().await?))
}

/// POST /sessions/:session_id/skip
pub async fn skip(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<TrackResponse> {
    let track = session(&state, session_id).await.skip().await?;
    Ok(Json(TrackResponse { track }))
}

/// POST /sessions/:session_id/pause
pub async fn pause(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<TrackResponse> {
    let track = session(&state, session_id).await.pause().await?;
    Ok(Json(TrackResponse { track }))
}

/// POST /sessions/:session_id/resume
pub async fn resume(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<TrackResponse> {
    let track = session(&state, session_id).await.resume().await?;
    Ok(Json(TrackResponse { track }))
}

/// POST /sessions/:session_id/stop
pub async fn stop(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<StopOutcome> {
    Ok(Json(session(&state, session_id).await.stop().await?))
}

/// POST /sessions/:session_id/volume
pub async fn set_volume(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    payload: Result<Json<VolumeRequest>, JsonRejection>,
) -> ApiResult<VolumeOutcome> {
    let Json(req) = payload?;
    let percent = u32::try_from(req.volume).map_err(|_| CommandError::InvalidVolume {
        volume: req.volume,
    })?;
    let handle = session(&state, session_id).await;
    Ok(Json(handle.set_volume(percent).await?))
}

// ============================================================================
// Queue editing
// ============================================================================

/// POST /sessions/:session_id/clear
pub async fn clear(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<CountResponse> {
    let count = session(&state, session_id).await.clear().await?;
    Ok(Json(CountResponse { count }))
}

/// POST /sessions/:session_id/shuffle
pub async fn shuffle(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<CountResponse> {
    let count = session(&state, session_id).await.shuffle().await?;
    Ok(Json(CountResponse { count }))
}

/// POST /sessions/:session_id/queue/move
pub async fn move_track(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    payload: Result<Json<MoveRequest>, JsonRejection>,
) -> ApiResult<MoveOutcome> {
    let Json(req) = payload?;
    let handle = session(&state, session_id).await;
    Ok(Json(handle.move_track(req.from, req.to).await?))
}

/// DELETE /sessions/:session_id/queue/:position
pub async fn remove(
    State(state): State<AppState>,
    path: Result<Path<(String, usize)>, PathRejection>,
) -> ApiResult<TrackResponse> {
    let Path((session_id, position)) = path?;
    let track = session(&state, session_id).await.remove(position).await?;
    Ok(Json(TrackResponse { track }))
}
