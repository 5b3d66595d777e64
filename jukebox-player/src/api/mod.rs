//! HTTP control surface
//!
//! JSON endpoints mapping one-to-one onto session operations, plus SSE
//! streams of session events.

pub mod handlers;
pub mod sse;

use crate::error::{CommandError, Error, Result};
use crate::registry::SessionRegistry;
use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
    /// Server port
    pub port: u16,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/sessions", get(handlers::list_sessions))
        // Queries
        .route("/sessions/:session_id/queue", get(handlers::get_queue))
        .route("/sessions/:session_id/current", get(handlers::get_current))
        // Enqueue and playback control
        .route("/sessions/:session_id/play", post(handlers::play))
        .route("/sessions/:session_id/play-now", post(handlers::play_now))
        .route("/sessions/:session_id/play-next", post(handlers::play_next))
        .route("/sessions/:session_id/start", post(handlers::start))
        .route("/sessions/:session_id/skip", post(handlers::skip))
        .route("/sessions/:session_id/pause", post(handlers::pause))
        .route("/sessions/:session_id/resume", post(handlers::resume))
        .route("/sessions/:session_id/stop", post(handlers::stop))
        .route("/sessions/:session_id/volume", post(handlers::set_volume))
        // Queue editing
        .route("/sessions/:session_id/clear", post(handlers::clear))
        .route("/sessions/:session_id/shuffle", post(handlers::shuffle))
        .route("/sessions/:session_id/queue/move", post(handlers::move_track))
        .route(
            "/sessions/:session_id/queue/:position",
            delete(handlers::remove),
        )
        // SSE event streams
        .route("/events", get(sse::event_stream))
        .route("/sessions/:session_id/events", get(sse::session_event_stream))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind `port` and serve until `shutdown` resolves
pub async fn serve(
    registry: Arc<SessionRegistry>,
    port: u16,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let app = create_router(AppState { registry, port });

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Http(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::Http(format!("Server error: {}", e)))?;

    Ok(())
}

impl CommandError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CommandError::NoTracksFound => StatusCode::NOT_FOUND,
            CommandError::Resolution { .. } | CommandError::Engine { .. } => {
                StatusCode::BAD_GATEWAY
            }
            CommandError::InvalidPosition { .. }
            | CommandError::SamePosition { .. }
            | CommandError::InvalidVolume { .. }
            | CommandError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            CommandError::EmptyQueue
            | CommandError::AlreadyPaused
            | CommandError::NotPaused
            | CommandError::NothingToShuffle => StatusCode::CONFLICT,
            CommandError::SessionClosed { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<JsonRejection> for CommandError {
    fn from(rejection: JsonRejection) -> Self {
        CommandError::InvalidRequest {
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for CommandError {
    fn from(rejection: PathRejection) -> Self {
        CommandError::InvalidRequest {
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for CommandError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}
