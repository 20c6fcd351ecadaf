//! HTTP request handlers

use super::relay_socket::relay_socket;
use super::sse::sse_stream;
use super::types::{
    ChatRequest, ChatResponse, ErrorResponse, SessionListResponse, SessionResponse,
    SessionWithMessagesResponse, SuccessResponse,
};
use super::AppState;
use crate::db::DbError;
use crate::intent::Catalog;
use crate::runtime::{RuntimeError, SessionEvent};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Session listing and creation
        .route("/api/sessions", get(list_sessions).post(create_session))
        .route("/api/sessions/:id", get(get_session))
        // SSE streaming
        .route("/api/sessions/:id/stream", get(stream_session))
        // User actions
        .route("/api/sessions/:id/chat", post(send_chat))
        .route("/api/sessions/:id/clear", post(clear_session))
        .route("/api/sessions/:id/delete", post(delete_session))
        .route("/api/catalog", get(get_catalog))
        // Scene relay
        .route("/relay", get(relay_socket))
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Sessions
// ============================================================

async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<SessionListResponse>, AppError> {
    let sessions = state.runtime.db().list_sessions()?;

    Ok(Json(SessionListResponse {
        sessions: sessions.iter().map(to_json).collect(),
    }))
}

async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let session = state.runtime.create_session()?;
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            session: to_json(&session),
        }),
    ))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionWithMessagesResponse>, AppError> {
    let (session, messages) = load_session(&state, &id)?;
    Ok(Json(SessionWithMessagesResponse { session, messages }))
}

async fn stream_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    // Subscribe before the snapshot so nothing falls between the two
    let broadcast_rx = state.runtime.subscribe(&id).await?;
    let (session, messages) = load_session(&state, &id)?;

    Ok(sse_stream(SessionEvent::Init { session, messages }, broadcast_rx))
}

fn load_session(state: &AppState, id: &str) -> Result<(Value, Vec<Value>), AppError> {
    let db = state.runtime.db();
    let session = db.get_session(id)?;
    let messages = db.get_messages(id)?;
    Ok((to_json(&session), messages.iter().map(to_json).collect()))
}

// ============================================================
// User Actions
// ============================================================

async fn send_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let reply = state.runtime.chat(&id, &req.text).await?;
    Ok(Json(reply.into()))
}

async fn clear_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.runtime.clear(&id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.runtime.delete(&id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

// ============================================================
// Catalog and Version
// ============================================================

async fn get_catalog(State(state): State<AppState>) -> Json<Catalog> {
    Json(state.catalog.as_ref().clone())
}

async fn get_version() -> &'static str {
    concat!("decor-chat ", env!("CARGO_PKG_VERSION"))
}

fn to_json<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    NotFound(String),
    Internal(String),
}

impl From<DbError> for AppError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::SessionNotFound(_) => AppError::NotFound(e.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<RuntimeError> for AppError {
    fn from(e: RuntimeError) -> Self {
        match e {
            RuntimeError::Db(db) => db.into(),
            RuntimeError::Stopped(_) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
