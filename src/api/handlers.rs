//! REST API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::gateway::Gateway;
use super::hub::{BoardHub, DEFAULT_CHANNEL_CAPACITY};
use super::types::{
    api_error, AmountRequest, ApiError, ErrorResponse, FoldRequest, JoinSessionRequest,
    JoinSessionResponse, ListSessionsResponse, PlayerActionResponse, SessionSummary,
    StartSessionRequest, StartSessionResponse, WithdrawResponse,
};
use crate::session::{Session, SessionStore};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SessionStore>,
    pub gateway: Arc<Gateway>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_channel_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create state whose board channels buffer `capacity` updates.
    pub fn with_channel_capacity(capacity: usize) -> Self {
        let gateway = Arc::new(Gateway::new(Arc::new(BoardHub::new(capacity))));
        let store = gateway.shared_store();
        Self { store, gateway }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}

/// API information endpoint.
pub async fn api_info() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "potboard",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

/// List all sessions.
pub async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<ListSessionsResponse>, ApiError> {
    let sessions: Vec<SessionSummary> = state
        .store
        .list_sessions()
        .map_err(api_error)?
        .iter()
        .map(SessionSummary::from_session)
        .collect();

    Ok(Json(ListSessionsResponse {
        count: sessions.len(),
        sessions,
    }))
}

/// Start a new session.
pub async fn start_session(
    State(state): State<AppState>,
    Json(req): Json<StartSessionRequest>,
) -> Result<Json<StartSessionResponse>, ApiError> {
    let code = state
        .gateway
        .start_session(&req.initial_coins)
        .map_err(api_error)?;

    Ok(Json(StartSessionResponse::new(code)))
}

/// Get the full state of a session.
pub async fn get_session(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Session>, ApiError> {
    state
        .gateway
        .session(&code)
        .map_err(api_error)?
        .map(Json)
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(
                    "SESSION_NOT_FOUND",
                    format!("Session '{}' not found", code),
                )),
            )
        })
}

/// Delete a session.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<StatusCode, ApiError> {
    match state.gateway.remove(&code).map_err(api_error)? {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(
                "SESSION_NOT_FOUND",
                format!("Session '{}' not found", code),
            )),
        )),
    }
}

/// Join a session as a new player.
pub async fn join_session(
    State(state): State<AppState>,
    Json(req): Json<JoinSessionRequest>,
) -> Result<Json<JoinSessionResponse>, ApiError> {
    let player_id = state
        .gateway
        .join(&req.session_code, &req.player_name)
        .map_err(api_error)?;

    Ok(Json(JoinSessionResponse {
        success: true,
        player_id,
    }))
}

/// Place a bet.
pub async fn place_bet(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(req): Json<AmountRequest>,
) -> Result<Json<PlayerActionResponse>, ApiError> {
    let applied = state
        .gateway
        .bet(&code, &req.player_id, req.amount)
        .map_err(api_error)?;

    Ok(Json(PlayerActionResponse {
        player: applied.outcome.player,
        session: applied.session,
    }))
}

/// Fold the current hand.
pub async fn fold(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(req): Json<FoldRequest>,
) -> Result<Json<PlayerActionResponse>, ApiError> {
    let applied = state
        .gateway
        .fold(&code, &req.player_id)
        .map_err(api_error)?;

    Ok(Json(PlayerActionResponse {
        player: applied.outcome.player,
        session: applied.session,
    }))
}

/// Withdraw from the pot.
pub async fn withdraw(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(req): Json<AmountRequest>,
) -> Result<Json<WithdrawResponse>, ApiError> {
    let applied = state
        .gateway
        .withdraw(&code, &req.player_id, req.amount)
        .map_err(api_error)?;

    Ok(Json(WithdrawResponse {
        session: applied.session,
    }))
}
