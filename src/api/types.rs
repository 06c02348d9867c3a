//! API request and response types.
//!
//! Field names are camelCase on the wire, matching the board clients.

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::error::PotboardError;
use crate::session::{BoardView, Player, PlayerId, Session, SessionCode};

/// Request to start a new session.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    /// Starting stack per player, as a number or numeric string.
    #[serde(default)]
    pub initial_coins: serde_json::Value,
}

/// Response for session creation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionResponse {
    pub session_code: String,
}

impl StartSessionResponse {
    pub fn new(code: SessionCode) -> Self {
        Self {
            session_code: code.to_string(),
        }
    }
}

/// Request to join a session.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct JoinSessionRequest {
    #[serde(default)]
    pub session_code: String,
    #[serde(default)]
    pub player_name: String,
}

/// Response for a successful join.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinSessionResponse {
    pub success: bool,
    pub player_id: PlayerId,
}

/// Request to bet or withdraw a number of chips.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountRequest {
    pub player_id: String,
    pub amount: i64,
}

/// Request to fold.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoldRequest {
    pub player_id: String,
}

/// Response for bet and fold: the acting player and the stored session.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerActionResponse {
    pub player: Player,
    pub session: Session,
}

/// Response for withdraw.
#[derive(Debug, Clone, Serialize)]
pub struct WithdrawResponse {
    pub session: Session,
}

/// List sessions response.
#[derive(Debug, Clone, Serialize)]
pub struct ListSessionsResponse {
    /// Total number of sessions.
    pub count: usize,
    /// Session summaries.
    pub sessions: Vec<SessionSummary>,
}

/// Brief session summary for listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_code: String,
    pub initial_coins: i64,
    pub pot_value: i64,
    pub player_count: usize,
}

impl SessionSummary {
    pub fn from_session(session: &Session) -> Self {
        Self {
            session_code: session.code.to_string(),
            initial_coins: session.initial_coins,
            pot_value: session.pot_value,
            player_count: session.players.len(),
        }
    }
}

/// Generic API error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "SESSION_NOT_FOUND").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn from_error(err: &PotboardError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

/// Error half of every handler result.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a domain error to its HTTP status: absence is 404, bad input is
/// 400, anything else is 500.
pub fn api_error(err: PotboardError) -> ApiError {
    let status = if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else if err.is_validation() {
        StatusCode::BAD_REQUEST
    } else {
        tracing::error!("request failed: {}", err);
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(ErrorResponse::from_error(&err)))
}

/// WebSocket message types.
///
/// Tags are the kebab-case event names the board clients use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum WsMessage {
    /// Client opened a board: subscribe it and send the current state.
    BoardLoaded { session_code: String },
    /// Client bets on behalf of a player.
    Bet {
        session_code: String,
        player_id: String,
        amount: i64,
    },
    /// Client folds on behalf of a player.
    Fold {
        session_code: String,
        player_id: String,
    },
    /// Client withdraws from the pot on behalf of a player.
    Withdraw {
        session_code: String,
        player_id: String,
        amount: i64,
    },
    /// Server sends the board of a session to all its viewers.
    BoardUpdated {
        session_code: String,
        players: Vec<Player>,
        pot_value: i64,
    },
    /// Server acknowledges a bet or fold with the acting player.
    Player { player: Player },
    /// Error message, sent only to the client that caused it.
    Error { code: String, message: String },
    /// Ping/pong for connection health.
    Ping,
    Pong,
}

impl WsMessage {
    pub fn board_updated(code: &SessionCode, board: BoardView) -> Self {
        Self::BoardUpdated {
            session_code: code.to_string(),
            players: board.players,
            pot_value: board.pot_value,
        }
    }

    pub fn error(err: &PotboardError) -> Self {
        let message = match err {
            PotboardError::SessionNotFound(_) => "Session not found".to_string(),
            PotboardError::PlayerNotFound(_) => "Player not found in session".to_string(),
            other => other.to_string(),
        };
        Self::Error {
            code: err.code().to_string(),
            message,
        }
    }
}
