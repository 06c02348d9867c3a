//! API layer for potboard.
//!
//! This module provides the REST and WebSocket endpoints through which
//! players start and join sessions, act on the pot, and watch the board.
//!
//! ## Endpoints
//!
//! ### Health & Info
//! - `GET /health` - Health check
//! - `GET /api` - API information
//!
//! ### Sessions
//! - `POST /api/start-session` - Start a session (`{initialCoins}`)
//! - `POST /api/join-session` - Join a session (`{sessionCode, playerName}`)
//! - `GET /api/sessions` - List all sessions
//! - `GET /api/session/{code}` - Get a session
//! - `DELETE /api/session/{code}` - Remove a session
//!
//! ### Actions
//! - `POST /api/session/{code}/bet` - Bet (`{playerId, amount}`)
//! - `POST /api/session/{code}/fold` - Fold (`{playerId}`)
//! - `POST /api/session/{code}/withdraw` - Withdraw (`{playerId, amount}`)
//! - `WS /api/ws` - Live boards plus the same actions as messages
//!
//! ## Example
//!
//! ```no_run
//! use potboard::api::{ServerConfig, serve};
//!
//! #[tokio::main]
//! async fn main() -> potboard::Result<()> {
//!     let config = ServerConfig::new("127.0.0.1", 5000);
//!     serve(config).await
//! }
//! ```

pub mod gateway;
pub mod handlers;
pub mod hub;
pub mod router;
pub mod types;
pub mod websocket;

// Re-export commonly used types
pub use gateway::Gateway;
pub use handlers::AppState;
pub use hub::BoardHub;
pub use router::{create_router, create_router_with_state, serve, serve_with_state, ServerConfig};
pub use types::{
    ErrorResponse, JoinSessionRequest, JoinSessionResponse, ListSessionsResponse,
    StartSessionRequest, StartSessionResponse, WsMessage,
};
