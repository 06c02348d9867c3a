//! WebSocket handler for live boards and table actions.
//!
//! A connection can watch any number of sessions. Each `board-loaded`
//! subscribes the socket to that session's board stream; bets, folds and
//! withdrawals are applied through the gateway, which broadcasts the new
//! board to every watcher. Errors go back only to the socket that caused
//! them.

use std::collections::HashMap;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast::error::RecvError, mpsc};
use tokio::task::JoinHandle;

use super::gateway::Gateway;
use super::handlers::AppState;
use super::types::WsMessage;
use crate::error::PotboardError;
use crate::session::SessionCode;

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle WebSocket connection.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();

    tracing::debug!("viewer connected");

    // Single writer: direct replies and forwarded boards share the sink
    let writer = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let Ok(json) = serde_json::to_string(&msg) else {
                continue;
            };
            if sink.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let mut watching: HashMap<SessionCode, JoinHandle<()>> = HashMap::new();

    while let Some(msg) = stream.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text.to_string(),
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(_) => break,
        };

        let ws_msg: WsMessage = match serde_json::from_str(&text) {
            Ok(m) => m,
            Err(e) => {
                let _ = tx.send(WsMessage::Error {
                    code: "PARSE_ERROR".to_string(),
                    message: e.to_string(),
                });
                continue;
            }
        };

        if let WsMessage::BoardLoaded { session_code } = &ws_msg {
            if let Err(err) = watch(&state.gateway, session_code, &tx, &mut watching) {
                let _ = tx.send(WsMessage::error(&err));
                continue;
            }
        }

        if let Some(reply) = dispatch(&state.gateway, ws_msg) {
            if tx.send(reply).is_err() {
                break;
            }
        }
    }

    // Stored sessions are untouched by a viewer leaving
    for (_, forwarder) in watching {
        forwarder.abort();
    }
    drop(tx);
    let _ = writer.await;

    tracing::debug!("viewer disconnected");
}

/// Subscribe a connection to a session's boards, once per session.
fn watch(
    gateway: &Gateway,
    code: &str,
    tx: &mpsc::UnboundedSender<WsMessage>,
    watching: &mut HashMap<SessionCode, JoinHandle<()>>,
) -> crate::Result<()> {
    let code: SessionCode = code
        .parse()
        .map_err(|_| PotboardError::SessionNotFound(code.to_string()))?;

    if watching.contains_key(&code) {
        return Ok(());
    }

    let mut boards = gateway.subscribe(&code)?;
    let tx = tx.clone();
    let forwarder = tokio::spawn(async move {
        loop {
            match boards.recv().await {
                Ok(board) => {
                    if tx.send(WsMessage::board_updated(&code, board)).is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Session {}: viewer skipped {} stale boards", code, skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    watching.insert(code, forwarder);
    Ok(())
}

/// Apply one client message and return the direct reply, if any.
///
/// Boards are not part of the reply: they reach every watcher, the sender
/// included, through the session's broadcast stream.
pub fn dispatch(gateway: &Gateway, msg: WsMessage) -> Option<WsMessage> {
    let result = match msg {
        WsMessage::BoardLoaded { session_code } => session_code
            .parse::<SessionCode>()
            .map_err(|_| PotboardError::SessionNotFound(session_code.clone()))
            .and_then(|code| gateway.announce(&code))
            .map(|_| None),
        WsMessage::Bet {
            session_code,
            player_id,
            amount,
        } => gateway
            .bet(&session_code, &player_id, amount)
            .map(|applied| Some(WsMessage::Player {
                player: applied.outcome.player,
            })),
        WsMessage::Fold {
            session_code,
            player_id,
        } => gateway
            .fold(&session_code, &player_id)
            .map(|applied| Some(WsMessage::Player {
                player: applied.outcome.player,
            })),
        WsMessage::Withdraw {
            session_code,
            player_id,
            amount,
        } => gateway
            .withdraw(&session_code, &player_id, amount)
            .map(|_| None),
        WsMessage::Ping => Ok(Some(WsMessage::Pong)),
        // Server-to-client messages are ignored when sent by a client
        WsMessage::BoardUpdated { .. }
        | WsMessage::Player { .. }
        | WsMessage::Error { .. }
        | WsMessage::Pong => Ok(None),
    };

    result.unwrap_or_else(|err| Some(WsMessage::error(&err)))
}
