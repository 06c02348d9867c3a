//! Applies client actions to sessions and announces the result.
//!
//! Every action follows the same path: resolve the session code and player
//! id sent by the client, then run the transition in the store. The store
//! hands each committed session to the [`BoardHub`] before releasing the
//! session's lock, so viewers get boards in the order actions were applied.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::error::PotboardError;
use crate::session::{
    parse_initial_coins, Applied, BetOutcome, BoardView, FoldOutcome, PlayerId, Session,
    SessionCode, SessionObserver, SessionStore, WithdrawOutcome,
};
use crate::Result;

use super::hub::BoardHub;

/// Boundary between clients and the session store.
pub struct Gateway {
    store: Arc<SessionStore>,
    hub: Arc<BoardHub>,
}

impl Gateway {
    /// Create a gateway whose store reports every change to `hub`.
    pub fn new(hub: Arc<BoardHub>) -> Self {
        let observer: Arc<dyn SessionObserver> = hub.clone();
        let store = Arc::new(SessionStore::with_observer(observer));
        Self { store, hub }
    }

    /// Get a reference to the session store.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Get a shared handle to the session store.
    pub fn shared_store(&self) -> Arc<SessionStore> {
        Arc::clone(&self.store)
    }

    /// Get a reference to the broadcast hub.
    pub fn hub(&self) -> &BoardHub {
        &self.hub
    }

    /// Start a session from a client-supplied starting stack.
    pub fn start_session(&self, initial_coins: &serde_json::Value) -> Result<SessionCode> {
        let coins = parse_initial_coins(initial_coins)?;
        let code = self.store.create_session(coins)?;
        info!("Session {}: started with {} coins per player", code, coins);
        Ok(code)
    }

    /// Look up a session by the code a client sent.
    ///
    /// A malformed code cannot name a session, so it reads as absent.
    pub fn session(&self, code: &str) -> Result<Option<Session>> {
        match code.parse::<SessionCode>() {
            Ok(code) => self.store.get_session(&code),
            Err(_) => Ok(None),
        }
    }

    /// Seat a player and announce the new board.
    pub fn join(&self, code: &str, name: &str) -> Result<PlayerId> {
        let code: SessionCode = code.parse()?;
        let player_id = self.store.add_player(&code, name)?;
        info!("Session {}: Player {} joined", code, name);
        Ok(player_id)
    }

    /// Remove a session and end its broadcast stream.
    pub fn remove(&self, code: &str) -> Result<Option<Session>> {
        let Ok(code) = code.parse::<SessionCode>() else {
            return Ok(None);
        };
        let removed = self.store.remove_session(&code)?;
        if removed.is_some() {
            info!("Session {}: removed", code);
        }
        Ok(removed)
    }

    /// Subscribe to board updates of an existing session.
    ///
    /// The channel is opened under the session's lock, so a removal racing
    /// with this call always closes it.
    pub fn subscribe(&self, code: &SessionCode) -> Result<broadcast::Receiver<BoardView>> {
        self.store
            .with_live_session(code, |_| self.hub.subscribe(code))?
            .ok_or_else(|| PotboardError::SessionNotFound(code.to_string()))?
    }

    /// Broadcast the current board of a session to all its viewers.
    pub fn announce(&self, code: &SessionCode) -> Result<BoardView> {
        let session = self
            .store
            .announce(code)?
            .ok_or_else(|| PotboardError::SessionNotFound(code.to_string()))?;
        Ok(session.board())
    }

    /// Place a bet and announce the new board.
    pub fn bet(&self, code: &str, player_id: &str, amount: i64) -> Result<Applied<BetOutcome>> {
        let (code, player_id) = self.resolve(code, player_id)?;
        let applied = self.store.apply_bet(&code, &player_id, amount)?;

        info!(
            "Session {}: Player {} placed a bet of {}",
            code, applied.outcome.player.name, amount
        );
        Ok(applied)
    }

    /// Fold a player and announce the new board.
    pub fn fold(&self, code: &str, player_id: &str) -> Result<Applied<FoldOutcome>> {
        let (code, player_id) = self.resolve(code, player_id)?;
        let applied = self.store.apply_fold(&code, &player_id)?;

        info!(
            "Session {}: Player {} folded the hand",
            code, applied.outcome.player.name
        );
        if let Some(award) = &applied.outcome.award {
            info!(
                "Session {}: Player {} won the pot of {}",
                code, award.name, award.amount
            );
        }
        Ok(applied)
    }

    /// Withdraw from the pot and announce the new board.
    pub fn withdraw(
        &self,
        code: &str,
        player_id: &str,
        amount: i64,
    ) -> Result<Applied<WithdrawOutcome>> {
        let (code, player_id) = self.resolve(code, player_id)?;
        let applied = self.store.apply_withdraw(&code, &player_id, amount)?;
        let outcome = &applied.outcome;

        if outcome.withdrawn {
            let name = applied
                .session
                .player(&player_id)
                .map(|p| p.name.as_str())
                .unwrap_or_default();
            info!("Session {}: Player {} withdrew {}", code, name, amount);
        } else {
            debug!(
                "Session {}: withdrawal of {} exceeds the pot, ignored",
                code, amount
            );
        }
        if let Some(award) = &outcome.award {
            info!(
                "Session {}: Player {} won the pot of {}",
                code, award.name, award.amount
            );
        }
        if outcome.cleared {
            info!("Session {}: Pot is cleared", code);
        }

        Ok(applied)
    }

    /// Parse the identifiers of an action.
    ///
    /// A missing session is reported before a bad player id.
    fn resolve(&self, code: &str, player_id: &str) -> Result<(SessionCode, PlayerId)> {
        let code: SessionCode = code
            .parse()
            .map_err(|_| PotboardError::SessionNotFound(code.to_string()))?;

        match player_id.parse::<PlayerId>() {
            Ok(player_id) => Ok((code, player_id)),
            Err(err) if self.store.contains(&code)? => Err(err),
            Err(_) => Err(PotboardError::SessionNotFound(code.to_string())),
        }
    }
}
