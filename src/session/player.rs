//! Players seated in a session.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Process-unique identifier for a player, generated at join time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(Uuid);

impl PlayerId {
    /// Create a new random player ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PlayerId {
    type Err = crate::error::PotboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(PlayerId)
            .map_err(|_| crate::error::PotboardError::PlayerNotFound(s.into()))
    }
}

/// A player and their chip position.
///
/// `coins` is deliberately signed: bets are not checked against the
/// player's balance, so it can go below zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub coins: i64,
    /// Chips put in since the pot last cleared.
    pub current_bet: i64,
    /// False once the player has folded in the current round.
    pub can_bet: bool,
}

impl Player {
    /// Seat a new player holding `coins`.
    pub fn new(name: impl Into<String>, coins: i64) -> Self {
        Self {
            id: PlayerId::new(),
            name: name.into(),
            coins,
            current_bet: 0,
            can_bet: true,
        }
    }

    /// Start a fresh round: eligible to bet again, nothing in the pot.
    pub fn reset_round(&mut self) {
        self.can_bet = true;
        self.current_bet = 0;
    }
}
