//! Error types for potboard.

use thiserror::Error;

/// Main error type for potboard operations.
#[derive(Error, Debug)]
pub enum PotboardError {
    /// Initial coin value is not an integer in the accepted range.
    #[error("invalid initial coin value: {0}")]
    InvalidInitialCoins(String),

    /// A player tried to join a session code that is not in use.
    #[error("invalid session code: {0}")]
    InvalidSessionCode(String),

    /// A player tried to join without a name.
    #[error("player name cannot be empty")]
    EmptyPlayerName,

    /// Session with the given code was not found.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// Player with the given id is not part of the session.
    #[error("player not found in session: {0}")]
    PlayerNotFound(String),

    /// Internal lock was poisoned.
    #[error("internal lock poisoned")]
    LockPoisoned,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PotboardError {
    /// Whether the error reports that something addressed by the caller does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::InvalidSessionCode(_) | Self::SessionNotFound(_) | Self::PlayerNotFound(_)
        )
    }

    /// Whether the error reports malformed caller input.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidInitialCoins(_) | Self::EmptyPlayerName)
    }

    /// Stable machine-readable code, used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInitialCoins(_) => "INVALID_INITIAL_COINS",
            Self::InvalidSessionCode(_) => "INVALID_SESSION_CODE",
            Self::EmptyPlayerName => "EMPTY_PLAYER_NAME",
            Self::SessionNotFound(_) => "SESSION_NOT_FOUND",
            Self::PlayerNotFound(_) => "PLAYER_NOT_FOUND",
            Self::LockPoisoned | Self::Io(_) => "INTERNAL_ERROR",
        }
    }
}

/// Convenience Result type for potboard operations.
pub type Result<T> = std::result::Result<T, PotboardError>;
