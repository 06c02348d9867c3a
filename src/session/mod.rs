//! Session management module.
//!
//! This module provides the betting session model: session codes, players,
//! the in-memory store, and the rules that move chips between players and
//! the pot.

mod code;
mod player;
pub mod rules;
mod store;

pub use code::{SessionCode, MAX_CODE, MIN_CODE};
pub use player::{Player, PlayerId};
pub use rules::{BetOutcome, FoldOutcome, PotAward, WithdrawOutcome};
pub use store::{
    parse_initial_coins, Applied, BoardView, Session, SessionObserver, SessionStore,
    MAX_INITIAL_COINS, MIN_INITIAL_COINS,
};
