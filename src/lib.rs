//! # potboard
//!
//! In-memory chip pot tracker for multiplayer betting sessions.
//!
//! Players join a session with a fixed starting stack, bet chips into a
//! shared pot, fold, and withdraw from the pot. Every change is broadcast
//! to the session's viewers over WebSocket. Nothing is persisted.
//!
//! ## Features
//!
//! - **Sessions**: six-digit codes, fixed starting stack, players sorted by chips
//! - **Pot rules**: last player standing takes the pot, an empty pot starts a new round
//! - **Live boards**: per-session broadcast to every connected viewer
//! - **Lightweight**: everything lives in process memory
//!
//! ## Quick Start
//!
//! ```
//! use potboard::SessionStore;
//!
//! let store = SessionStore::new();
//! let code = store.create_session(500)?;
//!
//! let alice = store.add_player(&code, "Alice")?;
//! let bob = store.add_player(&code, "Bob")?;
//!
//! store.apply_bet(&code, &alice, 50)?;
//! let applied = store.apply_fold(&code, &alice)?;
//!
//! let award = applied.outcome.award.expect("bob is the last one standing");
//! assert_eq!(award.player_id, bob);
//! assert_eq!(award.amount, 50);
//! # Ok::<(), potboard::PotboardError>(())
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;

// Re-export commonly used types
pub use error::{PotboardError, Result};
pub use session::{
    BoardView, Player, PlayerId, PotAward, Session, SessionCode, SessionStore,
};
