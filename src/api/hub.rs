//! Per-session broadcast channels for board updates.

use std::collections::HashMap;
use std::sync::RwLock;

use tokio::sync::broadcast;

use crate::error::PotboardError;
use crate::session::{BoardView, Session, SessionCode, SessionObserver};
use crate::Result;

/// Default number of boards buffered per session before slow viewers lag.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Fan-out of board updates to every viewer of a session.
///
/// Channels are created lazily on first subscription and dropped when the
/// session is closed. A viewer that falls more than `capacity` boards
/// behind skips the stale ones; each board is a full snapshot, so the next
/// one received is still complete.
pub struct BoardHub {
    channels: RwLock<HashMap<SessionCode, broadcast::Sender<BoardView>>>,
    capacity: usize,
}

impl BoardHub {
    /// Create a hub buffering `capacity` boards per session.
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Subscribe to board updates for a session.
    pub fn subscribe(&self, code: &SessionCode) -> Result<broadcast::Receiver<BoardView>> {
        let mut channels = self
            .channels
            .write()
            .map_err(|_| PotboardError::LockPoisoned)?;

        let sender = channels
            .entry(*code)
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        Ok(sender.subscribe())
    }

    /// Send a board to every current subscriber of the session.
    ///
    /// Returns how many subscribers it reached.
    pub fn publish(&self, code: &SessionCode, board: BoardView) -> usize {
        let Ok(channels) = self.channels.read() else {
            return 0;
        };
        channels
            .get(code)
            .and_then(|sender| sender.send(board).ok())
            .unwrap_or(0)
    }

    /// Drop the channel of a session. Subscribers see the stream end.
    pub fn close(&self, code: &SessionCode) {
        if let Ok(mut channels) = self.channels.write() {
            channels.remove(code);
        }
    }

    /// Number of live subscribers of a session.
    pub fn subscriber_count(&self, code: &SessionCode) -> usize {
        self.channels
            .read()
            .ok()
            .and_then(|channels| channels.get(code).map(|s| s.receiver_count()))
            .unwrap_or(0)
    }
}

impl SessionObserver for BoardHub {
    fn committed(&self, session: &Session) {
        let reached = self.publish(&session.code, session.board());
        tracing::debug!("Session {}: board sent to {} viewers", session.code, reached);
    }

    fn removed(&self, code: &SessionCode) {
        self.close(code);
    }
}

impl Default for BoardHub {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}
