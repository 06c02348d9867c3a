//! Session storage and management.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use serde::Serialize;

use super::rules::{self, BetOutcome, FoldOutcome, WithdrawOutcome};
use super::{Player, PlayerId, SessionCode};
use crate::error::PotboardError;
use crate::Result;

/// Smallest accepted starting stack.
pub const MIN_INITIAL_COINS: i64 = 100;

/// Largest accepted starting stack.
pub const MAX_INITIAL_COINS: i64 = 1000;

/// A betting session: a pot and the players around it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(rename = "sessionCode")]
    pub code: SessionCode,
    /// Starting stack handed to every player who joins.
    pub initial_coins: i64,
    pub pot_value: i64,
    pub players: Vec<Player>,
}

impl Session {
    /// Create an empty session.
    pub fn new(code: SessionCode, initial_coins: i64) -> Self {
        Self {
            code,
            initial_coins,
            pot_value: 0,
            players: Vec::new(),
        }
    }

    /// Find a player by id.
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == *id)
    }

    /// Find a player by id, mutably.
    pub fn player_mut(&mut self, id: &PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == *id)
    }

    pub(crate) fn player_index(&self, id: &PlayerId) -> Result<usize> {
        self.players
            .iter()
            .position(|p| p.id == *id)
            .ok_or_else(|| PotboardError::PlayerNotFound(id.to_string()))
    }

    /// Seat a new player with the session's starting stack.
    ///
    /// A name already taken gets a numeric suffix, one more than the
    /// number of players currently holding exactly that name.
    pub fn seat(&mut self, name: &str) -> PlayerId {
        let taken = self.players.iter().filter(|p| p.name == name).count();
        let name = if taken > 0 {
            format!("{} {}", name, taken + 1)
        } else {
            name.to_string()
        };

        let player = Player::new(name, self.initial_coins);
        let id = player.id;
        self.players.push(player);
        id
    }

    /// Order players by ascending stack. Ties keep their current order.
    pub fn sort_players(&mut self) {
        self.players.sort_by_key(|p| p.coins);
    }

    /// Public view of the table, as broadcast to viewers.
    pub fn board(&self) -> BoardView {
        let mut players = self.players.clone();
        players.sort_by_key(|p| p.coins);
        BoardView {
            players,
            pot_value: self.pot_value,
        }
    }
}

/// What every viewer of a session sees after each change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    /// Players ascending by coins.
    pub players: Vec<Player>,
    pub pot_value: i64,
}

/// A transition that was applied, with the session as stored afterwards.
#[derive(Debug, Clone)]
pub struct Applied<T> {
    pub outcome: T,
    pub session: Session,
}

/// Interpret a client-supplied starting stack.
///
/// Integers and numeric strings are taken as-is, fractional values are
/// truncated whether sent as numbers or strings. Anything else is rejected. Range checking happens in
/// [`SessionStore::create_session`].
pub fn parse_initial_coins(value: &serde_json::Value) -> Result<i64> {
    use serde_json::Value;

    let coins = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    };

    coins.ok_or_else(|| PotboardError::InvalidInitialCoins(value.to_string()))
}

/// Receives session changes while the session's lock is still held.
///
/// Calls for one session arrive in the order the changes were applied.
/// Implementations must not block and must not call back into the store.
pub trait SessionObserver: Send + Sync {
    /// A session was changed or re-announced.
    fn committed(&self, session: &Session);

    /// A session was removed from the store.
    fn removed(&self, _code: &SessionCode) {}
}

/// Thread-safe storage for sessions.
///
/// The map lock is held only to find or insert entries; each session sits
/// behind its own mutex, so transitions on one session run one at a time
/// in arrival order without blocking other sessions.
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionCode, Arc<Mutex<Session>>>>,
    observer: Option<Arc<dyn SessionObserver>>,
}

impl SessionStore {
    /// Create a new empty session store.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            observer: None,
        }
    }

    /// Create a store that reports every committed change to `observer`.
    pub fn with_observer(observer: Arc<dyn SessionObserver>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            observer: Some(observer),
        }
    }

    /// Create a session whose players start with `initial_coins`.
    ///
    /// Returns the newly issued session code.
    pub fn create_session(&self, initial_coins: i64) -> Result<SessionCode> {
        if !(MIN_INITIAL_COINS..=MAX_INITIAL_COINS).contains(&initial_coins) {
            return Err(PotboardError::InvalidInitialCoins(initial_coins.to_string()));
        }

        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| PotboardError::LockPoisoned)?;

        let code = loop {
            let candidate = SessionCode::random();
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
        };

        sessions.insert(
            code,
            Arc::new(Mutex::new(Session::new(code, initial_coins))),
        );
        Ok(code)
    }

    /// Get a clone of the session with the given code.
    pub fn get_session(&self, code: &SessionCode) -> Result<Option<Session>> {
        match self.entry(code)? {
            Some(entry) => {
                let session = entry.lock().map_err(|_| PotboardError::LockPoisoned)?;
                Ok(Some(session.clone()))
            }
            None => Ok(None),
        }
    }

    /// Check if a session exists.
    pub fn contains(&self, code: &SessionCode) -> Result<bool> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| PotboardError::LockPoisoned)?;
        Ok(sessions.contains_key(code))
    }

    /// Replace a stored session, sorting its players by coins first.
    ///
    /// Does nothing when the code is not in use.
    pub fn update_session(&self, code: &SessionCode, mut session: Session) -> Result<()> {
        let Some(entry) = self.entry(code)? else {
            return Ok(());
        };

        session.code = *code;
        session.sort_players();

        let mut stored = entry.lock().map_err(|_| PotboardError::LockPoisoned)?;
        *stored = session;
        self.notify(&stored);
        Ok(())
    }

    /// Report the current state of a session to the observer.
    ///
    /// Returns the session as announced, or None if it doesn't exist.
    pub fn announce(&self, code: &SessionCode) -> Result<Option<Session>> {
        let Some(entry) = self.entry(code)? else {
            return Ok(None);
        };

        let session = entry.lock().map_err(|_| PotboardError::LockPoisoned)?;
        self.notify(&session);
        Ok(Some(session.clone()))
    }

    /// Run `f` under the session's lock, provided the session is still stored.
    ///
    /// A concurrent [`remove_session`](Self::remove_session) either finishes
    /// before `f` runs, in which case this returns None, or waits until
    /// `f` is done and is observed afterwards.
    pub fn with_live_session<T, F>(&self, code: &SessionCode, f: F) -> Result<Option<T>>
    where
        F: FnOnce(&Session) -> T,
    {
        let Some(entry) = self.entry(code)? else {
            return Ok(None);
        };

        let session = entry.lock().map_err(|_| PotboardError::LockPoisoned)?;
        if !self.contains(code)? {
            return Ok(None);
        }
        Ok(Some(f(&session)))
    }

    /// Remove a session from the store.
    ///
    /// Returns the removed session, or None if it didn't exist.
    pub fn remove_session(&self, code: &SessionCode) -> Result<Option<Session>> {
        let removed = self
            .sessions
            .write()
            .map_err(|_| PotboardError::LockPoisoned)?
            .remove(code);

        match removed {
            Some(entry) => {
                let session = entry.lock().map_err(|_| PotboardError::LockPoisoned)?;
                if let Some(observer) = &self.observer {
                    observer.removed(code);
                }
                Ok(Some(session.clone()))
            }
            None => Ok(None),
        }
    }

    /// Snapshot every session. Order is unspecified.
    pub fn list_sessions(&self) -> Result<Vec<Session>> {
        let entries: Vec<_> = self
            .sessions
            .read()
            .map_err(|_| PotboardError::LockPoisoned)?
            .values()
            .cloned()
            .collect();

        entries
            .iter()
            .map(|entry| {
                entry
                    .lock()
                    .map(|s| s.clone())
                    .map_err(|_| PotboardError::LockPoisoned)
            })
            .collect()
    }

    /// Get the number of sessions in the store.
    pub fn count(&self) -> Result<usize> {
        self.sessions
            .read()
            .map(|s| s.len())
            .map_err(|_| PotboardError::LockPoisoned)
    }

    /// Add a player named `name` to a session.
    ///
    /// Returns the new player's id.
    pub fn add_player(&self, code: &SessionCode, name: &str) -> Result<PlayerId> {
        let entry = self
            .entry(code)?
            .ok_or_else(|| PotboardError::InvalidSessionCode(code.to_string()))?;

        if name.is_empty() {
            return Err(PotboardError::EmptyPlayerName);
        }

        let mut session = entry.lock().map_err(|_| PotboardError::LockPoisoned)?;
        let player_id = session.seat(name);
        self.notify(&session);
        Ok(player_id)
    }

    /// Place a bet for a player.
    pub fn apply_bet(
        &self,
        code: &SessionCode,
        player_id: &PlayerId,
        amount: i64,
    ) -> Result<Applied<BetOutcome>> {
        self.transition(code, |session| rules::place_bet(session, player_id, amount))
    }

    /// Fold a player out of the current round.
    pub fn apply_fold(&self, code: &SessionCode, player_id: &PlayerId) -> Result<Applied<FoldOutcome>> {
        self.transition(code, |session| rules::fold(session, player_id))
    }

    /// Withdraw from the pot on behalf of a player.
    pub fn apply_withdraw(
        &self,
        code: &SessionCode,
        player_id: &PlayerId,
        amount: i64,
    ) -> Result<Applied<WithdrawOutcome>> {
        self.transition(code, |session| rules::withdraw(session, player_id, amount))
    }

    /// Run a rule against a session under its lock and store the result.
    ///
    /// The rule works on a copy; a failed rule leaves the stored session
    /// untouched. The observer sees the new state before the lock is
    /// released.
    fn transition<T, F>(&self, code: &SessionCode, rule: F) -> Result<Applied<T>>
    where
        F: FnOnce(&mut Session) -> Result<T>,
    {
        let entry = self
            .entry(code)?
            .ok_or_else(|| PotboardError::SessionNotFound(code.to_string()))?;

        let mut stored = entry.lock().map_err(|_| PotboardError::LockPoisoned)?;

        let mut session = stored.clone();
        let outcome = rule(&mut session)?;
        session.sort_players();
        *stored = session.clone();
        self.notify(&stored);

        Ok(Applied { outcome, session })
    }

    fn notify(&self, session: &Session) {
        if let Some(observer) = &self.observer {
            observer.committed(session);
        }
    }

    fn entry(&self, code: &SessionCode) -> Result<Option<Arc<Mutex<Session>>>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| PotboardError::LockPoisoned)?;
        Ok(sessions.get(code).cloned())
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unused_code(store: &SessionStore) -> SessionCode {
        loop {
            let code = SessionCode::random();
            if !store.contains(&code).unwrap() {
                return code;
            }
        }
    }

    #[test]
    fn test_create_session() {
        let store = SessionStore::new();
        let code = store.create_session(500).unwrap();

        assert!(store.contains(&code).unwrap());
        assert_eq!(store.count().unwrap(), 1);

        let session = store.get_session(&code).unwrap().unwrap();
        assert_eq!(session.code, code);
        assert_eq!(session.initial_coins, 500);
        assert_eq!(session.pot_value, 0);
        assert!(session.players.is_empty());
    }

    #[test]
    fn test_create_session_bounds() {
        let store = SessionStore::new();
        assert!(store.create_session(100).is_ok());
        assert!(store.create_session(1000).is_ok());

        for coins in [99, 1001, 0, -100] {
            let err = store.create_session(coins).unwrap_err();
            assert!(matches!(err, PotboardError::InvalidInitialCoins(_)), "{coins}");
        }
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_create_session_codes_are_unique() {
        let store = SessionStore::new();
        let mut codes = std::collections::HashSet::new();
        for i in 0..2_000 {
            let code = store.create_session(100 + (i % 901)).unwrap();
            assert_eq!(code.to_string().len(), 6);
            assert!(codes.insert(code), "duplicate code {code}");
        }
        assert_eq!(store.count().unwrap(), 2_000);
    }

    #[test]
    fn test_parse_initial_coins() {
        assert_eq!(parse_initial_coins(&json!(500)).unwrap(), 500);
        assert_eq!(parse_initial_coins(&json!("250")).unwrap(), 250);
        assert_eq!(parse_initial_coins(&json!(" 300 ")).unwrap(), 300);
        assert_eq!(parse_initial_coins(&json!(150.9)).unwrap(), 150);
        assert_eq!(parse_initial_coins(&json!("150.9")).unwrap(), 150);
        assert_eq!(parse_initial_coins(&json!(" 999.99 ")).unwrap(), 999);

        for bad in [json!("abc"), json!("NaN"), json!("150abc"), json!(null), json!(true), json!([100]), json!({})] {
            let err = parse_initial_coins(&bad).unwrap_err();
            assert!(matches!(err, PotboardError::InvalidInitialCoins(_)), "{bad}");
        }
    }

    #[test]
    fn test_get_nonexistent() {
        let store = SessionStore::new();
        let code = unused_code(&store);
        assert!(store.get_session(&code).unwrap().is_none());
    }

    #[test]
    fn test_update_session_sorts_players() {
        let store = SessionStore::new();
        let code = store.create_session(100).unwrap();
        for name in ["A", "B", "C"] {
            store.add_player(&code, name).unwrap();
        }

        let mut session = store.get_session(&code).unwrap().unwrap();
        session.players[0].coins = 300;
        session.players[1].coins = 50;
        session.players[2].coins = 120;
        store.update_session(&code, session).unwrap();

        let stored = store.get_session(&code).unwrap().unwrap();
        let coins: Vec<i64> = stored.players.iter().map(|p| p.coins).collect();
        assert_eq!(coins, vec![50, 120, 300]);
        let names: Vec<&str> = stored.players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C", "A"]);
    }

    #[test]
    fn test_update_session_sort_is_stable() {
        let store = SessionStore::new();
        let code = store.create_session(100).unwrap();
        for name in ["A", "B", "C"] {
            store.add_player(&code, name).unwrap();
        }

        let session = store.get_session(&code).unwrap().unwrap();
        store.update_session(&code, session).unwrap();

        let stored = store.get_session(&code).unwrap().unwrap();
        let names: Vec<&str> = stored.players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_update_nonexistent_is_noop() {
        let store = SessionStore::new();
        let code = unused_code(&store);

        store.update_session(&code, Session::new(code, 500)).unwrap();
        assert!(store.get_session(&code).unwrap().is_none());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_remove_session() {
        let store = SessionStore::new();
        let code = store.create_session(200).unwrap();

        let removed = store.remove_session(&code).unwrap();
        assert_eq!(removed.unwrap().code, code);
        assert!(!store.contains(&code).unwrap());

        // Second removal is a no-op
        assert!(store.remove_session(&code).unwrap().is_none());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_list_sessions() {
        let store = SessionStore::new();
        let c1 = store.create_session(100).unwrap();
        let c2 = store.create_session(200).unwrap();

        let sessions = store.list_sessions().unwrap();
        assert_eq!(sessions.len(), 2);
        assert!(sessions.iter().any(|s| s.code == c1 && s.initial_coins == 100));
        assert!(sessions.iter().any(|s| s.code == c2 && s.initial_coins == 200));
    }

    #[test]
    fn test_add_player() {
        let store = SessionStore::new();
        let code = store.create_session(400).unwrap();

        let id = store.add_player(&code, "Alice").unwrap();
        let session = store.get_session(&code).unwrap().unwrap();
        let player = session.player(&id).unwrap();
        assert_eq!(player.name, "Alice");
        assert_eq!(player.coins, 400);
        assert_eq!(player.current_bet, 0);
        assert!(player.can_bet);
    }

    #[test]
    fn test_add_player_duplicate_names() {
        let store = SessionStore::new();
        let code = store.create_session(100).unwrap();

        let first = store.add_player(&code, "Alice").unwrap();
        let second = store.add_player(&code, "Alice").unwrap();
        assert_ne!(first, second);

        let session = store.get_session(&code).unwrap().unwrap();
        assert_eq!(session.player(&first).unwrap().name, "Alice");
        assert_eq!(session.player(&second).unwrap().name, "Alice 2");
    }

    #[test]
    fn test_add_player_suffix_recomputed_from_current_names() {
        let store = SessionStore::new();
        let code = store.create_session(100).unwrap();

        store.add_player(&code, "Bob").unwrap();
        store.add_player(&code, "Bob").unwrap();
        let third = store.add_player(&code, "Bob").unwrap();

        // Only one player is named exactly "Bob", so the suffix repeats
        let session = store.get_session(&code).unwrap().unwrap();
        assert_eq!(session.player(&third).unwrap().name, "Bob 2");
    }

    #[test]
    fn test_add_player_same_name_other_session() {
        let store = SessionStore::new();
        let c1 = store.create_session(100).unwrap();
        let c2 = store.create_session(100).unwrap();

        store.add_player(&c1, "Dana").unwrap();
        let id = store.add_player(&c2, "Dana").unwrap();

        let session = store.get_session(&c2).unwrap().unwrap();
        assert_eq!(session.player(&id).unwrap().name, "Dana");
    }

    #[test]
    fn test_add_player_errors() {
        let store = SessionStore::new();
        let code = store.create_session(100).unwrap();

        let err = store.add_player(&code, "").unwrap_err();
        assert!(matches!(err, PotboardError::EmptyPlayerName));

        let missing = unused_code(&store);
        let err = store.add_player(&missing, "Eve").unwrap_err();
        assert!(matches!(err, PotboardError::InvalidSessionCode(_)));
    }

    #[test]
    fn test_apply_bet_sorts_and_returns_player() {
        let store = SessionStore::new();
        let code = store.create_session(100).unwrap();
        let a = store.add_player(&code, "A").unwrap();
        let b = store.add_player(&code, "B").unwrap();

        let applied = store.apply_bet(&code, &a, 30).unwrap();
        assert_eq!(applied.outcome.player.id, a);
        assert_eq!(applied.outcome.player.coins, 70);
        assert_eq!(applied.session.pot_value, 30);
        assert_eq!(applied.session.players[0].id, a);
        assert_eq!(applied.session.players[1].id, b);

        let stored = store.get_session(&code).unwrap().unwrap();
        assert_eq!(stored, applied.session);
    }

    #[test]
    fn test_apply_fold_resolution() {
        let store = SessionStore::new();
        let code = store.create_session(100).unwrap();
        let a = store.add_player(&code, "A").unwrap();
        let b = store.add_player(&code, "B").unwrap();
        store.apply_bet(&code, &a, 25).unwrap();
        store.apply_bet(&code, &b, 25).unwrap();

        let applied = store.apply_fold(&code, &a).unwrap();
        assert_eq!(applied.outcome.award.as_ref().unwrap().player_id, b);

        let session = store.get_session(&code).unwrap().unwrap();
        assert_eq!(session.pot_value, 0);
        assert_eq!(session.player(&b).unwrap().coins, 125);
        assert_eq!(session.player(&a).unwrap().coins, 75);
        assert_eq!(session.players[0].id, a);
    }

    #[test]
    fn test_apply_unknown_session_or_player() {
        let store = SessionStore::new();
        let code = store.create_session(100).unwrap();
        let missing = unused_code(&store);
        let stranger = PlayerId::new();

        let err = store.apply_bet(&missing, &stranger, 10).unwrap_err();
        assert!(matches!(err, PotboardError::SessionNotFound(_)));

        let err = store.apply_fold(&code, &stranger).unwrap_err();
        assert!(matches!(err, PotboardError::PlayerNotFound(_)));

        let err = store.apply_withdraw(&code, &stranger, 0).unwrap_err();
        assert!(matches!(err, PotboardError::PlayerNotFound(_)));
    }

    #[test]
    fn test_apply_withdraw_clears_empty_pot() {
        let store = SessionStore::new();
        let code = store.create_session(100).unwrap();
        let a = store.add_player(&code, "A").unwrap();
        store.add_player(&code, "B").unwrap();
        store.add_player(&code, "C").unwrap();
        assert!(store.apply_fold(&code, &a).unwrap().outcome.award.is_none());

        let applied = store.apply_withdraw(&code, &a, 5).unwrap();
        assert!(!applied.outcome.withdrawn);
        assert!(applied.outcome.cleared);
        assert!(applied.session.players.iter().all(|p| p.can_bet));
    }

    #[test]
    fn test_board_view_is_sorted() {
        let code = SessionCode::from_raw(222_222).unwrap();
        let mut session = Session::new(code, 100);
        session.seat("A");
        session.seat("B");
        session.players[1].coins = 90;
        session.pot_value = 10;

        let board = session.board();
        assert_eq!(board.players[0].name, "B");
        assert_eq!(board.players[1].name, "A");
        assert_eq!(board.pot_value, 10);

        let json = serde_json::to_value(&board).unwrap();
        assert_eq!(json["potValue"], 10);
        assert!(json["players"].is_array());
        assert!(json.get("initialCoins").is_none());
    }

    #[test]
    fn test_session_json_shape() {
        let code = SessionCode::from_raw(333_333).unwrap();
        let session = Session::new(code, 700);
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["sessionCode"], "333333");
        assert_eq!(json["initialCoins"], 700);
        assert_eq!(json["potValue"], 0);
    }

    #[test]
    fn test_concurrent_bets_serialize_per_session() {
        use std::thread;

        let store = Arc::new(SessionStore::new());
        let code = store.create_session(1000).unwrap();
        let ids: Vec<PlayerId> = (0..4)
            .map(|i| store.add_player(&code, &format!("P{i}")).unwrap())
            .collect();

        let mut handles = vec![];
        for id in ids.clone() {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                for _ in 0..50 {
                    store.apply_bet(&code, &id, 1).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let session = store.get_session(&code).unwrap().unwrap();
        assert_eq!(session.pot_value, 200);
        for id in &ids {
            assert_eq!(session.player(id).unwrap().coins, 950);
        }
    }

    #[derive(Default)]
    struct Recorder {
        pots: Mutex<Vec<i64>>,
        removed: Mutex<Vec<SessionCode>>,
    }

    impl SessionObserver for Recorder {
        fn committed(&self, session: &Session) {
            self.pots.lock().unwrap().push(session.pot_value);
        }

        fn removed(&self, code: &SessionCode) {
            self.removed.lock().unwrap().push(*code);
        }
    }

    #[test]
    fn test_observer_sees_every_change() {
        let recorder = Arc::new(Recorder::default());
        let store = SessionStore::with_observer(recorder.clone());
        let code = store.create_session(100).unwrap();
        assert!(recorder.pots.lock().unwrap().is_empty());

        let id = store.add_player(&code, "Alice").unwrap();
        store.apply_bet(&code, &id, 30).unwrap();
        store.announce(&code).unwrap().unwrap();
        assert_eq!(*recorder.pots.lock().unwrap(), vec![0, 30, 30]);

        // Failed transitions commit nothing
        let stranger = PlayerId::new();
        assert!(store.apply_bet(&code, &stranger, 5).is_err());
        assert_eq!(recorder.pots.lock().unwrap().len(), 3);

        store.remove_session(&code).unwrap();
        assert_eq!(*recorder.removed.lock().unwrap(), vec![code]);
        assert!(store.announce(&code).unwrap().is_none());
    }

    #[test]
    fn test_concurrent_bets_observed_in_order() {
        use std::thread;

        let recorder = Arc::new(Recorder::default());
        let store = Arc::new(SessionStore::with_observer(recorder.clone()));
        let code = store.create_session(1000).unwrap();
        let id = store.add_player(&code, "Solo").unwrap();

        let mut handles = vec![];
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                for _ in 0..25 {
                    store.apply_bet(&code, &id, 1).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let pots = recorder.pots.lock().unwrap().clone();
        // Join, then one board per bet, each pot one higher than the last
        let expected: Vec<i64> = (0..=200).collect();
        assert_eq!(pots, expected);

        let stored = store.get_session(&code).unwrap().unwrap();
        assert_eq!(pots.last().copied(), Some(stored.pot_value));
    }

    #[test]
    fn test_with_live_session() {
        let store = SessionStore::new();
        let code = store.create_session(300).unwrap();

        let coins = store.with_live_session(&code, |s| s.initial_coins).unwrap();
        assert_eq!(coins, Some(300));

        store.remove_session(&code).unwrap();
        assert!(store.with_live_session(&code, |_| ()).unwrap().is_none());
    }

    #[test]
    fn test_count_reports_poisoned_lock() {
        let store = Arc::new(SessionStore::new());
        let poisoner = Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.sessions.write().unwrap();
            panic!("poison the session map");
        })
        .join();

        assert!(matches!(store.count(), Err(PotboardError::LockPoisoned)));
    }
}
