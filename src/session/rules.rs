//! Betting rules: how bets, folds and withdrawals move chips.
//!
//! Every transition works on one [`Session`] value and holds no state of
//! its own. There is no explicit round object; a round is the stretch
//! between two pot clears. The pot clears when it is emptied by a
//! withdrawal, or when only one player is left able to bet, in which case
//! that player takes the whole pot.
//!
//! Amounts are not validated. A bet may exceed the player's balance or be
//! negative, and the balance follows along. Arithmetic saturates instead
//! of overflowing.

use super::{Player, PlayerId, Session};
use crate::Result;

/// The pot going to the last player left able to bet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PotAward {
    pub player_id: PlayerId,
    pub name: String,
    pub amount: i64,
}

/// Result of [`place_bet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BetOutcome {
    /// The betting player after the bet.
    pub player: Player,
}

/// Result of [`fold`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldOutcome {
    /// The folding player after any pot resolution.
    pub player: Player,
    /// Set when the fold left a single player standing.
    pub award: Option<PotAward>,
}

/// Result of [`withdraw`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WithdrawOutcome {
    /// False when the amount exceeded the pot and was ignored.
    pub withdrawn: bool,
    /// Set when a single player standing took the rest of the pot.
    pub award: Option<PotAward>,
    /// The round cleared: pot is empty and every player was reset.
    pub cleared: bool,
}

/// Move `amount` from a player's stack into the pot.
pub fn place_bet(session: &mut Session, player_id: &PlayerId, amount: i64) -> Result<BetOutcome> {
    let index = session.player_index(player_id)?;

    let player = &mut session.players[index];
    player.current_bet = player.current_bet.saturating_add(amount);
    player.coins = player.coins.saturating_sub(amount);
    session.pot_value = session.pot_value.saturating_add(amount);

    Ok(BetOutcome {
        player: session.players[index].clone(),
    })
}

/// Take a player out of the current round.
///
/// If that leaves exactly one player able to bet, they win the pot and a
/// new round begins. With zero or several players left nothing is resolved.
pub fn fold(session: &mut Session, player_id: &PlayerId) -> Result<FoldOutcome> {
    let index = session.player_index(player_id)?;
    session.players[index].can_bet = false;

    let award = award_last_standing(session);

    Ok(FoldOutcome {
        player: session.players[index].clone(),
        award,
    })
}

/// Pay `amount` out of the pot to a player.
///
/// An amount larger than the pot is ignored without error. Either way the
/// round is then checked: an empty pot resets every player, and otherwise a
/// single player left able to bet takes what remains.
pub fn withdraw(session: &mut Session, player_id: &PlayerId, amount: i64) -> Result<WithdrawOutcome> {
    let index = session.player_index(player_id)?;
    let mut outcome = WithdrawOutcome::default();

    if amount <= session.pot_value {
        let player = &mut session.players[index];
        player.coins = player.coins.saturating_add(amount);
        session.pot_value = session.pot_value.saturating_sub(amount);
        outcome.withdrawn = true;
    }

    if session.pot_value == 0 {
        clear_round(session);
        outcome.cleared = true;
    } else {
        outcome.award = award_last_standing(session);
        outcome.cleared = outcome.award.is_some();
    }

    Ok(outcome)
}

/// Give the whole pot to the only player still able to bet, if there is exactly one.
fn award_last_standing(session: &mut Session) -> Option<PotAward> {
    let mut standing = session.players.iter().filter(|p| p.can_bet);
    let winner = standing.next()?.id;
    if standing.next().is_some() {
        return None;
    }

    let amount = session.pot_value;
    let player = session.player_mut(&winner)?;
    player.coins = player.coins.saturating_add(amount);
    let award = PotAward {
        player_id: winner,
        name: player.name.clone(),
        amount,
    };

    session.pot_value = 0;
    clear_round(session);
    Some(award)
}

fn clear_round(session: &mut Session) {
    session.players.iter_mut().for_each(Player::reset_round);
}
