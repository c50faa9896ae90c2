//! Ad-hoc substitution of one roster slot in a scheduled match.

use crate::models::{GameMatch, MatchAction, PlayerSlot, SubstitutePlayer, SubstitutionRecord, TournamentError};
use chrono::{DateTime, Utc};

/// Swap the player in `slot` for `substitute` and recompute that side's handicap sum.
///
/// Only the affected side changes. A later substitution replaces the stored record
/// (the record describes the most recent swap only).
pub fn apply_substitution(
    game: &GameMatch,
    slot: PlayerSlot,
    substitute: &SubstitutePlayer,
    substituted_by: &str,
    at: DateTime<Utc>,
) -> Result<GameMatch, TournamentError> {
    game.status.apply(MatchAction::Substitute)?;

    let mut updated = game.clone();
    let affected = slot.side();
    let side = updated.side_mut(affected);
    let (name, handicap) = if slot.is_first() {
        (&mut side.player1_name, &mut side.player1_handicap)
    } else {
        (&mut side.player2_name, &mut side.player2_handicap)
    };
    let original_player_name = std::mem::replace(name, substitute.name.clone());
    let original_handicap = std::mem::replace(handicap, substitute.handicap);
    side.handicap_sum = side.handicap_sum - original_handicap + substitute.handicap;
    let new_team_handicap_sum = side.handicap_sum;

    updated.substitute_info = Some(SubstitutionRecord {
        affected_team: affected,
        slot,
        original_player_name,
        substitute_player_name: substitute.name.clone(),
        original_handicap,
        substitute_handicap: substitute.handicap,
        new_team_handicap_sum,
        substituted_by: substituted_by.to_string(),
        substituted_at: at,
    });
    Ok(updated)
}
