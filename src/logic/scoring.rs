//! Scoring rules: set/tiebreak completion, set and match winners, and score validation.

use crate::models::{format_sets, Score, ScoringConfig, SetScore, Side, TiebreakScore, TournamentError};
use serde::{Deserialize, Serialize};

/// `games` wins a set against `other` without a tiebreak.
fn wins_outright(games: u32, other: u32, cfg: &ScoringConfig) -> bool {
    games >= cfg.games_to_win_set && games >= other.saturating_add(2)
}

/// Both sides sit at the tiebreak threshold.
pub fn is_tiebreak_set(team1_games: u32, team2_games: u32, cfg: &ScoringConfig) -> bool {
    team1_games == cfg.tiebreaker_score_threshold && team2_games == cfg.tiebreaker_score_threshold
}

/// One side reached the tiebreak target with the required margin.
pub fn is_tiebreak_complete(team1_points: u32, team2_points: u32, cfg: &ScoringConfig) -> bool {
    tiebreak_winner(team1_points, team2_points, cfg).is_some()
}

fn tiebreak_winner(team1_points: u32, team2_points: u32, cfg: &ScoringConfig) -> Option<Side> {
    let wins = |p: u32, q: u32| {
        p >= cfg.tiebreaker_points_to_win && p >= q.saturating_add(cfg.tiebreaker_min_win_difference)
    };
    if wins(team1_points, team2_points) {
        Some(Side::Team1)
    } else if wins(team2_points, team1_points) {
        Some(Side::Team2)
    } else {
        None
    }
}

/// A set is complete when one side wins outright, or when games are tied at the
/// threshold and a finished tiebreak is attached.
pub fn is_set_complete(
    team1_games: u32,
    team2_games: u32,
    tiebreak: Option<&TiebreakScore>,
    cfg: &ScoringConfig,
) -> bool {
    let set = SetScore {
        team1_games,
        team2_games,
        tiebreak: tiebreak.copied(),
    };
    set_winner(&set, cfg).is_some()
}

/// Winner of a single set, or `None` while it is still undecided.
pub fn set_winner(set: &SetScore, cfg: &ScoringConfig) -> Option<Side> {
    if is_tiebreak_set(set.team1_games, set.team2_games, cfg) {
        let tb = set.tiebreak?;
        return tiebreak_winner(tb.team1_points, tb.team2_points, cfg);
    }
    if wins_outright(set.team1_games, set.team2_games, cfg) {
        Some(Side::Team1)
    } else if wins_outright(set.team2_games, set.team1_games, cfg) {
        Some(Side::Team2)
    } else {
        None
    }
}

/// Sets won by each side, counted in order and stopping once one side clinches the match.
pub fn tally_sets(sets: &[SetScore], cfg: &ScoringConfig) -> (u32, u32) {
    let (mut team1, mut team2) = (0, 0);
    for set in sets {
        if team1 >= cfg.sets_to_win_match || team2 >= cfg.sets_to_win_match {
            break;
        }
        match set_winner(set, cfg) {
            Some(Side::Team1) => team1 += 1,
            Some(Side::Team2) => team2 += 1,
            None => {}
        }
    }
    (team1, team2)
}

/// The side that first reaches `sets_to_win_match` set wins, if any.
pub fn match_winner(sets: &[SetScore], cfg: &ScoringConfig) -> Option<Side> {
    let (team1, team2) = tally_sets(sets, cfg);
    if team1 >= cfg.sets_to_win_match {
        Some(Side::Team1)
    } else if team2 >= cfg.sets_to_win_match {
        Some(Side::Team2)
    } else {
        None
    }
}

/// Validate a full submission and build the score for a match between `team1_id` and `team2_id`.
///
/// Every set must be complete, a tiebreak may only be attached at the threshold score,
/// and no set may follow the one that clinched the match.
pub fn evaluate_score(
    sets: Vec<SetScore>,
    team1_id: &str,
    team2_id: &str,
    cfg: &ScoringConfig,
) -> Result<Score, TournamentError> {
    if sets.is_empty() {
        return Err(TournamentError::InvalidScoreInput {
            set_index: None,
            reason: "enter at least one set score".into(),
        });
    }

    let (mut team1_sets, mut team2_sets) = (0, 0);
    for (i, set) in sets.iter().enumerate() {
        if team1_sets >= cfg.sets_to_win_match || team2_sets >= cfg.sets_to_win_match {
            return Err(TournamentError::InvalidScoreInput {
                set_index: Some(i),
                reason: "the match was already decided before this set".into(),
            });
        }
        let at_threshold = is_tiebreak_set(set.team1_games, set.team2_games, cfg);
        if set.tiebreak.is_some() && !at_threshold {
            return Err(TournamentError::InvalidScoreInput {
                set_index: Some(i),
                reason: format!(
                    "a tiebreak is only played at {0}-{0}",
                    cfg.tiebreaker_score_threshold
                ),
            });
        }
        match set_winner(set, cfg) {
            Some(Side::Team1) => team1_sets += 1,
            Some(Side::Team2) => team2_sets += 1,
            None if at_threshold => {
                return Err(TournamentError::InvalidScoreInput {
                    set_index: Some(i),
                    reason: format!(
                        "set tied at {0}-{0} needs a tiebreak won with at least {1} points and a {2}-point lead",
                        cfg.tiebreaker_score_threshold,
                        cfg.tiebreaker_points_to_win,
                        cfg.tiebreaker_min_win_difference
                    ),
                })
            }
            None => {
                return Err(TournamentError::InvalidScoreInput {
                    set_index: Some(i),
                    reason: format!(
                        "a set must be won by at least 2 games and reach {0} games, or be at {1}-{1} for a tiebreak",
                        cfg.games_to_win_set, cfg.tiebreaker_score_threshold
                    ),
                })
            }
        }
    }

    let (winner, loser) = match match_winner(&sets, cfg) {
        Some(Side::Team1) => (team1_id, team2_id),
        Some(Side::Team2) => (team2_id, team1_id),
        None => {
            return Err(TournamentError::InvalidScoreInput {
                set_index: None,
                reason: format!(
                    "match not yet concluded, a team needs to win {} sets",
                    cfg.sets_to_win_match
                ),
            })
        }
    };

    Ok(Score {
        final_score_string: format_sets(&sets),
        sets,
        winner_team_id: winner.to_string(),
        loser_team_id: loser.to_string(),
    })
}

/// Tiebreak points as submitted (before range checks).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TiebreakEntry {
    pub team1_points: i64,
    pub team2_points: i64,
}

/// A set as submitted by a caller. Negative values are rejected by [`parse_set_entries`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetEntry {
    pub team1_games: i64,
    pub team2_games: i64,
    #[serde(default)]
    pub tiebreak: Option<TiebreakEntry>,
}

fn non_negative(value: i64, set_index: usize, what: &str) -> Result<u32, TournamentError> {
    u32::try_from(value).map_err(|_| TournamentError::InvalidScoreInput {
        set_index: Some(set_index),
        reason: format!("{} must be a non-negative whole number (got {})", what, value),
    })
}

/// Range-check submitted sets. The first bad set fails the whole submission.
pub fn parse_set_entries(entries: &[SetEntry]) -> Result<Vec<SetScore>, TournamentError> {
    entries
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let tiebreak = match e.tiebreak {
                Some(tb) => Some(TiebreakScore::new(
                    non_negative(tb.team1_points, i, "tiebreak points")?,
                    non_negative(tb.team2_points, i, "tiebreak points")?,
                )),
                None => None,
            };
            Ok(SetScore {
                team1_games: non_negative(e.team1_games, i, "games")?,
                team2_games: non_negative(e.team2_games, i, "games")?,
                tiebreak,
            })
        })
        .collect()
}

fn parse_pair(text: &str, set_index: usize) -> Result<(u32, u32), TournamentError> {
    let bad = || TournamentError::InvalidScoreInput {
        set_index: Some(set_index),
        reason: format!("expected 'X-Y' with non-negative whole numbers, got '{}'", text.trim()),
    };
    let mut parts = text.split('-');
    let (a, b) = match (parts.next(), parts.next(), parts.next()) {
        (Some(a), Some(b), None) => (a.trim(), b.trim()),
        _ => return Err(bad()),
    };
    Ok((a.parse().map_err(|_| bad())?, b.parse().map_err(|_| bad())?))
}

/// Parse a score line such as `6-3, 4-6, 6-6(7-5)`.
pub fn parse_score_line(text: &str) -> Result<Vec<SetScore>, TournamentError> {
    if text.trim().is_empty() {
        return Err(TournamentError::InvalidScoreInput {
            set_index: None,
            reason: "enter at least one set score".into(),
        });
    }
    text.split(',')
        .enumerate()
        .map(|(i, token)| {
            let token = token.trim();
            let (games, tiebreak) = match token.split_once('(') {
                Some((games, rest)) => {
                    let inner = rest.strip_suffix(')').ok_or_else(|| TournamentError::InvalidScoreInput {
                        set_index: Some(i),
                        reason: format!("unclosed tiebreak in '{}'", token),
                    })?;
                    let (p1, p2) = parse_pair(inner, i)?;
                    (games, Some(TiebreakScore::new(p1, p2)))
                }
                None => (token, None),
            };
            let (team1_games, team2_games) = parse_pair(games, i)?;
            Ok(SetScore {
                team1_games,
                team2_games,
                tiebreak,
            })
        })
        .collect()
}
