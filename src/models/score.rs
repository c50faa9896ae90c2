//! Set-by-set scores and the scoring configuration.

use crate::models::team::TeamId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Points of a tiebreak played at the threshold score.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TiebreakScore {
    pub team1_points: u32,
    pub team2_points: u32,
}

impl TiebreakScore {
    pub fn new(team1_points: u32, team2_points: u32) -> Self {
        Self {
            team1_points,
            team2_points,
        }
    }
}

/// One set: games per side and, when the set went to a tiebreak, its points.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetScore {
    pub team1_games: u32,
    pub team2_games: u32,
    #[serde(default)]
    pub tiebreak: Option<TiebreakScore>,
}

impl SetScore {
    pub fn new(team1_games: u32, team2_games: u32) -> Self {
        Self {
            team1_games,
            team2_games,
            tiebreak: None,
        }
    }

    pub fn with_tiebreak(mut self, team1_points: u32, team2_points: u32) -> Self {
        self.tiebreak = Some(TiebreakScore::new(team1_points, team2_points));
        self
    }
}

impl fmt::Display for SetScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.team1_games, self.team2_games)?;
        if let Some(tb) = self.tiebreak {
            write!(f, "({}-{})", tb.team1_points, tb.team2_points)?;
        }
        Ok(())
    }
}

/// Validated score attached to a completed match. Replaced wholesale on edit.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub sets: Vec<SetScore>,
    pub winner_team_id: TeamId,
    pub loser_team_id: TeamId,
    pub final_score_string: String,
}

/// Renders sets as `6-3, 4-6, 6-6(7-5)`.
pub fn format_sets(sets: &[SetScore]) -> String {
    sets.iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Scoring rules, fixed for the duration of a tournament run.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringConfig {
    pub games_to_win_set: u32,
    pub sets_to_win_match: u32,
    /// Games each side must reach (tied) for a tiebreak to be played.
    pub tiebreaker_score_threshold: u32,
    pub tiebreaker_points_to_win: u32,
    pub tiebreaker_min_win_difference: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            games_to_win_set: 6,
            sets_to_win_match: 2,
            tiebreaker_score_threshold: 6,
            tiebreaker_points_to_win: 7,
            tiebreaker_min_win_difference: 2,
        }
    }
}

impl ScoringConfig {
    /// Longest possible match in sets (best of `2n - 1`).
    pub fn max_sets(&self) -> usize {
        (2 * self.sets_to_win_match).saturating_sub(1) as usize
    }

    /// Reject configurations under which no set or match could ever finish.
    pub fn validate(&self) -> Result<(), String> {
        if self.games_to_win_set == 0 {
            return Err("gamesToWinSet must be at least 1".into());
        }
        if self.sets_to_win_match == 0 {
            return Err("setsToWinMatch must be at least 1".into());
        }
        if self.tiebreaker_points_to_win == 0 {
            return Err("tiebreakerPointsToWin must be at least 1".into());
        }
        if self.tiebreaker_min_win_difference == 0 {
            return Err("tiebreakerMinWinDifference must be at least 1".into());
        }
        Ok(())
    }
}
