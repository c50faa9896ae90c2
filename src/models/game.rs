//! Match (game), its two sides, status state machine and substitution record.

use crate::models::player::Handicap;
use crate::models::score::Score;
use crate::models::team::{Team, TeamId};
use crate::models::tournament::TournamentError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Store-assigned identifier for a match.
pub type MatchId = String;

/// Which side of a match: first or second listed team.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Team1,
    Team2,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::Team1 => Side::Team2,
            Side::Team2 => Side::Team1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Team1 => write!(f, "team1"),
            Side::Team2 => write!(f, "team2"),
        }
    }
}

/// One of the four roster positions in a doubles match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerSlot {
    Team1Player1,
    Team1Player2,
    Team2Player1,
    Team2Player2,
}

impl PlayerSlot {
    pub fn side(self) -> Side {
        match self {
            PlayerSlot::Team1Player1 | PlayerSlot::Team1Player2 => Side::Team1,
            PlayerSlot::Team2Player1 | PlayerSlot::Team2Player2 => Side::Team2,
        }
    }

    /// True for the first player of either team.
    pub fn is_first(self) -> bool {
        matches!(self, PlayerSlot::Team1Player1 | PlayerSlot::Team2Player1)
    }
}

impl fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlayerSlot::Team1Player1 => "team1_player1",
            PlayerSlot::Team1Player2 => "team1_player2",
            PlayerSlot::Team2Player1 => "team2_player1",
            PlayerSlot::Team2Player2 => "team2_player2",
        };
        f.write_str(s)
    }
}

impl FromStr for PlayerSlot {
    type Err = TournamentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "team1_player1" => Ok(PlayerSlot::Team1Player1),
            "team1_player2" => Ok(PlayerSlot::Team1Player2),
            "team2_player1" => Ok(PlayerSlot::Team2Player1),
            "team2_player2" => Ok(PlayerSlot::Team2Player2),
            other => Err(TournamentError::NotFound {
                entity: "player slot",
                id: other.to_string(),
            }),
        }
    }
}

/// Lifecycle of a match. Completion and cancellation are terminal and mutually exclusive;
/// a completed match may only be re-scored.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
}

/// Commands that touch a match's status.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MatchAction {
    RecordScore,
    Cancel,
    Substitute,
    /// Commentary on the result; needs a completed match.
    Analyze,
}

impl fmt::Display for MatchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchAction::RecordScore => write!(f, "record a score for"),
            MatchAction::Cancel => write!(f, "cancel"),
            MatchAction::Substitute => write!(f, "substitute a player in"),
            MatchAction::Analyze => write!(f, "analyze"),
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::Scheduled => write!(f, "scheduled"),
            MatchStatus::Completed => write!(f, "completed"),
            MatchStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl MatchStatus {
    /// Transition table. Returns the status after `action`, or `InvalidMatchState`.
    pub fn apply(self, action: MatchAction) -> Result<MatchStatus, TournamentError> {
        use MatchAction::*;
        use MatchStatus::*;
        match (self, action) {
            (Scheduled | Completed, RecordScore) => Ok(Completed),
            (Scheduled, Cancel) => Ok(Cancelled),
            (Scheduled, Substitute) => Ok(Scheduled),
            (Completed, Analyze) => Ok(Completed),
            (status, action) => Err(TournamentError::InvalidMatchState { status, action }),
        }
    }
}

/// A team as it appears in one match: frozen at schedule time, changed only by substitution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSide {
    pub team_id: TeamId,
    pub team_name: String,
    pub player1_name: String,
    pub player2_name: String,
    pub player1_handicap: Handicap,
    pub player2_handicap: Handicap,
    pub handicap_sum: Handicap,
}

impl MatchSide {
    pub fn from_team(team: &Team) -> Self {
        Self {
            team_id: team.id.clone(),
            team_name: team.name.clone(),
            player1_name: team.player1_name.clone(),
            player2_name: team.player2_name.clone(),
            player1_handicap: team.player1_handicap,
            player2_handicap: team.player2_handicap,
            handicap_sum: team.handicap_sum,
        }
    }
}

/// Before/after state of the latest substitution on a match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstitutionRecord {
    pub affected_team: Side,
    pub slot: PlayerSlot,
    pub original_player_name: String,
    pub substitute_player_name: String,
    pub original_handicap: Handicap,
    pub substitute_handicap: Handicap,
    pub new_team_handicap_sum: Handicap,
    pub substituted_by: String,
    pub substituted_at: DateTime<Utc>,
}

/// A scheduled doubles match between two teams.
///
/// Serialized through [`MatchDocument`], so stored and served matches carry flat
/// `team1Id`/`team1OriginalPlayer1Name`/... keys rather than nested sides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "MatchDocument", into = "MatchDocument")]
pub struct GameMatch {
    #[serde(default)]
    pub id: MatchId,
    pub date: NaiveDate,
    pub time: String,
    pub court: String,
    pub team1: MatchSide,
    pub team2: MatchSide,
    pub status: MatchStatus,
    pub substitute_info: Option<SubstitutionRecord>,
    pub score: Option<Score>,
    pub winner_team_id: Option<TeamId>,
    pub loser_team_id: Option<TeamId>,
    pub created_by: String,
    pub scored_by: Option<String>,
    pub scored_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

/// Flat wire and storage shape of a [`GameMatch`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDocument {
    #[serde(default)]
    pub id: MatchId,
    pub date: NaiveDate,
    pub time: String,
    pub court: String,
    pub team1_id: TeamId,
    pub team2_id: TeamId,
    pub team1_name: String,
    pub team2_name: String,
    pub team1_original_player1_name: String,
    pub team1_original_player2_name: String,
    pub team1_original_player1_handicap: Handicap,
    pub team1_original_player2_handicap: Handicap,
    pub team2_original_player1_name: String,
    pub team2_original_player2_name: String,
    pub team2_original_player1_handicap: Handicap,
    pub team2_original_player2_handicap: Handicap,
    pub team1_handicap_sum: Handicap,
    pub team2_handicap_sum: Handicap,
    #[serde(default)]
    pub status: MatchStatus,
    #[serde(default)]
    pub substitute_info: Option<SubstitutionRecord>,
    #[serde(default)]
    pub score: Option<Score>,
    #[serde(default)]
    pub winner_team_id: Option<TeamId>,
    #[serde(default)]
    pub loser_team_id: Option<TeamId>,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub scored_by: Option<String>,
    #[serde(default)]
    pub scored_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cancelled_by: Option<String>,
    #[serde(default)]
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl From<MatchDocument> for GameMatch {
    fn from(doc: MatchDocument) -> Self {
        Self {
            id: doc.id,
            date: doc.date,
            time: doc.time,
            court: doc.court,
            team1: MatchSide {
                team_id: doc.team1_id,
                team_name: doc.team1_name,
                player1_name: doc.team1_original_player1_name,
                player2_name: doc.team1_original_player2_name,
                player1_handicap: doc.team1_original_player1_handicap,
                player2_handicap: doc.team1_original_player2_handicap,
                handicap_sum: doc.team1_handicap_sum,
            },
            team2: MatchSide {
                team_id: doc.team2_id,
                team_name: doc.team2_name,
                player1_name: doc.team2_original_player1_name,
                player2_name: doc.team2_original_player2_name,
                player1_handicap: doc.team2_original_player1_handicap,
                player2_handicap: doc.team2_original_player2_handicap,
                handicap_sum: doc.team2_handicap_sum,
            },
            status: doc.status,
            substitute_info: doc.substitute_info,
            score: doc.score,
            winner_team_id: doc.winner_team_id,
            loser_team_id: doc.loser_team_id,
            created_by: doc.created_by,
            scored_by: doc.scored_by,
            scored_at: doc.scored_at,
            cancelled_by: doc.cancelled_by,
            cancelled_at: doc.cancelled_at,
        }
    }
}

impl From<GameMatch> for MatchDocument {
    fn from(game: GameMatch) -> Self {
        let GameMatch {
            id,
            date,
            time,
            court,
            team1,
            team2,
            status,
            substitute_info,
            score,
            winner_team_id,
            loser_team_id,
            created_by,
            scored_by,
            scored_at,
            cancelled_by,
            cancelled_at,
        } = game;
        Self {
            id,
            date,
            time,
            court,
            team1_id: team1.team_id,
            team2_id: team2.team_id,
            team1_name: team1.team_name,
            team2_name: team2.team_name,
            team1_original_player1_name: team1.player1_name,
            team1_original_player2_name: team1.player2_name,
            team1_original_player1_handicap: team1.player1_handicap,
            team1_original_player2_handicap: team1.player2_handicap,
            team2_original_player1_name: team2.player1_name,
            team2_original_player2_name: team2.player2_name,
            team2_original_player1_handicap: team2.player1_handicap,
            team2_original_player2_handicap: team2.player2_handicap,
            team1_handicap_sum: team1.handicap_sum,
            team2_handicap_sum: team2.handicap_sum,
            status,
            substitute_info,
            score,
            winner_team_id,
            loser_team_id,
            created_by,
            scored_by,
            scored_at,
            cancelled_by,
            cancelled_at,
        }
    }
}

impl GameMatch {
    /// New scheduled match capturing both teams' current rosters.
    pub fn new(
        date: NaiveDate,
        time: impl Into<String>,
        court: impl Into<String>,
        team1: &Team,
        team2: &Team,
    ) -> Self {
        Self {
            id: MatchId::new(),
            date,
            time: time.into(),
            court: court.into(),
            team1: MatchSide::from_team(team1),
            team2: MatchSide::from_team(team2),
            status: MatchStatus::Scheduled,
            substitute_info: None,
            score: None,
            winner_team_id: None,
            loser_team_id: None,
            created_by: String::new(),
            scored_by: None,
            scored_at: None,
            cancelled_by: None,
            cancelled_at: None,
        }
    }

    pub fn side(&self, side: Side) -> &MatchSide {
        match side {
            Side::Team1 => &self.team1,
            Side::Team2 => &self.team2,
        }
    }

    pub fn side_mut(&mut self, side: Side) -> &mut MatchSide {
        match side {
            Side::Team1 => &mut self.team1,
            Side::Team2 => &mut self.team2,
        }
    }

    pub fn team_id(&self, side: Side) -> &TeamId {
        &self.side(side).team_id
    }

    /// Which side the given team plays on, if any.
    pub fn side_of(&self, team_id: &str) -> Option<Side> {
        if self.team1.team_id == team_id {
            Some(Side::Team1)
        } else if self.team2.team_id == team_id {
            Some(Side::Team2)
        } else {
            None
        }
    }

    pub fn involves_team(&self, team_id: &str) -> bool {
        self.side_of(team_id).is_some()
    }

    /// Attach a validated score. Keeps `completed => score and winner set` and the winner/loser pairing.
    pub fn record_score(
        &mut self,
        score: Score,
        scored_by: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<(), TournamentError> {
        let next = self.status.apply(MatchAction::RecordScore)?;
        let winner = self
            .side_of(&score.winner_team_id)
            .ok_or_else(|| TournamentError::NotFound {
                entity: "team",
                id: score.winner_team_id.clone(),
            })?;
        if self.team_id(winner.other()) != &score.loser_team_id {
            return Err(TournamentError::NotFound {
                entity: "team",
                id: score.loser_team_id.clone(),
            });
        }
        self.winner_team_id = Some(score.winner_team_id.clone());
        self.loser_team_id = Some(score.loser_team_id.clone());
        self.score = Some(score);
        self.status = next;
        self.scored_by = Some(scored_by.into());
        self.scored_at = Some(at);
        Ok(())
    }

    /// Cancel a scheduled match.
    pub fn cancel(&mut self, cancelled_by: impl Into<String>, at: DateTime<Utc>) -> Result<(), TournamentError> {
        self.status = self.status.apply(MatchAction::Cancel)?;
        self.cancelled_by = Some(cancelled_by.into());
        self.cancelled_at = Some(at);
        Ok(())
    }

    /// Side that won, if the match is completed.
    pub fn winning_side(&self) -> Option<Side> {
        self.winner_team_id.as_deref().and_then(|id| self.side_of(id))
    }
}
