//! Tournament settings, snapshot view and the error taxonomy.

use crate::auth::{Command, Role};
use crate::models::game::{GameMatch, MatchAction, MatchStatus};
use crate::models::player::{Player, SubstitutePlayer};
use crate::models::score::ScoringConfig;
use crate::models::team::Team;
use crate::store::RepositoryError;
use serde::{Deserialize, Serialize};

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// Player count does not match what the tournament is configured for (or is odd / < 2).
    InvalidPlayerCount { expected: usize, actual: usize },
    /// A registration row has an empty name or a non-numeric handicap.
    InvalidPlayerInput { index: usize, reason: String },
    /// A submitted set is malformed, incomplete, or the match is undecided.
    InvalidScoreInput { set_index: Option<usize>, reason: String },
    /// Courts, days, time slots or team count do not allow a schedule.
    InvalidScheduleConfig(String),
    /// The match's status does not allow this action.
    InvalidMatchState { status: MatchStatus, action: MatchAction },
    /// A referenced substitute/team/match/player id does not exist.
    NotFound { entity: &'static str, id: String },
    /// The caller's role may not issue this command.
    PermissionDenied { role: Role, command: Command },
    /// The backing store failed.
    Repository(RepositoryError),
    /// The commentary service failed; tournament data is untouched.
    NarrativeService(String),
}

impl TournamentError {
    /// Stable machine-readable kind, reported next to the message.
    pub fn kind(&self) -> &'static str {
        match self {
            TournamentError::InvalidPlayerCount { .. } => "InvalidPlayerCount",
            TournamentError::InvalidPlayerInput { .. } => "InvalidPlayerInput",
            TournamentError::InvalidScoreInput { .. } => "InvalidScoreInput",
            TournamentError::InvalidScheduleConfig(_) => "InvalidScheduleConfig",
            TournamentError::InvalidMatchState { .. } => "InvalidMatchState",
            TournamentError::NotFound { .. } => "NotFound",
            TournamentError::PermissionDenied { .. } => "PermissionDenied",
            TournamentError::Repository(_) => "RepositoryError",
            TournamentError::NarrativeService(_) => "NarrativeServiceError",
        }
    }

    /// Validation failures the caller can fix by resubmitting.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TournamentError::InvalidPlayerCount { .. }
                | TournamentError::InvalidPlayerInput { .. }
                | TournamentError::InvalidScoreInput { .. }
                | TournamentError::InvalidScheduleConfig(_)
                | TournamentError::InvalidMatchState { .. }
        )
    }
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::InvalidPlayerCount { expected, actual } => write!(
                f,
                "Need exactly {} players, an even number of at least 2 (got {})",
                expected, actual
            ),
            TournamentError::InvalidPlayerInput { index, reason } => {
                write!(f, "Player entry {}: {}", index + 1, reason)
            }
            TournamentError::InvalidScoreInput { set_index: Some(i), reason } => {
                write!(f, "Set {}: {}", i + 1, reason)
            }
            TournamentError::InvalidScoreInput { set_index: None, reason } => {
                write!(f, "Invalid score: {}", reason)
            }
            TournamentError::InvalidScheduleConfig(reason) => {
                write!(f, "Cannot generate schedule: {}", reason)
            }
            TournamentError::InvalidMatchState { status, action } => {
                write!(f, "Cannot {} a {} match", action, status)
            }
            TournamentError::NotFound { entity, id } => write!(f, "No {} with id {}", entity, id),
            TournamentError::PermissionDenied { role, command } => {
                write!(f, "Role {} is not allowed to {}", role, command)
            }
            TournamentError::Repository(e) => write!(f, "Storage error: {}", e),
            TournamentError::NarrativeService(reason) => {
                write!(f, "Commentary unavailable: {}", reason)
            }
        }
    }
}

impl std::error::Error for TournamentError {}

impl From<RepositoryError> for TournamentError {
    fn from(e: RepositoryError) -> Self {
        TournamentError::Repository(e)
    }
}

/// What to do with team pairs that do not fit the day × slot × court grid.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Leave the extra pairs unscheduled (logged).
    #[default]
    Drop,
    /// Refuse to generate a schedule that cannot hold every pair.
    Error,
    /// Keep adding days past the configured duration until every pair is placed.
    ExtendDays,
}

impl std::str::FromStr for OverflowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drop" => Ok(OverflowPolicy::Drop),
            "error" => Ok(OverflowPolicy::Error),
            "extend_days" | "extenddays" | "extend" => Ok(OverflowPolicy::ExtendDays),
            other => Err(format!("unknown overflow policy '{}'", other)),
        }
    }
}

/// Process-wide tournament configuration, set once before scheduling.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentSettings {
    pub total_players: usize,
    pub courts_per_day: u32,
    pub duration_days: u32,
    pub time_slots: Vec<String>,
    #[serde(default)]
    pub overflow: OverflowPolicy,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl Default for TournamentSettings {
    fn default() -> Self {
        Self {
            total_players: 20,
            courts_per_day: 5,
            duration_days: 18,
            time_slots: ["09:00", "10:30", "12:00", "13:30"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            overflow: OverflowPolicy::Drop,
            scoring: ScoringConfig::default(),
        }
    }
}

/// Closest even player count of at least 2, rounding odd counts up.
pub fn nearest_valid_player_count(n: usize) -> usize {
    (n + n % 2).max(2)
}

impl TournamentSettings {
    /// Teams formed from the configured player count.
    pub fn number_of_teams(&self) -> usize {
        self.total_players / 2
    }

    pub fn validate(&self) -> Result<(), TournamentError> {
        if self.total_players < 2 || self.total_players % 2 != 0 {
            return Err(TournamentError::InvalidPlayerCount {
                expected: nearest_valid_player_count(self.total_players),
                actual: self.total_players,
            });
        }
        if self.courts_per_day == 0 || self.duration_days == 0 {
            return Err(TournamentError::InvalidScheduleConfig(
                "courts per day and tournament duration must be positive".into(),
            ));
        }
        if self.time_slots.iter().all(|s| s.trim().is_empty()) {
            return Err(TournamentError::InvalidScheduleConfig(
                "at least one time slot is required".into(),
            ));
        }
        self.scoring
            .validate()
            .map_err(TournamentError::InvalidScheduleConfig)
    }
}

/// Everything currently stored for the tournament (for API / display).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentSnapshot {
    pub players: Vec<Player>,
    pub substitute_players: Vec<SubstitutePlayer>,
    pub teams: Vec<Team>,
    pub matches: Vec<GameMatch>,
}
