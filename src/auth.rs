//! Caller identity and the command → role authorization table.

use crate::models::{GameMatch, Team, TournamentError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role attribute supplied by the identity provider. Missing roles default to `Player`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Admin,
    TournamentManager,
    TeamCaptain,
    #[default]
    Player,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::TournamentManager => write!(f, "tournamentManager"),
            Role::TeamCaptain => write!(f, "teamCaptain"),
            Role::Player => write!(f, "player"),
        }
    }
}

/// Orchestrator commands that mutate tournament state.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Command {
    RegisterPlayers,
    AddSubstitute,
    GenerateTeams,
    GenerateSchedule,
    EnterScore,
    CancelMatch,
    SubstitutePlayer,
    ClearAllData,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Command::RegisterPlayers => "register players",
            Command::AddSubstitute => "add substitute players",
            Command::GenerateTeams => "generate teams",
            Command::GenerateSchedule => "generate the schedule",
            Command::EnterScore => "enter scores for this match",
            Command::CancelMatch => "cancel matches",
            Command::SubstitutePlayer => "substitute players",
            Command::ClearAllData => "clear all data",
        };
        f.write_str(s)
    }
}

impl Command {
    /// Roles that may always issue the command. Score entry is additionally open to the
    /// captain of a team playing in the match (see [`Identity::authorize_score_entry`]).
    pub fn allowed_roles(self) -> &'static [Role] {
        const ORGANIZERS: &[Role] = &[Role::Admin, Role::TournamentManager];
        match self {
            Command::RegisterPlayers
            | Command::AddSubstitute
            | Command::GenerateTeams
            | Command::GenerateSchedule
            | Command::ClearAllData => ORGANIZERS,
            Command::EnterScore => ORGANIZERS,
            Command::CancelMatch | Command::SubstitutePlayer => ORGANIZERS,
        }
    }
}

/// Opaque user id plus role, as handed over by the identity provider.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: String,
    #[serde(default)]
    pub role: Role,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn current_user_id(&self) -> &str {
        &self.user_id
    }

    pub fn current_user_role(&self) -> Role {
        self.role
    }

    pub fn is_organizer(&self) -> bool {
        matches!(self.role, Role::Admin | Role::TournamentManager)
    }

    /// Check the static role table for `command`.
    pub fn authorize(&self, command: Command) -> Result<(), TournamentError> {
        if command.allowed_roles().contains(&self.role) {
            Ok(())
        } else {
            Err(TournamentError::PermissionDenied {
                role: self.role,
                command,
            })
        }
    }

    /// Whether this caller captains one of the teams in `game`. `teams` is the current roster.
    pub fn captains_team_in(&self, game: &GameMatch, teams: &[Team]) -> bool {
        self.role == Role::TeamCaptain
            && teams
                .iter()
                .filter(|t| game.involves_team(&t.id))
                .any(|t| t.has_player(&self.user_id))
    }

    /// Organizers may score any match; a team captain only matches their own team plays in.
    pub fn authorize_score_entry(&self, game: &GameMatch, teams: &[Team]) -> Result<(), TournamentError> {
        if self.is_organizer() || self.captains_team_in(game, teams) {
            Ok(())
        } else {
            Err(TournamentError::PermissionDenied {
                role: self.role,
                command: Command::EnterScore,
            })
        }
    }
}
