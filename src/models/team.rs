//! Doubles team with a denormalized roster snapshot.

use crate::models::player::{Handicap, Player, PlayerId};
use serde::{Deserialize, Serialize};

/// Store-assigned identifier for a team.
pub type TeamId = String;

/// A doubles team. Player names and handicaps are copied at creation time so that
/// historical displays survive later player edits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    #[serde(default)]
    pub id: TeamId,
    pub name: String,
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    pub player1_name: String,
    pub player2_name: String,
    pub player1_handicap: Handicap,
    pub player2_handicap: Handicap,
    #[serde(rename = "teamHandicapSum")]
    pub handicap_sum: Handicap,
    #[serde(default)]
    pub created_by: String,
}

impl Team {
    /// Build a team from two players; `handicap_sum` is always the sum of both handicaps.
    pub fn from_players(name: impl Into<String>, player1: &Player, player2: &Player) -> Self {
        Self {
            id: TeamId::new(),
            name: name.into(),
            player1_id: player1.id.clone(),
            player2_id: player2.id.clone(),
            player1_name: player1.name.clone(),
            player2_name: player2.name.clone(),
            player1_handicap: player1.handicap,
            player2_handicap: player2.handicap,
            handicap_sum: player1.handicap + player2.handicap,
            created_by: String::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<TeamId>) -> Self {
        self.id = id.into();
        self
    }

    /// Whether the given player id is one of the two team members.
    pub fn has_player(&self, player_id: &str) -> bool {
        self.player1_id == player_id || self.player2_id == player_id
    }
}
