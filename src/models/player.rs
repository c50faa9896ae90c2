//! Player, SubstitutePlayer and registration input.

use serde::{Deserialize, Serialize};

/// Store-assigned identifier for a registered player.
pub type PlayerId = String;

/// Store-assigned identifier for a substitute in the pool.
pub type SubstituteId = String;

/// Handicap value: lower means stronger.
pub type Handicap = f64;

/// A registered player. Immutable once teams are generated; edits go through re-registration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Empty until the store assigns one on insert.
    #[serde(default)]
    pub id: PlayerId,
    pub name: String,
    pub handicap: Handicap,
    #[serde(default)]
    pub entered_by: String,
}

impl Player {
    /// Create a player that has not been persisted yet.
    pub fn new(name: impl Into<String>, handicap: Handicap) -> Self {
        Self {
            id: PlayerId::new(),
            name: name.into(),
            handicap,
            entered_by: String::new(),
        }
    }

    /// Same player with the given id (used once the store has assigned one).
    pub fn with_id(mut self, id: impl Into<PlayerId>) -> Self {
        self.id = id.into();
        self
    }
}

/// A player from the substitute pool. Never promoted to the roster; only referenced by substitutions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstitutePlayer {
    #[serde(default)]
    pub id: SubstituteId,
    pub name: String,
    pub handicap: Handicap,
    #[serde(default)]
    pub entered_by: String,
}

impl SubstitutePlayer {
    pub fn new(name: impl Into<String>, handicap: Handicap) -> Self {
        Self {
            id: SubstituteId::new(),
            name: name.into(),
            handicap,
            entered_by: String::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<SubstituteId>) -> Self {
        self.id = id.into();
        self
    }
}

/// Raw registration row as typed by the organizer (name and handicap text).
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerInput {
    pub name: String,
    pub handicap: String,
}

impl PlayerInput {
    pub fn new(name: impl Into<String>, handicap: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handicap: handicap.into(),
        }
    }
}
