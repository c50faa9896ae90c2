//! Data structures for the tennis tournament: players, teams, matches, scores, settings.

mod game;
mod player;
mod score;
mod team;
mod tournament;

pub use game::{GameMatch, MatchAction, MatchDocument, MatchId, MatchSide, MatchStatus, PlayerSlot, Side, SubstitutionRecord};
pub use player::{Handicap, Player, PlayerId, PlayerInput, SubstituteId, SubstitutePlayer};
pub use score::{format_sets, Score, ScoringConfig, SetScore, TiebreakScore};
pub use team::{Team, TeamId};
pub use tournament::{
    nearest_valid_player_count, OverflowPolicy, TournamentError, TournamentSettings, TournamentSnapshot,
};
