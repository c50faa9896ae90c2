//! Tournament business logic: registration, team balancing, scheduling, scoring,
//! substitution and standings. Everything here is pure and synchronous.

pub mod balancing;
pub mod schedule;
pub mod scoring;
pub mod setup;
pub mod standings;
pub mod substitution;

pub use balancing::{form_teams, team_name};
pub use schedule::{generate_schedule, round_robin_pairs, ScheduleRequest};
pub use scoring::{
    evaluate_score, is_set_complete, is_tiebreak_complete, match_winner, parse_score_line,
    parse_set_entries, set_winner, SetEntry, TiebreakEntry,
};
pub use setup::{new_substitute, parse_players_csv, register_players};
pub use standings::{compute_standings, PlayerStanding, Standings, TeamStanding};
pub use substitution::apply_substitution;
