//! Doubles tennis tournament web app: library with models, business logic, storage and
//! the orchestrator the web binary drives.

pub mod auth;
pub mod config;
pub mod logic;
pub mod models;
pub mod narrative;
pub mod orchestrator;
pub mod store;

pub use auth::{Command, Identity, Role};
pub use config::{AppConfig, ConfigError};
pub use logic::{
    apply_substitution, compute_standings, evaluate_score, form_teams, generate_schedule,
    parse_score_line, parse_set_entries, register_players, PlayerStanding, ScheduleRequest, SetEntry,
    Standings, TeamStanding,
};
pub use models::{
    GameMatch, MatchDocument, MatchId, MatchStatus, OverflowPolicy, Player, PlayerId, PlayerInput, PlayerSlot, Score,
    ScoringConfig, SetScore, SubstitutePlayer, Team, TeamId, TournamentError, TournamentSettings,
    TournamentSnapshot,
};
pub use narrative::{GeminiClient, GeminiConfig, NarrativeService};
pub use orchestrator::{TournamentContext, TournamentOrchestrator};
pub use store::{Collection, InMemoryRepository, Repository};
