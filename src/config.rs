//! Process configuration read from environment variables.
//!
//! Every variable is optional; unset or blank values fall back to the defaults of
//! [`TournamentSettings`] and [`ScoringConfig`]. A present but unparsable value is an error
//! naming the variable.

use crate::models::{OverflowPolicy, ScoringConfig, TournamentSettings};
use crate::narrative::GeminiConfig;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigError {
    pub variable: &'static str,
    pub reason: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {}", self.variable, self.reason)
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Tenant prefix for collection paths, e.g. `artifacts/default-app-id`.
    pub namespace: String,
    pub settings: TournamentSettings,
    /// `None` when no API key is configured; commentary endpoints then report unavailable.
    pub narrative: Option<GeminiConfig>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

const DEFAULT_APP_ID: &str = "default-app-id";

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let defaults = TournamentSettings::default();
        let scoring_defaults = ScoringConfig::default();

        let scoring = ScoringConfig {
            games_to_win_set: parsed(&get, "GAMES_TO_WIN_SET", scoring_defaults.games_to_win_set)?,
            sets_to_win_match: parsed(&get, "SETS_TO_WIN_MATCH", scoring_defaults.sets_to_win_match)?,
            tiebreaker_score_threshold: parsed(
                &get,
                "TIEBREAK_THRESHOLD",
                scoring_defaults.tiebreaker_score_threshold,
            )?,
            tiebreaker_points_to_win: parsed(&get, "TIEBREAK_POINTS", scoring_defaults.tiebreaker_points_to_win)?,
            tiebreaker_min_win_difference: parsed(
                &get,
                "TIEBREAK_MIN_DIFF",
                scoring_defaults.tiebreaker_min_win_difference,
            )?,
        };

        let time_slots = match get("TIME_SLOTS") {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => defaults.time_slots.clone(),
        };

        let settings = TournamentSettings {
            total_players: parsed(&get, "TOTAL_PLAYERS", defaults.total_players)?,
            courts_per_day: parsed(&get, "COURTS_PER_DAY", defaults.courts_per_day)?,
            duration_days: parsed(&get, "TOURNAMENT_DAYS", defaults.duration_days)?,
            time_slots,
            overflow: match get("SCHEDULE_OVERFLOW") {
                Some(raw) => OverflowPolicy::from_str(&raw).map_err(|reason| ConfigError {
                    variable: "SCHEDULE_OVERFLOW",
                    reason,
                })?,
                None => OverflowPolicy::default(),
            },
            scoring,
        };

        let narrative = get("GEMINI_API_KEY").map(|key| {
            let mut config = GeminiConfig::new(key.trim());
            if let Some(model) = get("GEMINI_MODEL") {
                config.model = model.trim().to_string();
            }
            if let Some(url) = get("GEMINI_BASE_URL") {
                config.base_url = url.trim().to_string();
            }
            config
        });

        let app_id = get("APP_ID").unwrap_or_else(|| DEFAULT_APP_ID.to_string());

        Ok(Self {
            host: get("HOST").unwrap_or_else(default_host),
            port: parsed(&get, "PORT", default_port())?,
            namespace: format!("artifacts/{}", app_id.trim()),
            settings,
            narrative,
        })
    }
}

fn parsed<T>(get: &impl Fn(&str) -> Option<String>, variable: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match get(variable) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError {
            variable,
            reason: format!("'{}': {}", raw.trim(), e),
        }),
        None => Ok(default),
    }
}
