//! Integration tests for environment-based configuration.

use std::collections::HashMap;
use tennis_doubles_web::{AppConfig, OverflowPolicy, ScoringConfig, TournamentError, TournamentSettings};

fn load(vars: &[(&str, &str)]) -> Result<AppConfig, tennis_doubles_web::ConfigError> {
    let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    AppConfig::from_lookup(|key| map.get(key).cloned())
}

#[test]
fn defaults_when_nothing_is_set() {
    let config = load(&[]).unwrap();
    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.port, 8080);
    assert_eq!(config.namespace, "artifacts/default-app-id");
    assert_eq!(config.settings, TournamentSettings::default());
    assert_eq!(config.settings.total_players, 20);
    assert_eq!(config.settings.courts_per_day, 5);
    assert_eq!(config.settings.duration_days, 18);
    assert_eq!(config.settings.time_slots, vec!["09:00", "10:30", "12:00", "13:30"]);
    assert_eq!(config.settings.overflow, OverflowPolicy::Drop);
    assert_eq!(config.settings.scoring, ScoringConfig::default());
    assert!(config.narrative.is_none());
}

#[test]
fn overrides_are_applied() {
    let config = load(&[
        ("HOST", "127.0.0.1"),
        ("PORT", "9000"),
        ("APP_ID", "club-2024"),
        ("TOTAL_PLAYERS", "16"),
        ("COURTS_PER_DAY", "3"),
        ("TOURNAMENT_DAYS", "10"),
        ("TIME_SLOTS", "08:00, 18:30,"),
        ("SCHEDULE_OVERFLOW", "extend_days"),
        ("GAMES_TO_WIN_SET", "4"),
        ("SETS_TO_WIN_MATCH", "1"),
        ("TIEBREAK_THRESHOLD", "4"),
        ("TIEBREAK_POINTS", "10"),
        ("TIEBREAK_MIN_DIFF", "2"),
    ])
    .unwrap();
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 9000);
    assert_eq!(config.namespace, "artifacts/club-2024");
    assert_eq!(config.settings.total_players, 16);
    assert_eq!(config.settings.courts_per_day, 3);
    assert_eq!(config.settings.duration_days, 10);
    assert_eq!(config.settings.time_slots, vec!["08:00", "18:30"]);
    assert_eq!(config.settings.overflow, OverflowPolicy::ExtendDays);
    assert_eq!(config.settings.scoring.games_to_win_set, 4);
    assert_eq!(config.settings.scoring.sets_to_win_match, 1);
    assert_eq!(config.settings.scoring.tiebreaker_points_to_win, 10);
    assert!(config.settings.validate().is_ok());
}

#[test]
fn blank_values_fall_back_to_defaults() {
    let config = load(&[("PORT", "  "), ("TIME_SLOTS", "")]).unwrap();
    assert_eq!(config.port, 8080);
    assert_eq!(config.settings.time_slots.len(), 4);
}

#[test]
fn invalid_values_name_the_variable() {
    let err = load(&[("PORT", "eighty")]).unwrap_err();
    assert_eq!(err.variable, "PORT");
    assert!(err.to_string().contains("PORT"));

    let err = load(&[("TOTAL_PLAYERS", "-4")]).unwrap_err();
    assert_eq!(err.variable, "TOTAL_PLAYERS");

    let err = load(&[("SCHEDULE_OVERFLOW", "squeeze")]).unwrap_err();
    assert_eq!(err.variable, "SCHEDULE_OVERFLOW");
}

#[test]
fn gemini_is_enabled_by_api_key() {
    let config = load(&[("GEMINI_API_KEY", "secret"), ("GEMINI_MODEL", "gemini-1.5-flash")]).unwrap();
    let gemini = config.narrative.unwrap();
    assert_eq!(gemini.api_key, "secret");
    assert_eq!(gemini.model, "gemini-1.5-flash");
    assert_eq!(gemini.base_url, "https://generativelanguage.googleapis.com");
}

#[test]
fn settings_validation_rejects_unplayable_tournaments() {
    let odd = TournamentSettings {
        total_players: 7,
        ..TournamentSettings::default()
    };
    assert!(matches!(
        odd.validate(),
        Err(TournamentError::InvalidPlayerCount { expected: 8, actual: 7 })
    ));
    let empty = TournamentSettings {
        total_players: 0,
        ..TournamentSettings::default()
    };
    assert!(matches!(
        empty.validate(),
        Err(TournamentError::InvalidPlayerCount { expected: 2, actual: 0 })
    ));

    let no_slots = TournamentSettings {
        time_slots: vec![" ".into()],
        ..TournamentSettings::default()
    };
    assert!(no_slots.validate().is_err());

    let no_sets = TournamentSettings {
        scoring: ScoringConfig {
            sets_to_win_match: 0,
            ..ScoringConfig::default()
        },
        ..TournamentSettings::default()
    };
    assert!(no_sets.validate().is_err());

    assert!(TournamentSettings::default().validate().is_ok());
    assert_eq!(TournamentSettings::default().number_of_teams(), 10);
}
