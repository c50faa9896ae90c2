//! Integration tests for scoring: set/tiebreak completion, match winner and score validation.

use tennis_doubles_web::logic::{
    evaluate_score, is_set_complete, is_tiebreak_complete, match_winner, parse_score_line, parse_set_entries,
    set_winner, SetEntry,
};
use tennis_doubles_web::logic::scoring::TiebreakEntry;
use tennis_doubles_web::models::{Side, TiebreakScore};
use tennis_doubles_web::{ScoringConfig, SetScore, TournamentError};

fn cfg() -> ScoringConfig {
    ScoringConfig::default()
}

fn sets(games: &[(u32, u32)]) -> Vec<SetScore> {
    games.iter().map(|&(a, b)| SetScore::new(a, b)).collect()
}

#[test]
fn tied_set_with_finished_tiebreak_goes_to_team1() {
    let set = SetScore::new(6, 6).with_tiebreak(7, 5);
    assert!(is_set_complete(6, 6, set.tiebreak.as_ref(), &cfg()));
    assert_eq!(set_winner(&set, &cfg()), Some(Side::Team1));
}

#[test]
fn three_set_match_goes_to_team1_two_sets_to_one() {
    let s = sets(&[(6, 3), (4, 6), (6, 2)]);
    assert_eq!(match_winner(&s, &cfg()), Some(Side::Team1));

    let score = evaluate_score(s, "t1", "t2", &cfg()).unwrap();
    assert_eq!(score.winner_team_id, "t1");
    assert_eq!(score.loser_team_id, "t2");
    assert_eq!(score.final_score_string, "6-3, 4-6, 6-2");
}

#[test]
fn team2_winning_is_recorded_with_ids_swapped() {
    let s = vec![SetScore::new(3, 6), SetScore::new(6, 6).with_tiebreak(4, 7)];
    let score = evaluate_score(s, "t1", "t2", &cfg()).unwrap();
    assert_eq!(score.winner_team_id, "t2");
    assert_eq!(score.loser_team_id, "t1");
    assert_eq!(score.final_score_string, "3-6, 6-6(4-7)");
}

#[test]
fn threshold_set_is_incomplete_until_tiebreak_has_a_winner() {
    let c = cfg();
    assert!(!is_set_complete(6, 6, None, &c));
    assert!(!is_set_complete(6, 6, Some(&TiebreakScore::new(6, 5)), &c));
    assert!(!is_set_complete(6, 6, Some(&TiebreakScore::new(7, 6)), &c));
    assert!(is_set_complete(6, 6, Some(&TiebreakScore::new(7, 5)), &c));
    assert!(is_set_complete(6, 6, Some(&TiebreakScore::new(10, 12)), &c));
}

#[test]
fn tiebreak_needs_target_and_margin() {
    let c = cfg();
    assert!(is_tiebreak_complete(7, 0, &c));
    assert!(is_tiebreak_complete(9, 7, &c));
    assert!(!is_tiebreak_complete(7, 6, &c));
    assert!(!is_tiebreak_complete(5, 3, &c));
}

#[test]
fn ordinary_sets_need_six_games_and_two_game_lead() {
    let c = cfg();
    assert!(is_set_complete(6, 4, None, &c));
    assert!(is_set_complete(7, 5, None, &c));
    assert!(is_set_complete(2, 6, None, &c));
    assert!(!is_set_complete(6, 5, None, &c));
    assert!(!is_set_complete(5, 3, None, &c));
    assert!(!is_set_complete(7, 6, None, &c));
}

#[test]
fn custom_config_changes_the_rules() {
    let c = ScoringConfig {
        games_to_win_set: 4,
        sets_to_win_match: 1,
        tiebreaker_score_threshold: 4,
        tiebreaker_points_to_win: 10,
        tiebreaker_min_win_difference: 2,
    };
    assert!(is_set_complete(4, 1, None, &c));
    assert!(!is_set_complete(4, 4, Some(&TiebreakScore::new(7, 3)), &c));
    assert!(is_set_complete(4, 4, Some(&TiebreakScore::new(10, 8)), &c));
    let score = evaluate_score(sets(&[(1, 4)]), "a", "b", &c).unwrap();
    assert_eq!(score.winner_team_id, "b");
}

#[test]
fn empty_submission_is_rejected() {
    let err = evaluate_score(Vec::new(), "t1", "t2", &cfg()).unwrap_err();
    assert!(matches!(err, TournamentError::InvalidScoreInput { set_index: None, .. }));
}

#[test]
fn incomplete_set_reports_its_index() {
    let err = evaluate_score(sets(&[(6, 3), (5, 4)]), "t1", "t2", &cfg()).unwrap_err();
    assert!(matches!(err, TournamentError::InvalidScoreInput { set_index: Some(1), .. }));
}

#[test]
fn tied_set_without_tiebreak_is_rejected() {
    let err = evaluate_score(sets(&[(6, 6), (6, 2)]), "t1", "t2", &cfg()).unwrap_err();
    match err {
        TournamentError::InvalidScoreInput { set_index, reason } => {
            assert_eq!(set_index, Some(0));
            assert!(reason.contains("tiebreak"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn tiebreak_on_a_non_tied_set_is_rejected() {
    let s = vec![SetScore::new(6, 4).with_tiebreak(7, 5), SetScore::new(6, 1)];
    let err = evaluate_score(s, "t1", "t2", &cfg()).unwrap_err();
    assert!(matches!(err, TournamentError::InvalidScoreInput { set_index: Some(0), .. }));
}

#[test]
fn undecided_match_is_rejected() {
    let err = evaluate_score(sets(&[(6, 3), (3, 6)]), "t1", "t2", &cfg()).unwrap_err();
    assert!(matches!(err, TournamentError::InvalidScoreInput { set_index: None, .. }));
}

#[test]
fn set_after_the_match_is_decided_is_rejected() {
    let err = evaluate_score(sets(&[(6, 3), (6, 3), (2, 6)]), "t1", "t2", &cfg()).unwrap_err();
    assert!(matches!(err, TournamentError::InvalidScoreInput { set_index: Some(2), .. }));
}

#[test]
fn winner_wins_exactly_the_required_sets() {
    let s = sets(&[(4, 6), (6, 1), (7, 5)]);
    let score = evaluate_score(s.clone(), "t1", "t2", &cfg()).unwrap();
    let won = s
        .iter()
        .filter(|set| set_winner(set, &cfg()) == Some(Side::Team1))
        .count();
    assert_eq!(score.winner_team_id, "t1");
    assert_eq!(won as u32, cfg().sets_to_win_match);
}

#[test]
fn score_line_parses_sets_and_tiebreaks() {
    let parsed = parse_score_line(" 6-3, 4-6 ,6-6(7-5)").unwrap();
    assert_eq!(
        parsed,
        vec![
            SetScore::new(6, 3),
            SetScore::new(4, 6),
            SetScore::new(6, 6).with_tiebreak(7, 5)
        ]
    );
}

#[test]
fn score_line_rejects_non_numeric_and_negative_tokens() {
    let err = parse_score_line("6-3, x-6").unwrap_err();
    assert!(matches!(err, TournamentError::InvalidScoreInput { set_index: Some(1), .. }));

    let err = parse_score_line("6--3").unwrap_err();
    assert!(matches!(err, TournamentError::InvalidScoreInput { set_index: Some(0), .. }));

    let err = parse_score_line("6-6(7-5").unwrap_err();
    assert!(matches!(err, TournamentError::InvalidScoreInput { set_index: Some(0), .. }));

    assert!(parse_score_line("   ").is_err());
}

#[test]
fn set_entries_reject_negative_values() {
    let entries = vec![
        SetEntry {
            team1_games: 6,
            team2_games: 2,
            tiebreak: None,
        },
        SetEntry {
            team1_games: 6,
            team2_games: 6,
            tiebreak: Some(TiebreakEntry {
                team1_points: -1,
                team2_points: 7,
            }),
        },
    ];
    let err = parse_set_entries(&entries).unwrap_err();
    assert!(matches!(err, TournamentError::InvalidScoreInput { set_index: Some(1), .. }));
}

#[test]
fn set_entries_deserialize_from_camel_case_json() {
    let entries: Vec<SetEntry> = serde_json::from_str(
        r#"[{"team1Games":6,"team2Games":6,"tiebreak":{"team1Points":3,"team2Points":7}},{"team1Games":2,"team2Games":6}]"#,
    )
    .unwrap();
    let parsed = parse_set_entries(&entries).unwrap();
    let score = evaluate_score(parsed, "t1", "t2", &cfg()).unwrap();
    assert_eq!(score.winner_team_id, "t2");
    assert_eq!(score.final_score_string, "6-6(3-7), 2-6");
}
