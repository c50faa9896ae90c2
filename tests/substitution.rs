//! Integration tests for substituting a player in a scheduled match.

use chrono::{NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use tennis_doubles_web::logic::{apply_substitution, evaluate_score};
use tennis_doubles_web::models::{MatchAction, Side};
use tennis_doubles_web::{
    GameMatch, MatchStatus, Player, PlayerSlot, ScoringConfig, SetScore, SubstitutePlayer, Team, TournamentError,
};

fn team(id: &str, h1: f64, h2: f64) -> Team {
    let p1 = Player::new(format!("{id}-1"), h1).with_id(format!("{id}p1"));
    let p2 = Player::new(format!("{id}-2"), h2).with_id(format!("{id}p2"));
    Team::from_players(format!("Team {id}"), &p1, &p2).with_id(id)
}

fn game(t1: (f64, f64), t2: (f64, f64)) -> GameMatch {
    let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    let mut m = GameMatch::new(date, "09:00", "Court 1", &team("A", t1.0, t1.1), &team("B", t2.0, t2.1));
    m.id = "m1".into();
    m
}

fn sub(name: &str, handicap: f64) -> SubstitutePlayer {
    SubstitutePlayer::new(name, handicap).with_id(format!("s-{name}"))
}

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
}

#[test]
fn substituting_team1_player1_updates_only_team1() {
    let m = game((5.0, 6.0), (4.0, 9.0));
    let updated = apply_substitution(&m, PlayerSlot::Team1Player1, &sub("Sam", 8.0), "organizer", now()).unwrap();

    assert_eq!(updated.team1.handicap_sum, 14.0);
    assert_eq!(updated.team1.player1_name, "Sam");
    assert_eq!(updated.team1.player1_handicap, 8.0);
    assert_eq!(updated.team1.player2_name, m.team1.player2_name);
    assert_eq!(updated.team2, m.team2);
    assert_eq!(updated.status, MatchStatus::Scheduled);

    let info = updated.substitute_info.unwrap();
    assert_eq!(info.affected_team, Side::Team1);
    assert_eq!(info.slot, PlayerSlot::Team1Player1);
    assert_eq!(info.original_player_name, "A-1");
    assert_eq!(info.substitute_player_name, "Sam");
    assert_eq!(info.original_handicap, 5.0);
    assert_eq!(info.substitute_handicap, 8.0);
    assert_eq!(info.new_team_handicap_sum, 14.0);
    assert_eq!(info.substituted_by, "organizer");
    assert_eq!(info.substituted_at, now());
}

#[test]
fn substituting_team2_player2_updates_only_team2() {
    let m = game((5.0, 6.0), (4.0, 9.0));
    let updated = apply_substitution(&m, PlayerSlot::Team2Player2, &sub("Kim", 3.0), "organizer", now()).unwrap();
    assert_eq!(updated.team2.handicap_sum, 7.0);
    assert_eq!(updated.team2.player2_name, "Kim");
    assert_eq!(updated.team1, m.team1);
}

#[test]
fn input_match_is_left_untouched() {
    let m = game((5.0, 6.0), (4.0, 9.0));
    let before = m.clone();
    apply_substitution(&m, PlayerSlot::Team1Player2, &sub("Lee", 1.0), "organizer", now()).unwrap();
    assert_eq!(m, before);
}

#[test]
fn second_substitution_replaces_the_record() {
    let m = game((5.0, 6.0), (4.0, 9.0));
    let once = apply_substitution(&m, PlayerSlot::Team1Player1, &sub("Sam", 8.0), "organizer", now()).unwrap();
    let twice = apply_substitution(&once, PlayerSlot::Team1Player1, &sub("Kim", 2.0), "organizer", now()).unwrap();

    assert_eq!(twice.team1.handicap_sum, 8.0);
    let info = twice.substitute_info.unwrap();
    assert_eq!(info.original_player_name, "Sam");
    assert_eq!(info.original_handicap, 8.0);
    assert_eq!(info.substitute_player_name, "Kim");
}

#[test]
fn cancelled_match_cannot_be_substituted() {
    let mut m = game((5.0, 6.0), (4.0, 9.0));
    m.cancel("organizer", now()).unwrap();
    let err = apply_substitution(&m, PlayerSlot::Team1Player1, &sub("Sam", 8.0), "organizer", now()).unwrap_err();
    assert_eq!(
        err,
        TournamentError::InvalidMatchState {
            status: MatchStatus::Cancelled,
            action: MatchAction::Substitute,
        }
    );
}

#[test]
fn completed_match_cannot_be_substituted() {
    let mut m = game((5.0, 6.0), (4.0, 9.0));
    let score = evaluate_score(
        vec![SetScore::new(6, 1), SetScore::new(6, 2)],
        "A",
        "B",
        &ScoringConfig::default(),
    )
    .unwrap();
    m.record_score(score, "organizer", now()).unwrap();
    let err = apply_substitution(&m, PlayerSlot::Team2Player1, &sub("Sam", 8.0), "organizer", now()).unwrap_err();
    assert!(matches!(err, TournamentError::InvalidMatchState { status: MatchStatus::Completed, .. }));
}

#[test]
fn player_slot_parses_from_snake_case() {
    assert_eq!("team1_player2".parse::<PlayerSlot>().unwrap(), PlayerSlot::Team1Player2);
    assert_eq!(PlayerSlot::Team2Player1.side(), Side::Team2);
    assert!("team3_player1".parse::<PlayerSlot>().is_err());
}

fn slot_strategy() -> impl Strategy<Value = PlayerSlot> {
    prop_oneof![
        Just(PlayerSlot::Team1Player1),
        Just(PlayerSlot::Team1Player2),
        Just(PlayerSlot::Team2Player1),
        Just(PlayerSlot::Team2Player2),
    ]
}

proptest! {
    #[test]
    fn substitution_conserves_handicap_sums(
        hs in prop::array::uniform4(0i32..60),
        sub_handicap in 0i32..60,
        slot in slot_strategy(),
    ) {
        let h = |x: i32| x as f64 / 2.0;
        let m = game((h(hs[0]), h(hs[1])), (h(hs[2]), h(hs[3])));
        let substitute = sub("S", h(sub_handicap));
        let updated = apply_substitution(&m, slot, &substitute, "organizer", now()).unwrap();

        let affected = slot.side();
        let original = if slot.is_first() {
            m.side(affected).player1_handicap
        } else {
            m.side(affected).player2_handicap
        };
        prop_assert_eq!(
            updated.side(affected).handicap_sum,
            m.side(affected).handicap_sum - original + substitute.handicap
        );
        prop_assert_eq!(updated.side(affected.other()), m.side(affected.other()));
    }
}
