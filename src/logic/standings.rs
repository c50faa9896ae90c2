//! Standings: fold completed matches into ranked team and player tables.

use crate::models::{GameMatch, Handicap, MatchStatus, Player, PlayerId, ScoringConfig, Side, Team, TeamId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// League points awarded for a match win.
pub const POINTS_PER_WIN: u32 = 3;

/// Aggregated record of one team.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStanding {
    pub team_id: TeamId,
    pub name: String,
    pub player1_name: String,
    pub player2_name: String,
    pub handicap_sum: Handicap,
    pub matches_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub sets_won: u32,
    pub sets_lost: u32,
    pub games_won: u32,
    pub games_lost: u32,
    pub points: u32,
}

impl TeamStanding {
    fn new(team: &Team) -> Self {
        Self {
            team_id: team.id.clone(),
            name: team.name.clone(),
            player1_name: team.player1_name.clone(),
            player2_name: team.player2_name.clone(),
            handicap_sum: team.handicap_sum,
            matches_played: 0,
            wins: 0,
            losses: 0,
            sets_won: 0,
            sets_lost: 0,
            games_won: 0,
            games_lost: 0,
            points: 0,
        }
    }

    pub fn set_difference(&self) -> i64 {
        i64::from(self.sets_won) - i64::from(self.sets_lost)
    }

    pub fn game_difference(&self) -> i64 {
        i64::from(self.games_won) - i64::from(self.games_lost)
    }
}

/// Match-level record of one player. Set and game counts are tracked per team only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStanding {
    pub player_id: PlayerId,
    pub name: String,
    pub team_name: Option<String>,
    pub matches_played: u32,
    pub wins: u32,
    pub losses: u32,
    /// Percentage, rounded to one decimal place.
    pub win_rate: f64,
}

impl PlayerStanding {
    fn new(player: &Player, team_name: Option<String>) -> Self {
        Self {
            player_id: player.id.clone(),
            name: player.name.clone(),
            team_name,
            matches_played: 0,
            wins: 0,
            losses: 0,
            win_rate: 0.0,
        }
    }
}

/// Both ranked tables.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standings {
    pub team_table: Vec<TeamStanding>,
    pub player_table: Vec<PlayerStanding>,
}

/// `wins / played` as a percentage with one decimal; 0 when nothing was played.
pub fn win_rate(wins: u32, played: u32) -> f64 {
    if played == 0 {
        return 0.0;
    }
    (f64::from(wins) / f64::from(played) * 1000.0).round() / 10.0
}

/// Team order: wins, then set difference, then game difference (all descending), then name.
pub fn compare_teams(a: &TeamStanding, b: &TeamStanding) -> Ordering {
    b.wins
        .cmp(&a.wins)
        .then_with(|| b.set_difference().cmp(&a.set_difference()))
        .then_with(|| b.game_difference().cmp(&a.game_difference()))
        .then_with(|| a.name.cmp(&b.name))
}

/// Player order: win rate, then wins (descending), then name.
pub fn compare_players(a: &PlayerStanding, b: &PlayerStanding) -> Ordering {
    b.win_rate
        .total_cmp(&a.win_rate)
        .then_with(|| b.wins.cmp(&a.wins))
        .then_with(|| a.name.cmp(&b.name))
}

/// Sets and games of one match from team 1's point of view.
#[derive(Default)]
struct MatchTally {
    team1_sets: u32,
    team2_sets: u32,
    team1_games: u32,
    team2_games: u32,
}

fn tally_match(game: &GameMatch) -> MatchTally {
    let mut tally = MatchTally::default();
    let Some(score) = &game.score else {
        return tally;
    };
    for set in &score.sets {
        tally.team1_games += set.team1_games;
        tally.team2_games += set.team2_games;
        // a set level on games (tiebreak sets included) only feeds the game totals
        match set.team1_games.cmp(&set.team2_games) {
            Ordering::Greater => tally.team1_sets += 1,
            Ordering::Less => tally.team2_sets += 1,
            Ordering::Equal => {}
        }
    }
    tally
}

fn record_result(row: &mut TeamStanding, won: bool, sets: (u32, u32), games: (u32, u32)) {
    row.matches_played += 1;
    if won {
        row.wins += 1;
        row.points += POINTS_PER_WIN;
    } else {
        row.losses += 1;
    }
    row.sets_won += sets.0;
    row.sets_lost += sets.1;
    row.games_won += games.0;
    row.games_lost += games.1;
}

/// Build ranked team and player tables from completed matches.
///
/// Matches that reference a team missing from `teams` (e.g. after teams were regenerated
/// without regenerating the schedule) are skipped with a warning. Sets are credited by
/// comparing game counts, so the scoring config does not change the tallies.
pub fn compute_standings(
    teams: &[Team],
    players: &[Player],
    matches: &[GameMatch],
    _cfg: &ScoringConfig,
) -> Standings {
    let mut team_rows: HashMap<&str, TeamStanding> =
        teams.iter().map(|t| (t.id.as_str(), TeamStanding::new(t))).collect();
    let mut player_rows: HashMap<&str, PlayerStanding> = players
        .iter()
        .map(|p| {
            let team_name = teams.iter().find(|t| t.has_player(&p.id)).map(|t| t.name.clone());
            (p.id.as_str(), PlayerStanding::new(p, team_name))
        })
        .collect();

    for game in matches.iter().filter(|m| m.status == MatchStatus::Completed) {
        let (team1_id, team2_id) = (game.team1.team_id.as_str(), game.team2.team_id.as_str());
        if team1_id == team2_id || !team_rows.contains_key(team1_id) || !team_rows.contains_key(team2_id) {
            log::warn!("Skipping match {} due to missing team data", game.id);
            continue;
        }
        let Some(winning_side) = game.winning_side() else {
            log::warn!("Skipping completed match {} without a winner", game.id);
            continue;
        };

        let tally = tally_match(game);
        if let Some(row) = team_rows.get_mut(team1_id) {
            record_result(
                row,
                winning_side == Side::Team1,
                (tally.team1_sets, tally.team2_sets),
                (tally.team1_games, tally.team2_games),
            );
        }
        if let Some(row) = team_rows.get_mut(team2_id) {
            record_result(
                row,
                winning_side == Side::Team2,
                (tally.team2_sets, tally.team1_sets),
                (tally.team2_games, tally.team1_games),
            );
        }

        for side in [Side::Team1, Side::Team2] {
            let won = side == winning_side;
            let Some(team) = teams.iter().find(|t| &t.id == game.team_id(side)) else {
                continue;
            };
            for player_id in [&team.player1_id, &team.player2_id] {
                if let Some(row) = player_rows.get_mut(player_id.as_str()) {
                    row.matches_played += 1;
                    if won {
                        row.wins += 1;
                    } else {
                        row.losses += 1;
                    }
                }
            }
        }
    }

    let mut team_table: Vec<TeamStanding> = team_rows.into_values().collect();
    team_table.sort_by(compare_teams);

    let mut player_table: Vec<PlayerStanding> = player_rows
        .into_values()
        .map(|mut row| {
            row.win_rate = win_rate(row.wins, row.matches_played);
            row
        })
        .collect();
    player_table.sort_by(compare_players);

    Standings {
        team_table,
        player_table,
    }
}
