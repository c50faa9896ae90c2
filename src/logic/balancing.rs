//! Team formation: pair the strongest remaining player with the weakest remaining player.

use crate::models::{nearest_valid_player_count, Player, Team, TournamentError};

/// Spreadsheet-style letters: 0 → A, 25 → Z, 26 → AA.
fn team_letters(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().collect()
}

/// Name of the `index`-th team formed (`Team A`, `Team B`, …).
pub fn team_name(index: usize) -> String {
    format!("Team {}", team_letters(index))
}

/// Form `n / 2` handicap-balanced doubles teams.
///
/// Players are sorted by handicap (ties keep input order) and rank `i` is paired with
/// rank `n - 1 - i`. Names follow pairing order; the returned list is sorted by
/// ascending `handicap_sum` for presentation.
pub fn form_teams(players: &[Player]) -> Result<Vec<Team>, TournamentError> {
    let n = players.len();
    if n < 2 || n % 2 != 0 {
        return Err(TournamentError::InvalidPlayerCount {
            expected: nearest_valid_player_count(n),
            actual: n,
        });
    }

    let mut sorted: Vec<&Player> = players.iter().collect();
    sorted.sort_by(|a, b| a.handicap.total_cmp(&b.handicap));

    let mut teams: Vec<Team> = (0..n / 2)
        .map(|i| Team::from_players(team_name(i), sorted[i], sorted[n - 1 - i]))
        .collect();
    teams.sort_by(|a, b| a.handicap_sum.total_cmp(&b.handicap_sum));
    Ok(teams)
}
