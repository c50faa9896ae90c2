//! Setup phase: validate bulk player registration (form rows or CSV) and substitute entries.

use crate::models::{Handicap, Player, PlayerInput, SubstitutePlayer, TournamentError};

/// Validate one row. `Ok(None)` for a fully blank row.
fn parse_entry(index: usize, input: &PlayerInput) -> Result<Option<(String, Handicap)>, TournamentError> {
    let name = input.name.trim();
    let handicap = input.handicap.trim();
    if name.is_empty() && handicap.is_empty() {
        return Ok(None);
    }
    if name.is_empty() {
        return Err(TournamentError::InvalidPlayerInput {
            index,
            reason: "name is required".into(),
        });
    }
    let handicap: Handicap = handicap
        .parse()
        .ok()
        .filter(|h: &Handicap| h.is_finite())
        .ok_or_else(|| TournamentError::InvalidPlayerInput {
            index,
            reason: format!("handicap for {} must be a number", name),
        })?;
    Ok(Some((name.to_string(), handicap)))
}

/// Turn registration rows into players. Fully blank rows are ignored; every other row
/// needs a non-empty name and a numeric handicap. Exactly `expected` players must remain.
pub fn register_players(inputs: &[PlayerInput], expected: usize) -> Result<Vec<Player>, TournamentError> {
    let mut players = Vec::with_capacity(expected);
    for (index, input) in inputs.iter().enumerate() {
        if let Some((name, handicap)) = parse_entry(index, input)? {
            players.push(Player::new(name, handicap));
        }
    }

    if players.len() != expected || expected < 2 || expected % 2 != 0 {
        return Err(TournamentError::InvalidPlayerCount {
            expected,
            actual: players.len(),
        });
    }
    Ok(players)
}

/// Validate a single substitute entry; both name and handicap are required.
pub fn new_substitute(input: &PlayerInput) -> Result<SubstitutePlayer, TournamentError> {
    match parse_entry(0, input)? {
        Some((name, handicap)) => Ok(SubstitutePlayer::new(name, handicap)),
        None => Err(TournamentError::InvalidPlayerInput {
            index: 0,
            reason: "enter a name and numeric handicap for the substitute".into(),
        }),
    }
}

/// Read `name,handicap` rows from CSV text. A leading `name,handicap` header is skipped.
pub fn parse_players_csv(text: &str) -> Result<Vec<PlayerInput>, TournamentError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut inputs = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| TournamentError::InvalidPlayerInput {
            index,
            reason: e.to_string(),
        })?;
        let name = record.get(0).unwrap_or_default();
        let handicap = record.get(1).unwrap_or_default();
        if index == 0 && name.eq_ignore_ascii_case("name") && handicap.eq_ignore_ascii_case("handicap") {
            continue;
        }
        if record.len() > 2 {
            return Err(TournamentError::InvalidPlayerInput {
                index,
                reason: format!("expected 2 columns (name,handicap), got {}", record.len()),
            });
        }
        inputs.push(PlayerInput::new(name, handicap));
    }
    Ok(inputs)
}
