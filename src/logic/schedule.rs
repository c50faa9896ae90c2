//! Round-robin schedule: every pair of teams once, placed on a day × time slot × court grid.

use crate::models::{GameMatch, OverflowPolicy, Team, TournamentError, TournamentSettings};
use chrono::{Days, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;

/// Grid dimensions and placement options for one schedule generation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScheduleRequest {
    pub courts_per_day: u32,
    pub duration_days: u32,
    pub time_slots: Vec<String>,
    /// Day 0 of the tournament (normally today).
    pub start_date: NaiveDate,
    pub overflow: OverflowPolicy,
}

impl ScheduleRequest {
    pub fn from_settings(settings: &TournamentSettings, start_date: NaiveDate) -> Self {
        Self {
            courts_per_day: settings.courts_per_day,
            duration_days: settings.duration_days,
            time_slots: settings.time_slots.clone(),
            start_date,
            overflow: settings.overflow,
        }
    }

    fn slots(&self) -> Vec<&str> {
        self.time_slots
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Matches that fit on one day.
    pub fn matches_per_day(&self) -> usize {
        self.slots().len() * self.courts_per_day as usize
    }

    /// Total grid cells over the configured duration.
    pub fn capacity(&self) -> usize {
        self.matches_per_day() * self.duration_days as usize
    }
}

/// All unordered pairs of team indices, `(i, j)` with `i < j`.
pub fn round_robin_pairs(team_count: usize) -> Vec<(usize, usize)> {
    (0..team_count)
        .flat_map(|i| (i + 1..team_count).map(move |j| (i, j)))
        .collect()
}

/// Court label for a zero-based court index.
pub fn court_name(index: u32) -> String {
    format!("Court {}", index + 1)
}

/// Generate the full round-robin schedule.
///
/// Pairs are shuffled with `rng`, then placed day by day, slot by slot, court by court.
/// Pairs that do not fit the grid are handled per `request.overflow`. Each match
/// captures the teams' rosters as they are now.
pub fn generate_schedule<R: Rng + ?Sized>(
    teams: &[Team],
    expected_teams: usize,
    request: &ScheduleRequest,
    rng: &mut R,
) -> Result<Vec<GameMatch>, TournamentError> {
    if teams.len() != expected_teams {
        return Err(TournamentError::InvalidScheduleConfig(format!(
            "need {} teams to generate a schedule, found {}",
            expected_teams,
            teams.len()
        )));
    }
    if request.courts_per_day == 0 || request.duration_days == 0 {
        return Err(TournamentError::InvalidScheduleConfig(
            "number of courts and tournament duration must be positive".into(),
        ));
    }
    let slots = request.slots();
    if slots.is_empty() {
        return Err(TournamentError::InvalidScheduleConfig(
            "at least one time slot is required".into(),
        ));
    }

    let mut pairs = round_robin_pairs(teams.len());
    pairs.shuffle(rng);

    let per_day = request.matches_per_day();
    let capacity = request.capacity();
    let days = if pairs.len() > capacity {
        match request.overflow {
            OverflowPolicy::Drop => {
                log::warn!(
                    "Schedule grid holds {} matches; {} team pairs will not be scheduled",
                    capacity,
                    pairs.len() - capacity
                );
                pairs.truncate(capacity);
                request.duration_days as usize
            }
            OverflowPolicy::Error => {
                return Err(TournamentError::InvalidScheduleConfig(format!(
                    "{} matches needed but only {} fit in {} days",
                    pairs.len(),
                    capacity,
                    request.duration_days
                )))
            }
            OverflowPolicy::ExtendDays => {
                let days = pairs.len().div_ceil(per_day);
                log::info!(
                    "Extending schedule from {} to {} days to fit {} matches",
                    request.duration_days,
                    days,
                    pairs.len()
                );
                days
            }
        }
    } else {
        request.duration_days as usize
    };

    let mut cells = Vec::with_capacity(pairs.len());
    'grid: for day in 0..days {
        let date = request
            .start_date
            .checked_add_days(Days::new(day as u64))
            .ok_or_else(|| TournamentError::InvalidScheduleConfig("schedule runs past the calendar".into()))?;
        for slot in &slots {
            for court in 0..request.courts_per_day {
                if cells.len() == pairs.len() {
                    break 'grid;
                }
                cells.push((date, *slot, court_name(court)));
            }
        }
    }

    Ok(pairs
        .into_iter()
        .zip(cells)
        .map(|((i, j), (date, time, court))| GameMatch::new(date, time, court, &teams[i], &teams[j]))
        .collect())
}
