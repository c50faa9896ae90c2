//! Orchestrator: checks permissions and preconditions, runs the pure engines and
//! persists results through the injected repository.
//!
//! Every command validates completely before its first write. Regeneration (players,
//! teams, matches) deletes the whole collection and re-inserts it; a store failure
//! half-way leaves the collection partial and the command should simply be re-run.

use crate::auth::{Command, Identity};
use crate::logic::{
    apply_substitution, compute_standings, evaluate_score, form_teams, generate_schedule,
    new_substitute, parse_players_csv, register_players, ScheduleRequest, Standings,
};
use crate::models::{
    GameMatch, MatchId, Player, PlayerInput, PlayerSlot, SetScore, SubstituteId, SubstitutePlayer,
    Team, TournamentError, TournamentSettings, TournamentSnapshot,
};
use crate::narrative::{match_analysis_prompt, optimal_pairings_prompt, NarrativeService};
use crate::store::{
    encode, fetch_all, insert_record, ChangeListener, Collection, Document, Record, Repository, Subscription,
};
use chrono::{NaiveDate, Utc};
use rand::Rng;
use std::sync::Arc;

/// Collaborators handed to the orchestrator at construction.
#[derive(Clone)]
pub struct TournamentContext {
    pub repository: Arc<dyn Repository>,
    pub settings: TournamentSettings,
}

impl TournamentContext {
    pub fn new(repository: Arc<dyn Repository>, settings: TournamentSettings) -> Self {
        Self {
            repository,
            settings,
        }
    }
}

/// Command façade over the tournament engines.
#[derive(Clone)]
pub struct TournamentOrchestrator {
    repo: Arc<dyn Repository>,
    settings: TournamentSettings,
}

impl TournamentOrchestrator {
    /// Fails with a validation error if the settings could never produce a tournament.
    pub fn new(context: TournamentContext) -> Result<Self, TournamentError> {
        context.settings.validate()?;
        Ok(Self {
            repo: context.repository,
            settings: context.settings,
        })
    }

    pub fn settings(&self) -> &TournamentSettings {
        &self.settings
    }

    // --- Reads ---

    pub fn players(&self) -> Result<Vec<Player>, TournamentError> {
        Ok(fetch_all(self.repo.as_ref())?)
    }

    pub fn substitutes(&self) -> Result<Vec<SubstitutePlayer>, TournamentError> {
        Ok(fetch_all(self.repo.as_ref())?)
    }

    /// Teams ordered by ascending handicap sum.
    pub fn teams(&self) -> Result<Vec<Team>, TournamentError> {
        let mut teams: Vec<Team> = fetch_all(self.repo.as_ref())?;
        teams.sort_by(|a, b| a.handicap_sum.total_cmp(&b.handicap_sum));
        Ok(teams)
    }

    /// Matches ordered by date, time, then court.
    pub fn matches(&self) -> Result<Vec<GameMatch>, TournamentError> {
        let mut matches: Vec<GameMatch> = fetch_all(self.repo.as_ref())?;
        matches.sort_by(|a, b| {
            (a.date, &a.time, &a.court).cmp(&(b.date, &b.time, &b.court))
        });
        Ok(matches)
    }

    pub fn snapshot(&self) -> Result<TournamentSnapshot, TournamentError> {
        Ok(TournamentSnapshot {
            players: self.players()?,
            substitute_players: self.substitutes()?,
            teams: self.teams()?,
            matches: self.matches()?,
        })
    }

    pub fn standings(&self) -> Result<Standings, TournamentError> {
        let teams = self.teams()?;
        let players = self.players()?;
        let matches = self.matches()?;
        Ok(compute_standings(&teams, &players, &matches, &self.settings.scoring))
    }

    /// Matches the caller created, plus (for team captains) matches their team plays in.
    pub fn my_matches(&self, identity: &Identity) -> Result<Vec<GameMatch>, TournamentError> {
        let teams = self.teams()?;
        Ok(self
            .matches()?
            .into_iter()
            .filter(|m| m.created_by == identity.user_id || identity.captains_team_in(m, &teams))
            .collect())
    }

    pub fn find_match(&self, match_id: &str) -> Result<GameMatch, TournamentError> {
        self.matches()?
            .into_iter()
            .find(|m| m.id == match_id)
            .ok_or_else(|| TournamentError::NotFound {
                entity: "match",
                id: match_id.to_string(),
            })
    }

    /// Raw change feed of one collection.
    pub fn subscribe(
        &self,
        collection: Collection,
        on_change: ChangeListener,
    ) -> Result<Subscription, TournamentError> {
        Ok(self.repo.subscribe(collection, on_change)?)
    }

    /// Recompute standings whenever teams or matches change.
    pub fn watch_standings(
        &self,
        on_change: impl Fn(&Standings) + Send + Sync + 'static,
    ) -> Result<Subscription, TournamentError> {
        let on_change = Arc::new(on_change);
        let mut subscriptions = Vec::new();
        for collection in [Collection::Teams, Collection::Matches] {
            let this = self.clone();
            let on_change = on_change.clone();
            let subscription = self.repo.subscribe(
                collection,
                Box::new(move |_: &[Document]| match this.standings() {
                    Ok(standings) => on_change(&standings),
                    Err(e) => log::warn!("Could not recompute standings: {}", e),
                }),
            );
            match subscription {
                Ok(s) => subscriptions.push(s),
                Err(e) => {
                    subscriptions.into_iter().for_each(Subscription::unsubscribe);
                    return Err(e.into());
                }
            }
        }
        Ok(Subscription::new(move || {
            subscriptions.into_iter().for_each(Subscription::unsubscribe);
        }))
    }

    // --- Commands ---

    /// Replace the registered players. The count must match the configured total.
    pub fn register_players(
        &self,
        identity: &Identity,
        inputs: &[PlayerInput],
    ) -> Result<Vec<Player>, TournamentError> {
        identity.authorize(Command::RegisterPlayers)?;
        let players: Vec<Player> = register_players(inputs, self.settings.total_players)?
            .into_iter()
            .map(|mut p| {
                p.entered_by = identity.user_id.clone();
                p
            })
            .collect();
        let players = self.regenerate(players)?;
        log::info!("{} players registered by {}", players.len(), identity.user_id);
        Ok(players)
    }

    /// Same as [`Self::register_players`] with `name,handicap` CSV input.
    pub fn import_players_csv(&self, identity: &Identity, csv: &str) -> Result<Vec<Player>, TournamentError> {
        identity.authorize(Command::RegisterPlayers)?;
        let inputs = parse_players_csv(csv)?;
        self.register_players(identity, &inputs)
    }

    pub fn add_substitute(
        &self,
        identity: &Identity,
        input: &PlayerInput,
    ) -> Result<SubstitutePlayer, TournamentError> {
        identity.authorize(Command::AddSubstitute)?;
        let mut substitute = new_substitute(input)?;
        substitute.entered_by = identity.user_id.clone();
        let substitute = insert_record(self.repo.as_ref(), substitute)?;
        log::info!("Substitute player \"{}\" added", substitute.name);
        Ok(substitute)
    }

    /// Form balanced teams from the registered players, replacing any existing teams.
    pub fn generate_teams(&self, identity: &Identity) -> Result<Vec<Team>, TournamentError> {
        identity.authorize(Command::GenerateTeams)?;
        let players = self.players()?;
        if players.len() != self.settings.total_players {
            return Err(TournamentError::InvalidPlayerCount {
                expected: self.settings.total_players,
                actual: players.len(),
            });
        }
        let teams: Vec<Team> = form_teams(&players)?
            .into_iter()
            .map(|mut t| {
                t.created_by = identity.user_id.clone();
                t
            })
            .collect();
        let teams = self.regenerate(teams)?;
        log::info!("{} doubles teams generated and balanced by handicap", teams.len());
        Ok(teams)
    }

    /// Build the round-robin schedule starting on `start_date`, replacing any existing matches.
    pub fn generate_schedule<R: Rng + ?Sized>(
        &self,
        identity: &Identity,
        start_date: NaiveDate,
        rng: &mut R,
    ) -> Result<Vec<GameMatch>, TournamentError> {
        identity.authorize(Command::GenerateSchedule)?;
        let teams = self.teams()?;
        let request = ScheduleRequest::from_settings(&self.settings, start_date);
        let matches: Vec<GameMatch> = generate_schedule(&teams, self.settings.number_of_teams(), &request, rng)?
            .into_iter()
            .map(|mut m| {
                m.created_by = identity.user_id.clone();
                m
            })
            .collect();
        let matches = self.regenerate(matches)?;
        log::info!(
            "Generated {} matches across {} days using {} courts",
            matches.len(),
            request.duration_days,
            request.courts_per_day
        );
        Ok(matches)
    }

    /// Enter (or re-enter) the score of a match and mark it completed.
    pub fn enter_score(
        &self,
        identity: &Identity,
        match_id: &str,
        sets: Vec<SetScore>,
    ) -> Result<GameMatch, TournamentError> {
        let mut game = self.find_match(match_id)?;
        if !identity.is_organizer() {
            let teams = self.teams()?;
            identity.authorize_score_entry(&game, &teams)?;
        }
        let score = evaluate_score(
            sets,
            &game.team1.team_id,
            &game.team2.team_id,
            &self.settings.scoring,
        )?;
        game.record_score(score, identity.user_id.clone(), Utc::now())?;
        self.save(&game)?;
        log::info!(
            "Score {} entered for match {} on {}",
            game.score.as_ref().map(|s| s.final_score_string.as_str()).unwrap_or_default(),
            game.id,
            game.date
        );
        Ok(game)
    }

    pub fn cancel_match(&self, identity: &Identity, match_id: &str) -> Result<GameMatch, TournamentError> {
        identity.authorize(Command::CancelMatch)?;
        let mut game = self.find_match(match_id)?;
        game.cancel(identity.user_id.clone(), Utc::now())?;
        self.save(&game)?;
        log::info!(
            "Match on {} at {} on {} cancelled",
            game.date,
            game.time,
            game.court
        );
        Ok(game)
    }

    /// Put a substitute from the pool into one roster slot of a scheduled match.
    pub fn substitute_player(
        &self,
        identity: &Identity,
        match_id: &str,
        slot: PlayerSlot,
        substitute_id: &SubstituteId,
    ) -> Result<GameMatch, TournamentError> {
        identity.authorize(Command::SubstitutePlayer)?;
        let game = self.find_match(match_id)?;
        let substitute = self
            .substitutes()?
            .into_iter()
            .find(|s| &s.id == substitute_id)
            .ok_or_else(|| TournamentError::NotFound {
                entity: "substitute",
                id: substitute_id.clone(),
            })?;
        let updated = apply_substitution(&game, slot, &substitute, &identity.user_id, Utc::now())?;
        self.save(&updated)?;
        if let Some(info) = &updated.substitute_info {
            log::info!(
                "{} replaced by {} in match on {}",
                info.original_player_name,
                info.substitute_player_name,
                updated.date
            );
        }
        Ok(updated)
    }

    /// Delete players, substitutes, teams and matches.
    pub fn clear_all_data(&self, identity: &Identity) -> Result<(), TournamentError> {
        identity.authorize(Command::ClearAllData)?;
        for collection in Collection::ALL {
            self.clear(collection)?;
        }
        log::info!("All tournament data cleared by {}", identity.user_id);
        Ok(())
    }

    // --- Commentary (never mutates tournament data) ---

    pub async fn match_commentary(
        &self,
        match_id: &MatchId,
        narrator: &dyn NarrativeService,
    ) -> Result<String, TournamentError> {
        let game = self.find_match(match_id)?;
        let prompt = match_analysis_prompt(&game)?;
        narrator.generate(&prompt).await.inspect_err(|e| {
            log::warn!("Match analysis for {} failed: {}", match_id, e);
        })
    }

    pub async fn suggest_pairings(&self, narrator: &dyn NarrativeService) -> Result<String, TournamentError> {
        let prompt = optimal_pairings_prompt(&self.teams()?)?;
        narrator.generate(&prompt).await.inspect_err(|e| {
            log::warn!("Pairing suggestions failed: {}", e);
        })
    }

    // --- Persistence helpers ---

    fn clear(&self, collection: Collection) -> Result<(), TournamentError> {
        for doc in self.repo.list(collection)? {
            self.repo.delete(collection, &doc.id)?;
        }
        Ok(())
    }

    /// Delete-then-recreate a whole collection.
    fn regenerate<T: Record>(&self, records: Vec<T>) -> Result<Vec<T>, TournamentError> {
        self.clear(T::COLLECTION)?;
        records
            .into_iter()
            .map(|r| insert_record(self.repo.as_ref(), r).map_err(TournamentError::from))
            .collect()
    }

    fn save(&self, game: &GameMatch) -> Result<(), TournamentError> {
        let fields = encode(Collection::Matches, game)?;
        self.repo.update(Collection::Matches, &game.id, fields)?;
        Ok(())
    }
}
