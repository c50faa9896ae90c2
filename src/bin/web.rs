//! Single binary web server: JSON API over the tournament orchestrator.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Configuration comes from env vars (see `config.rs`):
//! HOST, PORT, APP_ID, TOTAL_PLAYERS, COURTS_PER_DAY, TOURNAMENT_DAYS, TIME_SLOTS, ...

use actix_session::{storage::CookieSessionStore, Session, SessionMiddleware};
use actix_web::{
    cookie::Key,
    delete, get, post, put,
    web::{Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tennis_doubles_web::{
    parse_score_line, parse_set_entries, AppConfig, GeminiClient, Identity, InMemoryRepository, PlayerInput,
    PlayerSlot, Role, SetEntry, TournamentContext, TournamentError, TournamentOrchestrator,
};
use uuid::Uuid;

struct AppState {
    orchestrator: TournamentOrchestrator,
    /// `None` when GEMINI_API_KEY is unset.
    narrator: Option<GeminiClient>,
}

type State = Data<AppState>;

const IDENTITY_KEY: &str = "identity";

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionBody {
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    role: Role,
}

#[derive(Deserialize)]
struct RegisterPlayersBody {
    players: Vec<PlayerInput>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateScheduleBody {
    #[serde(default)]
    start_date: Option<NaiveDate>,
}

/// Either structured sets or a score line like `6-3, 4-6, 6-6(7-5)`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ScoreBody {
    Sets { sets: Vec<SetEntry> },
    Line { score: String },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubstituteBody {
    slot: PlayerSlot,
    substitute_id: String,
}

#[derive(Deserialize)]
struct MatchPath {
    id: String,
}

#[derive(Deserialize)]
struct MatchesQuery {
    #[serde(default)]
    mine: bool,
}

/// Map a tournament error to `{ error, kind }` with a status matching its category.
fn error_response(e: &TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string(), "kind": e.kind() });
    match e {
        TournamentError::NotFound { .. } => HttpResponse::NotFound().json(body),
        TournamentError::PermissionDenied { .. } => HttpResponse::Forbidden().json(body),
        TournamentError::Repository(_) => {
            log::error!("{}", e);
            HttpResponse::InternalServerError().json(body)
        }
        TournamentError::NarrativeService(_) => HttpResponse::BadGateway().json(body),
        _ => HttpResponse::BadRequest().json(body),
    }
}

fn respond<T: serde::Serialize>(result: Result<T, TournamentError>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => error_response(&e),
    }
}

/// Identity stored in the session cookie; a fresh anonymous player on first visit.
fn current_identity(session: &Session) -> Result<Identity, HttpResponse> {
    match session.get::<Identity>(IDENTITY_KEY) {
        Ok(Some(identity)) => Ok(identity),
        Ok(None) => {
            let identity = Identity::new(Uuid::new_v4().to_string(), Role::Player);
            session
                .insert(IDENTITY_KEY, &identity)
                .map_err(|_| HttpResponse::InternalServerError().body("session error"))?;
            Ok(identity)
        }
        Err(_) => Err(HttpResponse::InternalServerError().body("session error")),
    }
}

macro_rules! identity_or_return {
    ($session:expr) => {
        match current_identity(&$session) {
            Ok(identity) => identity,
            Err(response) => return response,
        }
    };
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "tennis-doubles-web",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Current caller identity (creates an anonymous player session if none).
#[get("/api/session")]
async fn api_get_session(session: Session) -> HttpResponse {
    let identity = identity_or_return!(session);
    HttpResponse::Ok().json(identity)
}

/// Sign in as the given user id and role (stand-in for the external identity provider).
#[post("/api/session")]
async fn api_set_session(session: Session, body: Json<SessionBody>) -> HttpResponse {
    let body = body.into_inner();
    let user_id = body
        .user_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let identity = Identity::new(user_id, body.role);
    if session.insert(IDENTITY_KEY, &identity).is_err() {
        return HttpResponse::InternalServerError().body("session error");
    }
    log::info!("Session started for {} as {}", identity.user_id, identity.role);
    HttpResponse::Ok().json(identity)
}

/// Everything stored: players, substitutes, teams (by handicap) and matches (by date/time/court).
#[get("/api/tournament")]
async fn api_get_tournament(state: State) -> HttpResponse {
    respond(state.orchestrator.snapshot())
}

#[get("/api/settings")]
async fn api_get_settings(state: State) -> HttpResponse {
    HttpResponse::Ok().json(state.orchestrator.settings())
}

/// Replace the registered players (admin / tournament manager).
#[post("/api/players")]
async fn api_register_players(state: State, session: Session, body: Json<RegisterPlayersBody>) -> HttpResponse {
    let identity = identity_or_return!(session);
    respond(state.orchestrator.register_players(&identity, &body.players))
}

/// Same as POST /api/players with a `name,handicap` CSV body.
#[post("/api/players/csv")]
async fn api_import_players_csv(state: State, session: Session, body: String) -> HttpResponse {
    let identity = identity_or_return!(session);
    respond(state.orchestrator.import_players_csv(&identity, &body))
}

#[post("/api/substitutes")]
async fn api_add_substitute(state: State, session: Session, body: Json<PlayerInput>) -> HttpResponse {
    let identity = identity_or_return!(session);
    respond(state.orchestrator.add_substitute(&identity, &body))
}

#[post("/api/teams/generate")]
async fn api_generate_teams(state: State, session: Session) -> HttpResponse {
    let identity = identity_or_return!(session);
    respond(state.orchestrator.generate_teams(&identity))
}

/// Generate the round-robin schedule; start date defaults to today (UTC).
#[post("/api/schedule/generate")]
async fn api_generate_schedule(
    state: State,
    session: Session,
    body: Option<Json<GenerateScheduleBody>>,
) -> HttpResponse {
    let identity = identity_or_return!(session);
    let start_date = body
        .and_then(|b| b.into_inner().start_date)
        .unwrap_or_else(|| Utc::now().date_naive());
    let mut rng = rand::thread_rng();
    respond(state.orchestrator.generate_schedule(&identity, start_date, &mut rng))
}

#[get("/api/matches")]
async fn api_list_matches(state: State, session: Session, query: Query<MatchesQuery>) -> HttpResponse {
    if query.mine {
        let identity = identity_or_return!(session);
        respond(state.orchestrator.my_matches(&identity))
    } else {
        respond(state.orchestrator.matches())
    }
}

/// Enter or edit the score of a match (organizers, or a captain of a team in the match).
#[put("/api/matches/{id}/score")]
async fn api_enter_score(
    state: State,
    session: Session,
    path: Path<MatchPath>,
    body: Json<ScoreBody>,
) -> HttpResponse {
    let identity = identity_or_return!(session);
    let sets = match body.into_inner() {
        ScoreBody::Sets { sets } => parse_set_entries(&sets),
        ScoreBody::Line { score } => parse_score_line(&score),
    };
    respond(sets.and_then(|sets| state.orchestrator.enter_score(&identity, &path.id, sets)))
}

#[post("/api/matches/{id}/cancel")]
async fn api_cancel_match(state: State, session: Session, path: Path<MatchPath>) -> HttpResponse {
    let identity = identity_or_return!(session);
    respond(state.orchestrator.cancel_match(&identity, &path.id))
}

#[post("/api/matches/{id}/substitute")]
async fn api_substitute_player(
    state: State,
    session: Session,
    path: Path<MatchPath>,
    body: Json<SubstituteBody>,
) -> HttpResponse {
    let identity = identity_or_return!(session);
    respond(
        state
            .orchestrator
            .substitute_player(&identity, &path.id, body.slot, &body.substitute_id),
    )
}

#[get("/api/standings")]
async fn api_standings(state: State) -> HttpResponse {
    respond(state.orchestrator.standings())
}

fn narrator_unavailable() -> TournamentError {
    TournamentError::NarrativeService("GEMINI_API_KEY is not configured".into())
}

/// Commentary on a completed match. Failures leave tournament data untouched.
#[post("/api/matches/{id}/commentary")]
async fn api_match_commentary(state: State, path: Path<MatchPath>) -> HttpResponse {
    let narrator = match &state.narrator {
        Some(n) => n,
        None => return error_response(&narrator_unavailable()),
    };
    match state.orchestrator.match_commentary(&path.id, narrator).await {
        Ok(text) => HttpResponse::Ok().json(serde_json::json!({ "commentary": text })),
        Err(e) => error_response(&e),
    }
}

#[get("/api/pairings/suggestions")]
async fn api_pairing_suggestions(state: State) -> HttpResponse {
    let narrator = match &state.narrator {
        Some(n) => n,
        None => return error_response(&narrator_unavailable()),
    };
    match state.orchestrator.suggest_pairings(narrator).await {
        Ok(text) => HttpResponse::Ok().json(serde_json::json!({ "suggestions": text })),
        Err(e) => error_response(&e),
    }
}

/// Delete players, substitutes, teams and matches (admin / tournament manager).
#[delete("/api/data")]
async fn api_clear_all_data(state: State, session: Session) -> HttpResponse {
    let identity = identity_or_return!(session);
    match state.orchestrator.clear_all_data(&identity) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(&e),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let repository = Arc::new(InMemoryRepository::new(config.namespace.clone()));
    let orchestrator = TournamentOrchestrator::new(TournamentContext::new(repository, config.settings.clone()))
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let narrator = match config.narrative.clone() {
        Some(gemini) => Some(
            GeminiClient::new(gemini).map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?,
        ),
        None => {
            log::warn!("GEMINI_API_KEY not set; match commentary is disabled");
            None
        }
    };
    let state = Data::new(AppState { orchestrator, narrator });

    let bind = (config.host.as_str(), config.port);
    log::info!(
        "Starting server at http://{}:{} (namespace {}, {} players, {} courts, {} days)",
        bind.0,
        bind.1,
        config.namespace,
        config.settings.total_players,
        config.settings.courts_per_day,
        config.settings.duration_days
    );

    // Cookies are signed with a per-process key; sessions end on restart.
    let key = Key::generate();

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
                    .cookie_secure(false)
                    .build(),
            )
            .service(api_health)
            .service(favicon)
            .service(api_get_session)
            .service(api_set_session)
            .service(api_get_tournament)
            .service(api_get_settings)
            .service(api_register_players)
            .service(api_import_players_csv)
            .service(api_add_substitute)
            .service(api_generate_teams)
            .service(api_generate_schedule)
            .service(api_list_matches)
            .service(api_enter_score)
            .service(api_cancel_match)
            .service(api_substitute_player)
            .service(api_standings)
            .service(api_match_commentary)
            .service(api_pairing_suggestions)
            .service(api_clear_all_data)
    })
    .bind(bind)?
    .run()
    .await
}
