//! Single binary web server: JSON API over the pickup queue.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST (e.g. 0.0.0.0), PORT (e.g. 8080).

use actix_web::{
    delete, get, post,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use pickup_queue_web::{
    ErrorKind, GameId, MemoryStore, MoveCommand, PlayerId, QueueError, QueueService,
    SessionConfig, SessionId,
};
use serde::Deserialize;

type AppState = Data<QueueService<MemoryStore>>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterPlayerBody {
    name: String,
    #[serde(default)]
    birth_year: Option<i32>,
    #[serde(default)]
    auto_rejoin: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckInBody {
    player_id: PlayerId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GameResultBody {
    team1_score: u32,
    team2_score: u32,
}

/// Path segment: session id (e.g. /api/sessions/{id})
#[derive(Deserialize)]
struct SessionPath {
    id: SessionId,
}

/// Path segment: game id (e.g. /api/games/{id})
#[derive(Deserialize)]
struct GamePath {
    id: GameId,
}

fn error_response(e: &QueueError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e.kind() {
        ErrorKind::Validation | ErrorKind::InsufficientPlayers => {
            HttpResponse::BadRequest().json(body)
        }
        ErrorKind::NotFound => HttpResponse::NotFound().json(body),
        ErrorKind::InvalidState => HttpResponse::Conflict().json(body),
        ErrorKind::Store => {
            log::error!("{}", e);
            HttpResponse::InternalServerError().json(body)
        }
    }
}

fn respond<T: serde::Serialize>(result: Result<T, QueueError>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => error_response(&e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "pickup-queue-web",
    })
}

/// Start a session. Every config field is optional; an empty body means all defaults.
#[post("/api/sessions")]
async fn api_start_session(state: AppState, body: Option<Json<SessionConfig>>) -> HttpResponse {
    let config = body.map(Json::into_inner).unwrap_or_default();
    respond(state.start_session(config))
}

/// End a session and drop its queue.
#[delete("/api/sessions/{id}")]
async fn api_end_session(state: AppState, path: Path<SessionPath>) -> HttpResponse {
    match state.end_session(path.id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(&e),
    }
}

/// Register a player (not yet checked in anywhere).
#[post("/api/players")]
async fn api_register_player(state: AppState, body: Json<RegisterPlayerBody>) -> HttpResponse {
    respond(state.register_player(&body.name, body.birth_year, body.auto_rejoin))
}

/// Check a registered player into the session's queue.
#[post("/api/sessions/{id}/check-ins")]
async fn api_check_in(state: AppState, path: Path<SessionPath>, body: Json<CheckInBody>) -> HttpResponse {
    respond(state.check_in(path.id, body.player_id).await)
}

/// Current teams, next-up list and court. Read-only.
#[get("/api/sessions/{id}/snapshot")]
async fn api_snapshot(state: AppState, path: Path<SessionPath>) -> HttpResponse {
    respond(state.snapshot(path.id).await)
}

/// Populate the next game and save the resulting layout.
#[post("/api/sessions/{id}/populate")]
async fn api_populate(state: AppState, path: Path<SessionPath>) -> HttpResponse {
    respond(state.populate_game(path.id).await)
}

/// Move a player: `{ "playerId": 7, "moveType": "BUMP" }`. A rejected move is still 200
/// with `success: false` and the unchanged snapshot.
#[post("/api/sessions/{id}/moves")]
async fn api_move(state: AppState, path: Path<SessionPath>, body: Json<MoveCommand>) -> HttpResponse {
    respond(state.apply_move(path.id, body.into_inner()).await)
}

/// Start a game from the current snapshot.
#[post("/api/sessions/{id}/games")]
async fn api_start_game(state: AppState, path: Path<SessionPath>) -> HttpResponse {
    respond(state.start_game(path.id).await)
}

/// Submit a final score and promote a team.
#[post("/api/games/{id}/result")]
async fn api_game_result(state: AppState, path: Path<GamePath>, body: Json<GameResultBody>) -> HttpResponse {
    respond(
        state
            .resolve_promotion(path.id, body.team1_score, body.team2_score)
            .await,
    )
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(QueueService::new(MemoryStore::new()));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_start_session)
            .service(api_end_session)
            .service(api_register_player)
            .service(api_check_in)
            .service(api_snapshot)
            .service(api_populate)
            .service(api_move)
            .service(api_start_game)
            .service(api_game_result)
    })
    .bind(bind)?
    .run()
    .await
}
