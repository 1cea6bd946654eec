use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::Config;
use crate::decision::{Decision, ScoreAverages, TimelinePoint};
use crate::error::GameError;
use crate::game::{DecisionOutcome, GameSetup};
use crate::metrics::MetricVector;
use crate::report::{attach_analysis, LlmClient, PerformanceReport};
use crate::scenario::{Department, HotelType, Scenario, ScenarioDraft};
use crate::service::{BaselineView, GameService, GameView};
use crate::store::SqliteStore;

#[derive(Clone)]
struct ApiState {
    config: Config,
    db_path: PathBuf,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    ok: bool,
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<GameError> for ApiError {
    fn from(error: GameError) -> Self {
        let status = match &error {
            GameError::NotFound { .. } => StatusCode::NOT_FOUND,
            GameError::MissingSetup(_) | GameError::Validation(_) => StatusCode::BAD_REQUEST,
            GameError::InvalidState(_) => StatusCode::CONFLICT,
            GameError::Store(_)
            | GameError::Serialization(_)
            | GameError::Llm(_)
            | GameError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiErrorBody {
            ok: false,
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<ApiResponse<T>>, ApiError>;

#[derive(Debug, Clone, Deserialize)]
struct NewGameRequest {
    player_id: String,
    hotel_type: String,
    role: String,
}

#[derive(Debug, Clone, Deserialize)]
struct DecisionRequest {
    scenario_id: String,
    option_index: usize,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct ReportRequest {
    #[serde(default)]
    use_llm: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct ScenarioQuery {
    department: Option<String>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct HistoryResponse {
    decisions: Vec<Decision>,
}

#[derive(Debug, Serialize)]
struct TimelineResponse {
    points: Vec<TimelinePoint>,
}

#[derive(Debug, Serialize)]
struct ScenariosResponse {
    scenarios: Vec<Scenario>,
}

pub fn router(config: Config) -> Router {
    let state = ApiState {
        db_path: config.resolved_db_path(),
        config,
    };

    Router::new()
        .route("/health", get(health))
        .route("/v1/config", get(show_config))
        .route("/v1/games", post(create_game))
        .route("/v1/games/:id", get(get_game))
        .route("/v1/games/:id/decisions", post(submit_decision).get(list_decisions))
        .route("/v1/games/:id/refresh", post(refresh_game))
        .route("/v1/games/:id/timeline", get(timeline))
        .route("/v1/games/:id/averages", get(averages))
        .route("/v1/games/:id/report", post(report))
        .route("/v1/scenarios", get(list_scenarios).post(create_scenario))
        .route("/v1/hotels/:hotel_type", get(get_baseline).put(put_baseline))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run_server(config: Config, bind: SocketAddr) -> Result<()> {
    let app = router(config);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("REST API listening on http://{bind}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<ApiResponse<HealthResponse>> {
    ok(HealthResponse { status: "ok" })
}

async fn show_config(State(state): State<ApiState>) -> Json<ApiResponse<Config>> {
    let mut config = state.config;
    if !config.llm.api_key.is_empty() {
        config.llm.api_key = "***".to_string();
    }
    ok(config)
}

async fn create_game(
    State(state): State<ApiState>,
    Json(request): Json<NewGameRequest>,
) -> ApiResult<GameView> {
    let setup = parse_setup(&request.hotel_type, &request.role)?;
    let service = open_service(&state)?;
    let mut rng = StdRng::from_entropy();
    Ok(ok(service.new_game(&request.player_id, setup, &mut rng)?))
}

async fn get_game(State(state): State<ApiState>, Path(id): Path<String>) -> ApiResult<GameView> {
    Ok(ok(open_service(&state)?.view(&id)?))
}

async fn submit_decision(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(request): Json<DecisionRequest>,
) -> ApiResult<DecisionOutcome> {
    let service = open_service(&state)?;
    let mut rng = StdRng::from_entropy();
    let outcome = service.submit(&id, &request.scenario_id, request.option_index, &mut rng)?;
    Ok(ok(outcome))
}

async fn refresh_game(State(state): State<ApiState>, Path(id): Path<String>) -> ApiResult<GameView> {
    let service = open_service(&state)?;
    let mut rng = StdRng::from_entropy();
    Ok(ok(service.refresh(&id, &mut rng)?))
}

async fn list_decisions(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<HistoryResponse> {
    let decisions = open_service(&state)?.history(&id)?;
    Ok(ok(HistoryResponse { decisions }))
}

async fn timeline(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<TimelineResponse> {
    let points = open_service(&state)?.timeline(&id)?;
    Ok(ok(TimelineResponse { points }))
}

async fn averages(State(state): State<ApiState>, Path(id): Path<String>) -> ApiResult<ScoreAverages> {
    Ok(ok(open_service(&state)?.averages(&id)?))
}

async fn report(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(request): Json<ReportRequest>,
) -> ApiResult<PerformanceReport> {
    // the store connection is not Send; finish with it before awaiting the model
    let mut report = {
        let service = open_service(&state)?;
        service.report(&id)?
    };
    if request.use_llm.unwrap_or(state.config.llm.enabled) {
        match LlmClient::from_config(&state.config.llm) {
            Ok(client) => attach_analysis(&mut report, &client).await,
            Err(err) => report.analysis_error = Some(format!("{err:#}")),
        }
    }
    Ok(ok(report))
}

async fn list_scenarios(
    State(state): State<ApiState>,
    Query(query): Query<ScenarioQuery>,
) -> ApiResult<ScenariosResponse> {
    let department = query
        .department
        .as_deref()
        .map(Department::from_str)
        .transpose()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    let scenarios = open_service(&state)?.list_scenarios(department)?;
    Ok(ok(ScenariosResponse { scenarios }))
}

async fn create_scenario(
    State(state): State<ApiState>,
    Json(draft): Json<ScenarioDraft>,
) -> ApiResult<Scenario> {
    Ok(ok(open_service(&state)?.add_scenario(draft)?))
}

async fn get_baseline(
    State(state): State<ApiState>,
    Path(hotel_type): Path<String>,
) -> ApiResult<BaselineView> {
    let hotel_type = parse_hotel(&hotel_type)?;
    Ok(ok(open_service(&state)?.baseline(hotel_type)?))
}

async fn put_baseline(
    State(state): State<ApiState>,
    Path(hotel_type): Path<String>,
    Json(metrics): Json<MetricVector>,
) -> ApiResult<BaselineView> {
    let hotel_type = parse_hotel(&hotel_type)?;
    Ok(ok(open_service(&state)?.set_baseline(hotel_type, metrics)?))
}

fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse { ok: true, data })
}

fn open_service(state: &ApiState) -> std::result::Result<GameService<SqliteStore>, ApiError> {
    let store = SqliteStore::open(&state.db_path)?;
    Ok(GameService::new(store, state.config.rules()))
}

fn parse_hotel(raw: &str) -> std::result::Result<HotelType, ApiError> {
    HotelType::from_str(raw).map_err(|e| ApiError::bad_request(e.to_string()))
}

fn parse_setup(hotel_type: &str, role: &str) -> std::result::Result<GameSetup, ApiError> {
    let hotel_type = parse_hotel(hotel_type)?;
    let role = Department::from_str(role).map_err(|e| ApiError::bad_request(e.to_string()))?;
    if !role.is_playable_role() {
        return Err(ApiError::bad_request(format!("{role} is not a playable role")));
    }
    Ok(GameSetup { hotel_type, role })
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::{parse_setup, ApiError};
    use crate::error::GameError;
    use crate::scenario::{Department, HotelType};

    #[test]
    fn parses_setup_aliases() {
        let setup = parse_setup("5_star", "customer_relations").expect("setup");
        assert_eq!(setup.hotel_type, HotelType::FiveStar);
        assert_eq!(setup.role, Department::CustomerRelations);
    }

    #[test]
    fn rejects_authoring_only_role() {
        let err = parse_setup("resort", "sustainability").expect_err("not playable");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(parse_setup("motel", "hr").is_err());
    }

    #[test]
    fn maps_error_taxonomy_to_status_codes() {
        let cases = [
            (GameError::not_found("game", "g1"), StatusCode::NOT_FOUND),
            (GameError::MissingSetup("x".to_string()), StatusCode::BAD_REQUEST),
            (GameError::Validation("x".to_string()), StatusCode::BAD_REQUEST),
            (GameError::invalid_state("over"), StatusCode::CONFLICT),
            (GameError::Llm("down".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(ApiError::from(error).status, status);
        }
    }
}
