use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::{
    DeliveryFeeError,
    app::AppState,
    delivery::FeeQuote,
    models::ObservationRecord,
    scheduler::{CycleOutcome, RefreshState},
};

type ApiError = (StatusCode, String);

#[derive(Debug, Deserialize)]
pub struct FeeParams {
    pub location: String,
    pub vehicle: String,
}

#[derive(Debug, Deserialize)]
pub struct LocationParams {
    pub location: String,
}

#[derive(Debug, Deserialize)]
pub struct SchedulerParams {
    #[serde(default)]
    pub start: bool,
}

#[derive(Debug, Serialize)]
pub struct SchedulerStatus {
    pub running: bool,
    pub state: RefreshState,
    pub completed_cycles: u64,
    pub last_outcome: Option<CycleOutcome>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/delivery/fee", get(get_fee))
        .route("/delivery/quote", get(get_quote))
        .route("/weatherdata/latest", get(get_latest_observation))
        .route("/weatherdata/scheduler", get(get_scheduler).post(post_scheduler))
        .route("/weatherdata/refresh", post(post_refresh))
        .with_state(state)
}

fn error_response(err: DeliveryFeeError) -> ApiError {
    if err.is_not_found() {
        (StatusCode::NOT_FOUND, err.user_message())
    } else {
        tracing::error!("Request failed: {}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, err.user_message())
    }
}

fn scheduler_status(state: &AppState) -> SchedulerStatus {
    SchedulerStatus {
        running: state.scheduler.is_running(),
        state: state.scheduler.state(),
        completed_cycles: state.scheduler.completed_cycles(),
        last_outcome: state.scheduler.last_outcome(),
    }
}

async fn get_fee(
    State(state): State<AppState>,
    Query(params): Query<FeeParams>,
) -> Result<String, ApiError> {
    state
        .service
        .quote(&params.vehicle, &params.location)
        .map(|quote| quote.to_string())
        .map_err(error_response)
}

async fn get_quote(
    State(state): State<AppState>,
    Query(params): Query<FeeParams>,
) -> Result<Json<FeeQuote>, ApiError> {
    state
        .service
        .quote(&params.vehicle, &params.location)
        .map(Json)
        .map_err(error_response)
}

async fn get_latest_observation(
    State(state): State<AppState>,
    Query(params): Query<LocationParams>,
) -> Result<Json<ObservationRecord>, ApiError> {
    state
        .store
        .latest_for(&params.location)
        .map(|observation| Json(observation.to_record()))
        .map_err(error_response)
}

async fn get_scheduler(State(state): State<AppState>) -> Json<SchedulerStatus> {
    Json(scheduler_status(&state))
}

async fn post_scheduler(
    State(state): State<AppState>,
    Query(params): Query<SchedulerParams>,
) -> (StatusCode, Json<SchedulerStatus>) {
    let status = if params.start && state.scheduler.start().is_some() {
        StatusCode::ACCEPTED
    } else {
        StatusCode::OK
    };
    (status, Json(scheduler_status(&state)))
}

async fn post_refresh(State(state): State<AppState>) -> Json<CycleOutcome> {
    Json(state.scheduler.refresh_now().await)
}
