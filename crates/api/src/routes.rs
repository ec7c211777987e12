use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use geo::Coordinate;
use runtime::{live::Fix, EngineSnapshot, LogEntry, SettingsPatch};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, state::AppState, ws};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/sim/state", get(sim_state))
        .route("/sim/log", get(sim_log))
        .route("/sim/start", post(start_run))
        .route("/sim/stop", post(stop_run))
        .route("/sim/reset", post(reset_run))
        .route("/sim/settings", put(update_settings))
        .route("/feed/fix", post(push_fix))
        .route("/feed/error", post(push_feed_error))
        .route("/ws/events", get(ws::events_socket))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct LogResponse {
    entries: Vec<LogEntry>,
}

#[derive(Debug, Deserialize)]
struct FixRequest {
    lat: f64,
    lng: f64,
    #[serde(default)]
    accuracy_m: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct FeedErrorRequest {
    message: String,
}

#[derive(Debug, Serialize)]
struct FeedAccepted {
    delivered: usize,
}

async fn sim_state(State(state): State<AppState>) -> Json<EngineSnapshot> {
    Json(state.controller().snapshot().await)
}

async fn sim_log(State(state): State<AppState>) -> Json<LogResponse> {
    Json(LogResponse {
        entries: state.controller().log_entries().await,
    })
}

async fn start_run(State(state): State<AppState>) -> Result<Json<EngineSnapshot>, ApiError> {
    let ticket = state.controller().start().await?;
    tracing::info!(epoch = ticket.epoch, source = ?ticket.source, "run started via api");

    Ok(Json(state.controller().snapshot().await))
}

async fn stop_run(State(state): State<AppState>) -> Json<EngineSnapshot> {
    Json(state.controller().stop().await)
}

async fn reset_run(State(state): State<AppState>) -> Json<EngineSnapshot> {
    Json(state.controller().reset().await)
}

async fn update_settings(
    State(state): State<AppState>,
    Json(patch): Json<SettingsPatch>,
) -> Result<Json<EngineSnapshot>, ApiError> {
    Ok(Json(state.controller().apply_settings(patch).await?))
}

async fn push_fix(
    State(state): State<AppState>,
    Json(request): Json<FixRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let location = state.location().ok_or(ApiError::LiveFeedUnavailable)?;
    let mut fix = Fix::now(Coordinate::new(request.lat, request.lng));
    fix.accuracy_m = request.accuracy_m;
    let delivered = location.publish_fix(fix);

    Ok((StatusCode::ACCEPTED, Json(FeedAccepted { delivered })))
}

async fn push_feed_error(
    State(state): State<AppState>,
    Json(request): Json<FeedErrorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let location = state.location().ok_or(ApiError::LiveFeedUnavailable)?;
    let delivered = location.publish_error(request.message);

    Ok((StatusCode::ACCEPTED, Json(FeedAccepted { delivered })))
}
