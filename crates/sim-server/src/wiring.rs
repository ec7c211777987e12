use std::sync::Arc;

use api::AppState;
use axum::{routing::get, Router};
use core_sim::CorridorLayout;
use runtime::{
    live::{LocationService, PushLocationService, UnsupportedLocationService},
    notify::HttpNotifier,
    SimController, SimEngine,
};

use crate::config::{Config, LocationMode};

pub fn build_state(config: &Config) -> AppState {
    let engine = SimEngine::new(CorridorLayout::default(), config.engine_settings());
    let push = match config.location {
        LocationMode::Push => Some(Arc::new(PushLocationService::new())),
        LocationMode::None => None,
    };
    let location: Arc<dyn LocationService> = match &push {
        Some(push) => push.clone(),
        None => Arc::new(UnsupportedLocationService),
    };

    let controller = SimController::new(engine, location, Arc::new(HttpNotifier::new()));
    AppState::new(controller, push)
}

pub fn build_app(state: AppState) -> Router {
    api::app(state).route("/health", get(healthcheck))
}

async fn healthcheck() -> &'static str {
    "ok"
}
