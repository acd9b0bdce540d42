use axum::{routing::get, Router};

use crate::app_state::SharedState;
use super::super::controllers::health_controller::HealthController;

pub const ROUTER_PATH: &str = "/health";

pub fn get_router(app_state: SharedState) -> Router {
    Router::new()
        .route("/api", get(HealthController::info))
        .route(ROUTER_PATH, get(HealthController::get))
        .route(format!("{}/db", ROUTER_PATH).as_str(), get(HealthController::database))
        .with_state(app_state)
}
