use axum::{routing::get, Router};

use crate::{app_state::SharedState, task_controller::TaskController};

pub const ROUTER_PATH: &str = "/tasks";

pub fn get_router(app_state: SharedState) -> Router {
    Router::new()
        .route(ROUTER_PATH, get(TaskController::get_all).post(TaskController::add))
        // Registered before `/:id`; the static segment wins either way.
        .route(format!("{}/stats/summary", ROUTER_PATH).as_str(), get(TaskController::stats))
        .route(
            format!("{}/:id", ROUTER_PATH).as_str(),
            get(TaskController::get)
                .put(TaskController::edit)
                .delete(TaskController::delete),
        )
        .with_state(app_state)
}
