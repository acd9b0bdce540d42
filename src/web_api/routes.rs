pub mod health_routes;
pub mod task_routes;

use std::path::Path;

use axum::Router;
use tower_http::services::ServeDir;

use crate::app_state::SharedState;

pub fn map_routes(app_state: SharedState) -> Router {
    Router::new()
        .merge(task_routes::get_router(app_state.clone()))
        .merge(health_routes::get_router(app_state))
}

/// Hand every unmatched path, `/` included, to the dashboard build in `dir`.
pub fn with_static_fallback(router: Router, dir: impl AsRef<Path>) -> Router {
    router.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true))
}
