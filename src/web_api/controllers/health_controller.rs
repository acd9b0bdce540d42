use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;

use crate::{
    app_state::SharedState,
    error_response::ErrorResponse,
    health_response::{ApiInfoResponse, DatabaseHealthResponse, HealthResponse},
};

pub struct HealthController {}

impl HealthController {
    pub async fn get() -> Json<HealthResponse> {
        Json(HealthResponse {
            status: "OK",
            message: "Server is running",
            timestamp: Utc::now(),
        })
    }

    pub async fn database(State(state): State<SharedState>) -> impl IntoResponse {
        match state.store.health().await {
            Ok(database) => (
                StatusCode::OK,
                Json(DatabaseHealthResponse {
                    status: "OK",
                    message: "Database connection successful",
                    database,
                }),
            )
                .into_response(),
            Err(e) => {
                tracing::error!(error = %e, "database health check failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "Database connection failed".to_string(),
                        details: Some(e.to_string()),
                        code: Some(e.code().to_string()),
                        hint: e.hint().map(str::to_string),
                        ..ErrorResponse::default()
                    }),
                )
                    .into_response()
            }
        }
    }

    pub async fn info() -> Json<ApiInfoResponse> {
        Json(ApiInfoResponse {
            status: "OK",
            message: "Task Management API is running",
            version: env!("CARGO_PKG_VERSION"),
            endpoints: vec![
                "GET /tasks",
                "GET /tasks/:id",
                "POST /tasks",
                "PUT /tasks/:id",
                "DELETE /tasks/:id",
                "GET /tasks/stats/summary",
                "GET /health",
                "GET /health/db",
                "GET /api",
            ],
        })
    }
}
