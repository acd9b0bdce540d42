//! Error type returned by every handler.
//!
//! Each variant maps to one HTTP status and renders an [`ErrorResponse`]
//! body. Raw store text only ever appears in `details`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::{
    error_response::ErrorResponse, shared::validation::ValidationError, task_priority::TaskPriority,
    task_status::TaskStatus, StoreError,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The request body was not valid JSON for the endpoint.
    #[error("invalid request body: {0}")]
    BadRequest(String),

    #[error("task {id} not found")]
    NotFound { id: String },

    /// The database refused a status or priority the validator let through.
    #[error("constraint violation: {details}")]
    ConstraintViolation { details: String },

    #[error("{action}: {source}")]
    Store {
        action: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    pub fn not_found(id: impl Into<String>) -> Self {
        ApiError::NotFound { id: id.into() }
    }

    /// `map_err` adapter naming the operation that failed.
    pub fn store(action: &'static str) -> impl FnOnce(StoreError) -> ApiError {
        move |source| match source {
            StoreError::CheckViolation(details) => ApiError::ConstraintViolation { details },
            source => ApiError::Store { action, source },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) | ApiError::ConstraintViolation { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(self) -> ErrorResponse {
        match self {
            ApiError::Validation(err) => ErrorResponse {
                error: err.message,
                code: Some("VALIDATION_ERROR".to_string()),
                allowed_values: err.allowed_values,
                ..ErrorResponse::default()
            },
            ApiError::BadRequest(details) => ErrorResponse {
                error: "Invalid JSON body".to_string(),
                details: Some(details),
                code: Some("VALIDATION_ERROR".to_string()),
                ..ErrorResponse::default()
            },
            ApiError::NotFound { id } => ErrorResponse {
                error: "Task not found".to_string(),
                code: Some("NOT_FOUND".to_string()),
                task_id: Some(id),
                ..ErrorResponse::default()
            },
            ApiError::ConstraintViolation { details } => ErrorResponse {
                error: "Invalid status or priority value".to_string(),
                details: Some(details),
                code: Some("CONSTRAINT_VIOLATION".to_string()),
                hint: Some(format!(
                    "Status must be one of: {}. Priority must be one of: {}",
                    TaskStatus::allowed_values().join(", "),
                    TaskPriority::allowed_values().join(", ")
                )),
                allowed_values: Some(
                    TaskStatus::allowed_values()
                        .into_iter()
                        .chain(TaskPriority::allowed_values())
                        .collect(),
                ),
                ..ErrorResponse::default()
            },
            ApiError::Store { action, source } => {
                let error = match source {
                    StoreError::MissingSchema(_) => "Database table does not exist",
                    StoreError::Authentication(_) | StoreError::Unavailable(_) => "Database connection failed",
                    _ => action,
                };
                ErrorResponse {
                    error: error.to_string(),
                    code: Some(source.code().to_string()),
                    hint: source.hint().map(str::to_string),
                    details: Some(source.to_string()),
                    ..ErrorResponse::default()
                }
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }
        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_bad_requests() {
        let err = ApiError::from(ValidationError::new("Title cannot be empty"));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let body = err.body();
        assert_eq!(body.error, "Title cannot be empty");
        assert_eq!(body.code.as_deref(), Some("VALIDATION_ERROR"));
        assert_eq!(body.details, None);
    }

    #[test]
    fn not_found_echoes_the_id() {
        let body = serde_json::to_value(ApiError::not_found("abc").body()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "error": "Task not found", "code": "NOT_FOUND", "taskId": "abc" })
        );
    }

    #[test]
    fn check_violations_become_client_errors() {
        let err = ApiError::store("Failed to create task")(StoreError::CheckViolation(
            "tasks_status_check".into(),
        ));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let body = err.body();
        assert_eq!(body.code.as_deref(), Some("CONSTRAINT_VIOLATION"));
        assert!(body.hint.unwrap().starts_with("Status must be one of: To Do"));
        assert!(body.allowed_values.unwrap().contains(&"Medium"));
    }

    #[test]
    fn missing_schema_carries_a_hint() {
        let err = ApiError::store("Failed to fetch tasks")(StoreError::MissingSchema(
            "relation \"tasks\" does not exist".into(),
        ));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = err.body();
        assert_eq!(body.error, "Database table does not exist");
        assert_eq!(body.code.as_deref(), Some("SCHEMA_MISSING"));
        assert!(body.hint.is_some());
        assert!(body.details.unwrap().contains("does not exist"));
    }

    #[test]
    fn other_store_errors_name_the_operation() {
        let body = ApiError::store("Failed to delete task")(StoreError::Query("boom".into())).body();
        assert_eq!(body.error, "Failed to delete task");
        assert_eq!(body.code.as_deref(), Some("QUERY_FAILED"));
        assert_eq!(body.hint, None);
    }
}
