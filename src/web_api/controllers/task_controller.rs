use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::{
    app_state::SharedState,
    create_task_request::CreateTaskRequest,
    delete_task_response::DeleteTaskResponse,
    task::Task,
    task_id::TaskId,
    task_stats::TaskStats,
    update_task_request::UpdateTaskRequest,
    ApiError,
};

pub struct TaskController {}

impl TaskController {
    pub async fn get_all(State(state): State<SharedState>) -> Result<Json<Vec<Task>>, ApiError> {
        let rows = state
            .store
            .list_all()
            .await
            .map_err(ApiError::store("Failed to fetch tasks"))?;
        tracing::debug!(count = rows.len(), "listed tasks");
        Ok(Json(rows.into_iter().map(Task::from).collect()))
    }

    pub async fn get(
        State(state): State<SharedState>,
        Path(raw_id): Path<String>,
    ) -> Result<Json<Task>, ApiError> {
        let id = parse_id(&state, &raw_id)?;
        match state.store.get(id).await.map_err(ApiError::store("Failed to fetch task"))? {
            Some(row) => Ok(Json(row.into())),
            None => Err(ApiError::not_found(raw_id)),
        }
    }

    pub async fn add(
        State(state): State<SharedState>,
        body: Result<Json<CreateTaskRequest>, JsonRejection>,
    ) -> Result<(StatusCode, Json<Task>), ApiError> {
        let Json(body) = body?;
        let new_task = body.into_new_task(Utc::now().timestamp_millis())?;

        let row = state
            .store
            .create(new_task)
            .await
            .map_err(ApiError::store("Failed to create task"))?;
        tracing::info!(id = %row.id, title = %row.title, "task created");
        Ok((StatusCode::CREATED, Json(row.into())))
    }

    pub async fn edit(
        State(state): State<SharedState>,
        Path(raw_id): Path<String>,
        body: Result<Json<UpdateTaskRequest>, JsonRejection>,
    ) -> Result<Json<Task>, ApiError> {
        let Json(body) = body?;
        let patch = body.into_patch(Utc::now().timestamp_millis())?;
        let id = parse_id(&state, &raw_id)?;

        match state
            .store
            .update(id, patch)
            .await
            .map_err(ApiError::store("Failed to update task"))?
        {
            Some(row) => {
                tracing::info!(%id, "task updated");
                Ok(Json(row.into()))
            }
            None => {
                tracing::warn!(%id, "update for unknown task");
                Err(ApiError::not_found(raw_id))
            }
        }
    }

    pub async fn delete(
        State(state): State<SharedState>,
        Path(raw_id): Path<String>,
    ) -> Result<Json<DeleteTaskResponse>, ApiError> {
        let id = parse_id(&state, &raw_id)?;
        match state
            .store
            .delete(id)
            .await
            .map_err(ApiError::store("Failed to delete task"))?
        {
            Some(row) => {
                tracing::info!(%id, "task deleted");
                Ok(Json(DeleteTaskResponse::new(row.into())))
            }
            None => Err(ApiError::not_found(raw_id)),
        }
    }

    pub async fn stats(State(state): State<SharedState>) -> Result<Json<TaskStats>, ApiError> {
        let today = Utc::now().date_naive();
        let stats = state
            .store
            .stats(today)
            .await
            .map_err(ApiError::store("Failed to fetch statistics"))?;
        Ok(Json(stats))
    }
}

/// An id that cannot exist under the configured key type is simply not found.
fn parse_id(state: &SharedState, raw_id: &str) -> Result<TaskId, ApiError> {
    TaskId::parse(raw_id, state.key_type).ok_or_else(|| {
        tracing::debug!(raw_id, key_type = ?state.key_type, "unparseable task id");
        ApiError::not_found(raw_id)
    })
}
