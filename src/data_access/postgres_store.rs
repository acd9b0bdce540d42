//! `TaskStore` over a Postgres connection pool.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{
    postgres::{PgArguments, PgPoolOptions, PgRow},
    query::Query,
    PgPool, Postgres, Row,
};
#[cfg(feature = "profile")]
use std::time::Instant;
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::data_access::schema;
use crate::{
    health_response::DatabaseInfo,
    settings::Settings,
    task::{NewTask, TaskPatch, TaskRow},
    task_id::{KeyType, TaskId},
    task_priority::TaskPriority,
    task_stats::TaskStats,
    task_status::TaskStatus,
    StoreError, TaskStore,
};

const COLUMNS: &str =
    "id, title, description, priority, status, assigned_to, due_date, tags, subtasks, created_at, updated_at";

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
    key_type: KeyType,
    schema_ready: Arc<OnceCell<()>>,
}

impl PostgresStore {
    pub fn new(pool: PgPool, key_type: KeyType) -> Self {
        Self {
            pool,
            key_type,
            schema_ready: Arc::new(OnceCell::new()),
        }
    }

    /// Build a lazily-connecting pool from settings. No connection is made
    /// until the first query.
    pub fn connect_lazy(settings: &Settings) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(settings.acquire_timeout_seconds))
            .connect_lazy(&settings.database_url)?;
        Ok(Self::new(pool, settings.key_type))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn decode_row(&self, row: &PgRow) -> Result<TaskRow, StoreError> {
        let id = match self.key_type {
            KeyType::Serial => TaskId::Serial(row.try_get::<i32, _>("id")?),
            KeyType::Uuid => TaskId::Uuid(row.try_get::<Uuid, _>("id")?),
        };

        let priority = match row.try_get::<Option<String>, _>("priority")? {
            Some(raw) => raw
                .parse::<TaskPriority>()
                .map_err(|value| StoreError::Decode(format!("priority '{value}'")))?,
            None => TaskPriority::default(),
        };
        let status = match row.try_get::<Option<String>, _>("status")? {
            Some(raw) => raw
                .parse::<TaskStatus>()
                .map_err(|value| StoreError::Decode(format!("status '{value}'")))?,
            None => TaskStatus::default(),
        };

        Ok(TaskRow {
            id,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            priority,
            status,
            assigned_to: row.try_get("assigned_to")?,
            due_date: row.try_get("due_date")?,
            tags: row.try_get("tags")?,
            subtasks: row
                .try_get::<Option<serde_json::Value>, _>("subtasks")?
                .unwrap_or(serde_json::Value::Null),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    async fn fetch_optional(
        &self,
        query: Query<'_, Postgres, PgArguments>,
    ) -> Result<Option<TaskRow>, StoreError> {
        #[cfg(feature = "profile")]
        let start = Instant::now();
        let row = query.fetch_optional(&self.pool).await?;
        #[cfg(feature = "profile")]
        tracing::debug!(elapsed_us = start.elapsed().as_micros() as u64, "task query finished");
        row.map(|row| self.decode_row(&row)).transpose()
    }
}

fn bind_id<'q>(query: Query<'q, Postgres, PgArguments>, id: TaskId) -> Query<'q, Postgres, PgArguments> {
    match id {
        TaskId::Serial(n) => query.bind(n),
        TaskId::Uuid(u) => query.bind(u),
    }
}

fn subtasks_json<T: serde::Serialize>(subtasks: &T) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(subtasks).map_err(|e| StoreError::Decode(e.to_string()))
}

#[async_trait]
impl TaskStore for PostgresStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        self.schema_ready
            .get_or_try_init(|| schema::ensure_schema(&self.pool, self.key_type))
            .await
            .map(|_| ())
    }

    async fn list_all(&self) -> Result<Vec<TaskRow>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM {} ORDER BY created_at DESC", schema::TASKS_TABLE);
        #[cfg(feature = "profile")]
        let start = Instant::now();
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        #[cfg(feature = "profile")]
        tracing::debug!(elapsed_us = start.elapsed().as_micros() as u64, rows = rows.len(), "listed tasks");
        rows.iter().map(|row| self.decode_row(row)).collect()
    }

    async fn get(&self, id: TaskId) -> Result<Option<TaskRow>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM {} WHERE id = $1", schema::TASKS_TABLE);
        self.fetch_optional(bind_id(sqlx::query(&sql), id)).await
    }

    async fn create(&self, task: NewTask) -> Result<TaskRow, StoreError> {
        let sql = format!(
            "INSERT INTO {} (title, description, priority, status, assigned_to, due_date, tags, subtasks)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}",
            schema::TASKS_TABLE
        );
        let query = sqlx::query(&sql)
            .bind(task.title)
            .bind(task.description)
            .bind(task.priority.as_str())
            .bind(task.status.as_str())
            .bind(task.assigned_to)
            .bind(task.due_date)
            .bind(task.tags)
            .bind(subtasks_json(&task.subtasks)?);

        self.fetch_optional(query)
            .await?
            .ok_or_else(|| StoreError::Query("insert returned no row".to_string()))
    }

    async fn update(&self, id: TaskId, patch: TaskPatch) -> Result<Option<TaskRow>, StoreError> {
        // COALESCE keeps the stored value for anything the patch leaves out;
        // the boolean flags turn an explicit clear into NULL.
        let sql = format!(
            "UPDATE {}
             SET title = COALESCE($1, title),
                 description = CASE WHEN $2 THEN NULL ELSE COALESCE($3, description) END,
                 priority = COALESCE($4, priority),
                 status = COALESCE($5, status),
                 assigned_to = CASE WHEN $6 THEN NULL ELSE COALESCE($7, assigned_to) END,
                 due_date = CASE WHEN $8 THEN NULL ELSE COALESCE($9, due_date) END,
                 tags = CASE WHEN $10 THEN NULL ELSE COALESCE($11, tags) END,
                 subtasks = COALESCE($12, subtasks),
                 updated_at = CURRENT_TIMESTAMP
             WHERE id = $13
             RETURNING {COLUMNS}",
            schema::TASKS_TABLE
        );
        let subtasks = patch.subtasks.as_ref().map(subtasks_json).transpose()?;

        let query = sqlx::query(&sql)
            .bind(patch.title.as_deref())
            .bind(patch.description.is_clear())
            .bind(patch.description.value().map(String::as_str))
            .bind(patch.priority.map(|p| p.as_str()))
            .bind(patch.status.map(|s| s.as_str()))
            .bind(patch.assigned_to.is_clear())
            .bind(patch.assigned_to.value().map(String::as_str))
            .bind(patch.due_date.is_clear())
            .bind(patch.due_date.value().copied())
            .bind(patch.tags.is_clear())
            .bind(patch.tags.value().map(String::as_str))
            .bind(subtasks);

        self.fetch_optional(bind_id(query, id)).await
    }

    async fn delete(&self, id: TaskId) -> Result<Option<TaskRow>, StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = $1 RETURNING {COLUMNS}", schema::TASKS_TABLE);
        self.fetch_optional(bind_id(sqlx::query(&sql), id)).await
    }

    async fn stats(&self, today: NaiveDate) -> Result<TaskStats, StoreError> {
        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", schema::TASKS_TABLE))
            .fetch_one(&self.pool)
            .await?;

        let by_status: Vec<(Option<String>, i64)> = sqlx::query_as(&format!(
            "SELECT status, COUNT(*) FROM {} GROUP BY status",
            schema::TASKS_TABLE
        ))
        .fetch_all(&self.pool)
        .await?;

        let overdue: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {} WHERE due_date < $1 AND status != $2",
            schema::TASKS_TABLE
        ))
        .bind(today)
        .bind(TaskStatus::Completed.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(TaskStats {
            total,
            by_status: by_status
                .into_iter()
                .filter_map(|(status, count)| status.map(|s| (s, count)))
                .collect(),
            overdue,
        })
    }

    async fn health(&self) -> Result<DatabaseInfo, StoreError> {
        let (time, version): (String, String) =
            sqlx::query_as("SELECT NOW()::text, version()").fetch_one(&self.pool).await?;
        Ok(DatabaseInfo {
            time,
            // "PostgreSQL 16.2 on x86_64-pc-linux-gnu, compiled by ..."
            version: version.split(',').next().unwrap_or_default().to_string(),
        })
    }
}
