//! The persistence seam. Controllers only ever talk to `dyn TaskStore`.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::{
    health_response::DatabaseInfo,
    task::{NewTask, TaskPatch, TaskRow},
    task_id::TaskId,
    task_stats::TaskStats,
};

// SQLSTATE codes we translate into something actionable.
const UNDEFINED_TABLE: &str = "42P01";
const UNDEFINED_COLUMN: &str = "42703";
const INVALID_PASSWORD: &str = "28P01";
const INVALID_CATALOG_NAME: &str = "3D000";
const CHECK_VIOLATION: &str = "23514";

#[derive(Debug, Error)]
pub enum StoreError {
    /// The `tasks` table (or one of its columns) is missing.
    #[error("database schema is missing: {0}")]
    MissingSchema(String),

    #[error("database authentication failed: {0}")]
    Authentication(String),

    /// The database could not be reached, or does not exist.
    #[error("database unavailable: {0}")]
    Unavailable(String),

    /// A write was rejected by a check constraint.
    #[error("check constraint violated: {0}")]
    CheckViolation(String),

    #[error("unexpected stored value: {0}")]
    Decode(String),

    #[error("database query failed: {0}")]
    Query(String),
}

impl StoreError {
    /// Machine-readable classification for error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::MissingSchema(_) => "SCHEMA_MISSING",
            StoreError::Authentication(_) => "AUTHENTICATION_FAILED",
            StoreError::Unavailable(_) => "DATABASE_UNAVAILABLE",
            StoreError::CheckViolation(_) => "CONSTRAINT_VIOLATION",
            StoreError::Decode(_) => "DECODE_ERROR",
            StoreError::Query(_) => "QUERY_FAILED",
        }
    }

    /// What an operator should do about it, when there is something to do.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            StoreError::MissingSchema(_) => {
                Some("Run schema initialization: restart the server so it can create the tasks table")
            }
            StoreError::Authentication(_) => {
                Some("Check the database credentials in database_url / DATABASE_URL")
            }
            StoreError::Unavailable(_) => {
                Some("Check the connection configuration in database_url / DATABASE_URL")
            }
            _ => None,
        }
    }
}

impl StoreError {
    fn from_sqlstate(code: Option<&str>, message: String) -> Self {
        match code {
            Some(UNDEFINED_TABLE | UNDEFINED_COLUMN) => StoreError::MissingSchema(message),
            Some(INVALID_PASSWORD) => StoreError::Authentication(message),
            Some(INVALID_CATALOG_NAME) => StoreError::Unavailable(message),
            Some(CHECK_VIOLATION) => StoreError::CheckViolation(message),
            _ => StoreError::Query(message),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) => {
                StoreError::from_sqlstate(db_err.code().as_deref(), db_err.message().to_string())
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Configuration(_) => StoreError::Unavailable(err.to_string()),
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) | sqlx::Error::ColumnNotFound(_) => {
                StoreError::Decode(err.to_string())
            }
            _ => StoreError::Query(err.to_string()),
        }
    }
}

/// CRUD over the task table.
///
/// Lookups by id return `Ok(None)` when no row matches. Rows come back in
/// their stored shape; callers convert them with `Task::from`.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Create the table, constraints and index if needed. Idempotent.
    async fn ensure_schema(&self) -> Result<(), StoreError>;

    /// Every task, newest first.
    async fn list_all(&self) -> Result<Vec<TaskRow>, StoreError>;

    async fn get(&self, id: TaskId) -> Result<Option<TaskRow>, StoreError>;

    async fn create(&self, task: NewTask) -> Result<TaskRow, StoreError>;

    /// Apply a partial update and refresh `updated_at`.
    async fn update(&self, id: TaskId, patch: TaskPatch) -> Result<Option<TaskRow>, StoreError>;

    /// Remove a task, returning the row as it was.
    async fn delete(&self, id: TaskId) -> Result<Option<TaskRow>, StoreError>;

    /// Counts for the dashboard; `today` decides what is overdue.
    async fn stats(&self, today: NaiveDate) -> Result<TaskStats, StoreError>;

    /// Probe the backing database.
    async fn health(&self) -> Result<DatabaseInfo, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_faults_are_unavailable() {
        let err = StoreError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert_eq!(err.code(), "DATABASE_UNAVAILABLE");
        assert!(err.hint().unwrap().contains("connection"));
    }

    #[test]
    fn row_not_found_is_a_query_error() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Query(_)));
        assert_eq!(err.hint(), None);
    }

    #[test]
    fn missing_table_or_column_means_missing_schema() {
        for code in ["42P01", "42703"] {
            let err = StoreError::from_sqlstate(Some(code), "column \"tags\" does not exist".into());
            assert!(matches!(err, StoreError::MissingSchema(_)), "{code}");
            assert_eq!(err.code(), "SCHEMA_MISSING");
            assert!(err.hint().is_some());
        }
    }

    #[test]
    fn sqlstates_are_classified() {
        assert!(matches!(StoreError::from_sqlstate(Some("28P01"), String::new()), StoreError::Authentication(_)));
        assert!(matches!(StoreError::from_sqlstate(Some("3D000"), String::new()), StoreError::Unavailable(_)));
        assert!(matches!(StoreError::from_sqlstate(Some("23514"), String::new()), StoreError::CheckViolation(_)));
        assert!(matches!(StoreError::from_sqlstate(Some("23505"), String::new()), StoreError::Query(_)));
        assert!(matches!(StoreError::from_sqlstate(None, String::new()), StoreError::Query(_)));
    }

    #[test]
    fn each_fault_has_a_distinct_hint() {
        let schema = StoreError::MissingSchema(String::new()).hint().unwrap();
        let auth = StoreError::Authentication(String::new()).hint().unwrap();
        let conn = StoreError::Unavailable(String::new()).hint().unwrap();
        assert!(schema.contains("schema"));
        assert!(auth.contains("credentials"));
        assert_ne!(auth, conn);
    }
}
