//! DDL for the `tasks` table.
//!
//! Every statement is safe to re-run: tables, columns and indexes use
//! `IF NOT EXISTS`, and the check constraints are dropped and re-added so a
//! changed enum reaches databases created by older builds.

use sqlx::PgPool;
#[cfg(feature = "profile")]
use std::time::Instant;

use crate::{task_id::KeyType, task_priority::TaskPriority, task_status::TaskStatus, StoreError};

pub const TASKS_TABLE: &str = "tasks";
pub const PRIORITY_CHECK: &str = "tasks_priority_check";
pub const STATUS_CHECK: &str = "tasks_status_check";
pub const STATUS_INDEX: &str = "idx_tasks_status";

/// Key for the transaction-scoped advisory lock taken around the DDL.
/// Arbitrary, but fixed for every process sharing the database.
pub const SCHEMA_LOCK_KEY: i64 = 0x7461_736b_7363_6800;

fn id_column(key_type: KeyType) -> &'static str {
    match key_type {
        KeyType::Serial => "id SERIAL PRIMARY KEY",
        KeyType::Uuid => "id UUID PRIMARY KEY DEFAULT gen_random_uuid()",
    }
}

// ('A', 'B', 'C')
fn sql_list(values: &[&str]) -> String {
    let quoted: Vec<String> = values
        .iter()
        .map(|v| format!("'{}'", v.replace('\'', "''")))
        .collect();
    format!("({})", quoted.join(", "))
}

/// The statements `ensure_schema` runs, in order.
pub fn schema_statements(key_type: KeyType) -> Vec<String> {
    let priorities = sql_list(&TaskPriority::allowed_values());
    let statuses = sql_list(&TaskStatus::allowed_values());

    vec![
        format!(
            "CREATE TABLE IF NOT EXISTS {TASKS_TABLE} (
                {id},
                title VARCHAR(255) NOT NULL,
                description TEXT,
                priority VARCHAR(20) DEFAULT '{medium}',
                status VARCHAR(20) DEFAULT '{todo}',
                assigned_to VARCHAR(255),
                due_date DATE,
                tags TEXT,
                subtasks JSONB DEFAULT '[]'::jsonb,
                created_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP
            )",
            id = id_column(key_type),
            medium = TaskPriority::default(),
            todo = TaskStatus::default(),
        ),
        // Columns added after the first release
        format!("ALTER TABLE {TASKS_TABLE} ADD COLUMN IF NOT EXISTS tags TEXT"),
        format!("ALTER TABLE {TASKS_TABLE} ADD COLUMN IF NOT EXISTS subtasks JSONB DEFAULT '[]'::jsonb"),
        // Tables from older builds stored naive timestamps; those were UTC.
        format!(
            "DO $$
            BEGIN
                IF EXISTS (
                    SELECT 1 FROM information_schema.columns
                    WHERE table_schema = current_schema()
                      AND table_name = '{TASKS_TABLE}'
                      AND column_name = 'created_at'
                      AND data_type = 'timestamp without time zone'
                ) THEN
                    ALTER TABLE {TASKS_TABLE}
                        ALTER COLUMN created_at TYPE TIMESTAMPTZ USING created_at AT TIME ZONE 'UTC',
                        ALTER COLUMN updated_at TYPE TIMESTAMPTZ USING updated_at AT TIME ZONE 'UTC';
                END IF;
            END $$"
        ),
        format!(
            "ALTER TABLE {TASKS_TABLE}
                DROP CONSTRAINT IF EXISTS {PRIORITY_CHECK},
                DROP CONSTRAINT IF EXISTS {STATUS_CHECK}"
        ),
        format!("ALTER TABLE {TASKS_TABLE} ADD CONSTRAINT {PRIORITY_CHECK} CHECK (priority IN {priorities})"),
        format!("ALTER TABLE {TASKS_TABLE} ADD CONSTRAINT {STATUS_CHECK} CHECK (status IN {statuses})"),
        format!("CREATE INDEX IF NOT EXISTS {STATUS_INDEX} ON {TASKS_TABLE}(status)"),
    ]
}

/// Run the schema statements in one transaction. An advisory lock taken
/// first serializes concurrent callers, in this process or any other, so a
/// fresh database never sees two `CREATE TABLE` calls race.
pub async fn ensure_schema(pool: &PgPool, key_type: KeyType) -> Result<(), StoreError> {
    #[cfg(feature = "profile")]
    let start = Instant::now();

    let mut txn = pool.begin().await?;
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(SCHEMA_LOCK_KEY)
        .execute(&mut *txn)
        .await?;
    for statement in schema_statements(key_type) {
        sqlx::query(&statement).execute(&mut *txn).await?;
    }
    txn.commit().await?;

    #[cfg(feature = "profile")]
    tracing::debug!(elapsed_us = start.elapsed().as_micros() as u64, "schema statements committed");
    tracing::info!(table = TASKS_TABLE, ?key_type, "database schema ready");
    Ok(())
}
