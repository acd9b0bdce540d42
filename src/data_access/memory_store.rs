//! Process-local `TaskStore`. Everything lives in one map behind a lock;
//! nothing survives a restart.

use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    health_response::DatabaseInfo,
    task::{NewTask, TaskPatch, TaskRow},
    task_id::{KeyType, TaskId},
    task_stats::TaskStats,
    task_status::TaskStatus,
    StoreError, TaskStore,
};

struct Entry {
    /// Insertion order, breaks `created_at` ties.
    seq: u64,
    row: TaskRow,
}

#[derive(Default)]
struct Tables {
    tasks: HashMap<TaskId, Entry>,
    /// Monotonic; serial ids are never handed out twice.
    next_seq: u64,
}

pub struct MemoryStore {
    key_type: KeyType,
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new(key_type: KeyType) -> Self {
        Self {
            key_type,
            tables: RwLock::new(Tables::default()),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(KeyType::Serial)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<TaskRow>, StoreError> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        let mut entries: Vec<&Entry> = tables.tasks.values().collect();
        entries.sort_by(|a, b| {
            b.row
                .created_at
                .cmp(&a.row.created_at)
                .then_with(|| b.seq.cmp(&a.seq))
        });
        Ok(entries.into_iter().map(|entry| entry.row.clone()).collect())
    }

    async fn get(&self, id: TaskId) -> Result<Option<TaskRow>, StoreError> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        Ok(tables.tasks.get(&id).map(|entry| entry.row.clone()))
    }

    async fn create(&self, task: NewTask) -> Result<TaskRow, StoreError> {
        let subtasks =
            serde_json::to_value(&task.subtasks).map_err(|e| StoreError::Decode(e.to_string()))?;
        let now = Self::now();

        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        tables.next_seq += 1;
        let seq = tables.next_seq;
        let id = match self.key_type {
            KeyType::Serial => TaskId::Serial(
                i32::try_from(seq).map_err(|_| StoreError::Query("serial id space exhausted".into()))?,
            ),
            KeyType::Uuid => TaskId::Uuid(Uuid::new_v4()),
        };

        let row = TaskRow {
            id,
            title: task.title,
            description: task.description,
            priority: task.priority,
            status: task.status,
            assigned_to: task.assigned_to,
            due_date: task.due_date,
            tags: task.tags,
            subtasks,
            created_at: now,
            updated_at: now,
        };
        tables.tasks.insert(id, Entry { seq, row: row.clone() });
        Ok(row)
    }

    async fn update(&self, id: TaskId, patch: TaskPatch) -> Result<Option<TaskRow>, StoreError> {
        let now = Self::now();
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        Ok(tables.tasks.get_mut(&id).map(|entry| {
            entry.row.apply(patch, now);
            entry.row.clone()
        }))
    }

    async fn delete(&self, id: TaskId) -> Result<Option<TaskRow>, StoreError> {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        Ok(tables.tasks.remove(&id).map(|entry| entry.row))
    }

    async fn stats(&self, today: NaiveDate) -> Result<TaskStats, StoreError> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        let mut stats = TaskStats::default();
        for Entry { row, .. } in tables.tasks.values() {
            stats.total += 1;
            *stats.by_status.entry(row.status.to_string()).or_insert(0) += 1;
            if row.status != TaskStatus::Completed && row.due_date.is_some_and(|due| due < today) {
                stats.overdue += 1;
            }
        }
        Ok(stats)
    }

    async fn health(&self) -> Result<DatabaseInfo, StoreError> {
        Ok(DatabaseInfo {
            time: Utc::now().to_rfc3339(),
            version: "in-memory".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{task::FieldUpdate, task_priority::TaskPriority};
    use chrono::Duration;

    fn new_task(title: &str) -> NewTask {
        NewTask {
            title: title.to_string(),
            description: None,
            priority: TaskPriority::Medium,
            status: TaskStatus::ToDo,
            assigned_to: None,
            due_date: None,
            tags: None,
            subtasks: Vec::new(),
        }
    }

    #[tokio::test]
    async fn serial_ids_are_never_reused() {
        let store = MemoryStore::default();
        let first = store.create(new_task("one")).await.unwrap();
        store.delete(first.id).await.unwrap();
        let second = store.create(new_task("two")).await.unwrap();

        assert_eq!(first.id, TaskId::Serial(1));
        assert_eq!(second.id, TaskId::Serial(2));
    }

    #[tokio::test]
    async fn uuid_store_issues_uuids() {
        let store = MemoryStore::new(KeyType::Uuid);
        let task = store.create(new_task("one")).await.unwrap();
        assert!(matches!(task.id, TaskId::Uuid(_)));
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = MemoryStore::default();
        for title in ["a", "b", "c"] {
            store.create(new_task(title)).await.unwrap();
        }
        let titles: Vec<String> = store.list_all().await.unwrap().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn update_missing_task_is_none() {
        let store = MemoryStore::default();
        let patch = TaskPatch {
            description: FieldUpdate::Set("x".into()),
            ..TaskPatch::default()
        };
        assert!(store.update(TaskId::Serial(9), patch).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn stats_track_overdue_tasks() {
        let store = MemoryStore::default();
        let today = Utc::now().date_naive();
        assert_eq!(store.stats(today).await.unwrap(), TaskStats::default());

        let mut late = new_task("late");
        late.due_date = Some(today - Duration::days(1));
        let late = store.create(late).await.unwrap();

        let mut due_today = new_task("today");
        due_today.due_date = Some(today);
        store.create(due_today).await.unwrap();

        let stats = store.stats(today).await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.by_status.get("To Do"), Some(&2));
        assert_eq!(stats.overdue, 1);

        let done = TaskPatch {
            status: Some(TaskStatus::Completed),
            ..TaskPatch::default()
        };
        store.update(late.id, done).await.unwrap();
        let stats = store.stats(today).await.unwrap();
        assert_eq!(stats.overdue, 0);
        assert_eq!(stats.by_status.get("Completed"), Some(&1));
    }
}
