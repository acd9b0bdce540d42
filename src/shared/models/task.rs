use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::shared::normalize::{normalize_subtasks_out, normalize_tags_out};
use crate::{
    subtask::Subtask,
    task_id::TaskId,
    task_priority::TaskPriority,
    task_status::TaskStatus,
};

/// A task as the store holds it: tags as comma-joined text, subtasks as
/// raw JSON. Turn it into a [`Task`] before it leaves the server.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRow {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub assigned_to: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub tags: Option<String>,
    pub subtasks: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The client-facing task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub assigned_to: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub tags: Vec<String>,
    pub subtasks: Vec<Subtask>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Self {
            tags: normalize_tags_out(row.tags.as_deref()),
            subtasks: normalize_subtasks_out(&row.subtasks),
            id: row.id,
            title: row.title,
            description: row.description,
            priority: row.priority,
            status: row.status,
            assigned_to: row.assigned_to,
            due_date: row.due_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A validated, normalized create request.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub assigned_to: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub tags: Option<String>,
    pub subtasks: Vec<Subtask>,
}

/// One column of a partial update.
///
/// `Keep` leaves the stored value alone, `Clear` writes NULL.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FieldUpdate<T> {
    #[default]
    Keep,
    Clear,
    Set(T),
}

impl<T> FieldUpdate<T> {
    pub fn is_clear(&self) -> bool {
        matches!(self, FieldUpdate::Clear)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            FieldUpdate::Set(value) => Some(value),
            _ => None,
        }
    }

    pub fn apply(self, current: Option<T>) -> Option<T> {
        match self {
            FieldUpdate::Keep => current,
            FieldUpdate::Clear => None,
            FieldUpdate::Set(value) => Some(value),
        }
    }
}

/// A validated, normalized partial update. Title, priority and status can
/// only be replaced, never cleared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: FieldUpdate<String>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub assigned_to: FieldUpdate<String>,
    pub due_date: FieldUpdate<NaiveDate>,
    pub tags: FieldUpdate<String>,
    pub subtasks: Option<Vec<Subtask>>,
}

impl TaskRow {
    /// Apply a patch in place, refreshing `updated_at`.
    pub fn apply(&mut self, patch: TaskPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        self.description = patch.description.apply(self.description.take());
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.assigned_to = patch.assigned_to.apply(self.assigned_to.take());
        self.due_date = patch.due_date.apply(self.due_date.take());
        self.tags = patch.tags.apply(self.tags.take());
        if let Some(subtasks) = patch.subtasks {
            self.subtasks = serde_json::to_value(subtasks).unwrap_or_default();
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn ts(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
    }

    fn row() -> TaskRow {
        TaskRow {
            id: TaskId::Serial(1),
            title: "Ship report".into(),
            description: Some("Quarterly numbers".into()),
            priority: TaskPriority::High,
            status: TaskStatus::ToDo,
            assigned_to: Some("dana".into()),
            due_date: NaiveDate::from_ymd_opt(2024, 5, 3),
            tags: Some("finance, q2".into()),
            subtasks: json!([{ "id": "a", "text": "Draft", "completed": false }]),
            created_at: ts(9),
            updated_at: ts(9),
        }
    }

    #[test]
    fn status_only_patch_touches_status_and_timestamp() {
        let before = row();
        let mut after = before.clone();
        after.apply(
            TaskPatch {
                status: Some(TaskStatus::Completed),
                ..TaskPatch::default()
            },
            ts(10),
        );

        assert_eq!(after.status, TaskStatus::Completed);
        assert_eq!(after.updated_at, ts(10));
        assert_eq!(
            TaskRow { status: before.status, updated_at: before.updated_at, ..after },
            before
        );
    }

    #[test]
    fn clear_writes_null() {
        let mut task = row();
        task.apply(
            TaskPatch {
                description: FieldUpdate::Clear,
                due_date: FieldUpdate::Clear,
                tags: FieldUpdate::Clear,
                subtasks: Some(Vec::new()),
                ..TaskPatch::default()
            },
            ts(11),
        );

        assert_eq!(task.description, None);
        assert_eq!(task.due_date, None);
        assert_eq!(task.tags, None);
        assert_eq!(task.subtasks, json!([]));
        assert_eq!(task.assigned_to.as_deref(), Some("dana"));
    }

    #[test]
    fn row_converts_to_client_shape() {
        let task = Task::from(row());
        assert_eq!(task.tags, vec!["finance", "q2"]);
        assert_eq!(task.subtasks.len(), 1);
        assert_eq!(task.subtasks[0].text, "Draft");

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["id"], json!(1));
        assert_eq!(json["status"], json!("To Do"));
        assert_eq!(json["due_date"], json!("2024-05-03"));
        assert_eq!(json["created_at"], json!("2024-05-01T09:00:00Z"));
    }
}
