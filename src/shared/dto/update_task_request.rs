use serde::Deserialize;

use crate::shared::normalize::{normalize_subtasks_in, normalize_tags_in};
use crate::shared::validation::{parse_due_date, validate_enums, validate_max_len, ValidationError};
use crate::{
    tags_input::TagsInput,
    task::{FieldUpdate, TaskPatch},
};

/// Partial update. A missing or `null` field keeps its stored value; an
/// empty string (or empty list) clears the clearable ones.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub assigned_to: Option<String>,
    pub due_date: Option<String>,
    pub tags: Option<TagsInput>,
    #[serde(default)]
    pub subtasks: serde_json::Value,
}

impl UpdateTaskRequest {
    pub fn into_patch(self, now_millis: i64) -> Result<TaskPatch, ValidationError> {
        let (status, priority) = validate_enums(self.status.as_deref(), self.priority.as_deref())?;

        let title = match self.title {
            Some(title) if title.trim().is_empty() => {
                return Err(ValidationError::new("Title cannot be empty"));
            }
            Some(title) => {
                let title = title.trim().to_string();
                validate_max_len("title", &title)?;
                Some(title)
            }
            None => None,
        };

        let assigned_to = text_update(self.assigned_to);
        if let Some(assignee) = assigned_to.value() {
            validate_max_len("assigned_to", assignee)?;
        }

        let due_date = match text_update(self.due_date) {
            FieldUpdate::Set(raw) => FieldUpdate::Set(parse_due_date(&raw)?),
            FieldUpdate::Clear => FieldUpdate::Clear,
            FieldUpdate::Keep => FieldUpdate::Keep,
        };

        let tags = match &self.tags {
            None => FieldUpdate::Keep,
            Some(input) => match normalize_tags_in(Some(input)) {
                Some(joined) => FieldUpdate::Set(joined),
                None => FieldUpdate::Clear,
            },
        };

        let subtasks = (!self.subtasks.is_null())
            .then(|| normalize_subtasks_in(&self.subtasks, now_millis));

        Ok(TaskPatch {
            title,
            description: text_update(self.description),
            priority,
            status,
            assigned_to,
            due_date,
            tags,
            subtasks,
        })
    }
}

fn text_update(value: Option<String>) -> FieldUpdate<String> {
    match value {
        None => FieldUpdate::Keep,
        Some(v) if v.trim().is_empty() => FieldUpdate::Clear,
        Some(v) => FieldUpdate::Set(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task_status::TaskStatus;
    use chrono::NaiveDate;
    use serde_json::json;

    fn patch(body: serde_json::Value) -> Result<TaskPatch, ValidationError> {
        serde_json::from_value::<UpdateTaskRequest>(body).unwrap().into_patch(7)
    }

    #[test]
    fn status_only_keeps_everything_else() {
        let patch = patch(json!({ "status": "Completed" })).unwrap();
        assert_eq!(
            patch,
            TaskPatch {
                status: Some(TaskStatus::Completed),
                ..TaskPatch::default()
            }
        );
    }

    #[test]
    fn null_means_keep() {
        let patch = patch(json!({
            "description": null, "due_date": null, "tags": null, "subtasks": null
        }))
        .unwrap();
        assert_eq!(patch, TaskPatch::default());
    }

    #[test]
    fn empty_values_clear() {
        let patch = patch(json!({
            "description": "", "assigned_to": " ", "due_date": "", "tags": [], "subtasks": []
        }))
        .unwrap();
        assert_eq!(patch.description, FieldUpdate::Clear);
        assert_eq!(patch.assigned_to, FieldUpdate::Clear);
        assert_eq!(patch.due_date, FieldUpdate::Clear);
        assert_eq!(patch.tags, FieldUpdate::Clear);
        assert_eq!(patch.subtasks, Some(Vec::new()));
    }

    #[test]
    fn values_are_set() {
        let patch = patch(json!({
            "title": " Renamed ", "due_date": "2024-08-01", "tags": "x, y",
            "subtasks": [{ "text": "step" }]
        }))
        .unwrap();
        assert_eq!(patch.title.as_deref(), Some("Renamed"));
        assert_eq!(patch.due_date, FieldUpdate::Set(NaiveDate::from_ymd_opt(2024, 8, 1).unwrap()));
        assert_eq!(patch.tags, FieldUpdate::Set("x, y".to_string()));
        assert_eq!(patch.subtasks.unwrap()[0].id, "7-0");
    }

    #[test]
    fn blank_title_is_rejected() {
        assert_eq!(patch(json!({ "title": "" })).unwrap_err().message, "Title cannot be empty");
    }

    #[test]
    fn invalid_status_is_rejected() {
        let err = patch(json!({ "status": "Blocked" })).unwrap_err();
        assert!(err.allowed_values.is_some());
    }
}
