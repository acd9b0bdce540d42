use serde::Deserialize;

use crate::shared::normalize::{normalize_subtasks_in, normalize_tags_in};
use crate::shared::validation::{
    parse_due_date, validate_enums, validate_max_len, validate_required, ValidationError,
};
use crate::{tags_input::TagsInput, task::NewTask};

#[derive(Debug, Default, Deserialize)]
pub struct CreateTaskRequest {
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

impl CreateTaskRequest {
    /// Validate and normalize into a [`NewTask`]. `now_millis` seeds ids
    /// for subtasks that arrive without one.
    pub fn into_new_task(self, now_millis: i64) -> Result<NewTask, ValidationError> {
        let (status, priority) = validate_enums(self.status.as_deref(), self.priority.as_deref())?;
        validate_required(
            self.title.as_deref(),
            self.priority.as_deref(),
            self.status.as_deref(),
        )?;
        let (Some(title), Some(status), Some(priority)) = (self.title, status, priority) else {
            return Err(ValidationError::new("Title, priority, and status are required"));
        };

        let title = title.trim().to_string();
        validate_max_len("title", &title)?;
        let assigned_to = non_blank(self.assigned_to);
        if let Some(assignee) = &assigned_to {
            validate_max_len("assigned_to", assignee)?;
        }

        let due_date = match non_blank(self.due_date) {
            Some(raw) => Some(parse_due_date(&raw)?),
            None => None,
        };

        Ok(NewTask {
            title,
            description: non_blank(self.description),
            priority,
            status,
            assigned_to,
            due_date,
            tags: normalize_tags_in(self.tags.as_ref()),
            subtasks: normalize_subtasks_in(&self.subtasks, now_millis),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
