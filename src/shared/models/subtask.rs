use serde::{Deserialize, Serialize};

/// A checklist item nested inside a task. Stored as one element of the
/// task's `subtasks` JSONB array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}
