use serde::Serialize;

use crate::task::Task;

#[derive(Debug, Serialize)]
pub struct DeleteTaskResponse {
    pub message: String,
    pub task: Task,
}

impl DeleteTaskResponse {
    pub fn new(task: Task) -> Self {
        Self {
            message: "Task deleted successfully".to_string(),
            task,
        }
    }
}
