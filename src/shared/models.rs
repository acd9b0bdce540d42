pub mod app_state;
pub mod settings;
pub mod subtask;
pub mod task;
pub mod task_id;
pub mod task_priority;
pub mod task_stats;
pub mod task_status;
