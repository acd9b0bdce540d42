use std::sync::Arc;

use crate::{task_id::KeyType, TaskStore};

pub struct AppState {
    pub store: Arc<dyn TaskStore>,
    /// Used to parse `:id` path segments.
    pub key_type: KeyType,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn shared(store: Arc<dyn TaskStore>, key_type: KeyType) -> SharedState {
        Arc::new(AppState { store, key_type })
    }
}
