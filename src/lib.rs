//---------------------------------------
pub mod web_api {
    pub mod api_error;
    pub mod controllers;
    pub mod routes;
}

pub use web_api::api_error::ApiError;
pub use web_api::routes::{map_routes, with_static_fallback};
pub use web_api::controllers::*;
//---------------------------------------

//---------------------------------------
pub mod shared {
    pub mod dto;
    pub mod models;
    pub mod normalize;
    pub mod validation;
}

pub use shared::dto::*;
pub use shared::models::*;
//---------------------------------------

//---------------------------------------
pub mod data_access {
    pub mod memory_store;
    pub mod postgres_store;
    pub mod schema;
    pub mod task_store;
}

pub use data_access::task_store::{StoreError, TaskStore};
//---------------------------------------
