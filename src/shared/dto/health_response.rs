use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// What a store reports about its backing database.
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseInfo {
    pub time: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct DatabaseHealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub database: DatabaseInfo,
}

#[derive(Debug, Serialize)]
pub struct ApiInfoResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub version: &'static str,
    pub endpoints: Vec<&'static str>,
}
