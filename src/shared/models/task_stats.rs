use std::collections::BTreeMap;

use serde::Serialize;

/// Aggregate counts for the dashboard header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: i64,
    /// Row count per stored status. Statuses with no rows are absent.
    pub by_status: BTreeMap<String, i64>,
    /// Tasks past their due date that are not yet completed.
    pub overdue: i64,
}
