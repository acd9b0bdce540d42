//! Boundary checks run before anything reaches a store.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::{task_priority::TaskPriority, task_status::TaskStatus};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    /// Set when the failure is an enum value outside its allowed set.
    pub allowed_values: Option<Vec<&'static str>>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            allowed_values: None,
        }
    }

    fn not_one_of(field: &str, allowed: Vec<&'static str>) -> Self {
        Self {
            message: format!("Invalid {field}. Must be one of: {}", allowed.join(", ")),
            allowed_values: Some(allowed),
        }
    }
}

/// Check status and priority membership. An absent or empty value is not
/// checked and comes back as `None`.
pub fn validate_enums(
    status: Option<&str>,
    priority: Option<&str>,
) -> Result<(Option<TaskStatus>, Option<TaskPriority>), ValidationError> {
    let status = match status.filter(|s| !s.is_empty()) {
        Some(raw) => Some(
            raw.parse::<TaskStatus>()
                .map_err(|_| ValidationError::not_one_of("status", TaskStatus::allowed_values()))?,
        ),
        None => None,
    };
    let priority = match priority.filter(|p| !p.is_empty()) {
        Some(raw) => Some(
            raw.parse::<TaskPriority>()
                .map_err(|_| ValidationError::not_one_of("priority", TaskPriority::allowed_values()))?,
        ),
        None => None,
    };
    Ok((status, priority))
}

/// Create-only presence check for the three mandatory fields.
pub fn validate_required(
    title: Option<&str>,
    priority: Option<&str>,
    status: Option<&str>,
) -> Result<(), ValidationError> {
    let present = |value: Option<&str>| value.is_some_and(|v| !v.trim().is_empty());
    if present(title) && present(priority) && present(status) {
        Ok(())
    } else {
        Err(ValidationError::new("Title, priority, and status are required"))
    }
}

/// Title and assignee live in `VARCHAR(255)` columns.
pub const MAX_SHORT_TEXT_LEN: usize = 255;

pub fn validate_max_len(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.chars().count() > MAX_SHORT_TEXT_LEN {
        return Err(ValidationError::new(format!(
            "{field} must be at most {MAX_SHORT_TEXT_LEN} characters"
        )));
    }
    Ok(())
}

/// Accepts `YYYY-MM-DD`, an RFC 3339 timestamp, or a naive
/// `YYYY-MM-DDTHH:MM:SS` timestamp. Timestamps keep only their date.
pub fn parse_due_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date()))
        .map_err(|_| ValidationError::new(format!("Invalid due_date '{raw}'. Use YYYY-MM-DD")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omitted_enums_are_valid() {
        assert_eq!(validate_enums(None, None), Ok((None, None)));
        assert_eq!(validate_enums(Some(""), Some("")), Ok((None, None)));
    }

    #[test]
    fn known_enums_parse() {
        assert_eq!(
            validate_enums(Some("Completed"), Some("Low")),
            Ok((Some(TaskStatus::Completed), Some(TaskPriority::Low)))
        );
    }

    #[test]
    fn unknown_status_lists_allowed_values() {
        let err = validate_enums(Some("Done"), Some("High")).unwrap_err();
        assert_eq!(err.message, "Invalid status. Must be one of: To Do, In Progress, Completed");
        assert_eq!(err.allowed_values, Some(vec!["To Do", "In Progress", "Completed"]));
    }

    #[test]
    fn unknown_priority_lists_allowed_values() {
        let err = validate_enums(None, Some("Urgent")).unwrap_err();
        assert_eq!(err.message, "Invalid priority. Must be one of: High, Medium, Low");
        assert_eq!(err.allowed_values, Some(vec!["High", "Medium", "Low"]));
    }

    #[test]
    fn required_fields_share_one_error() {
        assert!(validate_required(Some("Ship report"), Some("High"), Some("To Do")).is_ok());
        for (title, priority, status) in [
            (None, Some("High"), Some("To Do")),
            (Some("  "), Some("High"), Some("To Do")),
            (Some("Ship report"), None, Some("To Do")),
            (Some("Ship report"), Some("High"), Some("")),
        ] {
            let err = validate_required(title, priority, status).unwrap_err();
            assert_eq!(err.message, "Title, priority, and status are required");
            assert_eq!(err.allowed_values, None);
        }
    }

    #[test]
    fn long_titles_are_rejected() {
        assert!(validate_max_len("title", &"x".repeat(255)).is_ok());
        let err = validate_max_len("title", &"x".repeat(256)).unwrap_err();
        assert_eq!(err.message, "title must be at most 255 characters");
    }

    #[test]
    fn due_dates_accept_dates_and_timestamps() {
        let expected = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        assert_eq!(parse_due_date("2024-06-30"), Ok(expected));
        assert_eq!(parse_due_date("2024-06-30T23:00:00Z"), Ok(expected));
        assert_eq!(parse_due_date("2024-06-30T08:15:00.000"), Ok(expected));
        assert!(parse_due_date("next tuesday").is_err());
    }
}
