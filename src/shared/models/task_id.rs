use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Primary key type of the `tasks` table for this deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    /// `SERIAL` integer keys.
    #[default]
    Serial,
    /// `UUID` keys generated by the database.
    Uuid,
}

/// A task identifier, resolved once at the HTTP boundary against the
/// configured [`KeyType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum TaskId {
    Serial(i32),
    Uuid(Uuid),
}

impl TaskId {
    /// Parse a raw path segment. `None` means no row can ever carry this id.
    pub fn parse(raw: &str, key_type: KeyType) -> Option<TaskId> {
        let raw = raw.trim();
        match key_type {
            KeyType::Serial => raw.parse::<i32>().ok().filter(|n| *n > 0).map(TaskId::Serial),
            KeyType::Uuid => Uuid::parse_str(raw).ok().map(TaskId::Uuid),
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Serial(n) => write!(f, "{n}"),
            TaskId::Uuid(u) => write!(f, "{u}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_ids_only_accept_positive_integers() {
        assert_eq!(TaskId::parse("42", KeyType::Serial), Some(TaskId::Serial(42)));
        assert_eq!(TaskId::parse("0", KeyType::Serial), None);
        assert_eq!(TaskId::parse("-3", KeyType::Serial), None);
        assert_eq!(
            TaskId::parse("6b3c18d4-2a1d-4f2b-9d4c-0a0c3f0f2f10", KeyType::Serial),
            None
        );
    }

    #[test]
    fn uuid_ids_reject_numbers() {
        let raw = "6b3c18d4-2a1d-4f2b-9d4c-0a0c3f0f2f10";
        let id = TaskId::parse(raw, KeyType::Uuid).unwrap();
        assert_eq!(id.to_string(), raw);
        assert_eq!(TaskId::parse("42", KeyType::Uuid), None);
    }

    #[test]
    fn serializes_as_bare_value() {
        assert_eq!(serde_json::to_string(&TaskId::Serial(7)).unwrap(), "7");
        let uuid = Uuid::nil();
        assert_eq!(
            serde_json::to_string(&TaskId::Uuid(uuid)).unwrap(),
            format!("\"{uuid}\"")
        );
    }
}
