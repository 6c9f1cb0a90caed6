use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type TaskId = i64;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: Status,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Board column a task lives in. Wire names are `todo`, `in_progress` and `done`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Todo,
    InProgress,
    Done,
}

impl Status {
    /// Column order, left to right.
    pub const ALL: [Status; 3] = [Status::Todo, Status::InProgress, Status::Done];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "in_progress",
            Status::Done => "done",
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            Status::Todo => "To Do",
            Status::InProgress => "In Progress",
            Status::Done => "Done",
        }
    }

    /// Position of the column on the board.
    pub fn index(self) -> usize {
        match self {
            Status::Todo => 0,
            Status::InProgress => 1,
            Status::Done => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Status> {
        Status::ALL.get(index).copied()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /tasks`.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: Status,
}

/// Body of `PUT /tasks/{id}`. Fields left as `None` are omitted from the JSON.
///
/// `description` is doubly optional so a patch can send an explicit `null`.
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl TaskPatch {
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn content(title: String, description: Option<String>) -> Self {
        Self {
            title: Some(title),
            description: Some(description),
            status: None,
        }
    }
}

/// Parses a server timestamp.
///
/// Accepts RFC 3339 as well as the naive `YYYY-MM-DD HH:MM:SS[.fff]` form that
/// SQLite's `CURRENT_TIMESTAMP` produces; naive values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
}

mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(dt) => serializer.serialize_str(&dt.to_rfc3339()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| super::super::parse_timestamp(&raw).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn decodes_backend_row() {
        let task: Task = serde_json::from_value(json!({
            "id": 3,
            "title": "Write docs",
            "description": null,
            "status": "in_progress",
            "created_at": "2024-05-01 09:30:00",
            "updated_at": "2024-05-02 10:00:00"
        }))
        .unwrap();

        assert_eq!(task.id, 3);
        assert_eq!(task.status, Status::InProgress);
        assert_eq!(task.description, None);
        assert_eq!(
            task.created_at,
            Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
        );
        assert!(task.updated_at.is_some());
    }

    #[test]
    fn updated_at_is_optional() {
        let task: Task = serde_json::from_value(json!({
            "id": 1,
            "title": "a",
            "status": "todo",
            "created_at": "2024-05-01T09:30:00Z"
        }))
        .unwrap();
        assert_eq!(task.updated_at, None);
        assert_eq!(task.description, None);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let result = serde_json::from_value::<Task>(json!({
            "id": 1,
            "title": "a",
            "status": "blocked",
            "created_at": "2024-05-01T09:30:00Z"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn parses_fractional_and_offset_timestamps() {
        let frac = parse_timestamp("2024-05-01 09:30:00.250").unwrap();
        assert_eq!(frac.timestamp_subsec_millis(), 250);

        let offset = parse_timestamp("2024-05-01T11:30:00+02:00").unwrap();
        assert_eq!(offset, Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap());

        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn status_patch_only_carries_status() {
        let body = serde_json::to_value(TaskPatch::status(Status::Done)).unwrap();
        assert_eq!(body, json!({"status": "done"}));
    }

    #[test]
    fn content_patch_sends_explicit_null_description() {
        let body = serde_json::to_value(TaskPatch::content("Title".into(), None)).unwrap();
        assert_eq!(body, json!({"title": "Title", "description": null}));
    }

    #[test]
    fn status_index_round_trips_column_order() {
        for status in Status::ALL {
            assert_eq!(Status::from_index(status.index()), Some(status));
        }
        assert_eq!(Status::from_index(3), None);
    }
}
