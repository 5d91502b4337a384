use super::enums::Priority;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generate a fresh opaque id for tasks and lists
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current wall-clock time as epoch milliseconds
pub fn now_millis() -> i64 {
    Local::now().timestamp_millis()
}

/// A single todo item belonging to one list
///
/// Serialized field names (`list`, `createdAt`, `dueDate`, ...) match the
/// exported backup format, so older backups import without translation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, with = "opt_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, with = "opt_time")]
    pub due_time: Option<NaiveTime>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(rename = "list")]
    pub list_id: String,
    pub created_at: i64,
}

impl Task {
    pub fn new(title: impl Into<String>, list_id: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            description: String::new(),
            due_date: None,
            due_time: None,
            completed: false,
            priority: Priority::default(),
            list_id: list_id.into(),
            created_at: now_millis(),
        }
    }

    /// Combined due timestamp; a due date with no time is treated as midnight
    pub fn due_at(&self) -> Option<NaiveDateTime> {
        self.due_date
            .map(|date| date.and_time(self.due_time.unwrap_or_default()))
    }

    /// Apply a partial update
    pub fn apply(&mut self, patch: TaskPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(due_time) = patch.due_time {
            self.due_time = due_time;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
    }
}

/// Fields for creating a new task; the board fills in id, list and timestamp
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub due_time: Option<NaiveTime>,
    pub priority: Priority,
}

/// Partial update for a task
///
/// Outer `None` leaves the field alone; for the due fields, `Some(None)`
/// clears a previously set value. The list is reassigned through the board
/// so the target is validated.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<Option<NaiveDate>>,
    pub due_time: Option<Option<NaiveTime>>,
    pub priority: Option<Priority>,
    pub list_id: Option<String>,
}

/// A named, colored grouping of tasks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct List {
    pub id: String,
    pub name: String,
    /// Hex color like "#9764c7"
    pub color: String,
}

impl List {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            color: color.into(),
        }
    }
}

/// Serialize an optional date as "YYYY-MM-DD", with "" for absent values
/// (the backup format uses empty strings rather than nulls). Unparseable
/// input is treated as no due date rather than a hard error.
mod opt_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => serializer.serialize_str(&date.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()))
    }
}

/// Same convention as `opt_date`, for "HH:MM" times
mod opt_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(time) => serializer.serialize_str(&time.format("%H:%M").to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.and_then(|s| NaiveTime::parse_from_str(s.trim(), "%H:%M").ok()))
    }
}
