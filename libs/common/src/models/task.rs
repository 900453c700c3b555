//! Task model and the payloads used to create and update tasks

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use super::ParseEnumError;

/// Progress of a task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    Todo,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Every status, in cycling order
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "Todo",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }

    /// The status that follows this one: Todo → In Progress → Completed → Todo
    pub fn next(self) -> Self {
        match self {
            TaskStatus::Todo => TaskStatus::InProgress,
            TaskStatus::InProgress => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::Todo,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseEnumError::Status(s.to_string()))
    }
}

/// Importance of a task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 3] = [TaskPriority::High, TaskPriority::Medium, TaskPriority::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "Low",
            TaskPriority::Medium => "Medium",
            TaskPriority::High => "High",
        }
    }

    /// Sort weight; higher is more urgent
    pub fn rank(&self) -> u8 {
        match self {
            TaskPriority::High => 3,
            TaskPriority::Medium => 2,
            TaskPriority::Low => 1,
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskPriority::ALL
            .into_iter()
            .find(|priority| priority.as_str() == s)
            .ok_or_else(|| ParseEnumError::Priority(s.to_string()))
    }
}

/// Task entity as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, deserialize_with = "lenient_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: TaskPriority,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New task creation payload
///
/// Omitted fields take the model defaults when the task is stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
}

/// Partial task update payload
///
/// `due_date` distinguishes "not sent" (`None`) from "clear it"
/// (`Some(None)`, sent as `null` or an empty string).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(
        default,
        deserialize_with = "lenient_date_patch",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
}

impl UpdateTask {
    /// Update that only moves the task to `status`
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Merge the fields that were sent into `task`
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
    }
}

/// Accepts `null`, `""`, `YYYY-MM-DD` and full timestamps (date part only).
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let date_part = trimmed.split('T').next().unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| serde::de::Error::custom(format!("invalid dueDate '{}': {}", raw, e)))
}

fn lenient_date_patch<'de, D>(deserializer: D) -> Result<Option<Option<NaiveDate>>, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_date(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_cycles_back_after_three_steps() {
        for status in TaskStatus::ALL {
            assert_eq!(status.next().next().next(), status);
            assert_ne!(status.next(), status);
        }
    }

    #[test]
    fn status_uses_display_names_on_the_wire() {
        assert_eq!(
            serde_json::to_value(TaskStatus::InProgress).unwrap(),
            json!("In Progress")
        );
        assert_eq!(
            "In Progress".parse::<TaskStatus>().unwrap(),
            TaskStatus::InProgress
        );
        assert!("Doing".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn priority_rank_orders_high_first() {
        assert!(TaskPriority::High.rank() > TaskPriority::Medium.rank());
        assert!(TaskPriority::Medium.rank() > TaskPriority::Low.rank());
        assert_eq!("Low".parse::<TaskPriority>().unwrap(), TaskPriority::Low);
    }

    #[test]
    fn new_task_treats_empty_due_date_as_absent() {
        let task: NewTask = serde_json::from_value(json!({
            "title": "Buy milk",
            "dueDate": "",
            "priority": "High",
            "status": "Todo"
        }))
        .unwrap();

        assert_eq!(task.due_date, None);
        assert_eq!(task.priority, Some(TaskPriority::High));
        assert_eq!(task.status, Some(TaskStatus::Todo));
    }

    #[test]
    fn new_task_accepts_timestamp_due_dates() {
        let task: NewTask = serde_json::from_value(json!({
            "title": "Report",
            "dueDate": "2025-03-01T00:00:00.000Z"
        }))
        .unwrap();

        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2025, 3, 1));
        assert_eq!(task.priority, None);
    }

    #[test]
    fn update_distinguishes_missing_and_null_due_date() {
        let missing: UpdateTask = serde_json::from_value(json!({"status": "Completed"})).unwrap();
        assert_eq!(missing.due_date, None);
        assert_eq!(missing.status, Some(TaskStatus::Completed));

        let cleared: UpdateTask = serde_json::from_value(json!({"dueDate": null})).unwrap();
        assert_eq!(cleared.due_date, Some(None));

        let set: UpdateTask = serde_json::from_value(json!({"dueDate": "2024-12-24"})).unwrap();
        assert_eq!(set.due_date, Some(NaiveDate::from_ymd_opt(2024, 12, 24)));
    }

    #[test]
    fn update_serializes_only_sent_fields() {
        let update = UpdateTask::status(TaskStatus::InProgress);
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"status": "In Progress"})
        );

        let clear = UpdateTask {
            due_date: Some(None),
            ..UpdateTask::default()
        };
        assert_eq!(serde_json::to_value(&clear).unwrap(), json!({"dueDate": null}));
    }

    #[test]
    fn apply_merges_only_present_fields() {
        let now = Utc::now();
        let mut task = Task {
            id: Uuid::new_v4(),
            title: "Old".to_string(),
            status: TaskStatus::Todo,
            due_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            priority: TaskPriority::Low,
            user_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        };

        UpdateTask {
            priority: Some(TaskPriority::High),
            due_date: Some(None),
            ..UpdateTask::default()
        }
        .apply_to(&mut task);

        assert_eq!(task.title, "Old");
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.due_date, None);
    }

    #[test]
    fn task_fills_missing_priority_and_status() {
        let task: Task = serde_json::from_value(json!({
            "id": Uuid::nil(),
            "title": "Legacy",
            "dueDate": null,
            "userId": Uuid::nil(),
            "createdAt": "2024-05-01T10:00:00Z",
            "updatedAt": "2024-05-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.status, TaskStatus::Todo);
    }
}
