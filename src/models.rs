use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch.
pub type Timestamp = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Rank used by the priority sort: higher wins.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurring {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl Recurring {
    /// Fixed day counts; deliberately not calendar-aware.
    pub fn interval_days(self) -> Option<i64> {
        match self {
            Recurring::None => None,
            Recurring::Daily => Some(1),
            Recurring::Weekly => Some(7),
            Recurring::Monthly => Some(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

/// Persisted as a JSON array under the storage key; camelCase matches the
/// on-disk blob format. Every optional field has a serde default so a
/// partially-shaped persisted or imported task still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub created_at: Timestamp,
    #[serde(default)]
    pub emoji: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub due_at: Option<Timestamp>,
    #[serde(default)]
    pub recurring: Recurring,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

impl Task {
    pub fn new(text: String, created_at: Timestamp, extras: TaskExtras) -> Self {
        Self {
            id: fresh_id(),
            text,
            completed: false,
            created_at,
            emoji: extras.emoji,
            priority: extras.priority,
            category: extras.category,
            due_at: extras.due_at,
            recurring: extras.recurring,
            description: extras.description,
            subtasks: Vec::new(),
        }
    }
}

/// Optional fields supplied alongside the task text at creation time.
#[derive(Debug, Clone, Default)]
pub struct TaskExtras {
    pub emoji: String,
    pub priority: Priority,
    pub category: String,
    pub due_at: Option<Timestamp>,
    pub recurring: Recurring,
    pub description: String,
}

/// Full detail edit (the modal save in the UI). A blank `text` keeps the
/// existing title instead of deleting the task.
#[derive(Debug, Clone, Default)]
pub struct TaskDetails {
    pub text: String,
    pub description: String,
    pub priority: Priority,
    pub category: String,
    pub due_at: Option<Timestamp>,
}

pub fn fresh_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_rank_orders_high_over_medium_over_low() {
        assert!(Priority::High.rank() > Priority::Medium.rank());
        assert!(Priority::Medium.rank() > Priority::Low.rank());
    }

    #[test]
    fn recurring_interval_days_uses_fixed_counts() {
        assert_eq!(Recurring::None.interval_days(), None);
        assert_eq!(Recurring::Daily.interval_days(), Some(1));
        assert_eq!(Recurring::Weekly.interval_days(), Some(7));
        assert_eq!(Recurring::Monthly.interval_days(), Some(30));
    }

    #[test]
    fn task_serializes_with_camel_case_field_names() {
        let task = Task::new(
            "water plants".into(),
            1_700_000_000_000,
            TaskExtras::default(),
        );
        let value = serde_json::to_value(&task).expect("serialize task");
        assert_eq!(value["createdAt"], serde_json::json!(1_700_000_000_000i64));
        assert_eq!(value["dueAt"], serde_json::Value::Null);
        assert_eq!(value["priority"], serde_json::json!("medium"));
        assert_eq!(value["recurring"], serde_json::json!("none"));
    }

    #[test]
    fn task_deserialization_applies_defaults_for_missing_fields() {
        let json = r#"{ "id": "t1", "text": "bare" }"#;
        let task: Task = serde_json::from_str(json).expect("task should deserialize");
        assert!(!task.completed);
        assert_eq!(task.created_at, 0);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.recurring, Recurring::None);
        assert_eq!(task.due_at, None);
        assert!(task.subtasks.is_empty());
        assert!(task.emoji.is_empty());
    }

    #[test]
    fn fresh_ids_are_unique() {
        let a = fresh_id();
        let b = fresh_id();
        assert_ne!(a, b);
        assert!(!a.is_empty());
    }
}
