//! The Task record
//!
//! Serialized field names match the persisted format exactly:
//! `id, text, completed, createdAt, priority, category`.

use serde::{Deserialize, Serialize};

use super::Priority;

/// Unique identifier for a task
pub type TaskId = String;

/// Category assigned to every task; there is no way to change it yet
pub const DEFAULT_CATEGORY: &str = "General";

/// A single tracked to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Opaque unique ID (UUID string)
    pub id: TaskId,
    /// Trimmed, never empty
    pub text: String,
    pub completed: bool,
    /// Creation timestamp (unix ms)
    pub created_at: i64,
    pub priority: Priority,
    pub category: String,
}

impl Task {
    /// Create a new, incomplete task
    ///
    /// Returns None when `text` is blank after trimming.
    pub fn new(text: &str, priority: Priority, created_at: i64) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            id: uuid::Uuid::now_v7().to_string(),
            text: text.to_string(),
            completed: false,
            created_at,
            priority,
            category: DEFAULT_CATEGORY.to_string(),
        })
    }

    /// Short ID for display (first 8 chars)
    pub fn short_id(&self) -> &str {
        let end = self.id.char_indices().nth(8).map(|(i, _)| i).unwrap_or(self.id.len());
        &self.id[..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_text() {
        let task = Task::new("  Buy milk  ", Priority::High, 1_000).unwrap();
        assert_eq!(task.text, "Buy milk");
        assert!(!task.completed);
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.category, DEFAULT_CATEGORY);
        assert_eq!(task.created_at, 1_000);
    }

    #[test]
    fn test_new_rejects_blank() {
        assert!(Task::new("", Priority::Low, 0).is_none());
        assert!(Task::new("   \t\n", Priority::Low, 0).is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Task::new("a", Priority::Low, 0).unwrap();
        let b = Task::new("b", Priority::Low, 0).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_serialized_field_names() {
        let task = Task {
            id: "abc".to_string(),
            text: "Write report".to_string(),
            completed: true,
            created_at: 1_700_000_000_000,
            priority: Priority::Medium,
            category: "General".to_string(),
        };
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["id"], "abc");
        assert_eq!(value["text"], "Write report");
        assert_eq!(value["completed"], true);
        assert_eq!(value["createdAt"], 1_700_000_000_000i64);
        assert_eq!(value["priority"], "medium");
        assert_eq!(value["category"], "General");
        assert_eq!(value.as_object().unwrap().len(), 6);
    }

    #[test]
    fn test_short_id() {
        let task = Task {
            id: "0192f3a4-b5c6-7d8e".to_string(),
            text: "x".to_string(),
            completed: false,
            created_at: 0,
            priority: Priority::Low,
            category: DEFAULT_CATEGORY.to_string(),
        };
        assert_eq!(task.short_id(), "0192f3a4");
    }
}
