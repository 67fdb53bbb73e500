//! TaskStore - the ordered task collection and the input draft
//!
//! Pure in-memory state. Mutations report whether anything changed; persisting
//! the result is the controller's job.
//!
//! Ordering is structural: the collection is always sorted by `created_at`
//! descending, and every new task gets a `created_at` strictly greater than any
//! existing one, so it lands at the front.

use std::cmp::Reverse;
use std::collections::HashSet;

use tracing::{debug, warn};

use crate::domain::{Filter, Priority, Task};

/// Not-yet-committed input for a new task
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub text: String,
    pub priority: Priority,
}

impl Draft {
    /// Check whether the draft would produce a task
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Ordered task collection plus the pending draft
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    draft: Draft,
}

impl TaskStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from previously persisted tasks
    ///
    /// Tasks are sorted newest-first; ties keep their stored order. Records
    /// with blank text or a duplicate ID are dropped.
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        debug!(count = tasks.len(), "TaskStore::from_tasks: called");
        let mut seen = HashSet::new();
        let mut kept: Vec<Task> = Vec::with_capacity(tasks.len());
        for task in tasks {
            if task.text.trim().is_empty() {
                warn!(id = %task.id, "Dropping stored task with empty text");
                continue;
            }
            if !seen.insert(task.id.clone()) {
                warn!(id = %task.id, "Dropping stored task with duplicate id");
                continue;
            }
            kept.push(task);
        }
        kept.sort_by_key(|t| Reverse(t.created_at));
        Self {
            tasks: kept,
            draft: Draft::default(),
        }
    }

    /// All tasks, newest first
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn set_draft_text(&mut self, text: impl Into<String>) {
        self.draft.text = text.into();
    }

    pub fn draft_text_mut(&mut self) -> &mut String {
        &mut self.draft.text
    }

    pub fn clear_draft_text(&mut self) {
        self.draft.text.clear();
    }

    pub fn set_draft_priority(&mut self, priority: Priority) {
        self.draft.priority = priority;
    }

    pub fn cycle_draft_priority(&mut self) {
        self.draft.priority = self.draft.priority.cycle();
    }

    /// Add a task stamped with the current time
    pub fn add_task(&mut self, text: &str, priority: Priority) -> Option<&Task> {
        self.add_task_at(text, priority, chrono::Utc::now().timestamp_millis())
    }

    /// Add a task stamped with `now_ms`
    ///
    /// No-op returning None when `text` is blank. On success the task is
    /// placed first and the draft text is cleared.
    pub fn add_task_at(&mut self, text: &str, priority: Priority, now_ms: i64) -> Option<&Task> {
        debug!(text_len = text.len(), %priority, "TaskStore::add_task_at: called");
        let created_at = self.next_created_at(now_ms);
        let task = Task::new(text, priority, created_at)?;
        debug!(id = %task.id, created_at, "TaskStore::add_task_at: created");
        self.tasks.insert(0, task);
        self.draft.text.clear();
        self.tasks.first()
    }

    /// Timestamp for a new task, bumped past the newest existing one
    fn next_created_at(&self, now_ms: i64) -> i64 {
        match self.tasks.first() {
            Some(newest) if newest.created_at >= now_ms => newest.created_at.saturating_add(1),
            _ => now_ms,
        }
    }

    /// Flip `completed` on the task with `id`
    ///
    /// Returns false (and changes nothing) when no such task exists.
    pub fn toggle_task(&mut self, id: &str) -> bool {
        debug!(%id, "TaskStore::toggle_task: called");
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.completed = !task.completed;
                debug!(%id, completed = task.completed, "TaskStore::toggle_task: toggled");
                true
            }
            None => {
                debug!(%id, "TaskStore::toggle_task: unknown id, ignoring");
                false
            }
        }
    }

    /// Remove the task with `id`; returns false when it was not present
    pub fn delete_task(&mut self, id: &str) -> bool {
        debug!(%id, "TaskStore::delete_task: called");
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    /// Remove every completed task, returning how many were removed
    pub fn clear_completed(&mut self) -> usize {
        debug!("TaskStore::clear_completed: called");
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.completed);
        let removed = before - self.tasks.len();
        debug!(removed, "TaskStore::clear_completed: done");
        removed
    }

    /// Tasks matching `filter`, in collection order
    pub fn filtered_view(&self, filter: Filter) -> Vec<&Task> {
        self.tasks.iter().filter(|t| filter.matches(t)).collect()
    }
}
