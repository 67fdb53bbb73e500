//! View composition - presentational state derived from the task collection
//!
//! Everything here is pure: no mutation, no I/O.

use std::fmt::Write as _;

use chrono::{DateTime, Local};
use ratatui::style::{Color, Modifier, Style};
use serde::Serialize;

use crate::domain::{Priority, Task};

/// Default date format for task creation dates
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Summary statistics over the full collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    /// round(100 * completed / total), 0 when empty
    pub progress_percent: u8,
}

/// Compute summary statistics
pub fn compute_stats(tasks: &[Task]) -> Stats {
    let total = tasks.len();
    let completed = tasks.iter().filter(|t| t.completed).count();
    let progress_percent = if total == 0 {
        0
    } else {
        ((completed as f64 * 100.0) / total as f64).round() as u8
    };
    Stats {
        total,
        completed,
        progress_percent,
    }
}

/// Fixed colour for a priority badge
pub fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Low => Color::Green,
        Priority::Medium => Color::Yellow,
        Priority::High => Color::Red,
    }
}

/// Fixed style for a priority badge
pub fn priority_style(priority: Priority) -> Style {
    Style::default()
        .fg(priority_color(priority))
        .add_modifier(Modifier::BOLD)
}

/// Style for the task text, dimmed and struck through once completed
pub fn text_style(completed: bool) -> Style {
    if completed {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default()
    }
}

/// Render a creation timestamp (unix ms) as a local date
///
/// Falls back to the default format if `format` is not a valid chrono format
/// string, and to "-" for out-of-range timestamps.
pub fn format_created_at(created_at: i64, format: &str) -> String {
    let Some(utc) = DateTime::from_timestamp_millis(created_at) else {
        return "-".to_string();
    };
    let local = utc.with_timezone(&Local);

    let mut out = String::new();
    if write!(out, "{}", local.format(format)).is_ok() {
        return out;
    }
    out.clear();
    match write!(out, "{}", local.format(DEFAULT_DATE_FORMAT)) {
        Ok(()) => out,
        Err(_) => "-".to_string(),
    }
}

/// Display record for one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskRow {
    pub id: String,
    pub short_id: String,
    pub text: String,
    pub completed: bool,
    pub priority: Priority,
    pub date: String,
}

impl TaskRow {
    pub fn from_task(task: &Task, date_format: &str) -> Self {
        Self {
            id: task.id.clone(),
            short_id: task.short_id().to_string(),
            text: task.text.clone(),
            completed: task.completed,
            priority: task.priority,
            date: format_created_at(task.created_at, date_format),
        }
    }

    pub fn priority_style(&self) -> Style {
        priority_style(self.priority)
    }

    pub fn text_style(&self) -> Style {
        text_style(self.completed)
    }
}

/// Build display rows for a list of tasks
pub fn task_rows<'a>(tasks: impl IntoIterator<Item = &'a Task>, date_format: &str) -> Vec<TaskRow> {
    tasks
        .into_iter()
        .map(|t| TaskRow::from_task(t, date_format))
        .collect()
}
