//! TUI state types

use crate::controller::{Controller, DecomposeTicket};
use crate::domain::TaskId;
use crate::view::DEFAULT_DATE_FORMAT;

/// Spinner frames shown while a breakdown is in flight
pub const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// How keys are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    /// Navigate and act on the list
    #[default]
    Normal,
    /// Typing into the draft line
    Editing,
    /// Help overlay
    Help,
}

/// Cursor over the visible task list
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    pub selected_index: usize,
}

impl SelectionState {
    pub fn select_next(&mut self, max_items: usize) {
        if max_items > 0 && self.selected_index < max_items - 1 {
            self.selected_index += 1;
        }
    }

    pub fn select_prev(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    pub fn select_last(&mut self, max_items: usize) {
        if max_items > 0 {
            self.selected_index = max_items - 1;
        }
    }

    /// Ensure selection is within bounds
    pub fn clamp(&mut self, max_items: usize) {
        if max_items == 0 {
            self.selected_index = 0;
        } else if self.selected_index >= max_items {
            self.selected_index = max_items - 1;
        }
    }
}

/// Main TUI application state
pub struct AppState {
    /// Task session
    pub controller: Controller,

    /// Current key interpretation
    pub mode: InteractionMode,

    /// Selection within the filtered list
    pub selection: SelectionState,

    /// Set when the user asked to quit
    pub should_quit: bool,

    /// Breakdown the runner should start
    pub pending_decompose: Option<DecomposeTicket>,

    /// chrono format for task dates
    pub date_format: String,

    /// Animation counter, advanced on every tick
    pub tick_count: usize,
}

impl AppState {
    pub fn new(controller: Controller) -> Self {
        Self {
            controller,
            mode: InteractionMode::default(),
            selection: SelectionState::default(),
            should_quit: false,
            pending_decompose: None,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            tick_count: 0,
        }
    }

    pub fn with_date_format(mut self, date_format: impl Into<String>) -> Self {
        self.date_format = date_format.into();
        self
    }

    pub fn tick(&mut self) {
        self.tick_count = self.tick_count.wrapping_add(1);
    }

    pub fn spinner(&self) -> &'static str {
        SPINNER[self.tick_count % SPINNER.len()]
    }

    /// Number of tasks passing the current filter
    pub fn visible_count(&self) -> usize {
        self.controller.visible_tasks().len()
    }

    /// ID of the highlighted task, if any
    pub fn selected_task_id(&self) -> Option<TaskId> {
        self.controller
            .visible_tasks()
            .get(self.selection.selected_index)
            .map(|t| t.id.clone())
    }

    /// Keep the cursor on an existing row after the list changed
    pub fn clamp_selection(&mut self) {
        let count = self.visible_count();
        self.selection.clamp(count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Priority;
    use crate::storage::MemoryRepository;

    fn state() -> AppState {
        AppState::new(Controller::new(Box::new(MemoryRepository::new())))
    }

    #[test]
    fn test_selection_bounds() {
        let mut sel = SelectionState::default();
        sel.select_prev();
        assert_eq!(sel.selected_index, 0);
        sel.select_next(3);
        sel.select_next(3);
        sel.select_next(3);
        assert_eq!(sel.selected_index, 2);
        sel.clamp(1);
        assert_eq!(sel.selected_index, 0);
        sel.select_last(5);
        assert_eq!(sel.selected_index, 4);
        sel.select_first();
        assert_eq!(sel.selected_index, 0);
    }

    #[test]
    fn test_selected_task_follows_visible_list() {
        let mut s = state();
        assert!(s.selected_task_id().is_none());

        let older = s.controller.add_task("Older", Priority::Low).unwrap();
        let newer = s.controller.add_task("Newer", Priority::Low).unwrap();
        assert_eq!(s.selected_task_id(), Some(newer));

        s.selection.select_next(s.visible_count());
        assert_eq!(s.selected_task_id(), Some(older));
    }

    #[test]
    fn test_spinner_cycles() {
        let mut s = state();
        let first = s.spinner();
        s.tick();
        assert_ne!(first, s.spinner());
    }
}
