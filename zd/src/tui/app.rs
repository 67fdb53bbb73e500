//! TUI application - keyboard handling
//!
//! The App struct owns the AppState and turns key events into controller
//! calls. It does no rendering and no I/O of its own; a requested
//! breakdown is left in `pending_decompose` for the runner to start.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use super::state::{AppState, InteractionMode};
use crate::controller::Controller;
use crate::domain::Filter;

/// TUI application
pub struct App {
    state: AppState,
}

impl App {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Create an app over `controller` with default display settings
    pub fn with_controller(controller: Controller) -> Self {
        Self::new(AppState::new(controller))
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    /// Handle a key event
    ///
    /// Returns true if the application should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        debug!(?key, mode = ?self.state.mode, "App::handle_key: called");
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }

        // Transient messages last until the next key, except while loading
        if !self.state.controller.is_loading() {
            self.state.controller.clear_status();
        }

        if self.state.controller.review().is_some() {
            self.handle_review_key(key);
        } else {
            match self.state.mode {
                InteractionMode::Normal => self.handle_normal_key(key),
                InteractionMode::Editing => self.handle_editing_key(key),
                InteractionMode::Help => self.state.mode = InteractionMode::Normal,
            }
        }

        self.state.clamp_selection();
        self.state.should_quit
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match (key.code, key.modifiers) {
            (KeyCode::Char('q'), _) => {
                self.state.should_quit = true;
            }
            (KeyCode::Char('?'), _) | (KeyCode::F(1), _) => {
                self.state.mode = InteractionMode::Help;
            }
            (KeyCode::Char('i'), _) | (KeyCode::Char('a'), _) => {
                self.state.mode = InteractionMode::Editing;
            }
            (KeyCode::Enter, _) => {
                if self.state.controller.draft().is_blank() {
                    self.state.mode = InteractionMode::Editing;
                } else {
                    self.add_draft();
                }
            }
            (KeyCode::Esc, _) => {
                self.state.controller.cancel_decompose();
            }

            // === Navigation ===
            (KeyCode::Up, _) | (KeyCode::Char('k'), _) => {
                self.state.selection.select_prev();
            }
            (KeyCode::Down, _) | (KeyCode::Char('j'), _) => {
                let max = self.state.visible_count();
                self.state.selection.select_next(max);
            }
            (KeyCode::Home, _) | (KeyCode::Char('g'), _) => {
                self.state.selection.select_first();
            }
            (KeyCode::End, _) | (KeyCode::Char('G'), _) => {
                let max = self.state.visible_count();
                self.state.selection.select_last(max);
            }

            // === Task actions ===
            (KeyCode::Char(' '), _) | (KeyCode::Char('x'), _) => {
                if let Some(id) = self.state.selected_task_id() {
                    self.state.controller.toggle(&id);
                }
            }
            (KeyCode::Char('d'), KeyModifiers::NONE) | (KeyCode::Delete, _) => {
                if let Some(id) = self.state.selected_task_id() {
                    self.state.controller.delete(&id);
                }
            }
            (KeyCode::Char('C'), _) => {
                let removed = self.state.controller.clear_completed();
                if removed > 0 && self.state.controller.status().is_none() {
                    self.state
                        .controller
                        .set_status(format!("Cleared {} completed", removed));
                }
            }

            // === Filter ===
            (KeyCode::Char('1'), _) => self.set_filter(Filter::All),
            (KeyCode::Char('2'), _) => self.set_filter(Filter::Active),
            (KeyCode::Char('3'), _) => self.set_filter(Filter::Completed),
            (KeyCode::Char('f'), _) => {
                self.state.controller.cycle_filter();
                self.state.selection.select_first();
            }

            // === Draft ===
            (KeyCode::Tab, _) => {
                self.state.controller.cycle_draft_priority();
            }
            (KeyCode::Char('d'), KeyModifiers::CONTROL) | (KeyCode::F(2), _) => {
                self.request_decompose();
            }

            _ => {}
        }
    }

    fn handle_editing_key(&mut self, key: KeyEvent) {
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => {
                if !self.state.controller.cancel_decompose() {
                    self.state.mode = InteractionMode::Normal;
                }
            }
            (KeyCode::Enter, _) => {
                self.add_draft();
            }
            (KeyCode::Tab, _) => {
                self.state.controller.cycle_draft_priority();
            }
            (KeyCode::Char('d'), KeyModifiers::CONTROL) | (KeyCode::F(2), _) => {
                self.request_decompose();
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.state.controller.draft_text_mut().clear();
            }
            (KeyCode::Backspace, _) => {
                self.state.controller.draft_text_mut().pop();
            }
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.state.controller.draft_text_mut().push(c);
            }
            _ => {}
        }
    }

    fn handle_review_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Char('y') => {
                let added = self.state.controller.accept_suggestions();
                self.state.selection.select_first();
                if added > 0 && self.state.controller.status().is_none() {
                    self.state.controller.set_status(format!("Added {} tasks", added));
                }
            }
            KeyCode::Esc | KeyCode::Char('n') => {
                self.state.controller.cancel_suggestions();
            }
            _ => {}
        }
    }

    fn add_draft(&mut self) {
        if self.state.controller.add_from_draft().is_some() {
            self.state.selection.select_first();
        }
    }

    fn set_filter(&mut self, filter: Filter) {
        self.state.controller.set_filter(filter);
        self.state.selection.select_first();
    }

    fn request_decompose(&mut self) {
        match self.state.controller.begin_decompose() {
            Some(ticket) => {
                debug!(generation = ticket.generation, "App::request_decompose: ticket issued");
                self.state.pending_decompose = Some(ticket);
            }
            None if self.state.controller.draft().is_blank() => {
                self.state.controller.set_status("Type a task to break down first");
            }
            None => {}
        }
    }
}
