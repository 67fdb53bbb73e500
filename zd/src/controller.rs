//! Controller - single owner of the task list session
//!
//! Wraps the [`TaskStore`] with the current filter, the persistence port,
//! the in-flight decomposition and the suggestion review buffer. Every
//! mutation that changes the collection is saved immediately; a failed save
//! is logged and reported through [`Controller::status`] while the in-memory
//! state stays as it is.

use tracing::{debug, info, warn};

use crate::decompose::DecomposeOutcome;
use crate::domain::{Filter, Priority, Task, TaskId};
use crate::storage::TaskRepository;
use crate::store::{Draft, TaskStore};
use crate::view::{Stats, compute_stats};

/// Handle for one decomposition request
///
/// Results are only applied while the ticket is still the in-flight one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecomposeTicket {
    pub generation: u64,
    pub text: String,
}

/// Suggestions waiting for the user's accept/cancel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub source_text: String,
    pub suggestions: Vec<String>,
}

pub struct Controller {
    store: TaskStore,
    filter: Filter,
    repo: Box<dyn TaskRepository>,
    in_flight: Option<DecomposeTicket>,
    generation: u64,
    review: Option<Review>,
    status: Option<String>,
    /// Set when the initial load failed; the stored data is left untouched
    read_only: bool,
}

impl Controller {
    /// Open a session on `repo`, loading whatever it holds
    ///
    /// A failed load starts an empty list, sets a status message and turns
    /// off saving for the session so the unread data is never overwritten.
    pub fn new(repo: Box<dyn TaskRepository>) -> Self {
        debug!(repo = %repo.describe(), "Controller::new: called");
        let (store, status, read_only) = match repo.load() {
            Ok(tasks) => {
                info!(count = tasks.len(), repo = %repo.describe(), "Loaded tasks");
                (TaskStore::from_tasks(tasks), None, false)
            }
            Err(e) => {
                warn!(error = %e, repo = %repo.describe(), "Failed to load tasks, starting empty without saving");
                (TaskStore::new(), Some(format!("Could not load tasks: {}", e)), true)
            }
        };

        Self {
            store,
            filter: Filter::default(),
            repo,
            in_flight: None,
            generation: 0,
            review: None,
            status,
            read_only,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Tasks that pass the current filter, in display order
    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.store.filtered_view(self.filter)
    }

    pub fn stats(&self) -> Stats {
        compute_stats(self.store.tasks())
    }

    pub fn storage_description(&self) -> String {
        self.repo.describe()
    }

    // Draft

    pub fn draft(&self) -> &Draft {
        self.store.draft()
    }

    pub fn set_draft_text(&mut self, text: impl Into<String>) {
        self.store.set_draft_text(text);
    }

    pub fn draft_text_mut(&mut self) -> &mut String {
        self.store.draft_text_mut()
    }

    pub fn set_draft_priority(&mut self, priority: Priority) {
        self.store.set_draft_priority(priority);
    }

    pub fn cycle_draft_priority(&mut self) {
        self.store.cycle_draft_priority();
    }

    // Collection mutations

    /// Commit the draft as a new task
    pub fn add_from_draft(&mut self) -> Option<TaskId> {
        let Draft { text, priority } = self.store.draft().clone();
        self.add_task(&text, priority)
    }

    /// Add a task; blank text is a silent no-op
    pub fn add_task(&mut self, text: &str, priority: Priority) -> Option<TaskId> {
        debug!(%priority, "Controller::add_task: called");
        let id = self.store.add_task(text, priority).map(|t| t.id.clone())?;
        info!(%id, "Task added");
        self.persist();
        Some(id)
    }

    pub fn toggle(&mut self, id: &str) -> bool {
        debug!(%id, "Controller::toggle: called");
        let changed = self.store.toggle_task(id);
        if changed {
            self.persist();
        }
        changed
    }

    pub fn delete(&mut self, id: &str) -> bool {
        debug!(%id, "Controller::delete: called");
        let changed = self.store.delete_task(id);
        if changed {
            info!(%id, "Task deleted");
            self.persist();
        }
        changed
    }

    /// Remove completed tasks, returning how many went
    pub fn clear_completed(&mut self) -> usize {
        debug!("Controller::clear_completed: called");
        let removed = self.store.clear_completed();
        if removed > 0 {
            info!(removed, "Cleared completed tasks");
            self.persist();
        }
        removed
    }

    // Filter

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: Filter) {
        debug!(%filter, "Controller::set_filter: called");
        self.filter = filter;
    }

    pub fn cycle_filter(&mut self) {
        self.filter = self.filter.next();
    }

    // Decomposition

    /// True while a decomposition request is in flight
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Start decomposing the draft
    ///
    /// Returns None when the draft is blank, a request is already in flight,
    /// or suggestions are still under review.
    pub fn begin_decompose(&mut self) -> Option<DecomposeTicket> {
        debug!("Controller::begin_decompose: called");
        if self.store.draft().is_blank() || self.in_flight.is_some() || self.review.is_some() {
            debug!("Controller::begin_decompose: not starting");
            return None;
        }
        self.generation += 1;
        let ticket = DecomposeTicket {
            generation: self.generation,
            text: self.store.draft().text.trim().to_string(),
        };
        self.in_flight = Some(ticket.clone());
        self.status = Some("Breaking task down...".to_string());
        Some(ticket)
    }

    /// Apply the result of a decomposition request
    ///
    /// Returns true when suggestions were staged for review. Stale tickets and
    /// results for a draft that has since been edited are dropped.
    pub fn finish_decompose(&mut self, ticket: &DecomposeTicket, outcome: DecomposeOutcome) -> bool {
        debug!(generation = ticket.generation, "Controller::finish_decompose: called");
        match &self.in_flight {
            Some(current) if current.generation == ticket.generation => {}
            _ => {
                debug!(generation = ticket.generation, "Controller::finish_decompose: stale result dropped");
                return false;
            }
        }
        self.in_flight = None;

        if self.store.draft().text.trim() != ticket.text {
            info!("Draft changed during breakdown, discarding suggestions");
            self.status = Some("Draft changed, suggestions discarded".to_string());
            return false;
        }

        match outcome {
            DecomposeOutcome::Suggestions(suggestions) if suggestions.is_empty() => {
                self.status = Some("No subtasks suggested".to_string());
                false
            }
            DecomposeOutcome::Suggestions(suggestions) => {
                info!(count = suggestions.len(), "Suggestions ready for review");
                self.review = Some(Review {
                    source_text: ticket.text.clone(),
                    suggestions,
                });
                self.status = None;
                true
            }
            DecomposeOutcome::Failed(e) => {
                self.status = Some(format!("Breakdown failed: {}", e));
                false
            }
        }
    }

    /// Abandon the in-flight request; its result will be dropped
    pub fn cancel_decompose(&mut self) -> bool {
        debug!("Controller::cancel_decompose: called");
        if self.in_flight.take().is_some() {
            self.status = Some("Breakdown cancelled".to_string());
            true
        } else {
            false
        }
    }

    pub fn review(&self) -> Option<&Review> {
        self.review.as_ref()
    }

    /// Add every suggestion under review with the draft priority
    ///
    /// Clears the review and the draft text. The collection is saved once.
    pub fn accept_suggestions(&mut self) -> usize {
        debug!("Controller::accept_suggestions: called");
        let Some(review) = self.review.take() else {
            return 0;
        };
        let priority = self.store.draft().priority;
        let mut added = 0;
        for suggestion in &review.suggestions {
            if self.store.add_task(suggestion, priority).is_some() {
                added += 1;
            }
        }
        self.store.clear_draft_text();
        info!(added, "Accepted suggestions");
        if added > 0 {
            self.persist();
        }
        added
    }

    /// Discard the suggestions under review, keeping the draft
    pub fn cancel_suggestions(&mut self) {
        debug!("Controller::cancel_suggestions: called");
        self.review = None;
    }

    // Status line

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// True when the initial load failed and saving is off
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn persist(&mut self) {
        if self.read_only {
            warn!(repo = %self.repo.describe(), "Not saving: tasks failed to load this session");
            self.status = Some("Not saved: the task file could not be loaded".to_string());
            return;
        }
        if let Err(e) = self.repo.save(self.store.tasks()) {
            warn!(error = %e, repo = %self.repo.describe(), "Failed to save tasks");
            self.status = Some(format!("Could not save tasks: {}", e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decompose::DecomposeError;
    use crate::llm::LlmError;
    use crate::storage::MemoryRepository;

    fn controller() -> (Controller, MemoryRepository) {
        let repo = MemoryRepository::new();
        (Controller::new(Box::new(repo.clone())), repo)
    }

    fn suggestions(items: &[&str]) -> DecomposeOutcome {
        DecomposeOutcome::Suggestions(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_end_to_end_stats() {
        let (mut c, repo) = controller();
        let report = c.add_task("Write report", Priority::Medium).unwrap();
        c.add_task("Call client", Priority::High).unwrap();
        assert!(c.toggle(&report));

        let stats = c.stats();
        assert_eq!((stats.total, stats.completed, stats.progress_percent), (2, 1, 50));
        assert_eq!(repo.stored().len(), 2);
        assert_eq!(repo.save_count(), 3);
    }

    #[test]
    fn test_noops_do_not_save() {
        let (mut c, repo) = controller();
        assert!(c.add_task("   ", Priority::Low).is_none());
        assert!(!c.toggle("missing"));
        assert!(!c.delete("missing"));
        assert_eq!(c.clear_completed(), 0);
        assert_eq!(repo.save_count(), 0);
    }

    #[test]
    fn test_loads_existing_tasks() {
        let older = Task::new("Older", Priority::Low, 1_000).unwrap();
        let newer = Task::new("Newer", Priority::High, 2_000).unwrap();
        let repo = MemoryRepository::with_tasks(vec![older, newer]);
        let c = Controller::new(Box::new(repo));

        let texts: Vec<_> = c.tasks().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Newer", "Older"]);
    }

    #[test]
    fn test_save_failure_keeps_state_and_sets_status() {
        let (mut c, repo) = controller();
        repo.set_fail_saves(true);

        assert!(c.add_task("Buy milk", Priority::High).is_some());
        assert_eq!(c.tasks().len(), 1);
        assert!(c.status().unwrap_or_default().contains("Could not save"));
        assert!(repo.stored().is_empty());
    }

    #[test]
    fn test_failed_load_never_saves() {
        let stored = Task::new("Keep me", Priority::High, 1_000).unwrap();
        let repo = MemoryRepository::with_tasks(vec![stored.clone()]);
        repo.set_fail_loads(true);
        let mut c = Controller::new(Box::new(repo.clone()));
        assert!(c.is_read_only());
        assert!(c.status().unwrap_or_default().contains("Could not load"));

        let id = c.add_task("New", Priority::Low).unwrap();
        assert!(c.toggle(&id));
        assert_eq!(c.clear_completed(), 1);

        assert_eq!(repo.save_count(), 0);
        assert_eq!(repo.stored(), vec![stored]);
        assert!(c.status().unwrap_or_default().contains("Not saved"));
    }

    #[test]
    fn test_add_from_draft_uses_draft_priority() {
        let (mut c, _) = controller();
        c.set_draft_text("Buy milk");
        c.set_draft_priority(Priority::High);

        assert!(c.add_from_draft().is_some());
        assert_eq!(c.tasks()[0].text, "Buy milk");
        assert_eq!(c.tasks()[0].priority, Priority::High);
        assert!(c.draft().text.is_empty());
        assert_eq!(c.draft().priority, Priority::High);
    }

    #[test]
    fn test_filter_visible_tasks() {
        let (mut c, _) = controller();
        let a = c.add_task("A", Priority::Low).unwrap();
        c.add_task("B", Priority::Low).unwrap();
        c.toggle(&a);

        c.set_filter(Filter::Completed);
        assert_eq!(c.visible_tasks().len(), 1);
        c.cycle_filter();
        assert_eq!(c.filter(), Filter::All);
        assert_eq!(c.visible_tasks().len(), 2);
    }

    #[test]
    fn test_begin_decompose_requires_draft() {
        let (mut c, _) = controller();
        assert!(c.begin_decompose().is_none());

        c.set_draft_text("  Plan a wedding ");
        let ticket = c.begin_decompose().unwrap();
        assert_eq!(ticket.text, "Plan a wedding");
        assert!(c.is_loading());

        // only one request at a time
        assert!(c.begin_decompose().is_none());
    }

    #[test]
    fn test_accept_suggestions_adds_all_with_draft_priority() {
        let (mut c, repo) = controller();
        c.set_draft_text("Plan a wedding");
        c.set_draft_priority(Priority::High);
        let ticket = c.begin_decompose().unwrap();

        assert!(c.finish_decompose(&ticket, suggestions(&["Book venue", "Send invites"])));
        assert!(!c.is_loading());
        assert_eq!(c.review().unwrap().suggestions.len(), 2);

        assert_eq!(c.accept_suggestions(), 2);
        assert!(c.review().is_none());
        assert!(c.draft().text.is_empty());
        assert!(c.tasks().iter().all(|t| t.priority == Priority::High));
        let texts: Vec<_> = c.tasks().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Send invites", "Book venue"]);
        assert_eq!(repo.save_count(), 1);
    }

    #[test]
    fn test_cancel_suggestions_keeps_draft() {
        let (mut c, repo) = controller();
        c.set_draft_text("Plan a wedding");
        let ticket = c.begin_decompose().unwrap();
        c.finish_decompose(&ticket, suggestions(&["Book venue"]));

        c.cancel_suggestions();
        assert!(c.review().is_none());
        assert!(c.tasks().is_empty());
        assert_eq!(c.draft().text, "Plan a wedding");
        assert_eq!(repo.save_count(), 0);
    }

    #[test]
    fn test_stale_ticket_is_dropped() {
        let (mut c, _) = controller();
        c.set_draft_text("Plan a wedding");
        let first = c.begin_decompose().unwrap();
        assert!(c.cancel_decompose());

        let second = c.begin_decompose().unwrap();
        assert!(!c.finish_decompose(&first, suggestions(&["late"])));
        assert!(c.is_loading());
        assert!(c.review().is_none());

        assert!(c.finish_decompose(&second, suggestions(&["fresh"])));
        assert_eq!(c.review().unwrap().suggestions, vec!["fresh"]);
    }

    #[test]
    fn test_result_dropped_when_draft_edited() {
        let (mut c, _) = controller();
        c.set_draft_text("Plan a wedding");
        let ticket = c.begin_decompose().unwrap();
        c.draft_text_mut().push_str(" in June");

        assert!(!c.finish_decompose(&ticket, suggestions(&["Book venue"])));
        assert!(c.review().is_none());
        assert!(!c.is_loading());
    }

    #[test]
    fn test_empty_and_failed_outcomes_have_distinct_status() {
        let (mut c, _) = controller();
        c.set_draft_text("Plan a wedding");

        let ticket = c.begin_decompose().unwrap();
        c.finish_decompose(&ticket, suggestions(&[]));
        let empty_status = c.status().map(str::to_string);

        let ticket = c.begin_decompose().unwrap();
        let err = DecomposeError::Llm(LlmError::MissingApiKey("GEMINI_API_KEY".to_string()));
        c.finish_decompose(&ticket, DecomposeOutcome::Failed(err));
        let failed_status = c.status().map(str::to_string);

        assert!(empty_status.is_some());
        assert!(failed_status.unwrap_or_default().contains("GEMINI_API_KEY"));
        assert_ne!(empty_status, c.status().map(str::to_string));
        assert!(c.review().is_none());
    }

    #[test]
    fn test_no_decompose_while_reviewing() {
        let (mut c, _) = controller();
        c.set_draft_text("Plan a wedding");
        let ticket = c.begin_decompose().unwrap();
        c.finish_decompose(&ticket, suggestions(&["Book venue"]));
        assert!(c.begin_decompose().is_none());
    }
}
