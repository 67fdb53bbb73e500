//! In-memory backend

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;

use super::{StorageError, TaskRepository};
use crate::domain::Task;

/// Keeps the "stored" collection in memory
///
/// Clones share state, so a test can hand one clone to the controller and
/// inspect another.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    tasks: Arc<Mutex<Vec<Task>>>,
    save_count: Arc<AtomicUsize>,
    fail_saves: Arc<AtomicBool>,
    fail_loads: Arc<AtomicBool>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an already-stored collection
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Arc::new(Mutex::new(tasks)),
            ..Self::default()
        }
    }

    /// Snapshot of the stored collection
    pub fn stored(&self) -> Vec<Task> {
        self.tasks.lock().map(|t| t.clone()).unwrap_or_default()
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }

    /// Make subsequent saves fail
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent loads fail
    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }
}

impl TaskRepository for MemoryRepository {
    fn load(&self) -> Result<Vec<Task>, StorageError> {
        debug!("MemoryRepository::load: called");
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("load failure injected".to_string()));
        }
        self.tasks
            .lock()
            .map(|t| t.clone())
            .map_err(|e| StorageError::Unavailable(e.to_string()))
    }

    fn save(&self, tasks: &[Task]) -> Result<(), StorageError> {
        debug!(count = tasks.len(), "MemoryRepository::save: called");
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("saves disabled".to_string()));
        }
        let mut stored = self
            .tasks
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        *stored = tasks.to_vec();
        self.save_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Priority;

    #[test]
    fn test_clones_share_state() {
        let repo = MemoryRepository::new();
        let handle = repo.clone();
        let task = Task::new("a", Priority::Low, 0).unwrap();

        repo.save(std::slice::from_ref(&task)).unwrap();
        assert_eq!(handle.stored(), vec![task]);
        assert_eq!(handle.save_count(), 1);
    }

    #[test]
    fn test_fail_saves() {
        let repo = MemoryRepository::new();
        repo.set_fail_saves(true);
        assert!(repo.save(&[]).is_err());
        assert_eq!(repo.save_count(), 0);
    }
}
