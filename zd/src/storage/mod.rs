//! Persistence port for the task collection
//!
//! The controller talks to storage only through [`TaskRepository`]: load the
//! whole collection once at startup, overwrite it after every change.
//! [`JsonFileRepository`] is the real backend; [`MemoryRepository`] backs tests
//! and `--ephemeral` sessions.

mod error;
mod json_file;
mod memory;

pub use error::StorageError;
pub use json_file::{JsonFileRepository, STORAGE_KEY};
pub use memory::MemoryRepository;

use crate::domain::Task;

/// Load/save contract for the full task collection
pub trait TaskRepository: Send {
    /// Load the stored collection
    ///
    /// A missing store yields an empty collection.
    fn load(&self) -> Result<Vec<Task>, StorageError>;

    /// Overwrite the stored collection with `tasks`
    fn save(&self, tasks: &[Task]) -> Result<(), StorageError>;

    /// Human-readable location, for logs and `zd config`
    fn describe(&self) -> String;
}
