//! Task ID resolution for partial references
//!
//! Task IDs are UUID strings. The CLI accepts any unique prefix.

use super::Task;

/// Resolves a partial reference to a full task ID
pub struct IdResolver<'a> {
    tasks: &'a [Task],
}

impl<'a> IdResolver<'a> {
    pub fn new(tasks: &'a [Task]) -> Self {
        Self { tasks }
    }

    /// Resolve a partial reference to a full ID
    ///
    /// Returns:
    /// - Ok(Some(id)) if exactly one match
    /// - Ok(None) if no matches
    /// - Err with candidates if ambiguous
    pub fn resolve(&self, reference: &str) -> Result<Option<String>, Vec<String>> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Ok(None);
        }

        // Exact match wins even if it is also a prefix of another ID
        if let Some(task) = self.tasks.iter().find(|t| t.id == reference) {
            return Ok(Some(task.id.clone()));
        }

        let mut matches: Vec<String> = self
            .tasks
            .iter()
            .filter(|t| t.id.starts_with(reference))
            .map(|t| t.id.clone())
            .collect();

        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            _ => Err(matches),
        }
    }
}
