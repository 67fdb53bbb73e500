//! Domain types for ZenDo
//!
//! Core domain types: Task, Priority, Filter.

mod filter;
mod id;
mod priority;
mod task;

pub use filter::Filter;
pub use id::IdResolver;
pub use priority::Priority;
pub use task::{DEFAULT_CATEGORY, Task, TaskId};
