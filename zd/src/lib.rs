//! ZenDo - a single-user task list with AI-assisted task breakdown
//!
//! Tasks carry a priority and a completion flag, are kept newest-first and
//! persist as a JSON array after every change. A draft task can be sent to a
//! generative-AI provider which suggests 3-5 subtasks; the suggestions are
//! reviewed and then added all at once or discarded.
//!
//! # Modules
//!
//! - [`domain`] - Task, Priority, Filter and ID prefix resolution
//! - [`store`] - Ordered in-memory collection plus the input draft
//! - [`view`] - Stats and per-task display mapping
//! - [`storage`] - Persistence port with JSON file and in-memory backends
//! - [`llm`] - Gemini, Anthropic and OpenAI completion clients
//! - [`decompose`] - Task breakdown on top of [`llm`]
//! - [`controller`] - Session owner: mutations, persistence, review buffer
//! - [`tui`] - Terminal interface
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod controller;
pub mod decompose;
pub mod domain;
pub mod llm;
pub mod storage;
pub mod store;
pub mod tui;
pub mod view;

// Re-export commonly used types
pub use config::{Config, LlmConfig};
pub use controller::{Controller, DecomposeTicket, Review};
pub use decompose::{DecomposeError, DecomposeOutcome, Decomposer};
pub use domain::{Filter, Priority, Task, TaskId};
pub use storage::{JsonFileRepository, MemoryRepository, StorageError, TaskRepository};
pub use store::{Draft, TaskStore};
pub use view::{Stats, TaskRow, compute_stats};
