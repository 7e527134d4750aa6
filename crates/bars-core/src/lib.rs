//! Core engine for the Bars assistant shell.
//!
//! A [`Session`] owns the configuration, the system prompt, the memory
//! document and a [`ModelRuntime`](bars_providers::ModelRuntime). Each user line
//! becomes a prompt via [`context`], goes through the runtime, is cleaned by
//! [`cleaner`] and, for project requests, is written to disk by [`project`].

pub mod cleaner;
pub mod context;
pub mod dialogue;
pub mod error;
pub mod memory;
pub mod paths;
pub mod project;
pub mod prompt;
pub mod runner;
pub mod session;
pub mod turn_result;

pub use cleaner::{clean_response, trim_dialogue};
pub use context::{ContextBuilder, PromptMode};
pub use dialogue::DialogueMarkers;
pub use error::{BarsError, Result};
pub use memory::{MemoryDocument, MemoryStore, SnapshotEntry, Turn};
pub use paths::Paths;
pub use project::{CodeFile, ProjectReport, ProjectSummary};
pub use runner::ExecutionReport;
pub use session::{MemoryStats, Session};
pub use turn_result::TurnResult;
