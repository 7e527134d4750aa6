//! Model runtime adapters.
//!
//! A model runtime is an external command-line program that lists installed
//! models and generates text for a prompt written to its stdin. Every call is
//! a single subprocess round trip bounded by an explicit timeout.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub mod mock;
pub mod ollama;

pub use mock::ScriptedRuntime;
pub use ollama::OllamaCli;

/// Outcome of one generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    /// The runtime exited successfully; `text` is its decoded stdout.
    Completed { text: String },
    /// The call exceeded its timeout and the child was killed.
    TimedOut { after: Duration },
    /// The runtime exited with a nonzero status.
    Failed { code: Option<i32>, stderr: String },
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("{program} is not installed")]
    NotInstalled { program: String },
    #[error("{program} is not running: {detail}")]
    NotRunning { program: String, detail: String },
    #[error("{program} is not responding (no answer within {after:?})")]
    Unresponsive { program: String, after: Duration },
    #[error("Model {model} not found. Available models:\n{}", .available.join("\n"))]
    ModelNotFound {
        model: String,
        available: Vec<String>,
    },
    #[error("failed to talk to {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

#[async_trait]
pub trait ModelRuntime: Send + Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &str;

    /// Names of the models the runtime can serve.
    async fn list_models(&self) -> Result<Vec<String>, RuntimeError>;

    /// Run `model` on `prompt`, waiting at most `timeout`.
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        timeout: Duration,
    ) -> Result<Generation, RuntimeError>;

    /// Readiness probe: the runtime answers and serves `model`.
    async fn probe(&self, model: &str) -> Result<(), RuntimeError> {
        let available = self.list_models().await?;
        if available.iter().any(|listed| model_matches(listed, model)) {
            Ok(())
        } else {
            Err(RuntimeError::ModelNotFound {
                model: model.to_string(),
                available,
            })
        }
    }
}

/// Parse a tabular model listing: one header row, then one model per line
/// with the model name in the first column.
pub fn parse_model_listing(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with("NAME"))
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

/// A listed `name:latest` satisfies a request for plain `name`.
pub fn model_matches(listed: &str, wanted: &str) -> bool {
    if listed == wanted {
        return true;
    }
    match listed.strip_suffix(":latest") {
        Some(base) => base == wanted,
        None => false,
    }
}
