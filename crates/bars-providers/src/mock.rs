//! Scripted runtime for deterministic tests without a model installed.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::{Generation, ModelRuntime, RuntimeError};

/// Pre-programmed reply for one `generate` call.
pub enum ScriptedReply {
    Generation(Generation),
    Error(RuntimeError),
}

/// Returns queued replies in order and records every prompt it receives.
/// An exhausted queue answers with an empty completion.
pub struct ScriptedRuntime {
    models: Vec<String>,
    unavailable: Option<String>,
    replies: Mutex<VecDeque<ScriptedReply>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedRuntime {
    pub fn new(models: &[&str]) -> Self {
        Self {
            models: models.iter().map(|m| m.to_string()).collect(),
            unavailable: None,
            replies: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A runtime whose listing always fails as if the daemon were down.
    pub fn unavailable(detail: &str) -> Self {
        let mut runtime = Self::new(&[]);
        runtime.unavailable = Some(detail.to_string());
        runtime
    }

    pub fn with_text(self, text: &str) -> Self {
        self.with_reply(ScriptedReply::Generation(Generation::Completed {
            text: text.to_string(),
        }))
    }

    pub fn with_timeout(self, after: Duration) -> Self {
        self.with_reply(ScriptedReply::Generation(Generation::TimedOut { after }))
    }

    pub fn with_failure(self, code: i32, stderr: &str) -> Self {
        self.with_reply(ScriptedReply::Generation(Generation::Failed {
            code: Some(code),
            stderr: stderr.to_string(),
        }))
    }

    pub fn with_reply(self, reply: ScriptedReply) -> Self {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
        self
    }

    /// Every prompt passed to `generate`, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl ModelRuntime for ScriptedRuntime {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn list_models(&self) -> Result<Vec<String>, RuntimeError> {
        match &self.unavailable {
            Some(detail) => Err(RuntimeError::NotRunning {
                program: self.name().to_string(),
                detail: detail.clone(),
            }),
            None => Ok(self.models.clone()),
        }
    }

    async fn generate(
        &self,
        _model: &str,
        prompt: &str,
        _timeout: Duration,
    ) -> Result<Generation, RuntimeError> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.to_string());

        let reply = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        match reply {
            Some(ScriptedReply::Generation(generation)) => Ok(generation),
            Some(ScriptedReply::Error(err)) => Err(err),
            None => Ok(Generation::Completed {
                text: String::new(),
            }),
        }
    }
}
