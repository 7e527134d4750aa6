//! `ollama` command-line runtime.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::{parse_model_listing, Generation, ModelRuntime, RuntimeError};

/// Drives a locally installed runtime through `<program> list` and
/// `<program> run <model>`.
#[derive(Debug, Clone)]
pub struct OllamaCli {
    program: String,
    probe_timeout: Duration,
}

impl OllamaCli {
    pub fn new(program: impl Into<String>, probe_timeout: Duration) -> Self {
        Self {
            program: program.into(),
            probe_timeout,
        }
    }

    fn spawn_error(&self, source: std::io::Error) -> RuntimeError {
        if source.kind() == ErrorKind::NotFound {
            RuntimeError::NotInstalled {
                program: self.program.clone(),
            }
        } else {
            RuntimeError::Io {
                program: self.program.clone(),
                source,
            }
        }
    }
}

impl Default for OllamaCli {
    fn default() -> Self {
        Self::new("ollama", Duration::from_secs(5))
    }
}

#[async_trait]
impl ModelRuntime for OllamaCli {
    fn name(&self) -> &str {
        &self.program
    }

    async fn list_models(&self) -> Result<Vec<String>, RuntimeError> {
        let output = Command::new(&self.program)
            .arg("list")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.probe_timeout, output)
            .await
            .map_err(|_| RuntimeError::Unresponsive {
                program: self.program.clone(),
                after: self.probe_timeout,
            })?
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let detail = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(RuntimeError::NotRunning {
                program: self.program.clone(),
                detail,
            });
        }

        let models = parse_model_listing(&String::from_utf8_lossy(&output.stdout));
        debug!("{} lists {} models", self.program, models.len());
        Ok(models)
    }

    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        timeout: Duration,
    ) -> Result<Generation, RuntimeError> {
        debug!(
            "Running {} run {} with a {} char prompt",
            self.program,
            model,
            prompt.chars().count()
        );

        let mut child = Command::new(&self.program)
            .arg("run")
            .arg(model)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        // The prompt is written while stdout and stderr are drained, so a
        // runtime that answers before it has read all its input cannot block
        // on a full pipe.
        let stdin = child.stdin.take();
        let write_prompt = async move {
            if let Some(mut stdin) = stdin {
                // A runtime that exits before reading its input is reported
                // through its exit status, not as a write error.
                match stdin.write_all(prompt.as_bytes()).await {
                    Ok(()) => {}
                    Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                        debug!("Runtime closed stdin early");
                    }
                    Err(e) => return Err(e),
                }
            }
            Ok(())
        };
        let exchange = async move {
            let ((), output) = tokio::try_join!(write_prompt, child.wait_with_output())?;
            Ok::<_, std::io::Error>(output)
        };

        let output = match tokio::time::timeout(timeout, exchange).await {
            Ok(result) => result.map_err(|source| RuntimeError::Io {
                program: self.program.clone(),
                source,
            })?,
            Err(_) => {
                warn!("{} run {} timed out after {:?}", self.program, model, timeout);
                return Ok(Generation::TimedOut { after: timeout });
            }
        };

        if !output.status.success() {
            return Ok(Generation::Failed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(Generation::Completed {
            text: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}
