//! A Bars session: everything one running shell needs, passed explicitly.

use bars_config::Config;
use bars_providers::{Generation, ModelRuntime};
use chrono::Local;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info};

use crate::cleaner::{clean_response, trim_dialogue};
use crate::context::{ContextBuilder, PromptMode};
use crate::dialogue::DialogueMarkers;
use crate::error::Result;
use crate::memory::{MemoryDocument, MemoryStore, Turn};
use crate::paths::Paths;
use crate::project::{self, ProjectReport, ProjectSummary};
use crate::prompt::load_system_prompt;
use crate::runner::{self, ExecutionReport};
use crate::turn_result::TurnResult;

/// Counts shown by the `stats` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryStats {
    pub turns: usize,
    pub facts: usize,
    pub projects: usize,
    pub model: String,
    pub root: PathBuf,
}

pub struct Session<R: ModelRuntime> {
    config: Config,
    paths: Paths,
    markers: DialogueMarkers,
    system_prompt: String,
    store: MemoryStore,
    memory: MemoryDocument,
    model: String,
    runtime: R,
}

impl<R: ModelRuntime> Session<R> {
    /// Prepare the root directory, load the system prompt and memory, and
    /// take a fresh project snapshot.
    pub fn open(config: Config, runtime: R) -> Result<Self> {
        let paths = Paths::new(config.paths.root());
        paths.ensure_dirs()?;

        let system_prompt = load_system_prompt(&paths.system_prompt())?;
        let markers = DialogueMarkers::from(&config.persona);
        let store = MemoryStore::new(paths.memory_file(), markers.clone());
        let memory = store.open(&paths.legacy_log());
        let model = config.runtime.model.clone();

        let mut session = Self {
            config,
            paths,
            markers,
            system_prompt,
            store,
            memory,
            model,
            runtime,
        };
        session.rescan()?;

        info!(
            "Session opened at {} with {} turns and {} facts",
            session.paths.root().display(),
            session.memory.turns.len(),
            session.memory.facts.len()
        );
        Ok(session)
    }

    /// Check that the runtime answers and serves the current model.
    pub async fn ensure_ready(&self) -> Result<()> {
        self.runtime.probe(&self.model).await?;
        Ok(())
    }

    /// Send one user line through the model and record the turn.
    ///
    /// Only a completed generation is stored. Timeouts, nonzero exits and
    /// spawn failures come back as a message with `persisted == false`.
    pub async fn respond(&mut self, input: &str) -> TurnResult {
        let started = Instant::now();
        let mode = if project::is_project_request(input) {
            PromptMode::Project
        } else {
            PromptMode::Chat
        };

        let prompt = ContextBuilder::new(&self.system_prompt, &self.markers, &self.config.memory)
            .build(&self.memory, mode, input);
        debug!("Prompt mode {:?}, {} chars", mode, prompt.len());

        let generation = self
            .runtime
            .generate(&self.model, &prompt, self.config.runtime.timeout())
            .await;

        let raw = match generation {
            Ok(Generation::Completed { text }) => text,
            Ok(Generation::TimedOut { after }) => {
                return TurnResult::failed(
                    format!(
                        "⏰ Response timeout - model took longer than {}s",
                        after.as_secs()
                    ),
                    started.elapsed(),
                );
            }
            Ok(Generation::Failed { code, stderr }) => {
                let code = code.map(|c| c.to_string()).unwrap_or_else(|| "signal".to_string());
                return TurnResult::failed(
                    format!("❌ Error from model (exit {}): {}", code, stderr),
                    started.elapsed(),
                );
            }
            Err(e) => {
                error!("Model call failed: {}", e);
                return TurnResult::failed(format!("❌ Unexpected error: {}", e), started.elapsed());
            }
        };

        let reply = clean_response(&raw, &self.markers);
        let mut sections = vec![reply.clone()];
        let mut report = None;

        if mode == PromptMode::Project {
            let (project_sections, project_report) = self.materialize_project(input, &raw).await;
            sections.extend(project_sections);
            report = project_report;
        }

        let response = sections
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");

        self.memory.push_turn(Turn::new(input, response.clone()));
        if let Err(e) = self.store.save(&self.memory) {
            error!("Failed to save memory: {}", e);
        }

        TurnResult::completed(reply, response, report, started.elapsed())
    }

    /// Write the reply's code blocks as a project and run its main file.
    /// Returns the report sections to append to the reply.
    async fn materialize_project(
        &self,
        input: &str,
        raw: &str,
    ) -> (Vec<String>, Option<ProjectReport>) {
        let files = project::extract_code_files(&trim_dialogue(raw, &self.markers));
        if files.is_empty() {
            debug!("Project request produced no code blocks");
            return (Vec::new(), None);
        }

        let name = project::project_slug(input, Local::now());
        let report = match project::materialize(&self.paths.projects_dir(), &name, &files) {
            Ok(report) => report,
            Err(e) => {
                error!("Failed to create project {}: {}", name, e);
                return (vec![format!("❌ Could not create project {}: {}", name, e)], None);
            }
        };

        info!("Created project {} with {} files", report.name, report.created.len());
        let mut sections = vec![report.to_string()];

        if let Some(main_file) = report.main_file() {
            let result = runner::run_code_file(main_file, &[], &self.config.execution).await;
            sections.push(format!("🚀 Execution result:\n{}", result));
        }

        (sections, Some(report))
    }

    pub fn remember(&mut self, fact: &str) -> Result<()> {
        self.memory.add_fact(fact.trim());
        self.store.save(&self.memory)
    }

    /// Empty the conversation history; facts stay.
    pub fn clear(&mut self) -> Result<()> {
        self.memory.clear_turns();
        self.store.save(&self.memory)
    }

    pub fn set_model(&mut self, model: &str) {
        info!("Switching model from {} to {}", self.model, model);
        self.model = model.trim().to_string();
    }

    /// Rebuild the system snapshot from the projects directory. Returns the
    /// number of folders found.
    pub fn rescan(&mut self) -> Result<usize> {
        self.memory.snapshot = project::scan_snapshot(self.paths.root(), &self.paths.projects_dir());
        self.store.save(&self.memory)?;
        Ok(self.memory.snapshot.len())
    }

    pub fn stats(&self) -> MemoryStats {
        MemoryStats {
            turns: self.memory.turns.len(),
            facts: self.memory.facts.len(),
            projects: self.list_projects().len(),
            model: self.model.clone(),
            root: self.paths.root().to_path_buf(),
        }
    }

    pub fn list_projects(&self) -> Vec<ProjectSummary> {
        project::list_projects(&self.paths.projects_dir())
    }

    pub async fn run_project(&self, project: &str, file: &str, args: &[String]) -> ExecutionReport {
        runner::run_project(
            &self.paths.projects_dir(),
            project,
            file,
            args,
            &self.config.execution,
        )
        .await
    }

    pub fn memory(&self) -> &MemoryDocument {
        &self.memory
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    pub fn markers(&self) -> &DialogueMarkers {
        &self.markers
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }
}
