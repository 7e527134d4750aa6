//! The interactive command loop.

use anyhow::{Context, Result};
use bars_core::Session;
use bars_providers::ModelRuntime;
use crossterm::style::Stylize;
use indicatif::{ProgressBar, ProgressStyle};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::Write;
use std::time::Duration;
use tracing::{debug, warn};

use crate::commands::{Command, HELP};
use crate::metrics::SessionTiming;

/// Whether the loop keeps reading after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Shell<R: ModelRuntime, W: Write> {
    session: Session<R>,
    out: W,
    timing: SessionTiming,
    /// Spinner and colors; off when output is captured.
    decorated: bool,
}

impl<R: ModelRuntime, W: Write> Shell<R, W> {
    pub fn new(session: Session<R>, out: W) -> Self {
        Self {
            session,
            out,
            timing: SessionTiming::start(),
            decorated: true,
        }
    }

    /// Plain output with no spinner or ANSI styling.
    pub fn plain(mut self) -> Self {
        self.decorated = false;
        self
    }

    pub fn session(&self) -> &Session<R> {
        &self.session
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Read lines until the user leaves. Ctrl-C at the prompt or while the
    /// model is thinking ends the session.
    pub async fn run(&mut self) -> Result<()> {
        let mut editor = DefaultEditor::new().context("failed to initialize line editor")?;
        let prompt = if self.decorated {
            format!("{} > ", "You".cyan().bold())
        } else {
            "You > ".to_string()
        };

        writeln!(self.out, "💬 Type 'help' for commands, 'exit' to quit\n")?;

        loop {
            match editor.readline(&prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = editor.add_history_entry(line.as_str());
                    }

                    let outcome = tokio::select! {
                        flow = self.handle_line(&line) => Some(flow),
                        _ = tokio::signal::ctrl_c() => None,
                    };

                    match outcome {
                        Some(Ok(Flow::Continue)) => {}
                        Some(Ok(Flow::Exit)) => break,
                        Some(Err(e)) => return Err(e).context("failed to write output"),
                        None => {
                            debug!("Interrupted during a turn");
                            self.farewell()?;
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    self.farewell()?;
                    break;
                }
                Err(e) => {
                    warn!("Line editor error: {}", e);
                    writeln!(self.out, "❌ Error: {}", e)?;
                    break;
                }
            }
        }

        Ok(())
    }

    /// Execute one input line.
    pub async fn handle_line(&mut self, line: &str) -> std::io::Result<Flow> {
        match Command::parse(line) {
            Command::Empty => {}
            Command::Exit => {
                writeln!(
                    self.out,
                    "{} > Catch you later, {}! 🤘",
                    self.session.markers().assistant,
                    self.session.markers().user
                )?;
                return Ok(Flow::Exit);
            }
            Command::Help => {
                let heading = self.heading("🔧 Bars Commands:");
                writeln!(self.out, "{}\n{}", heading, HELP)?;
            }
            Command::Stats => self.print_stats()?,
            Command::Projects => self.print_projects()?,
            Command::Remember(fact) => match self.session.remember(&fact) {
                Ok(()) => writeln!(self.out, "✅ Added to long-term memory: {}", fact.trim())?,
                Err(e) => writeln!(self.out, "❌ Failed to save memory: {}", e)?,
            },
            Command::Model(name) => {
                self.session.set_model(&name);
                writeln!(self.out, "🔄 Switched to model: {}", self.session.model())?;
                if let Err(e) = self.session.ensure_ready().await {
                    writeln!(self.out, "⚠️  {}", e)?;
                }
            }
            Command::Run {
                project,
                file,
                args,
            } => {
                let report = self.session.run_project(&project, &file, &args).await;
                writeln!(self.out, "🚀 {}", report)?;
            }
            Command::Clear => match self.session.clear() {
                Ok(()) => writeln!(self.out, "🗑️  Cleared recent conversations")?,
                Err(e) => writeln!(self.out, "❌ Failed to save memory: {}", e)?,
            },
            Command::Rescan => match self.session.rescan() {
                Ok(0) => writeln!(
                    self.out,
                    "⚠️ No folders with files found in the projects directory."
                )?,
                Ok(count) => writeln!(
                    self.out,
                    "🔄 Rescanned your project folders: {} with files.",
                    count
                )?,
                Err(e) => writeln!(self.out, "❌ Failed to save memory: {}", e)?,
            },
            Command::Usage(usage) => writeln!(self.out, "❌ Usage: {}", usage)?,
            Command::Chat(input) => self.chat(&input).await?,
        }
        Ok(Flow::Continue)
    }

    async fn chat(&mut self, input: &str) -> std::io::Result<()> {
        let spinner = self.spinner();
        let result = self.session.respond(input).await;
        spinner.finish_and_clear();

        if result.persisted {
            self.timing.record_turn(result.elapsed);
        }
        debug!("Turn finished in {:?}", result.elapsed);

        let label = format!("{} >", self.session.markers().assistant);
        let label = if self.decorated {
            label.green().bold().to_string()
        } else {
            label
        };
        writeln!(self.out, "{} {}", label, result.response)
    }

    fn spinner(&self) -> ProgressBar {
        if !self.decorated {
            return ProgressBar::hidden();
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::default_spinner());
        spinner.set_message(format!("{} is thinking...", self.session.markers().assistant));
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }

    fn print_stats(&mut self) -> std::io::Result<()> {
        let stats = self.session.stats();
        let heading = self.heading("📊 Bars Stats:");
        writeln!(self.out, "{}", heading)?;
        writeln!(self.out, "   Conversation pairs: {}", stats.turns)?;
        writeln!(self.out, "   Important facts: {}", stats.facts)?;
        writeln!(self.out, "   Projects: {}", stats.projects)?;
        writeln!(self.out, "   Current model: {}", stats.model)?;
        writeln!(self.out, "   Main directory: {}", stats.root.display())?;
        writeln!(self.out, "{}", self.timing.summary())
    }

    fn print_projects(&mut self) -> std::io::Result<()> {
        let projects = self.session.list_projects();
        if projects.is_empty() {
            return writeln!(self.out, "📁 No projects created yet");
        }

        let heading = self.heading(&format!(
            "📁 Projects in {}:",
            self.session.paths().projects_dir().display()
        ));
        writeln!(self.out, "{}", heading)?;
        for project in projects {
            writeln!(self.out, "   🎯 {} ({} files)", project.name, project.entries)?;
        }
        Ok(())
    }

    fn farewell(&mut self) -> std::io::Result<()> {
        writeln!(
            self.out,
            "\n{} > Alright, catch you later! 🤘",
            self.session.markers().assistant
        )
    }

    fn heading(&self, text: &str) -> String {
        if self.decorated {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }
}
