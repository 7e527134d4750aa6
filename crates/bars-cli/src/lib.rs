//! Command line front end for Bars.

pub mod commands;
pub mod metrics;
pub mod shell;

pub use commands::Command;
pub use shell::{Flow, Shell};

use anyhow::{Context, Result};
use bars_config::{Config, Overrides};
use bars_core::Session;
use bars_providers::{ModelRuntime, OllamaCli};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Exit status when the model runtime cannot be reached.
pub const EXIT_RUNTIME_UNAVAILABLE: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "bars", version, about = "A local chat companion that remembers you and builds small projects")]
pub struct Cli {
    /// Configuration file (default: <config dir>/bars/config.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding the prompt, memory and projects
    #[arg(long, value_name = "DIR")]
    pub root: Option<String>,

    /// Model to chat with
    #[arg(long, value_name = "NAME")]
    pub model: Option<String>,

    /// Seconds to wait for a model reply
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Debug logging to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            root_dir: self.root.clone(),
            model: self.model.clone(),
            timeout_secs: self.timeout,
        }
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Probe the runtime before the shell starts. An unavailable runtime is
/// diagnosed on `err` and yields the exit code to stop with; any other
/// failure propagates.
pub async fn check_ready<R: ModelRuntime>(
    session: &Session<R>,
    err: &mut impl Write,
) -> Result<Option<ExitCode>> {
    match session.ensure_ready().await {
        Ok(()) => Ok(None),
        Err(e) if e.is_runtime_unavailable() => {
            error!("Runtime not ready: {}", e);
            writeln!(err, "❌ {}", e)?;
            writeln!(
                err,
                "💡 Try: {} serve (in another terminal)",
                session.runtime().name()
            )?;
            Ok(Some(ExitCode::from(EXIT_RUNTIME_UNAVAILABLE)))
        }
        Err(e) => Err(e).context("readiness check failed"),
    }
}

/// Start a session and run the shell until the user leaves.
pub async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    config.apply(&cli.overrides());
    info!("Using model {} via {}", config.runtime.model, config.runtime.program);

    let runtime = OllamaCli::new(config.runtime.program.clone(), config.runtime.probe_timeout());
    let session = Session::open(config, runtime)?;

    println!("🧠 Bars - local chat with memory and project creation");
    println!("📱 Using model: {}", session.model());
    println!("📁 Main directory: {}", session.paths().root().display());

    if let Some(code) = check_ready(&session, &mut std::io::stderr()).await? {
        return Ok(code);
    }
    println!("✅ {} is ready!", session.runtime().name());

    let mut shell = Shell::new(session, std::io::stdout());
    shell.run().await?;
    Ok(ExitCode::SUCCESS)
}
