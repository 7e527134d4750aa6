//! Running generated code with an interpreter picked by file extension.

use bars_config::ExecutionConfig;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::project::is_safe_relative;

/// Outcome of trying to run a file. Never an error: every case renders as a
/// message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionReport {
    Completed { stdout: String, stderr: String },
    /// HTML is never executed, only pointed at.
    HtmlCreated { path: PathBuf },
    Unsupported { extension: String },
    NotFound { path: PathBuf },
    ProjectNotFound { name: String },
    TimedOut { after: Duration },
    Failed { reason: String },
}

impl fmt::Display for ExecutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionReport::Completed { stdout, stderr } => {
                if stdout.is_empty() && stderr.is_empty() {
                    return write!(f, "✅ Code ran successfully (no output)");
                }
                let mut sections = Vec::new();
                if !stdout.is_empty() {
                    sections.push(format!("📤 Output:\n{}", stdout.trim_end()));
                }
                if !stderr.is_empty() {
                    sections.push(format!("❌ Errors:\n{}", stderr.trim_end()));
                }
                write!(f, "{}", sections.join("\n"))
            }
            ExecutionReport::HtmlCreated { path } => write!(
                f,
                "✅ HTML file created at {}. Open in browser to view.",
                path.display()
            ),
            ExecutionReport::Unsupported { extension } if extension.is_empty() => {
                write!(f, "❌ Don't know how to run files without an extension")
            }
            ExecutionReport::Unsupported { extension } => {
                write!(f, "❌ Don't know how to run .{} files", extension)
            }
            ExecutionReport::NotFound { path } => {
                write!(f, "❌ File not found: {}", path.display())
            }
            ExecutionReport::ProjectNotFound { name } => {
                write!(f, "❌ Project '{}' not found", name)
            }
            ExecutionReport::TimedOut { after } => {
                write!(f, "⏰ Code execution timeout after {}s", after.as_secs_f32())
            }
            ExecutionReport::Failed { reason } => write!(f, "❌ Error running code: {}", reason),
        }
    }
}

/// Interpreter for a file extension, or `None` when the file is not runnable.
fn interpreter_for<'a>(extension: &str, config: &'a ExecutionConfig) -> Option<&'a str> {
    match extension {
        "py" => Some(config.python.as_str()),
        "js" | "mjs" => Some(config.node.as_str()),
        "sh" => Some(config.shell.as_str()),
        _ => None,
    }
}

/// Run `path` with the interpreter for its extension, in the file's own
/// directory, capturing output. The child is killed after the configured
/// timeout.
pub async fn run_code_file(path: &Path, args: &[String], config: &ExecutionConfig) -> ExecutionReport {
    if !path.is_file() {
        return ExecutionReport::NotFound {
            path: path.to_path_buf(),
        };
    }

    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if extension == "html" || extension == "htm" {
        return ExecutionReport::HtmlCreated {
            path: path.to_path_buf(),
        };
    }

    let Some(interpreter) = interpreter_for(&extension, config) else {
        return ExecutionReport::Unsupported { extension };
    };

    let (Some(file_name), Some(dir)) = (path.file_name(), path.parent()) else {
        return ExecutionReport::NotFound {
            path: path.to_path_buf(),
        };
    };
    let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };

    debug!("Running {} {} in {}", interpreter, file_name.to_string_lossy(), dir.display());

    let output = Command::new(interpreter)
        .arg(file_name)
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output();

    let timeout = config.timeout();
    match tokio::time::timeout(timeout, output).await {
        Err(_) => {
            warn!("{} timed out after {:?}", path.display(), timeout);
            ExecutionReport::TimedOut { after: timeout }
        }
        Ok(Err(e)) if e.kind() == ErrorKind::NotFound => ExecutionReport::Failed {
            reason: format!("{} is not installed", interpreter),
        },
        Ok(Err(e)) => ExecutionReport::Failed {
            reason: e.to_string(),
        },
        Ok(Ok(output)) => ExecutionReport::Completed {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        },
    }
}

/// Run `file` from the project `project` under `projects_dir`.
pub async fn run_project(
    projects_dir: &Path,
    project: &str,
    file: &str,
    args: &[String],
    config: &ExecutionConfig,
) -> ExecutionReport {
    if !is_safe_relative(project) || !is_safe_relative(file) {
        return ExecutionReport::Failed {
            reason: "project and file must be plain relative names".to_string(),
        };
    }

    let project_path = projects_dir.join(project);
    if !project_path.is_dir() {
        return ExecutionReport::ProjectNotFound {
            name: project.to_string(),
        };
    }

    run_code_file(&project_path.join(file), args, config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_messages() {
        let ok = ExecutionReport::Completed {
            stdout: String::new(),
            stderr: String::new(),
        };
        assert_eq!(ok.to_string(), "✅ Code ran successfully (no output)");

        let both = ExecutionReport::Completed {
            stdout: "4\n".to_string(),
            stderr: "warning\n".to_string(),
        };
        assert_eq!(both.to_string(), "📤 Output:\n4\n❌ Errors:\nwarning");

        let timeout = ExecutionReport::TimedOut {
            after: Duration::from_secs(10),
        };
        assert!(timeout.to_string().contains("timeout"));
    }

    #[test]
    fn test_interpreter_dispatch() {
        let config = ExecutionConfig::default();
        assert_eq!(interpreter_for("py", &config), Some("python3"));
        assert_eq!(interpreter_for("js", &config), Some("node"));
        assert_eq!(interpreter_for("sh", &config), Some("sh"));
        assert_eq!(interpreter_for("rs", &config), None);
    }
}
