//! Project materialization: turning a code-bearing reply into files on disk.

mod extract;

pub use extract::{extension_for, extract_code_files, CodeFile};

use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, error, warn};
use walkdir::WalkDir;

use crate::memory::SnapshotEntry;

const CREATE_KEYWORDS: &[&str] = &["create", "make", "build", "generate", "write"];
const PROJECT_KEYWORDS: &[&str] = &["project", "app", "program", "script", "website", "game"];
const STOP_WORDS: &[&str] = &[
    "create", "make", "build", "a", "an", "the", "for", "me", "please", "can", "you",
];

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());

/// Whether the user is asking for something to be built, e.g.
/// "make a snake game" or "create a calculator app".
pub fn is_project_request(input: &str) -> bool {
    let lower = input.to_lowercase();
    CREATE_KEYWORDS.iter().any(|k| lower.contains(k))
        && PROJECT_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Directory name for a request: its first three meaningful words joined by
/// underscores, or a timestamp when none remain.
pub fn project_slug(input: &str, now: DateTime<Local>) -> String {
    let lower = input.to_lowercase();
    let words: Vec<&str> = WORD
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(w))
        .take(3)
        .collect();

    if words.is_empty() {
        format!("project_{}", now.format("%Y%m%d_%H%M%S"))
    } else {
        words.join("_")
    }
}

/// What happened when a project's files were written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectReport {
    pub name: String,
    pub path: PathBuf,
    pub created: Vec<PathBuf>,
    pub skipped: Vec<String>,
}

impl ProjectReport {
    /// First created file whose name mentions `main`.
    pub fn main_file(&self) -> Option<&Path> {
        self.created
            .iter()
            .find(|p| {
                p.file_name()
                    .map(|n| n.to_string_lossy().to_lowercase().contains("main"))
                    .unwrap_or(false)
            })
            .map(PathBuf::as_path)
    }
}

impl fmt::Display for ProjectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "🎯 Project created: {}", self.name)?;
        writeln!(f, "📁 Location: {}", self.path.display())?;
        write!(f, "📄 Files created: {}", self.created.len())?;
        if !self.skipped.is_empty() {
            write!(f, "\n⚠️ Skipped: {}", self.skipped.join(", "))?;
        }
        Ok(())
    }
}

/// Write `files` into `projects_dir/<name>`.
///
/// Failing to create the project directory is an error. A file with an
/// unsafe name or one that fails to write is logged and skipped.
pub fn materialize(projects_dir: &Path, name: &str, files: &[CodeFile]) -> std::io::Result<ProjectReport> {
    let project_path = projects_dir.join(name);
    std::fs::create_dir_all(&project_path)?;

    let mut report = ProjectReport {
        name: name.to_string(),
        path: project_path.clone(),
        created: Vec::new(),
        skipped: Vec::new(),
    };

    for file in files {
        if !is_safe_relative(&file.name) {
            warn!("Refusing to write {} outside the project", file.name);
            report.skipped.push(file.name.clone());
            continue;
        }

        let file_path = project_path.join(&file.name);
        match write_file(&file_path, &file.content) {
            Ok(()) => {
                debug!("Wrote {}", file_path.display());
                report.created.push(file_path);
            }
            Err(e) => {
                error!("Failed to create {}: {}", file.name, e);
                report.skipped.push(file.name.clone());
            }
        }
    }

    Ok(report)
}

fn write_file(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut text = content.to_string();
    if !text.ends_with('\n') {
        text.push('\n');
    }
    std::fs::write(path, text)
}

/// Only plain relative paths stay inside the project directory.
pub(crate) fn is_safe_relative(name: &str) -> bool {
    let path = Path::new(name);
    !name.is_empty() && path.components().all(|c| matches!(c, Component::Normal(_)))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSummary {
    pub name: String,
    pub entries: usize,
}

/// Project directories under `projects_dir`, sorted by name.
pub fn list_projects(projects_dir: &Path) -> Vec<ProjectSummary> {
    let Ok(read_dir) = std::fs::read_dir(projects_dir) else {
        return Vec::new();
    };

    let mut projects: Vec<ProjectSummary> = read_dir
        .flatten()
        .filter(|entry| entry.path().is_dir())
        .map(|entry| ProjectSummary {
            name: entry.file_name().to_string_lossy().into_owned(),
            entries: std::fs::read_dir(entry.path()).map(|d| d.count()).unwrap_or(0),
        })
        .collect();
    projects.sort_by(|a, b| a.name.cmp(&b.name));
    projects
}

/// Every folder below `projects_dir` that directly holds files, with folder
/// paths relative to `root`.
pub fn scan_snapshot(root: &Path, projects_dir: &Path) -> Vec<SnapshotEntry> {
    let mut snapshot = Vec::new();

    for entry in WalkDir::new(projects_dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
    {
        let Ok(read_dir) = std::fs::read_dir(entry.path()) else {
            continue;
        };
        let mut files: Vec<String> = read_dir
            .flatten()
            .filter(|f| f.path().is_file())
            .map(|f| f.file_name().to_string_lossy().into_owned())
            .collect();
        if files.is_empty() {
            continue;
        }
        files.sort();

        let folder = entry.path().strip_prefix(root).unwrap_or(entry.path());
        snapshot.push(SnapshotEntry {
            folder: folder.to_string_lossy().into_owned(),
            files,
        });
    }

    snapshot
}
