//! Filesystem layout under the Bars root directory.

use std::path::{Path, PathBuf};

use crate::error::{BarsError, Result};

pub const SYSTEM_PROMPT_FILE: &str = "bars_system_prompt.txt";
pub const MEMORY_FILE: &str = "bars_memory.json";
pub const LEGACY_LOG_FILE: &str = "bars_chat_history.txt";
pub const PROJECTS_DIR: &str = "projects";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    root: PathBuf,
}

impl Paths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn system_prompt(&self) -> PathBuf {
        self.root.join(SYSTEM_PROMPT_FILE)
    }

    pub fn memory_file(&self) -> PathBuf {
        self.root.join(MEMORY_FILE)
    }

    pub fn legacy_log(&self) -> PathBuf {
        self.root.join(LEGACY_LOG_FILE)
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.root.join(PROJECTS_DIR)
    }

    /// Create the root and projects directories if they are missing.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [self.root.clone(), self.projects_dir()] {
            std::fs::create_dir_all(&dir)
                .map_err(|source| BarsError::CreateDir { path: dir, source })?;
        }
        Ok(())
    }
}
