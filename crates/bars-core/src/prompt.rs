use std::path::Path;
use tracing::debug;

use crate::error::{BarsError, Result};

/// Read the system prompt asset. A missing or unreadable file is fatal.
pub fn load_system_prompt(path: &Path) -> Result<String> {
    let prompt = std::fs::read_to_string(path).map_err(|source| BarsError::MissingPrompt {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Loaded system prompt ({} chars) from {}", prompt.len(), path.display());
    Ok(prompt)
}
