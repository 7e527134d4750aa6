//! Persistent conversational memory.
//!
//! One JSON document per installation holds the conversation turns, the
//! user-curated important facts and the last system snapshot. The document is
//! rewritten in full after every mutation. There is a single writer, so no
//! locking is done; the write goes through a temp file and a rename so a crash
//! mid-write leaves the previous document intact.

use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::dialogue::DialogueMarkers;
use crate::error::{BarsError, Result};

/// One user input and the assistant response it produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub user_input: String,
    #[serde(rename = "bars_response")]
    pub response: String,
}

impl Turn {
    pub fn new(user_input: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            user_input: user_input.into(),
            response: response.into(),
        }
    }
}

/// A project folder and the names of the files directly inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub folder: String,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryDocument {
    #[serde(rename = "conversation_pairs", default)]
    pub turns: Vec<Turn>,
    #[serde(rename = "important_facts", default)]
    pub facts: Vec<String>,
    #[serde(
        rename = "system_snapshot",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub snapshot: Vec<SnapshotEntry>,
}

impl MemoryDocument {
    pub fn push_turn(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn add_fact(&mut self, fact: impl Into<String>) {
        self.facts.push(fact.into());
    }

    /// Forget the conversation but keep the facts.
    pub fn clear_turns(&mut self) {
        self.turns.clear();
    }

    /// The last `n` turns in chronological order.
    pub fn recent_turns(&self, n: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }
}

/// Reads and writes the memory document and performs the one-time legacy
/// log migration.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    path: PathBuf,
    markers: DialogueMarkers,
}

impl MemoryStore {
    pub fn new(path: impl Into<PathBuf>, markers: DialogueMarkers) -> Self {
        Self {
            path: path.into(),
            markers,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document. A missing file yields the empty document; an
    /// unreadable or malformed one is discarded with a warning.
    pub fn load(&self) -> MemoryDocument {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No memory file at {}", self.path.display());
                return MemoryDocument::default();
            }
            Err(e) => {
                warn!(
                    "Could not read memory file {}, starting fresh: {}",
                    self.path.display(),
                    e
                );
                return MemoryDocument::default();
            }
        };

        match serde_json::from_str(&text) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("Memory file corrupted, starting fresh: {}", e);
                MemoryDocument::default()
            }
        }
    }

    pub fn save(&self, doc: &MemoryDocument) -> Result<()> {
        let json = serde_json::to_string_pretty(doc)?;
        let tmp = self.path.with_extension("json.tmp");

        std::fs::write(&tmp, json).map_err(|source| BarsError::SaveMemory {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| BarsError::SaveMemory {
            path: self.path.clone(),
            source,
        })?;

        debug!(
            "Saved memory: {} turns, {} facts",
            doc.turns.len(),
            doc.facts.len()
        );
        Ok(())
    }

    /// Startup load: the JSON document if it exists, otherwise a document
    /// migrated from `legacy_log` (when present), saved straight away.
    pub fn open(&self, legacy_log: &Path) -> MemoryDocument {
        if self.path.exists() {
            return self.load();
        }

        if !legacy_log.exists() {
            return MemoryDocument::default();
        }

        match self.migrate_legacy(legacy_log) {
            Ok(doc) => {
                info!(
                    "Migrated {} turns from {}",
                    doc.turns.len(),
                    legacy_log.display()
                );
                if let Err(e) = self.save(&doc) {
                    error!("Failed to save migrated memory: {}", e);
                }
                doc
            }
            Err(e) => {
                warn!("Could not migrate old memory: {}", e);
                MemoryDocument::default()
            }
        }
    }

    /// Build a document from a legacy line-oriented chat log.
    pub fn migrate_legacy(&self, legacy_log: &Path) -> std::io::Result<MemoryDocument> {
        let text = std::fs::read_to_string(legacy_log)?;
        Ok(MemoryDocument {
            turns: parse_legacy_log(&text, &self.markers),
            ..MemoryDocument::default()
        })
    }
}

/// Pair `"<user>:"` lines with the `"<assistant>:"` line that follows.
///
/// A user line starts a new pending turn, replacing a pending turn that never
/// got a response. Assistant lines fill the pending turn; the last one wins.
/// Lines with neither marker are ignored, as is a trailing unanswered turn.
pub fn parse_legacy_log(text: &str, markers: &DialogueMarkers) -> Vec<Turn> {
    let user_prefix = markers.user_prefix();
    let assistant_prefix = markers.assistant_prefix();

    let mut turns = Vec::new();
    let mut pending: Option<Turn> = None;

    for line in text.lines() {
        if let Some(rest) = line.strip_prefix(&user_prefix) {
            if let Some(turn) = pending.take() {
                if !turn.response.is_empty() {
                    turns.push(turn);
                }
            }
            pending = Some(Turn::new(rest.trim(), ""));
        } else if let Some(rest) = line.strip_prefix(&assistant_prefix) {
            if let Some(turn) = pending.as_mut().filter(|t| !t.user_input.is_empty()) {
                turn.response = rest.trim().to_string();
            }
        }
    }

    if let Some(turn) = pending {
        if !turn.user_input.is_empty() && !turn.response.is_empty() {
            turns.push(turn);
        }
    }

    turns
}
