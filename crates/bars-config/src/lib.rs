//! Configuration for the Bars assistant shell.
//!
//! Configuration is read from a TOML file. Every field has a default, so an
//! empty or missing file yields a working setup pointed at a local `ollama`
//! install. Command-line flags are applied on top with [`Overrides`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// File name looked up under the platform config directory (`~/.config/bars/`).
pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub runtime: RuntimeConfig,
    pub memory: MemoryConfig,
    pub persona: PersonaConfig,
    pub paths: PathsConfig,
    pub execution: ExecutionConfig,
}

/// External model runtime invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Program spawned for `list` and `run <model>`.
    pub program: String,
    pub model: String,
    /// Upper bound on a single generation.
    pub timeout_secs: u64,
    /// Upper bound on the readiness probe (`<program> list`).
    pub probe_timeout_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            program: "ollama".to_string(),
            model: "dolphin-mistral".to_string(),
            timeout_secs: 90,
            probe_timeout_secs: 5,
        }
    }
}

impl RuntimeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Number of most recent turns rendered into each prompt.
    pub recent_turns: usize,
    /// Prompt budget in estimated tokens. Oldest turns are dropped to fit.
    pub max_context_tokens: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            recent_turns: 5,
            max_context_tokens: 4000,
        }
    }
}

/// Speaker names used as dialogue markers (`"<user>:"`, `"<assistant>:"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonaConfig {
    pub user: String,
    pub assistant: String,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            user: "User".to_string(),
            assistant: "Bars".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root holding the system prompt, the memory file and `projects/`.
    /// A leading `~` is expanded.
    pub root_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root_dir: "~/bars".to_string(),
        }
    }
}

impl PathsConfig {
    pub fn root(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.root_dir).into_owned())
    }
}

/// Interpreters and limits for running generated code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    pub timeout_secs: u64,
    pub python: String,
    pub node: String,
    pub shell: String,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            python: "python3".to_string(),
            node: "node".to_string(),
            shell: "sh".to_string(),
        }
    }
}

impl ExecutionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Values supplied on the command line. `None` keeps the file value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub root_dir: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Parse a config file. Unknown keys are ignored, missing keys default.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from an explicit path, else from the default location if it
    /// exists, else fall back to built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            debug!("Loading config from {}", path.display());
            return Self::from_file(path);
        }

        match default_config_path() {
            Some(path) if path.is_file() => {
                debug!("Loading config from {}", path.display());
                Self::from_file(&path)
            }
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(root) = &overrides.root_dir {
            self.paths.root_dir = root.clone();
        }
        if let Some(model) = &overrides.model {
            self.runtime.model = model.clone();
        }
        if let Some(secs) = overrides.timeout_secs {
            self.runtime.timeout_secs = secs;
        }
    }
}

/// `<config dir>/bars/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("bars").join(CONFIG_FILE_NAME))
}
