use bars_config::PersonaConfig;

/// Speaker labels that prefix dialogue lines, e.g. `"User:"` and `"Bars:"`.
///
/// The same labels are written into prompts, recognized in legacy chat logs
/// and stripped from model output, so they live in one place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueMarkers {
    pub user: String,
    pub assistant: String,
}

impl DialogueMarkers {
    pub fn new(user: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            assistant: assistant.into(),
        }
    }

    pub fn user_prefix(&self) -> String {
        format!("{}:", self.user)
    }

    pub fn assistant_prefix(&self) -> String {
        format!("{}:", self.assistant)
    }
}

impl From<&PersonaConfig> for DialogueMarkers {
    fn from(persona: &PersonaConfig) -> Self {
        Self::new(persona.user.clone(), persona.assistant.clone())
    }
}

impl Default for DialogueMarkers {
    fn default() -> Self {
        Self::from(&PersonaConfig::default())
    }
}
