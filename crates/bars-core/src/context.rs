//! Prompt assembly.
//!
//! A prompt is the mode preamble, the system prompt, the important facts, the
//! system snapshot (when one exists), a window of recent turns and finally the
//! new user line followed by an open assistant marker for the model to
//! complete.

use bars_config::MemoryConfig;
use tracing::debug;

use crate::dialogue::DialogueMarkers;
use crate::memory::{MemoryDocument, SnapshotEntry, Turn};

/// Which instructions lead the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    /// Plain conversation, no code in the reply.
    Chat,
    /// The user asked for a project; the reply should carry fenced files.
    Project,
}

/// Rough token estimate used for the prompt budget.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

pub struct ContextBuilder<'a> {
    system_prompt: &'a str,
    markers: &'a DialogueMarkers,
    recent_turns: usize,
    max_context_tokens: usize,
}

impl<'a> ContextBuilder<'a> {
    pub fn new(system_prompt: &'a str, markers: &'a DialogueMarkers, config: &MemoryConfig) -> Self {
        Self {
            system_prompt,
            markers,
            recent_turns: config.recent_turns,
            max_context_tokens: config.max_context_tokens,
        }
    }

    /// Build the prompt for `user_input`.
    ///
    /// Up to `recent_turns` turns are included. If the prompt exceeds the
    /// token budget the oldest turns are dropped one at a time; everything
    /// else is always kept, so a prompt with no turns left may still exceed
    /// the budget.
    pub fn build(&self, doc: &MemoryDocument, mode: PromptMode, user_input: &str) -> String {
        let window = doc.recent_turns(self.recent_turns);

        let mut skip = 0;
        loop {
            let prompt = self.render(doc, mode, &window[skip..], user_input);
            let tokens = estimate_tokens(&prompt);
            if tokens <= self.max_context_tokens || skip == window.len() {
                if skip > 0 {
                    debug!("Dropped {} oldest turns to fit the context budget", skip);
                }
                if tokens > self.max_context_tokens {
                    debug!(
                        "Prompt is {} tokens, over the {} token budget",
                        tokens, self.max_context_tokens
                    );
                }
                return prompt;
            }
            skip += 1;
        }
    }

    fn render(&self, doc: &MemoryDocument, mode: PromptMode, turns: &[Turn], user_input: &str) -> String {
        let mut sections = vec![self.preamble(mode), self.system_prompt.trim().to_string()];

        sections.push(format!(
            "Important facts about our relationship:\n{}",
            doc.facts.join("\n")
        ));

        if !doc.snapshot.is_empty() {
            sections.push(render_snapshot(&doc.snapshot));
        }

        if !turns.is_empty() {
            sections.push(format!("Recent conversation:\n{}", self.render_turns(turns)));
        }

        sections.push(format!(
            "{} {}\n{}",
            self.markers.user_prefix(),
            user_input,
            self.markers.assistant_prefix()
        ));

        sections.join("\n\n")
    }

    fn render_turns(&self, turns: &[Turn]) -> String {
        let user = self.markers.user_prefix();
        let assistant = self.markers.assistant_prefix();
        turns
            .iter()
            .map(|turn| format!("{} {}\n{} {}", user, turn.user_input, assistant, turn.response))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn preamble(&self, mode: PromptMode) -> String {
        let assistant = &self.markers.assistant;
        let user = &self.markers.user;
        match mode {
            PromptMode::Chat => format!(
                "You are {assistant}. Respond ONLY as {assistant} would respond. Do not include any code, \
                 explanations, or meta-commentary unless specifically asked for coding help."
            ),
            PromptMode::Project => format!(
                "You are {assistant}, {user}'s coding buddy. {user} wants you to create a project.\n\n\
                 Follow these rules:\n\
                 1. Create complete, working code\n\
                 2. Put the filename in a comment on the first line of each code block, like: # filename.py\n\
                 3. Write code in triple backticks with the language specified\n\
                 4. Name the entry point main, e.g. main.py\n\
                 5. Explain what each file does"
            ),
        }
    }
}

fn render_snapshot(snapshot: &[SnapshotEntry]) -> String {
    let lines: Vec<String> = snapshot
        .iter()
        .map(|entry| {
            let files = if entry.files.is_empty() {
                "no files".to_string()
            } else {
                entry.files.join(", ")
            };
            format!("- {}: {}", entry.folder, files)
        })
        .collect();
    format!("System snapshot:\n{}", lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_tokens_rounds_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abc"), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }

    #[test]
    fn test_prompt_ends_with_open_assistant_marker() {
        let markers = DialogueMarkers::new("Aditya", "Bars");
        let builder = ContextBuilder::new("Be chill.", &markers, &MemoryConfig::default());
        let prompt = builder.build(&MemoryDocument::default(), PromptMode::Chat, "yo");
        assert!(prompt.starts_with("You are Bars."));
        assert!(prompt.ends_with("Aditya: yo\nBars:"));
    }
}
