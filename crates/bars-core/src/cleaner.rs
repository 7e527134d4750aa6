//! Model output cleanup.
//!
//! Local models tend to keep writing past their turn: they invent the next
//! user line, echo their own speaker label, paste code nobody asked for or
//! slide into worked-example boilerplate. Each step below cuts one of those.
//! Steps run in order on the progressively trimmed text.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::dialogue::DialogueMarkers;

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```.*?```").unwrap());

/// Phrases after which the rest of the output is discarded.
static HALLUCINATION_TAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)(?:OUTPUT:|Question:|Answer:|This is an example|The first step|Next, we need).*",
    )
    .unwrap()
});

static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Cut at the first invented user line and drop a leading assistant label.
pub fn trim_dialogue(raw: &str, markers: &DialogueMarkers) -> String {
    let user_prefix = markers.user_prefix();
    let text = match raw.find(&user_prefix) {
        Some(pos) => &raw[..pos],
        None => raw,
    };

    let text = text.trim();
    text.strip_prefix(&markers.assistant_prefix())
        .unwrap_or(text)
        .trim()
        .to_string()
}

/// Full cleanup of a raw model reply for display and storage.
pub fn clean_response(raw: &str, markers: &DialogueMarkers) -> String {
    let text = trim_dialogue(raw, markers);
    let text = CODE_FENCE.replace_all(&text, "");
    let text = HALLUCINATION_TAIL.replace(&text, "");
    let text = BLANK_LINES.replace_all(&text, "\n");
    text.trim().to_string()
}
