//! Session timing shown by `stats`.

use std::time::{Duration, Instant};

/// Wall clock time for each completed model turn in this shell session.
#[derive(Debug, Clone)]
pub struct SessionTiming {
    started: Instant,
    turns: Vec<Duration>,
}

impl SessionTiming {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            turns: Vec::new(),
        }
    }

    pub fn record_turn(&mut self, elapsed: Duration) {
        self.turns.push(elapsed);
    }

    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }

    pub fn session_elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn average_turn(&self) -> Option<Duration> {
        if self.turns.is_empty() {
            return None;
        }
        let total: Duration = self.turns.iter().sum();
        Some(total / self.turns.len() as u32)
    }

    pub fn slowest_turn(&self) -> Option<Duration> {
        self.turns.iter().max().copied()
    }

    /// One line per figure, indented to sit under the stats heading.
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("   Session time: {}", format_elapsed_time(self.session_elapsed())),
            format!("   Turns this session: {}", self.turn_count()),
        ];
        if let (Some(average), Some(slowest)) = (self.average_turn(), self.slowest_turn()) {
            lines.push(format!(
                "   Average response: {} (slowest {})",
                format_elapsed_time(average),
                format_elapsed_time(slowest)
            ));
        }
        lines.join("\n")
    }
}

/// Format a Duration as human-readable elapsed time (e.g., "1h 23m 45s").
pub fn format_elapsed_time(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    match (hours, minutes, seconds) {
        (h, m, s) if h > 0 => format!("{}h {}m {}s", h, m, s),
        (_, m, s) if m > 0 => format!("{}m {}s", m, s),
        (_, _, s) if s > 0 => format!("{}s", s),
        _ => format!("{}ms", duration.as_millis()),
    }
}
