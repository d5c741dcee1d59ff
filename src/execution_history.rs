//! Size-capped record of recent command executions.
//!
//! The history exists purely as prompt context: it keeps the most recent
//! commands with truncated outputs and renders them in the two shapes the
//! prompts expect. Nothing here is persisted.

use serde::{Deserialize, Serialize};

use crate::providers::{SystemTimeProvider, TimeProvider};

/// Maximum number of entries kept for prompt context.
pub const HISTORY_CAPACITY: usize = 5;

/// Maximum stored output length per entry, in characters.
pub const OUTPUT_LIMIT: usize = 500;

/// Number of entries included in the analysis excerpt.
const ANALYSIS_WINDOW: usize = 3;

/// One executed command and its outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unix timestamp of when the command ran.
    pub timestamp: u64,
    /// The command string as executed.
    pub command: String,
    /// Captured output, truncated to [`OUTPUT_LIMIT`] characters.
    pub output: String,
    /// Whether the command exited successfully.
    pub success: bool,
}

/// Bounded list of recent executions, oldest evicted first.
pub struct ExecutionHistory {
    entries: Vec<HistoryEntry>,
    time: Box<dyn TimeProvider>,
}

impl ExecutionHistory {
    pub fn new() -> Self {
        Self::with_time_provider(Box::new(SystemTimeProvider))
    }

    pub fn with_time_provider(time: Box<dyn TimeProvider>) -> Self {
        Self {
            entries: Vec::new(),
            time,
        }
    }

    /// Records an execution, truncating the output and evicting the oldest
    /// entry once the capacity is reached.
    pub fn record(&mut self, command: &str, output: &str, success: bool) {
        let output: String = output.chars().take(OUTPUT_LIMIT).collect();
        self.entries.push(HistoryEntry {
            timestamp: self.time.now(),
            command: command.to_string(),
            output,
            success,
        });
        if self.entries.len() > HISTORY_CAPACITY {
            self.entries.remove(0);
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Full history block for the command-generation prompt.
    ///
    /// Empty history renders as the empty string so the prompt section
    /// disappears entirely.
    pub fn format_full(&self) -> String {
        if self.entries.is_empty() {
            return String::new();
        }

        let mut history = String::from("Recent commands and their outputs:\n");
        for entry in &self.entries {
            history.push_str(&format!("$ {}\n", entry.command));
            if !entry.output.is_empty() {
                history.push_str(&format!("Output: {}\n", entry.output));
            }
            history.push_str(&format!(
                "Status: {}\n\n",
                if entry.success { "Success" } else { "Failed" }
            ));
        }
        history
    }

    /// Excerpt of the last three entries for the analysis prompt.
    pub fn format_recent(&self) -> String {
        if self.entries.is_empty() {
            return String::new();
        }

        let start = self.entries.len().saturating_sub(ANALYSIS_WINDOW);
        let lines: Vec<String> = self.entries[start..]
            .iter()
            .map(|entry| {
                format!(
                    "$ {}\nSuccess: {}\nOutput: {}",
                    entry.command, entry.success, entry.output
                )
            })
            .collect();

        format!("Recent commands and their results:\n{}", lines.join("\n"))
    }
}

impl Default for ExecutionHistory {
    fn default() -> Self {
        Self::new()
    }
}
