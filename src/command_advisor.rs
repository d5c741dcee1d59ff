//! Model-backed advice for each phase of a task.
//!
//! The task loop talks to the model through the [`CommandAdvisor`] trait:
//! one method per phase. `LlmAdvisor` is the production implementation over
//! the chat-completions client; `MockAdvisor` answers deterministically so
//! the binary can run offline (`FAMULUS_USE_MOCK=1`).

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::chat_client::ChatClient;
use crate::prompt_builder::{
    build_analysis_prompt, build_failure_prompt, build_info_prompt, build_next_commands_prompt,
    ANALYSIS_SYSTEM_PROMPT, FAILURE_SYSTEM_PROMPT, INFO_SYSTEM_PROMPT,
    NEXT_COMMANDS_SYSTEM_PROMPT,
};
use crate::response_parser::{is_task_complete, parse_commands};

/// What the command-generation phase decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextStep {
    /// Commands to run, in order.
    Commands(Vec<String>),
    /// Nothing left to do.
    Complete,
}

#[async_trait]
pub trait CommandAdvisor: Send + Sync {
    /// Safe information-gathering commands for the task.
    async fn info_commands(&self, task: &str, dir_structure: &str) -> Result<Vec<String>>;

    /// Concise analysis of the current state.
    async fn analyze_state(
        &self,
        task: &str,
        dir_structure: &str,
        gathered_info: &str,
        history_excerpt: &str,
        failure_analysis: Option<&str>,
    ) -> Result<String>;

    /// The next commands to run, or completion.
    async fn next_commands(
        &self,
        task: &str,
        analysis: &str,
        dir_structure: &str,
        command_history: &str,
    ) -> Result<NextStep>;

    /// Diagnosis of a failed command, used to steer the next round.
    async fn analyze_failure(&self, task: &str, command: &str, error: &str) -> Result<String>;
}

/// Production advisor backed by the chat-completions API.
pub struct LlmAdvisor {
    chat: ChatClient,
}

impl LlmAdvisor {
    pub fn new(chat: ChatClient) -> Self {
        Self { chat }
    }
}

#[async_trait]
impl CommandAdvisor for LlmAdvisor {
    async fn info_commands(&self, task: &str, dir_structure: &str) -> Result<Vec<String>> {
        let reply = self
            .chat
            .complete(INFO_SYSTEM_PROMPT, &build_info_prompt(task, dir_structure))
            .await?;
        debug!("Info-gathering reply:\n{}", reply);
        Ok(parse_commands(&reply))
    }

    async fn analyze_state(
        &self,
        task: &str,
        dir_structure: &str,
        gathered_info: &str,
        history_excerpt: &str,
        failure_analysis: Option<&str>,
    ) -> Result<String> {
        let prompt = build_analysis_prompt(
            task,
            dir_structure,
            gathered_info,
            history_excerpt,
            failure_analysis,
        );
        let analysis = self.chat.complete(ANALYSIS_SYSTEM_PROMPT, &prompt).await?;
        debug!("Analysis:\n{}", analysis);
        Ok(analysis)
    }

    async fn next_commands(
        &self,
        task: &str,
        analysis: &str,
        dir_structure: &str,
        command_history: &str,
    ) -> Result<NextStep> {
        let prompt = build_next_commands_prompt(task, analysis, dir_structure, command_history);
        let reply = self
            .chat
            .complete(NEXT_COMMANDS_SYSTEM_PROMPT, &prompt)
            .await?;
        debug!("Next-commands reply:\n{}", reply);

        let commands = parse_commands(&reply);
        if is_task_complete(&commands) {
            Ok(NextStep::Complete)
        } else {
            Ok(NextStep::Commands(commands))
        }
    }

    async fn analyze_failure(&self, task: &str, command: &str, error: &str) -> Result<String> {
        let prompt = build_failure_prompt(task, command, error);
        let diagnosis = self.chat.complete(FAILURE_SYSTEM_PROMPT, &prompt).await?;
        debug!("Failure diagnosis:\n{}", diagnosis);
        Ok(diagnosis)
    }
}

/// Deterministic advisor for offline runs and integration tests.
///
/// Phases are keyed on the task text and the visible history, so repeated
/// calls advance the flow without any internal state.
pub struct MockAdvisor;

impl MockAdvisor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MockAdvisor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandAdvisor for MockAdvisor {
    async fn info_commands(&self, _task: &str, _dir_structure: &str) -> Result<Vec<String>> {
        Ok(vec!["pwd".to_string()])
    }

    async fn analyze_state(
        &self,
        task: &str,
        _dir_structure: &str,
        _gathered_info: &str,
        history_excerpt: &str,
        failure_analysis: Option<&str>,
    ) -> Result<String> {
        if let Some(diagnosis) = failure_analysis {
            Ok(format!("Recovering from a failure: {diagnosis}"))
        } else if history_excerpt.is_empty() {
            Ok(format!("Nothing has been executed yet for: {task}"))
        } else {
            Ok(format!("Progress has been made on: {task}"))
        }
    }

    async fn next_commands(
        &self,
        task: &str,
        _analysis: &str,
        _dir_structure: &str,
        command_history: &str,
    ) -> Result<NextStep> {
        let task_lower = task.to_lowercase();

        if task_lower.contains("fail") {
            Ok(NextStep::Commands(vec!["false".to_string()]))
        } else if task_lower.contains("hello") {
            if command_history.contains("echo") {
                Ok(NextStep::Complete)
            } else {
                Ok(NextStep::Commands(vec![
                    "echo Hello from famulus".to_string()
                ]))
            }
        } else {
            Ok(NextStep::Complete)
        }
    }

    async fn analyze_failure(&self, _task: &str, command: &str, _error: &str) -> Result<String> {
        Ok(format!(
            "The command '{command}' exited with an error. Try an alternative."
        ))
    }
}
