//! Famulus - LLM-assisted shell task runner library.
//!
//! This library provides the core functionality for turning natural-language
//! tasks into executed shell commands. It supports:
//!
//! - **Multi-phase planning** via a chat-completions API
//! - **Information gathering** with read-only probe commands
//! - **Confirmation-gated execution** directly via subprocesses, no shell
//! - **Bounded recovery** from failed commands with model-guided retries
//! - **Execution history** fed back into every prompt
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management (API keys, model, retry budget)
//! - [`task_runner`] - Drives tasks through the phase loop
//! - [`command_advisor`] - LLM-backed planning behind a mockable trait
//! - [`chat_client`] - Chat-completions API wire client
//! - [`prompt_builder`] - Prompt texts for each phase
//! - [`response_parser`] - Command extraction from model replies
//! - [`executor`] - Runs commands as subprocesses
//! - [`execution_history`] - Bounded record of commands and outputs
//! - [`workspace`] - Directory structure snapshots
//! - [`confirmation_ui`] - Per-command user consent prompt
//! - [`providers`] - Shared dependency injection traits
//! - [`http_client`] - HTTP client abstraction
//!
//! # Example
//!
//! ```ignore
//! use famulus::command_advisor::MockAdvisor;
//! use famulus::task_runner::TaskRunner;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut runner = TaskRunner::new(Box::new(MockAdvisor::new()), false, 3);
//!
//!     // Run a single task to completion or abort.
//!     let done = runner.process_task("say hello").await?;
//!     println!("task finished: {done}");
//!
//!     // Or hand control to the interactive session.
//!     runner.run_interactive().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Recovery
//!
//! A failed command does not end the task. The failure is diagnosed by the
//! model, the diagnosis is folded into the next state analysis, and fresh
//! commands are requested:
//!
//! ```bash
//! # Ask for something that needs a few attempts
//! fam "extract the logs archive"
//!
//! # A wrong tool guess fails, gets diagnosed, and the next round
//! # switches approach; after max_retries consecutive failed rounds
//! # the task aborts instead of looping forever.
//! ```
//!
//! The recovery loop preserves the task description while regenerating
//! commands based on the failure diagnosis and the recorded history of the
//! previous rounds.

pub mod chat_client;
pub mod command_advisor;
pub mod config;
pub mod confirmation_ui;
pub mod execution_history;
pub mod executor;
pub mod http_client;
pub mod prompt_builder;
pub mod providers;
pub mod response_parser;
pub mod task_runner;
pub mod workspace;
