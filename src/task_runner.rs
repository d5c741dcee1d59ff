//! The multi-phase task loop and the interactive session.
//!
//! A task moves through four phases: gather information once, then loop
//! on analyze state, request next commands, and execute them behind the
//! confirmation gate. A failed command ends the round and the next
//! analysis steers recovery; consecutive failed rounds are bounded by
//! `max_retries`.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use tracing::{debug, error, info, warn};

use crate::command_advisor::{CommandAdvisor, NextStep};
use crate::confirmation_ui::{Confirmation, ConfirmationUi};
use crate::execution_history::ExecutionHistory;
use crate::executor::{CommandOutcome, Executor, ProcessRunner, SystemProcessRunner};
use crate::prompt_builder::format_gathered_info;
use crate::workspace::directory_snapshot_with_runner;

/// Drives tasks from description to completion.
pub struct TaskRunner {
    advisor: Box<dyn CommandAdvisor>,
    executor: Executor,
    confirmation_ui: ConfirmationUi,
    history: ExecutionHistory,
    runner: Box<dyn ProcessRunner>,
    trust_mode: bool,
    max_retries: u32,
}

impl TaskRunner {
    /// Creates a runner executing real subprocesses.
    pub fn new(advisor: Box<dyn CommandAdvisor>, trust_mode: bool, max_retries: u32) -> Self {
        Self::with_runner(advisor, trust_mode, max_retries, Box::new(SystemProcessRunner))
    }

    /// Creates a runner with an injected process runner (for testing).
    pub fn with_runner(
        advisor: Box<dyn CommandAdvisor>,
        trust_mode: bool,
        max_retries: u32,
        runner: Box<dyn ProcessRunner>,
    ) -> Self {
        Self {
            advisor,
            executor: Executor::new(),
            confirmation_ui: ConfirmationUi::new(trust_mode),
            history: ExecutionHistory::new(),
            runner,
            trust_mode,
            max_retries,
        }
    }

    pub fn history(&self) -> &ExecutionHistory {
        &self.history
    }

    /// Executes one command and records the outcome for prompt context.
    fn run_and_record(&mut self, command: &str) -> CommandOutcome {
        let outcome = self.executor.execute_with_runner(command, self.runner.as_ref());
        self.history
            .record(command, &outcome.output, outcome.success);
        outcome
    }

    /// Runs the advisor's information-gathering commands and collects the
    /// successful outputs.
    ///
    /// These commands are read-only by prompt contract, so they run
    /// without confirmation. Failures are logged and skipped.
    pub async fn gather_information(&mut self, task: &str) -> Result<Vec<(String, String)>> {
        info!("🔍 Gathering system information...");

        let dir_structure = directory_snapshot_with_runner(self.runner.as_ref());
        let commands = self.advisor.info_commands(task, &dir_structure).await?;

        let mut gathered = Vec::new();
        for command in commands {
            debug!("Gathering info: {}", command);
            let outcome = self.run_and_record(&command);
            if outcome.success {
                gathered.push((command, outcome.output));
            } else {
                warn!("Failed to gather info with {}: {}", command, outcome.output);
            }
        }

        Ok(gathered)
    }

    /// Processes a single task to completion, cancellation, or abort.
    ///
    /// Returns `Ok(true)` when the advisor signals completion, `Ok(false)`
    /// when the user declines a command or recovery is exhausted.
    pub async fn process_task(&mut self, task: &str) -> Result<bool> {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        self.process_task_with_io(task, &mut input, &mut output).await
    }

    /// Task processing with injected I/O streams for the confirmation gate.
    pub async fn process_task_with_io<R: BufRead, W: Write>(
        &mut self,
        task: &str,
        input: &mut R,
        output: &mut W,
    ) -> Result<bool> {
        let gathered = self.gather_information(task).await?;
        let gathered_info = format_gathered_info(&gathered);

        let mut retries = 0u32;
        let mut failure_analysis: Option<String> = None;

        loop {
            info!("📊 Analyzing current state...");

            let dir_structure = directory_snapshot_with_runner(self.runner.as_ref());
            let analysis = self
                .advisor
                .analyze_state(
                    task,
                    &dir_structure,
                    &gathered_info,
                    &self.history.format_recent(),
                    failure_analysis.as_deref(),
                )
                .await?;
            failure_analysis = None;

            let step = self
                .advisor
                .next_commands(task, &analysis, &dir_structure, &self.history.format_full())
                .await?;

            let commands = match step {
                NextStep::Complete => {
                    info!("✓ Task completed successfully!");
                    return Ok(true);
                }
                NextStep::Commands(commands) => commands,
            };

            let mut failed: Option<(String, String)> = None;
            for command in &commands {
                match self.confirmation_ui.confirm_with_io(command, input, output)? {
                    Confirmation::Approved => {}
                    Confirmation::Declined => {
                        info!("Command execution cancelled");
                        return Ok(false);
                    }
                }

                let outcome = self.run_and_record(command);
                if outcome.success {
                    info!("✓ Success!");
                    if !outcome.output.trim().is_empty() {
                        info!("{}", outcome.output.trim_end());
                    }
                } else {
                    warn!("✗ Failed: {}", outcome.output);
                    failed = Some((command.clone(), outcome.output));
                    break;
                }
            }

            match failed {
                Some((command, error)) => {
                    if retries >= self.max_retries {
                        error!("Task failed after {} recovery attempts", self.max_retries);
                        return Ok(false);
                    }
                    retries += 1;
                    info!("Attempting recovery ({}/{})", retries, self.max_retries);
                    failure_analysis =
                        Some(self.advisor.analyze_failure(task, &command, &error).await?);
                }
                None => {
                    retries = 0;
                }
            }
        }
    }

    /// Runs the interactive session on stdin/stdout.
    pub async fn run_interactive(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        self.run_interactive_with_io(&mut input, &mut output).await
    }

    /// Interactive session with injected I/O streams.
    ///
    /// Task prompts and confirmation prompts share the same reader, so a
    /// piped session transcript drives the whole loop.
    pub async fn run_interactive_with_io<R: BufRead, W: Write>(
        &mut self,
        input: &mut R,
        output: &mut W,
    ) -> Result<()> {
        let trust_note = if self.trust_mode {
            " (trust mode activated)"
        } else {
            ""
        };
        writeln!(output, "Welcome to the LLM Shell Helper!{trust_note}")?;

        loop {
            write!(output, "\nWhat would you like to do? (or 'exit' to quit): ")?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                break;
            }

            let task = line.trim().to_string();
            if task.eq_ignore_ascii_case("exit") {
                break;
            }
            if task.is_empty() {
                continue;
            }

            if let Err(e) = self.process_task_with_io(&task, input, output).await {
                error!("Error processing task: {}", e);
                warn!("An error occurred. Please try again or type 'exit' to quit");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::io::Cursor;
    use std::os::unix::process::ExitStatusExt;
    use std::process::{ExitStatus, Output};
    use std::sync::{Arc, Mutex};

    // =========================================================================
    // Scripted test doubles
    // =========================================================================

    /// Advisor that replays a fixed sequence of next-command steps and
    /// records what it was asked.
    struct ScriptedAdvisor {
        info_commands: Vec<String>,
        steps: Mutex<VecDeque<NextStep>>,
        analyses_seen: Arc<Mutex<Vec<(String, Option<String>)>>>,
        failures_diagnosed: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedAdvisor {
        fn new(info_commands: &[&str], steps: Vec<NextStep>) -> Self {
            Self {
                info_commands: info_commands.iter().map(|s| s.to_string()).collect(),
                steps: Mutex::new(steps.into()),
                analyses_seen: Arc::new(Mutex::new(Vec::new())),
                failures_diagnosed: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn completing() -> Self {
            Self::new(&[], vec![NextStep::Complete])
        }
    }

    #[async_trait]
    impl CommandAdvisor for ScriptedAdvisor {
        async fn info_commands(&self, _task: &str, _dir_structure: &str) -> Result<Vec<String>> {
            Ok(self.info_commands.clone())
        }

        async fn analyze_state(
            &self,
            _task: &str,
            _dir_structure: &str,
            gathered_info: &str,
            _history_excerpt: &str,
            failure_analysis: Option<&str>,
        ) -> Result<String> {
            self.analyses_seen.lock().unwrap().push((
                gathered_info.to_string(),
                failure_analysis.map(|s| s.to_string()),
            ));
            Ok("state analyzed".to_string())
        }

        async fn next_commands(
            &self,
            _task: &str,
            _analysis: &str,
            _dir_structure: &str,
            _command_history: &str,
        ) -> Result<NextStep> {
            self.steps
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| anyhow!("scripted advisor ran out of steps"))
        }

        async fn analyze_failure(&self, _task: &str, command: &str, _error: &str) -> Result<String> {
            self.failures_diagnosed
                .lock()
                .unwrap()
                .push(command.to_string());
            Ok(format!("diagnosis for {command}"))
        }
    }

    /// Runner that succeeds or fails by program name and records calls.
    struct ScriptedRunner {
        failing_programs: Vec<&'static str>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedRunner {
        fn new(failing_programs: &[&'static str]) -> Self {
            Self {
                failing_programs: failing_programs.to_vec(),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn calls(&self) -> Arc<Mutex<Vec<String>>> {
            Arc::clone(&self.calls)
        }
    }

    impl ProcessRunner for ScriptedRunner {
        fn run(&self, program: &str, _args: &[&str]) -> Result<Output> {
            self.calls.lock().unwrap().push(program.to_string());
            if self.failing_programs.contains(&program) {
                Ok(Output {
                    status: ExitStatus::from_raw(1 << 8),
                    stdout: vec![],
                    stderr: b"boom\n".to_vec(),
                })
            } else {
                Ok(Output {
                    status: ExitStatus::from_raw(0),
                    stdout: b"ok\n".to_vec(),
                    stderr: vec![],
                })
            }
        }

        fn program_exists(&self, _program: &str) -> bool {
            false
        }
    }

    fn executed(calls: &Arc<Mutex<Vec<String>>>, program: &str) -> usize {
        calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.as_str() == program)
            .count()
    }

    // =========================================================================
    // process_task tests
    // =========================================================================

    #[tokio::test]
    async fn test_completes_immediately_when_advisor_signals_done() {
        let advisor = ScriptedAdvisor::completing();
        let mut runner =
            TaskRunner::with_runner(Box::new(advisor), false, 3, Box::new(ScriptedRunner::new(&[])));

        let mut input = Cursor::new(b"");
        let mut output = Vec::new();
        let done = runner
            .process_task_with_io("do nothing", &mut input, &mut output)
            .await
            .unwrap();

        assert!(done);
    }

    #[tokio::test]
    async fn test_executes_commands_then_completes() {
        let advisor = ScriptedAdvisor::new(
            &[],
            vec![
                NextStep::Commands(vec!["touch a.txt".to_string()]),
                NextStep::Complete,
            ],
        );
        let process_runner = ScriptedRunner::new(&[]);
        let calls = process_runner.calls();
        let mut runner =
            TaskRunner::with_runner(Box::new(advisor), true, 3, Box::new(process_runner));

        let mut input = Cursor::new(b"");
        let mut output = Vec::new();
        let done = runner
            .process_task_with_io("create a file", &mut input, &mut output)
            .await
            .unwrap();

        assert!(done);
        assert_eq!(executed(&calls, "touch"), 1);
    }

    #[tokio::test]
    async fn test_success_is_reflected_in_history() {
        let advisor = ScriptedAdvisor::new(
            &[],
            vec![
                NextStep::Commands(vec!["touch a.txt".to_string(), "failcmd now".to_string()]),
                NextStep::Complete,
            ],
        );
        let mut runner = TaskRunner::with_runner(
            Box::new(advisor),
            true,
            3,
            Box::new(ScriptedRunner::new(&["failcmd"])),
        );

        let mut input = Cursor::new(b"");
        let mut output = Vec::new();
        runner
            .process_task_with_io("mixed results", &mut input, &mut output)
            .await
            .unwrap();

        let entries = runner.history().entries();
        let touch = entries.iter().find(|e| e.command == "touch a.txt").unwrap();
        assert!(touch.success);
        assert_eq!(touch.output, "ok\n");

        let failed = entries.iter().find(|e| e.command == "failcmd now").unwrap();
        assert!(!failed.success);
        assert_eq!(failed.output, "boom\n");
    }

    #[tokio::test]
    async fn test_declined_confirmation_cancels_task_without_executing() {
        let advisor = ScriptedAdvisor::new(
            &[],
            vec![NextStep::Commands(vec!["rm -r important".to_string()])],
        );
        let process_runner = ScriptedRunner::new(&[]);
        let calls = process_runner.calls();
        let mut runner =
            TaskRunner::with_runner(Box::new(advisor), false, 3, Box::new(process_runner));

        let mut input = Cursor::new(b"n\n");
        let mut output = Vec::new();
        let done = runner
            .process_task_with_io("delete things", &mut input, &mut output)
            .await
            .unwrap();

        assert!(!done);
        assert_eq!(executed(&calls, "rm"), 0);

        let output_str = String::from_utf8(output).unwrap();
        assert!(output_str.contains(">>> rm -r important"));
        assert!(output_str.contains("Execute this command? (y/n): "));
    }

    #[tokio::test]
    async fn test_retries_are_bounded_by_max_retries() {
        let always_failing = vec![NextStep::Commands(vec!["failcmd".to_string()]); 16];
        let advisor = ScriptedAdvisor::new(&[], always_failing);
        let diagnoses = Arc::clone(&advisor.failures_diagnosed);
        let process_runner = ScriptedRunner::new(&["failcmd"]);
        let calls = process_runner.calls();
        let mut runner =
            TaskRunner::with_runner(Box::new(advisor), true, 3, Box::new(process_runner));

        let mut input = Cursor::new(b"");
        let mut output = Vec::new();
        let done = runner
            .process_task_with_io("always fails", &mut input, &mut output)
            .await
            .unwrap();

        assert!(!done);
        // Initial attempt plus exactly max_retries recovery rounds.
        assert_eq!(executed(&calls, "failcmd"), 4);
        assert_eq!(diagnoses.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_successful_round_resets_retry_counter() {
        let steps = vec![
            NextStep::Commands(vec!["failcmd".to_string()]),
            NextStep::Commands(vec!["okcmd".to_string()]),
            NextStep::Commands(vec!["failcmd".to_string()]),
            NextStep::Commands(vec!["failcmd".to_string()]),
            NextStep::Commands(vec!["failcmd".to_string()]),
            NextStep::Commands(vec!["failcmd".to_string()]),
        ];
        let advisor = ScriptedAdvisor::new(&[], steps);
        let process_runner = ScriptedRunner::new(&["failcmd"]);
        let calls = process_runner.calls();
        let mut runner =
            TaskRunner::with_runner(Box::new(advisor), true, 2, Box::new(process_runner));

        let mut input = Cursor::new(b"");
        let mut output = Vec::new();
        let done = runner
            .process_task_with_io("flaky work", &mut input, &mut output)
            .await
            .unwrap();

        assert!(!done);
        // Rounds 1-2 burn one retry and reset; rounds 3-5 burn the full
        // budget again before the abort.
        assert_eq!(executed(&calls, "failcmd"), 4);
        assert_eq!(executed(&calls, "okcmd"), 1);
    }

    #[tokio::test]
    async fn test_failure_diagnosis_feeds_next_analysis() {
        let advisor = ScriptedAdvisor::new(
            &[],
            vec![
                NextStep::Commands(vec!["failcmd".to_string()]),
                NextStep::Complete,
            ],
        );
        let analyses = Arc::clone(&advisor.analyses_seen);
        let mut runner = TaskRunner::with_runner(
            Box::new(advisor),
            true,
            3,
            Box::new(ScriptedRunner::new(&["failcmd"])),
        );

        let mut input = Cursor::new(b"");
        let mut output = Vec::new();
        let done = runner
            .process_task_with_io("recover me", &mut input, &mut output)
            .await
            .unwrap();
        assert!(done);

        // The first analysis runs clean, the second carries the diagnosis
        // produced after the failed round.
        let analyses = analyses.lock().unwrap();
        assert_eq!(analyses.len(), 2);
        assert!(analyses[0].1.is_none());
        assert_eq!(analyses[1].1.as_deref(), Some("diagnosis for failcmd"));

        let entries = runner.history().entries();
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].success);
    }

    #[tokio::test]
    async fn test_gathered_info_reaches_analysis_prompt() {
        let advisor = ScriptedAdvisor::new(&["pwd"], vec![NextStep::Complete]);
        let analyses = Arc::clone(&advisor.analyses_seen);
        let mut runner =
            TaskRunner::with_runner(Box::new(advisor), false, 3, Box::new(ScriptedRunner::new(&[])));

        let mut input = Cursor::new(b"");
        let mut output = Vec::new();
        runner
            .process_task_with_io("where am i", &mut input, &mut output)
            .await
            .unwrap();

        let analyses = analyses.lock().unwrap();
        assert_eq!(analyses.len(), 1);
        assert!(analyses[0].0.contains("pwd:\nok"));
        assert!(analyses[0].1.is_none());
    }

    // =========================================================================
    // run_interactive tests
    // =========================================================================

    #[tokio::test]
    async fn test_interactive_exit_quits_without_tasks() {
        let advisor = ScriptedAdvisor::new(&[], vec![]);
        let mut runner =
            TaskRunner::with_runner(Box::new(advisor), false, 3, Box::new(ScriptedRunner::new(&[])));

        let mut input = Cursor::new(b"exit\n".to_vec());
        let mut output = Vec::new();
        runner
            .run_interactive_with_io(&mut input, &mut output)
            .await
            .unwrap();

        let output_str = String::from_utf8(output).unwrap();
        assert!(output_str.contains("Welcome to the LLM Shell Helper!"));
        assert!(output_str.contains("What would you like to do? (or 'exit' to quit): "));
    }

    #[tokio::test]
    async fn test_interactive_banner_notes_trust_mode() {
        let advisor = ScriptedAdvisor::new(&[], vec![]);
        let mut runner =
            TaskRunner::with_runner(Box::new(advisor), true, 3, Box::new(ScriptedRunner::new(&[])));

        let mut input = Cursor::new(b"exit\n".to_vec());
        let mut output = Vec::new();
        runner
            .run_interactive_with_io(&mut input, &mut output)
            .await
            .unwrap();

        let output_str = String::from_utf8(output).unwrap();
        assert!(output_str.contains("Welcome to the LLM Shell Helper! (trust mode activated)"));
    }

    #[tokio::test]
    async fn test_interactive_runs_task_then_exits_on_eof() {
        let advisor = ScriptedAdvisor::new(&[], vec![NextStep::Complete]);
        let mut runner =
            TaskRunner::with_runner(Box::new(advisor), false, 3, Box::new(ScriptedRunner::new(&[])));

        let mut input = Cursor::new(b"tidy up\n".to_vec());
        let mut output = Vec::new();
        runner
            .run_interactive_with_io(&mut input, &mut output)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_interactive_survives_task_errors() {
        // No scripted steps: the first task errors out of the advisor.
        let advisor = ScriptedAdvisor::new(&[], vec![]);
        let mut runner =
            TaskRunner::with_runner(Box::new(advisor), false, 3, Box::new(ScriptedRunner::new(&[])));

        let mut input = Cursor::new(b"broken task\nexit\n".to_vec());
        let mut output = Vec::new();
        let result = runner.run_interactive_with_io(&mut input, &mut output).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_interactive_skips_blank_lines() {
        let advisor = ScriptedAdvisor::new(&[], vec![]);
        let mut runner =
            TaskRunner::with_runner(Box::new(advisor), false, 3, Box::new(ScriptedRunner::new(&[])));

        let mut input = Cursor::new(b"\n\nexit\n".to_vec());
        let mut output = Vec::new();
        runner
            .run_interactive_with_io(&mut input, &mut output)
            .await
            .unwrap();
    }
}
