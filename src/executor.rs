//! Command execution module.
//!
//! Commands arrive as single strings from the model. They are tokenized
//! into an argv vector (quote-aware, no shell interpolation) and run as
//! plain subprocesses with captured output. A failed command is a normal
//! outcome here, not an error: the result feeds the recovery loop.

use std::process::{Command, Output};

use anyhow::Result;
use tracing::debug;

/// Outcome of one command execution.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    /// Whether the command exited with status zero.
    pub success: bool,
    /// Captured stdout on success, stderr on failure.
    pub output: String,
}

// =============================================================================
// Traits for Dependency Injection
// =============================================================================

/// Trait for running system processes.
///
/// This abstraction enables testing without spawning real processes.
pub trait ProcessRunner: Send + Sync {
    /// Executes a command and returns its output.
    fn run(&self, program: &str, args: &[&str]) -> Result<Output>;

    /// Checks if a program exists in PATH.
    fn program_exists(&self, program: &str) -> bool;
}

/// Default process runner using std::process::Command.
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        Ok(cmd.output()?)
    }

    fn program_exists(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

// =============================================================================
// Executor Implementation
// =============================================================================

/// Executes command strings as subprocesses.
///
/// Tokenization is quote-aware (`git commit -m "a message"` becomes four
/// argv entries) but nothing is interpreted by a shell: no globbing, no
/// pipes, no variable expansion.
///
/// # Example
///
/// ```ignore
/// let executor = Executor::new();
/// let outcome = executor.execute("ls -la");
/// println!("{}", outcome.output);
/// ```
pub struct Executor;

impl Executor {
    pub fn new() -> Self {
        Self
    }

    /// Executes a command string and reports its outcome.
    pub fn execute(&self, command: &str) -> CommandOutcome {
        self.execute_with_runner(command, &SystemProcessRunner)
    }

    /// Executes a command with an injected runner (for testing).
    ///
    /// Tokenization and spawn problems are reported as failed outcomes
    /// with the error text as output, so the caller can treat every
    /// command uniformly.
    pub fn execute_with_runner(&self, command: &str, runner: &dyn ProcessRunner) -> CommandOutcome {
        let args = match shell_words::split(command) {
            Ok(args) => args,
            Err(e) => {
                return CommandOutcome {
                    success: false,
                    output: format!("Failed to parse command: {}", e),
                }
            }
        };

        let (program, rest) = match args.split_first() {
            Some(split) => split,
            None => {
                return CommandOutcome {
                    success: false,
                    output: "No command provided".to_string(),
                }
            }
        };

        let command_args: Vec<&str> = rest.iter().map(|s| s.as_str()).collect();

        debug!("Executing command: {} {:?}", program, command_args);

        match runner.run(program, &command_args) {
            Ok(output) => {
                let success = output.status.success();
                let text = if success {
                    String::from_utf8_lossy(&output.stdout).to_string()
                } else {
                    String::from_utf8_lossy(&output.stderr).to_string()
                };
                CommandOutcome {
                    success,
                    output: text,
                }
            }
            Err(e) => CommandOutcome {
                success: false,
                output: e.to_string(),
            },
        }
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}
