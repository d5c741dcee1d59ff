//! Prompt templates for the four LLM phases.
//!
//! Each phase is a (system prompt, user prompt) pair: the system prompt
//! fixes the assistant's role and response format, the user prompt carries
//! the task plus whatever context the phase needs (directory structure,
//! gathered information, command history, failure details).

/// System prompt for the information-gathering phase.
pub const INFO_SYSTEM_PROMPT: &str = r#"You are a CLI intelligence gatherer. Your goal is to identify what information
would be helpful to know before suggesting commands for the given task.

Return ONLY executable shell commands that gather information, one per line.
These commands should be safe information gathering commands like ls, pwd, git status, etc.
DO NOT return commands that make any changes."#;

/// System prompt for the state-analysis phase.
pub const ANALYSIS_SYSTEM_PROMPT: &str = r#"You are a CLI system state analyzer. Your goal is to assess the current state
and determine what actions need to be taken to accomplish the task.

Return a concise analysis of:
1. What needs to be done
2. Any potential issues or risks
3. Whether the task is complete or what remains to be done"#;

/// System prompt for the command-generation phase.
pub const NEXT_COMMANDS_SYSTEM_PROMPT: &str = r#"You are a helpful and intelligent CLI assistant that suggests bash commands.
Your goal is to provide the next step(s) needed based on the current analysis.

Return ONLY executable commands, one per line. If no further commands are needed,
return 'TASK_COMPLETE'.

Example good response:
git add file.py
git commit -m "Update file.py"

Example when done:
TASK_COMPLETE"#;

/// System prompt for the failure-analysis phase.
pub const FAILURE_SYSTEM_PROMPT: &str = r#"You are a CLI error analyst. A shell command failed while working on a task.
Examine the command and its error output and explain what went wrong.

Return a short diagnosis of the failure and what to try instead.
Do not return commands, only the diagnosis."#;

/// User prompt for the information-gathering phase.
pub fn build_info_prompt(task: &str, dir_structure: &str) -> String {
    format!(
        r#"Task to be performed: {task}

Current directory structure:
{dir_structure}

What information would be helpful to gather before proceeding with this task?
Return ONLY safe information gathering commands, one per line.
Example commands: pwd, ls, git status, git branch, etc.

Do not return commands that modify anything."#
    )
}

/// User prompt for the state-analysis phase.
///
/// `gathered_info` and `history_excerpt` are pre-rendered blocks; either
/// may be empty. A failure diagnosis from the previous round is included
/// when present so the analysis can steer recovery.
pub fn build_analysis_prompt(
    task: &str,
    dir_structure: &str,
    gathered_info: &str,
    history_excerpt: &str,
    failure_analysis: Option<&str>,
) -> String {
    let failure_block = match failure_analysis {
        Some(diagnosis) => format!("Analysis of the last failure:\n{diagnosis}"),
        None => String::new(),
    };

    format!(
        r#"Task to be performed: {task}

Current directory structure:
{dir_structure}

Gathered system information:
{gathered_info}

{history_excerpt}

{failure_block}

Analyze the current state and what needs to be done.
Focus on:
1. What specific actions need to be taken
2. Any potential issues or risks
3. Whether the task is already complete or what remains

Be concise and factual."#
    )
}

/// User prompt for the command-generation phase.
pub fn build_next_commands_prompt(
    task: &str,
    analysis: &str,
    dir_structure: &str,
    command_history: &str,
) -> String {
    format!(
        r#"Task to be performed: {task}

Current analysis:
{analysis}

Directory structure:
{dir_structure}

{command_history}

What commands should be run next? If the task is complete, return TASK_COMPLETE.
Return ONLY executable commands or TASK_COMPLETE."#
    )
}

/// User prompt for the failure-analysis phase.
pub fn build_failure_prompt(task: &str, command: &str, error: &str) -> String {
    format!(
        r#"Task to be performed: {task}

Failed command:
{command}

Error output:
{error}

What went wrong and what should be tried instead? Be concise."#
    )
}

/// Renders gathered info as `command:` / output blocks for the analysis
/// prompt.
pub fn format_gathered_info(gathered: &[(String, String)]) -> String {
    gathered
        .iter()
        .map(|(cmd, output)| format!("{cmd}:\n{output}"))
        .collect::<Vec<_>>()
        .join("\n")
}
