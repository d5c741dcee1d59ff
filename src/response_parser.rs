//! Parsing of free-text model replies into candidate commands.

/// Literal reply line signalling that no further commands are needed.
pub const TASK_COMPLETE: &str = "TASK_COMPLETE";

/// Splits a model reply into candidate command lines.
///
/// Trims whitespace, drops blank lines and code-fence markers, and strips
/// a leading `$ ` when the model formats replies as a shell transcript.
pub fn parse_commands(reply: &str) -> Vec<String> {
    reply
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("```"))
        .map(|line| line.strip_prefix("$ ").unwrap_or(line).to_string())
        .collect()
}

/// True when the reply signals completion.
///
/// The sentinel counts only on the first parsed line. An empty command
/// list also counts as complete: a reply with nothing runnable means
/// there is nothing left to do.
pub fn is_task_complete(commands: &[String]) -> bool {
    commands
        .first()
        .map(|line| line == TASK_COMPLETE)
        .unwrap_or(true)
}
