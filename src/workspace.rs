//! Directory-structure snapshots for prompt context.

use tracing::error;

use crate::executor::{ProcessRunner, SystemProcessRunner};

/// Fallback text used when no listing tool is available.
pub const STRUCTURE_UNAVAILABLE: &str = "Unable to get directory structure";

/// Returns a listing of the current directory tree.
///
/// Prefers `tree` when it is installed and succeeds, falls back to
/// `ls -R`, and degrades to [`STRUCTURE_UNAVAILABLE`] when neither can
/// be run. The snapshot is context for the model, so a degraded answer
/// is better than an error.
pub fn directory_snapshot() -> String {
    directory_snapshot_with_runner(&SystemProcessRunner)
}

/// Snapshot with an injected runner (for testing).
pub fn directory_snapshot_with_runner(runner: &dyn ProcessRunner) -> String {
    if runner.program_exists("tree") {
        if let Ok(output) = runner.run("tree", &[]) {
            if output.status.success() {
                return String::from_utf8_lossy(&output.stdout).trim().to_string();
            }
        }
    }

    match runner.run("ls", &["-R"]) {
        Ok(output) => String::from_utf8_lossy(&output.stdout).trim().to_string(),
        Err(e) => {
            error!("Failed to get directory info: {}", e);
            STRUCTURE_UNAVAILABLE.to_string()
        }
    }
}
