//! User interface for command confirmation.
//!
//! Every command suggested by the model is echoed and confirmed before it
//! runs, unless trust mode is active. Declining cancels the whole task,
//! not just the one command.

use anyhow::Result;
use std::io::{self, BufRead, Write};

/// Outcome of a confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Approved,
    Declined,
}

/// Handles the per-command confirmation dialog.
///
/// # Example
///
/// ```no_run
/// use famulus::confirmation_ui::ConfirmationUi;
///
/// let ui = ConfirmationUi::new(false);
/// let decision = ui.confirm("rm -r build/")?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub struct ConfirmationUi {
    trust_mode: bool,
}

impl ConfirmationUi {
    /// Creates a new `ConfirmationUi`.
    ///
    /// # Arguments
    ///
    /// * `trust_mode` - If true, commands are approved without asking
    pub fn new(trust_mode: bool) -> Self {
        Self { trust_mode }
    }

    // =========================================================================
    // Core method with I/O injection (testable)
    // =========================================================================

    /// Echoes the command and asks for confirmation using custom I/O streams.
    ///
    /// In trust mode the command is echoed but approved without reading
    /// any input. Otherwise only an answer of `y` (any case) approves.
    pub fn confirm_with_io<R: BufRead, W: Write>(
        &self,
        command: &str,
        input: &mut R,
        output: &mut W,
    ) -> Result<Confirmation> {
        writeln!(output, "\n>>> {}", command)?;

        if self.trust_mode {
            return Ok(Confirmation::Approved);
        }

        write!(output, "Execute this command? (y/n): ")?;
        output.flush()?;

        let mut line = String::new();
        input.read_line(&mut line)?;

        if line.trim().eq_ignore_ascii_case("y") {
            Ok(Confirmation::Approved)
        } else {
            Ok(Confirmation::Declined)
        }
    }

    // =========================================================================
    // Convenience method using standard I/O
    // =========================================================================

    /// Echoes the command and asks for confirmation on stdin/stdout.
    ///
    /// This is a convenience wrapper around [`Self::confirm_with_io`].
    pub fn confirm(&self, command: &str) -> Result<Confirmation> {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        self.confirm_with_io(command, &mut input, &mut output)
    }
}
