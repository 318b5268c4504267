//! Colored terminal output utilities.

use console::{Style, Term};

/// Terminal output formatter.
///
/// Informational messages are dropped in quiet mode; errors never are.
pub(crate) struct Output {
    term: Term,
    quiet: bool,
    green: Style,
    red: Style,
}

impl Output {
    /// Create a new output formatter.
    #[must_use]
    pub(crate) fn new(quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            quiet,
            green: Style::new().green(),
            red: Style::new().red(),
        }
    }

    /// Print an info message.
    pub(crate) fn info(&self, msg: &str) {
        if !self.quiet {
            let _ = self.term.write_line(msg);
        }
    }

    /// Print a success message (green).
    pub(crate) fn success(&self, msg: &str) {
        if !self.quiet {
            let _ = self.term.write_line(&self.green.apply_to(msg).to_string());
        }
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }
}
