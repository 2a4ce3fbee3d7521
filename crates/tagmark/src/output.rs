//! Colored terminal output utilities.

use std::path::Path;

use console::{Style, Term};
use tagmark_core::Diagnostic;

/// Terminal output formatter.
pub(crate) struct Output {
    term: Term,
    green: Style,
    yellow: Style,
    red: Style,
}

impl Output {
    /// Create a new output formatter writing to stderr.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
        }
    }

    /// Print an info message.
    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// Print a success message (green).
    pub(crate) fn success(&self, msg: &str) {
        let _ = self.term.write_line(&self.green.apply_to(msg).to_string());
    }

    /// Print a warning message (yellow).
    pub(crate) fn warning(&self, msg: &str) {
        let _ = self.term.write_line(&self.yellow.apply_to(msg).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }

    /// Print diagnostics for `file`, red when fatal and yellow otherwise.
    pub(crate) fn diagnostics(&self, file: &Path, diagnostics: &[Diagnostic]) {
        for diagnostic in diagnostics {
            let line = diagnostic_line(file, diagnostic);
            if diagnostic.fatal {
                self.error(&line);
            } else {
                self.warning(&line);
            }
        }
    }
}

/// Format as `file:line:column: message`.
pub(crate) fn diagnostic_line(file: &Path, diagnostic: &Diagnostic) -> String {
    format!("{}:{diagnostic}", file.display())
}
