//! `tagmark check` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use tagmark_core::{Diagnostic, Severity, report_bad_nodes};
use tagmark_renderer::MacroRenderer;

use super::{CommonArgs, fail_on_fatal, read_source};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args, Debug)]
pub(crate) struct CheckArgs {
    /// Markdown files to check.
    #[arg(required = true)]
    pub(crate) files: Vec<PathBuf>,

    #[command(flatten)]
    pub(crate) common: CommonArgs,
}

impl CheckArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let (config, registry) = self.common.load(&output)?;
        let renderer = MacroRenderer::new(&registry).with_limits(config.scan_limits());
        let severity = config.severity();

        let mut all = Vec::new();
        for file in &self.files {
            let diagnostics = check_file(&renderer, file, severity)?;
            output.diagnostics(file, &diagnostics);
            all.extend(diagnostics);
        }

        if all.is_empty() {
            output.success(&format!("Checked {} file(s), no problems", self.files.len()));
        } else {
            output.warning(&format!(
                "Checked {} file(s), {} problem(s)",
                self.files.len(),
                all.len()
            ));
        }

        fail_on_fatal(&all)
    }
}

/// Parse one file and collect diagnostics for its bad nodes.
fn check_file(
    renderer: &MacroRenderer<'_>,
    path: &Path,
    severity: Severity,
) -> Result<Vec<Diagnostic>, CliError> {
    let source = read_source(path)?;
    let document = renderer.parse(&source);

    let mut diagnostics = Vec::new();
    report_bad_nodes(document.macro_nodes(), &mut diagnostics, severity);
    tracing::debug!(path = %path.display(), count = diagnostics.len(), "Checked file");
    Ok(diagnostics)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tagmark_core::{MacroRegistry, Position};

    use super::*;

    fn registry() -> MacroRegistry {
        let mut registry = MacroRegistry::new();
        registry
            .register_template("note", "<aside>{{content}}</aside>", false)
            .unwrap();
        registry
    }

    #[test]
    fn test_check_file_reports_unclosed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "Intro\n\n[note]\nnever closed\n").unwrap();

        let registry = registry();
        let diagnostics =
            check_file(&MacroRenderer::new(&registry), &path, Severity::Fatal).unwrap();

        assert_eq!(
            diagnostics,
            vec![Diagnostic {
                message: "Unclosed macro: note".to_owned(),
                position: Position::new(3, 1),
                fatal: true,
            }]
        );
    }

    #[test]
    fn test_check_file_clean() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "[note]\nfine\n[/note]\n").unwrap();

        let registry = registry();
        let diagnostics =
            check_file(&MacroRenderer::new(&registry), &path, Severity::Warning).unwrap();

        assert!(diagnostics.is_empty());
    }
}
