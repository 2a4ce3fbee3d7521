//! `tagmark render` command implementation.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use tagmark_renderer::MacroRenderer;

use super::{CommonArgs, fail_on_fatal, read_source};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args, Debug)]
pub(crate) struct RenderArgs {
    /// Markdown file to render.
    pub(crate) file: PathBuf,

    /// Write HTML to this file instead of stdout.
    #[arg(short, long)]
    pub(crate) output: Option<PathBuf>,

    #[command(flatten)]
    pub(crate) common: CommonArgs,
}

impl RenderArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let (config, registry) = self.common.load(&output)?;

        let source = read_source(&self.file)?;
        let result = MacroRenderer::new(&registry)
            .with_limits(config.scan_limits())
            .with_severity(config.severity())
            .render(&source);

        output.diagnostics(&self.file, &result.diagnostics);

        match &self.output {
            Some(path) => {
                std::fs::write(path, &result.html)?;
                output.success(&format!("Wrote {}", path.display()));
            }
            None => std::io::stdout().lock().write_all(result.html.as_bytes())?,
        }

        fail_on_fatal(&result.diagnostics)
    }
}
