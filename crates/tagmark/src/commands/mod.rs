//! CLI command implementations.

mod check;
mod render;

use std::path::{Path, PathBuf};

use clap::Args;
use tagmark_config::{CliSettings, Config};
use tagmark_core::{Diagnostic, MacroRegistry, has_fatal};

use crate::error::CliError;
use crate::output::Output;

pub(crate) use check::CheckArgs;
pub(crate) use render::RenderArgs;

/// Options shared by all commands.
#[derive(Args, Debug)]
pub(crate) struct CommonArgs {
    /// Path to configuration file (default: auto-discover tagmark.toml).
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,

    /// Report unclosed macros as warnings instead of errors.
    #[arg(long)]
    pub(crate) lenient: bool,

    /// Maximum lines scanned for a closing tag (overrides config).
    #[arg(long, value_name = "N")]
    pub(crate) max_block_lines: Option<usize>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl CommonArgs {
    /// Load configuration and build the macro registry it declares.
    fn load(&self, output: &Output) -> Result<(Config, MacroRegistry), CliError> {
        let cli_settings = CliSettings {
            max_block_lines: self.max_block_lines,
            fatal: self.lenient.then_some(false),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        if self.verbose
            && let Some(path) = &config.config_path
        {
            output.info(&format!("Config: {}", path.display()));
        }

        let registry = config.build_registry()?;
        Ok((config, registry))
    }
}

fn read_source(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Fail when any diagnostic is fatal.
fn fail_on_fatal(diagnostics: &[Diagnostic]) -> Result<(), CliError> {
    if has_fatal(diagnostics) {
        let count = diagnostics.iter().filter(|d| d.fatal).count();
        return Err(CliError::Fatal { count });
    }
    Ok(())
}
