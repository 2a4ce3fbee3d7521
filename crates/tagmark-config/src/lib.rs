//! Configuration management for tagmark.
//!
//! Parses `tagmark.toml` with serde and discovers it in the current
//! directory or its parents. CLI flags override file values through
//! [`CliSettings`].
//!
//! ```toml
//! [scan]
//! max_block_lines = 10000
//!
//! [diagnostics]
//! fatal = true
//!
//! [[macros]]
//! name = "alert"
//! template = "<div class=\"alert alert-{{type}}\">{{content}}</div>"
//!
//! [[macros]]
//! name = "codepen"
//! inline = true
//! template = "<iframe src=\"{{src}}\"></iframe>"
//! ```
//!
//! ## Environment Variable Expansion
//!
//! Macro templates support `${VAR}` (error if unset) and `${VAR:-default}`.

mod expand;

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tagmark_core::{DEFAULT_MAX_BLOCK_LINES, MacroRegistry, RegistryError, ScanLimits, Severity};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "tagmark.toml";

/// CLI settings that override configuration file values.
///
/// Only `Some` values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the block scan line cap.
    pub max_block_lines: Option<usize>,
    /// Override whether unclosed macros fail the document.
    pub fatal: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scanner limits.
    pub scan: ScanConfig,
    /// Diagnostic reporting.
    pub diagnostics: DiagnosticsConfig,
    /// Template macros.
    pub macros: Vec<MacroConfig>,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// `[scan]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Lines a block scan visits before reporting the macro unclosed.
    pub max_block_lines: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_block_lines: DEFAULT_MAX_BLOCK_LINES,
        }
    }
}

/// `[diagnostics]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Whether unclosed macros fail the document.
    pub fatal: bool,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self { fatal: true }
    }
}

/// One `[[macros]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct MacroConfig {
    /// Macro name as written in tags.
    pub name: String,
    /// Whether the macro has no body or closing tag.
    #[serde(default)]
    pub inline: bool,
    /// HTML template with `{{content}}`, `{{raw_content}}` and `{{key}}` placeholders.
    pub template: String,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`macros[0].template`").
        field: String,
        /// Error message (e.g., "${`ALERT_CLASS`} not set").
        message: String,
    },
    /// A configured macro was rejected by the registry.
    #[error("Macro error: {0}")]
    Registry(#[from] RegistryError),
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `tagmark.toml` in the current directory and its parents, falling
    /// back to defaults when none is found.
    ///
    /// # Errors
    ///
    /// Returns error if an explicit `config_path` doesn't exist, parsing or
    /// expansion fails, or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let discovered = match config_path {
            Some(path) if !path.exists() => return Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => std::env::current_dir()
                .ok()
                .and_then(|cwd| Self::discover_from(&cwd)),
        };

        let mut config = match discovered {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Search `start` and its parents for a config file.
    #[must_use]
    pub fn discover_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILENAME))
            .find(|candidate| candidate.is_file())
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns error on invalid TOML or a failed `${VAR}` expansion.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.expand_env_vars()?;
        Ok(config)
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content)?;
        config.config_path = Some(path.to_path_buf());

        tracing::info!(
            path = %path.display(),
            macros = config.macros.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(max_block_lines) = settings.max_block_lines {
            self.scan.max_block_lines = max_block_lines;
        }
        if let Some(fatal) = settings.fatal {
            self.diagnostics.fatal = fatal;
        }
    }

    /// Validate configuration values.
    ///
    /// Called automatically by [`load`](Self::load).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` for bad values and
    /// `ConfigError::Registry` for macros the registry would reject.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scan.max_block_lines == 0 {
            return Err(ConfigError::Validation(
                "scan.max_block_lines must be greater than 0".to_owned(),
            ));
        }

        for (i, entry) in self.macros.iter().enumerate() {
            require_non_empty(&entry.name, &format!("macros[{i}].name"))?;
            require_non_empty(&entry.template, &format!("macros[{i}].template"))?;
        }

        self.build_registry().map(drop)
    }

    /// Scanner limits from the `[scan]` section.
    #[must_use]
    pub fn scan_limits(&self) -> ScanLimits {
        ScanLimits {
            max_block_lines: self.scan.max_block_lines,
        }
    }

    /// Severity of unclosed-macro diagnostics.
    #[must_use]
    pub fn severity(&self) -> Severity {
        if self.diagnostics.fatal {
            Severity::Fatal
        } else {
            Severity::Warning
        }
    }

    /// Build a registry holding every configured macro.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Registry` on an invalid name or template, or a
    /// name defined twice.
    pub fn build_registry(&self) -> Result<MacroRegistry, ConfigError> {
        let mut registry = MacroRegistry::new();
        for entry in &self.macros {
            registry.register_template(&entry.name, &entry.template, entry.inline)?;
        }
        Ok(registry)
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        for (i, entry) in self.macros.iter_mut().enumerate() {
            let field = format!("macros[{i}].template");
            entry.template = expand::expand_env(&entry.template, &field)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join(CONFIG_FILENAME);
        std::fs::write(&path, content).unwrap();
        path
    }

    const ALERT: &str = r#"
[[macros]]
name = "alert"
template = "<div class=\"alert alert-{{type}}\">{{content}}</div>"

[[macros]]
name = "codepen"
inline = true
template = "<iframe src=\"{{src}}\"></iframe>"
"#;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.scan.max_block_lines, DEFAULT_MAX_BLOCK_LINES);
        assert!(config.diagnostics.fatal);
        assert!(config.macros.is_empty());
        assert_eq!(config.severity(), Severity::Fatal);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.scan.max_block_lines, DEFAULT_MAX_BLOCK_LINES);
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_parse_sections() {
        let config = Config::from_toml(
            r"
[scan]
max_block_lines = 50

[diagnostics]
fatal = false
",
        )
        .unwrap();

        assert_eq!(config.scan_limits(), ScanLimits { max_block_lines: 50 });
        assert_eq!(config.severity(), Severity::Warning);
    }

    #[test]
    fn test_parse_macros() {
        let config = Config::from_toml(ALERT).unwrap();

        assert_eq!(config.macros.len(), 2);
        assert_eq!(config.macros[0].name, "alert");
        assert!(!config.macros[0].inline);
        assert!(config.macros[1].inline);
    }

    #[test]
    fn test_build_registry() {
        let registry = Config::from_toml(ALERT).unwrap().build_registry().unwrap();

        assert_eq!(registry.names(), vec!["alert", "codepen"]);
        assert!(registry.resolve("codepen").unwrap().is_inline());
        assert!(!registry.resolve("alert").unwrap().is_inline());
    }

    #[test]
    fn test_duplicate_macro_rejected() {
        let config = Config::from_toml(
            r#"
[[macros]]
name = "alert"
template = "<div>{{content}}</div>"

[[macros]]
name = "alert"
template = "<aside>{{content}}</aside>"
"#,
        )
        .unwrap();

        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Registry(RegistryError::Duplicate { .. })
        ));
        assert!(err.to_string().contains("Cannot redefine the macro alert"));
    }

    #[test]
    fn test_invalid_macro_name_rejected() {
        let config = Config::from_toml(
            r#"
[[macros]]
name = "my-alert"
template = "<div>{{content}}</div>"
"#,
        )
        .unwrap();

        assert!(matches!(
            config.validate(),
            Err(ConfigError::Registry(RegistryError::InvalidName { .. }))
        ));
    }

    #[test]
    fn test_invalid_template_rejected() {
        let config = Config::from_toml(
            r#"
[[macros]]
name = "alert"
template = "<div>{{content</div>"
"#,
        )
        .unwrap();

        assert!(matches!(
            config.validate(),
            Err(ConfigError::Registry(RegistryError::InvalidHandler { .. }))
        ));
    }

    #[test]
    fn test_empty_fields_rejected() {
        let config = Config::from_toml(
            r#"
[[macros]]
name = ""
template = "<hr>"
"#,
        )
        .unwrap();

        let err = config.validate().unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: macros[0].name cannot be empty");
    }

    #[test]
    fn test_zero_max_block_lines_rejected() {
        let config = Config::from_toml("[scan]\nmax_block_lines = 0\n").unwrap();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("scan.max_block_lines"));
    }

    #[test]
    fn test_missing_template_is_parse_error() {
        let result = Config::from_toml("[[macros]]\nname = \"alert\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_template_env_expansion() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::set_var("TAGMARK_CONFIG_TEST_CLASS", "callout");
        }
        let config = Config::from_toml(
            r#"
[[macros]]
name = "alert"
template = "<div class=\"${TAGMARK_CONFIG_TEST_CLASS}\">{{content}}</div>"
"#,
        )
        .unwrap();
        unsafe {
            std::env::remove_var("TAGMARK_CONFIG_TEST_CLASS");
        }

        assert_eq!(
            config.macros[0].template,
            "<div class=\"callout\">{{content}}</div>"
        );
    }

    #[test]
    fn test_template_env_expansion_missing_var() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::remove_var("TAGMARK_CONFIG_TEST_MISSING");
        }
        let result = Config::from_toml(
            r#"
[[macros]]
name = "alert"
template = "${TAGMARK_CONFIG_TEST_MISSING}"
"#,
        );

        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { ref field, .. } if field == "macros[0].template"));
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), ALERT);

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.macros.len(), 2);
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(ref p) if *p == path));
    }

    #[test]
    fn test_load_validates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "[scan]\nmax_block_lines = 0\n");

        assert!(matches!(
            Config::load(Some(&path), None),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_discover_from_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), ALERT);
        let nested = dir.path().join("docs/guide");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(Config::discover_from(&nested), Some(path));
    }

    #[test]
    fn test_discover_prefers_nearest() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), ALERT);
        let nested = dir.path().join("docs");
        std::fs::create_dir_all(&nested).unwrap();
        let nearest = write_config(&nested, "");

        assert_eq!(Config::discover_from(&nested), Some(nearest));
    }

    #[test]
    fn test_cli_settings_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "[scan]\nmax_block_lines = 50\n");
        let settings = CliSettings {
            max_block_lines: Some(5),
            fatal: Some(false),
        };

        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert_eq!(config.scan.max_block_lines, 5);
        assert_eq!(config.severity(), Severity::Warning);
    }

    #[test]
    fn test_cli_settings_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "[diagnostics]\nfatal = false\n");

        let config = Config::load(Some(&path), Some(&CliSettings::default())).unwrap();

        assert!(!config.diagnostics.fatal);
        assert_eq!(config.scan.max_block_lines, DEFAULT_MAX_BLOCK_LINES);
    }

    #[test]
    fn test_cli_settings_are_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "");
        let settings = CliSettings {
            max_block_lines: Some(0),
            fatal: None,
        };

        assert!(Config::load(Some(&path), Some(&settings)).is_err());
    }
}
