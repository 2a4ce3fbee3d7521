//! Bracket-delimited macro tags for line-oriented markdown parsers.
//!
//! Recognizes `[name props]content[/name]` (block) and `[name props]` (inline)
//! tags and maps them to caller-supplied replacement nodes.
//!
//! # Architecture
//!
//! - [`Properties`]: decodes the property text trailing a tag name
//! - [`MacroRegistry`]: name → handler mapping, one registration per name
//! - [`MacroScanner`]: called by a host parser at each candidate line with the
//!   remaining text; returns a [`ScanOutcome`] and the span to consume
//! - [`report_bad_nodes`]: post-parse pass that reports unclosed macros
//!
//! The host parser owns the document tree and the dispatch loop. It hands
//! handlers a [`HostParser`] through the [`MacroContext`] so macro bodies can
//! be rendered with ordinary markdown semantics.
//!
//! # Example
//!
//! ```
//! use tagmark_core::{MacroNode, MacroRegistry, MacroScanner, PlainHost, Position};
//!
//! let mut registry = MacroRegistry::new();
//! registry.register_inline("codepen", |props, _ctx| {
//!     props.get("src").map(|src| MacroNode::html(format!("<iframe src=\"{src}\"></iframe>")))
//! })?;
//!
//! let scanner = MacroScanner::new(&registry);
//! let outcome = scanner.scan("[codepen src=foo]\n", false, Position::new(1, 1), &PlainHost);
//! assert_eq!(outcome.consumed(), 18);
//! # Ok::<(), tagmark_core::RegistryError>(())
//! ```

mod context;
mod diagnostics;
mod node;
mod props;
mod registry;
mod scanner;
mod template;

pub use context::{HostParser, MacroContext, PlainHost};
pub use diagnostics::{Diagnostic, MessageSink, Severity, has_fatal, report_bad_nodes};
pub use node::{BadNode, MacroNode, Position, escape_html};
pub use props::Properties;
pub use registry::{BlockFn, Handler, InlineFn, MacroDefinition, MacroRegistry, RegistryError};
pub use scanner::{DEFAULT_MAX_BLOCK_LINES, MacroScanner, ScanLimits, ScanOutcome};
pub use template::{TemplateError, TemplateHandler};
