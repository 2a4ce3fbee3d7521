//! Macro invocation context.
//!
//! Gives handlers access to the host parser, the span being consumed and a
//! factory for bad nodes.

use crate::node::{BadNode, MacroNode, Position};

/// Host parser services available to macro handlers.
///
/// Implemented by the document parser that drives the scanner. Handlers use
/// it to give macro bodies ordinary markdown semantics.
pub trait HostParser {
    /// Render a markdown fragment to the host's output format.
    ///
    /// The fragment is not scanned for macros.
    fn render_markdown(&self, markdown: &str) -> String;
}

/// Host that returns markdown unchanged.
///
/// Useful when the scanner is driven without a rendering host, e.g. in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainHost;

impl HostParser for PlainHost {
    fn render_markdown(&self, markdown: &str) -> String {
        markdown.to_owned()
    }
}

/// Context passed to a macro handler for one invocation.
///
/// # Example
///
/// ```
/// use tagmark_core::{MacroContext, PlainHost, Position};
///
/// let ctx = MacroContext::new(&PlainHost, "[note]\nbody\n[/note]", Position::new(3, 1));
/// assert_eq!(ctx.position().line, 3);
/// assert_eq!(ctx.host().render_markdown("*x*"), "*x*");
/// ```
pub struct MacroContext<'a> {
    host: &'a dyn HostParser,
    span: &'a str,
    position: Position,
}

impl<'a> MacroContext<'a> {
    /// Create a context for a matched span.
    #[must_use]
    pub fn new(host: &'a dyn HostParser, span: &'a str, position: Position) -> Self {
        Self {
            host,
            span,
            position,
        }
    }

    /// The host parser, for rendering nested markdown.
    #[must_use]
    pub fn host(&self) -> &'a dyn HostParser {
        self.host
    }

    /// The source text the scan outcome will consume.
    ///
    /// For block macros this runs from the opening tag through the closing tag.
    #[must_use]
    pub fn span(&self) -> &'a str {
        self.span
    }

    /// Position of the opening tag.
    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    /// Create a bad node, reported as a diagnostic after parsing.
    #[must_use]
    pub fn bad_node(&self, message: impl Into<String>) -> MacroNode {
        MacroNode::Bad(BadNode::new(message))
    }
}
