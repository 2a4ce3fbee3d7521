//! Nodes produced by macro handlers.

use std::fmt;

/// Source position of a node (1-indexed).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

impl Position {
    /// Create a position.
    #[must_use]
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Synthetic node marking a structural problem in the document.
///
/// Left in the tree by the scanner (currently for unclosed block macros) and
/// surfaced later by [`report_bad_nodes`](crate::report_bad_nodes).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BadNode {
    message: String,
}

impl BadNode {
    /// Create a bad node carrying a diagnostic message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Bad node for a block macro whose closing tag was never found.
    #[must_use]
    pub fn unclosed(name: &str) -> Self {
        Self::new(format!("Unclosed macro: {name}"))
    }

    /// The diagnostic message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTML placeholder shown where the macro would have been.
    #[must_use]
    pub fn to_html(&self) -> String {
        format!("<div>{}</div>", escape_html(&self.message))
    }
}

/// Replacement node returned by a macro handler.
///
/// # Example
///
/// ```
/// use tagmark_core::MacroNode;
///
/// let node = MacroNode::html("<kbd>Ctrl+C</kbd>");
/// assert!(matches!(node, MacroNode::Html(_)));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MacroNode {
    /// HTML spliced into the output verbatim.
    Html(String),
    /// Markdown rendered by the host. Macros inside it are not expanded.
    Markdown(String),
    /// Plain text, escaped by the host.
    Text(String),
    /// A structural problem reported through diagnostics.
    Bad(BadNode),
}

impl MacroNode {
    /// Create an HTML node.
    #[must_use]
    pub fn html(s: impl Into<String>) -> Self {
        Self::Html(s.into())
    }

    /// Create a markdown node.
    #[must_use]
    pub fn markdown(s: impl Into<String>) -> Self {
        Self::Markdown(s.into())
    }

    /// Create a text node.
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Get the bad node, if this is one.
    #[must_use]
    pub fn as_bad(&self) -> Option<&BadNode> {
        match self {
            Self::Bad(bad) => Some(bad),
            Self::Html(_) | Self::Markdown(_) | Self::Text(_) => None,
        }
    }
}

impl From<BadNode> for MacroNode {
    fn from(bad: BadNode) -> Self {
        Self::Bad(bad)
    }
}

/// Escape text for inclusion in HTML.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}
