//! Markdown to HTML rendering with macro expansion.

use tagmark_core::{
    Diagnostic, HostParser, MacroNode, MacroRegistry, MacroScanner, ScanLimits, Severity,
    escape_html, has_fatal, report_bad_nodes,
};

use crate::document::{Block, Document};
use crate::markdown::MarkdownRenderer;

/// Result of rendering a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderResult {
    /// Rendered HTML.
    pub html: String,
    /// One entry per bad node left in the document.
    pub diagnostics: Vec<Diagnostic>,
}

impl RenderResult {
    /// Check if any diagnostic should fail the document.
    #[must_use]
    pub fn has_fatal(&self) -> bool {
        has_fatal(&self.diagnostics)
    }
}

/// Renders markdown documents, expanding registered macros.
///
/// # Example
///
/// ```
/// use tagmark_core::{MacroNode, MacroRegistry};
/// use tagmark_renderer::MacroRenderer;
///
/// let mut registry = MacroRegistry::new();
/// registry.register_inline("kbd", |props, _| {
///     props.get("keys").map(|keys| MacroNode::html(format!("<kbd>{keys}</kbd>")))
/// })?;
///
/// let result = MacroRenderer::new(&registry).render("Press\n\n[kbd keys=Ctrl+C]\n");
/// assert_eq!(result.html, "<p>Press</p>\n<kbd>Ctrl+C</kbd>\n");
/// assert!(result.diagnostics.is_empty());
/// # Ok::<(), tagmark_core::RegistryError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MacroRenderer<'r> {
    scanner: MacroScanner<'r>,
    markdown: MarkdownRenderer,
    severity: Severity,
}

impl<'r> MacroRenderer<'r> {
    /// Create a renderer for macros in `registry`.
    #[must_use]
    pub fn new(registry: &'r MacroRegistry) -> Self {
        Self {
            scanner: MacroScanner::new(registry),
            markdown: MarkdownRenderer::new(),
            severity: Severity::Fatal,
        }
    }

    /// Set scanner limits.
    #[must_use]
    pub fn with_limits(mut self, limits: ScanLimits) -> Self {
        self.scanner = self.scanner.with_limits(limits);
        self
    }

    /// Set how bad nodes are reported.
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Enable or disable GFM extensions.
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.markdown = self.markdown.with_gfm(enabled);
        self
    }

    /// Parse `source` without rendering it.
    #[must_use]
    pub fn parse(&self, source: &str) -> Document {
        Document::parse(source, &self.scanner, &self.markdown)
    }

    /// Render `source` to HTML and collect diagnostics.
    ///
    /// The markdown is rendered in one pass with a placeholder comment where
    /// each macro stood, so nodes inside list items stay inside their item.
    /// Each placeholder is then replaced by the node's HTML.
    #[must_use]
    pub fn render(&self, source: &str) -> RenderResult {
        let document = self.parse(source);

        let mut diagnostics = Vec::new();
        report_bad_nodes(document.macro_nodes(), &mut diagnostics, self.severity);

        let mut markdown = String::with_capacity(source.len());
        let mut nodes = Vec::new();
        for block in document.blocks() {
            match block {
                Block::Markdown { text, .. } => markdown.push_str(text),
                Block::Macro { node, prefix, .. } => {
                    if !markdown.is_empty() && !markdown.ends_with('\n') {
                        markdown.push('\n');
                    }
                    markdown.push_str(prefix);
                    markdown.push_str(&placeholder(nodes.len()));
                    markdown.push('\n');
                    nodes.push(self.node_html(node));
                }
            }
        }

        let html = substitute_nodes(&self.markdown.render_markdown(&markdown), &nodes);

        tracing::debug!(
            blocks = document.blocks().len(),
            nodes = nodes.len(),
            diagnostics = diagnostics.len(),
            "Rendered document"
        );

        RenderResult { html, diagnostics }
    }

    fn node_html(&self, node: &MacroNode) -> String {
        let mut html = String::new();
        match node {
            MacroNode::Html(raw) => push_line(&mut html, raw),
            MacroNode::Markdown(markdown) => html.push_str(&self.markdown.render_markdown(markdown)),
            MacroNode::Text(text) => push_line(&mut html, &escape_html(text)),
            MacroNode::Bad(bad) => push_line(&mut html, &bad.to_html()),
        }
        html
    }
}

/// HTML comment standing in for the node at `index` during markdown rendering.
fn placeholder(index: usize) -> String {
    format!("<!--tagmark-macro-{index}-->")
}

/// Replace placeholder lines in `html` with the rendered nodes, in order.
fn substitute_nodes(html: &str, nodes: &[String]) -> String {
    let extra: usize = nodes.iter().map(String::len).sum();
    let mut out = String::with_capacity(html.len() + extra);
    let mut cursor = 0;

    for (index, node) in nodes.iter().enumerate() {
        let marker = placeholder(index);
        let Some(offset) = html[cursor..].find(&marker) else {
            tracing::warn!(index, "Macro placeholder missing from rendered markdown");
            continue;
        };
        let start = cursor + offset;
        out.push_str(&html[cursor..start]);
        out.push_str(node);
        cursor = start + marker.len();
        if html[cursor..].starts_with('\n') {
            cursor += 1;
        }
    }

    out.push_str(&html[cursor..]);
    out
}

/// Append `s`, terminated by a newline.
fn push_line(html: &mut String, s: &str) {
    html.push_str(s);
    if !s.ends_with('\n') {
        html.push('\n');
    }
}
