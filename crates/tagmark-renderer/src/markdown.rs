//! pulldown-cmark backed host parser.

use pulldown_cmark::{Options, Parser, html};
use tagmark_core::HostParser;

/// Renders markdown fragments to HTML with pulldown-cmark.
///
/// GitHub Flavored Markdown extensions (tables, strikethrough, task lists,
/// alerts) are enabled by default.
#[derive(Debug, Clone, Copy)]
pub struct MarkdownRenderer {
    gfm: bool,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self { gfm: true }
    }
}

impl MarkdownRenderer {
    /// Create a renderer with GFM enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable GFM extensions.
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Parser options for the current configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        }
    }
}

impl HostParser for MarkdownRenderer {
    fn render_markdown(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.parser_options());
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }
}
