//! Markdown rendering with bracket macro expansion.
//!
//! [`Document::parse`] walks a markdown source line by line and asks a
//! [`MacroScanner`](tagmark_core::MacroScanner) for a macro at every block
//! boundary, including inside list items. The document is rendered in one
//! pulldown-cmark pass through [`MarkdownRenderer`], which is also the
//! [`HostParser`](tagmark_core::HostParser) handed to macro handlers.
//!
//! [`MacroRenderer`] ties the pieces together and reports unclosed macros as
//! diagnostics.
//!
//! # Example
//!
//! ```
//! use tagmark_core::MacroRegistry;
//! use tagmark_renderer::MacroRenderer;
//!
//! let mut registry = MacroRegistry::new();
//! registry.register_template("alert", "<div class=\"alert\">{{content}}</div>", false)?;
//!
//! let result = MacroRenderer::new(&registry).render("[alert]\nHey *dude*\n[/alert]\n");
//! assert_eq!(result.html, "<div class=\"alert\"><p>Hey <em>dude</em></p>\n</div>\n");
//! # Ok::<(), tagmark_core::RegistryError>(())
//! ```

mod container;
mod document;
mod fence;
mod markdown;
mod renderer;

pub use document::{Block, Document};
pub use markdown::MarkdownRenderer;
pub use renderer::{MacroRenderer, RenderResult};
