//! String-template macro handlers.
//!
//! Lets macros be declared without code, e.g. from a config file:
//! `<div class="alert alert-{{type}}">{{content}}</div>`

use crate::context::MacroContext;
use crate::node::{MacroNode, escape_html};
use crate::props::Properties;

/// Placeholder for the block body rendered as markdown.
const CONTENT: &str = "content";
/// Placeholder for the escaped raw block body.
const RAW_CONTENT: &str = "raw_content";

/// Template parse error.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TemplateError {
    /// A `{{` without a matching `}}`.
    #[error("unterminated placeholder at byte {offset}")]
    Unterminated {
        /// Byte offset of the `{{`.
        offset: usize,
    },
    /// A `{{}}` with no name inside.
    #[error("empty placeholder {{{{}}}}")]
    EmptyPlaceholder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Content,
    RawContent,
    Property(String),
}

/// A parsed template that expands to an HTML node.
///
/// Placeholders:
/// - `{{content}}`: block body rendered through the host's markdown renderer
/// - `{{raw_content}}`: block body, HTML-escaped
/// - `{{key}}`: HTML-escaped property value, empty when absent
///
/// # Example
///
/// ```
/// use tagmark_core::{MacroContext, PlainHost, Position, Properties, TemplateHandler};
///
/// let template = TemplateHandler::parse(r#"<iframe src="{{src}}"></iframe>"#).unwrap();
/// let ctx = MacroContext::new(&PlainHost, "", Position::new(1, 1));
/// let node = template.expand("", &Properties::parse("src=foo"), &ctx);
/// assert_eq!(node, tagmark_core::MacroNode::html(r#"<iframe src="foo"></iframe>"#));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateHandler {
    segments: Vec<Segment>,
}

impl TemplateHandler {
    /// Parse a template string.
    ///
    /// Fails on an unterminated `{{` or an empty placeholder.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut remaining = source;

        while let Some(open) = remaining.find("{{") {
            if open > 0 {
                segments.push(Segment::Literal(remaining[..open].to_owned()));
            }

            let after_open = &remaining[open + 2..];
            let close = after_open
                .find("}}")
                .ok_or(TemplateError::Unterminated {
                    offset: source.len() - remaining.len() + open,
                })?;

            let name = after_open[..close].trim();
            let segment = match name {
                "" => return Err(TemplateError::EmptyPlaceholder),
                CONTENT => Segment::Content,
                RAW_CONTENT => Segment::RawContent,
                key => Segment::Property(key.to_owned()),
            };
            segments.push(segment);

            remaining = &after_open[close + 2..];
        }

        if !remaining.is_empty() {
            segments.push(Segment::Literal(remaining.to_owned()));
        }

        Ok(Self { segments })
    }

    /// Expand the template for one invocation.
    ///
    /// Inline macros pass an empty `content`.
    #[must_use]
    pub fn expand(&self, content: &str, props: &Properties, ctx: &MacroContext<'_>) -> MacroNode {
        let mut html = String::new();

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => html.push_str(text),
                Segment::Content => html.push_str(&ctx.host().render_markdown(content)),
                Segment::RawContent => html.push_str(&escape_html(content)),
                Segment::Property(key) => {
                    html.push_str(&escape_html(props.get(key).unwrap_or_default()));
                }
            }
        }

        MacroNode::Html(html)
    }
}
