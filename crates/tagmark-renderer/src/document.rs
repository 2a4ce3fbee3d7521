//! Line-oriented document parsing.
//!
//! Splits a markdown source into plain markdown blocks and macro nodes by
//! driving a [`MacroScanner`] at each block boundary. Lines inside list items
//! are scanned with the item's content indent removed.

use std::borrow::Cow;

use tagmark_core::{HostParser, MacroNode, MacroScanner, Position};

use crate::container::{ListStack, ends_block, leading_spaces};
use crate::fence::{FenceLine, FenceTracker};

/// A top-level piece of a parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Markdown text between macros, rendered by the host.
    Markdown {
        /// Source text.
        text: String,
        /// Where the text starts.
        position: Position,
    },
    /// Node produced by a macro.
    Macro {
        /// Replacement node.
        node: MacroNode,
        /// Position of the opening tag.
        position: Position,
        /// Text before the tag on its line that belongs to enclosing list
        /// items: indentation or a list marker. Empty at the top level.
        prefix: String,
    },
}

impl Block {
    /// Source position of the block.
    #[must_use]
    pub fn position(&self) -> Position {
        match self {
            Self::Markdown { position, .. } | Self::Macro { position, .. } => *position,
        }
    }
}

/// A parsed document.
///
/// # Example
///
/// ```
/// use tagmark_core::{MacroNode, MacroRegistry, MacroScanner, PlainHost, Position};
/// use tagmark_renderer::{Block, Document};
///
/// let mut registry = MacroRegistry::new();
/// registry.register_block("note", |content, _, _| Some(MacroNode::text(content)))?;
///
/// let source = "Intro\n\n[note]\nHey dude\n[/note]\n";
/// let doc = Document::parse(source, &MacroScanner::new(&registry), &PlainHost);
///
/// assert_eq!(doc.blocks().len(), 2);
/// assert_eq!(
///     doc.blocks()[1],
///     Block::Macro {
///         node: MacroNode::text("Hey dude"),
///         position: Position::new(3, 1),
///         prefix: String::new(),
///     }
/// );
/// # Ok::<(), tagmark_core::RegistryError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Document {
    /// Parse `source`, expanding macros known to `scanner`.
    ///
    /// Line endings are normalized to `\n` before scanning. Text inside fenced
    /// code blocks is never scanned. A macro must start a block: a tag on a
    /// line that continues a paragraph stays literal text.
    #[must_use]
    pub fn parse(source: &str, scanner: &MacroScanner<'_>, host: &dyn HostParser) -> Self {
        let text = normalize_newlines(source);
        let mut parser = DocumentParser::new(*scanner, host);
        parser.run(&text);
        parser.finish()
    }

    /// Blocks in source order.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Consume the document, returning its blocks.
    #[must_use]
    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    /// Macro nodes with their positions, for diagnostics.
    pub fn macro_nodes(&self) -> impl Iterator<Item = (&MacroNode, Position)> + '_ {
        self.blocks.iter().filter_map(|block| match block {
            Block::Macro { node, position, .. } => Some((node, *position)),
            Block::Markdown { .. } => None,
        })
    }
}

/// Convert `\r\n` and lone `\r` line endings to `\n`.
fn normalize_newlines(source: &str) -> Cow<'_, str> {
    if source.contains('\r') {
        Cow::Owned(source.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(source)
    }
}

/// Source lines with a list item's content indent removed.
#[derive(Debug, Default)]
struct Dedented {
    text: String,
    /// Source length and stripped bytes of each line.
    lines: Vec<(usize, usize)>,
}

impl Dedented {
    /// Strip `indent` bytes from the first line of `rest` and up to `indent`
    /// spaces from each following line, taking at most `max_lines` lines.
    fn new(rest: &str, indent: usize, max_lines: usize) -> Self {
        let mut dedented = Self::default();
        for (i, line) in rest.split_inclusive('\n').take(max_lines).enumerate() {
            let strip = if i == 0 { indent } else { leading_spaces(line).min(indent) };
            dedented.text.push_str(&line[strip..]);
            dedented.lines.push((line.len(), strip));
        }
        dedented
    }

    /// Source bytes covered by the first `consumed` dedented bytes.
    fn source_len(&self, consumed: usize) -> usize {
        let mut remaining = consumed;
        let mut offset = 0;
        for &(len, strip) in &self.lines {
            if remaining == 0 {
                break;
            }
            let kept = len - strip;
            if remaining < kept {
                return offset + strip + remaining;
            }
            offset += len;
            remaining -= kept;
        }
        offset
    }
}

struct DocumentParser<'a> {
    scanner: MacroScanner<'a>,
    host: &'a dyn HostParser,
    fence: FenceTracker,
    lists: ListStack,
    blocks: Vec<Block>,
    pending: String,
    pending_start: Position,
    /// Whether the cursor sits where a new block may start.
    at_boundary: bool,
    line: usize,
    column: usize,
}

impl<'a> DocumentParser<'a> {
    fn new(scanner: MacroScanner<'a>, host: &'a dyn HostParser) -> Self {
        Self {
            scanner,
            host,
            fence: FenceTracker::new(),
            lists: ListStack::new(),
            blocks: Vec::new(),
            pending: String::new(),
            pending_start: Position::new(1, 1),
            at_boundary: true,
            line: 1,
            column: 1,
        }
    }

    fn run(&mut self, text: &str) {
        let mut pos = 0;

        while pos < text.len() {
            let rest = &text[pos..];
            let line_len = rest.find('\n').map_or(rest.len(), |i| i + 1);
            let line = &rest[..line_len];

            let fence_line = self.fence.update(line);
            if fence_line.is_code() {
                self.push_markdown(line);
                self.at_boundary = fence_line == FenceLine::Close;
                pos += line_len;
                continue;
            }

            let in_paragraph = !self.at_boundary;
            let container = self.lists.enter(line, in_paragraph);
            let indent = container.indent.min(line.trim_end_matches('\n').len());
            let body = &line[indent..];
            let silent = in_paragraph && !container.new_item;
            let position = Position::new(self.line, self.column + indent);

            let (outcome, consumed) = if indent == 0 {
                let outcome = self.scanner.scan(rest, silent, position, self.host);
                let consumed = outcome.consumed();
                (outcome, consumed)
            } else {
                let max_lines = if body.trim_start_matches([' ', '\t']).starts_with('[') {
                    self.scanner.limits().max_block_lines
                } else {
                    1
                };
                let window = Dedented::new(rest, indent, max_lines);
                let outcome = self.scanner.scan(&window.text, silent, position, self.host);
                let consumed = window.source_len(outcome.consumed());
                (outcome, consumed)
            };

            if outcome.is_match() {
                self.flush_markdown();
                if let Some(node) = outcome.into_node() {
                    self.blocks.push(Block::Macro {
                        node,
                        position,
                        prefix: line[..indent].to_owned(),
                    });
                }
                self.advance(&rest[..consumed]);
                self.at_boundary = true;
                pos += consumed;
            } else {
                self.push_markdown(line);
                self.at_boundary = body.trim().is_empty() || ends_block(body, in_paragraph);
                pos += line_len;
            }
        }
    }

    fn push_markdown(&mut self, text: &str) {
        if self.pending.is_empty() {
            self.pending_start = Position::new(self.line, self.column);
        }
        self.pending.push_str(text);
        self.advance(text);
    }

    /// Move the line and column counters past `text`.
    fn advance(&mut self, text: &str) {
        match text.rfind('\n') {
            Some(last) => {
                self.line += text.matches('\n').count();
                self.column = text[last + 1..].chars().count() + 1;
            }
            None => self.column += text.chars().count(),
        }
    }

    fn flush_markdown(&mut self) {
        let text = std::mem::take(&mut self.pending);
        if !text.trim().is_empty() {
            self.blocks.push(Block::Markdown {
                text,
                position: self.pending_start,
            });
        }
    }

    fn finish(mut self) -> Document {
        self.flush_markdown();
        if self.fence.in_fence() {
            tracing::debug!(line = self.line, "Document ends inside a fenced code block");
        }
        Document {
            blocks: self.blocks,
        }
    }
}
