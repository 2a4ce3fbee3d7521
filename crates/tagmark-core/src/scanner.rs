//! Macro tag scanning.
//!
//! Recognizes `[name props]` at the start of the text remaining at a parse
//! cursor and, for block macros, finds the matching `[/name]` line.

use std::sync::LazyLock;

use regex::Regex;

use crate::context::{HostParser, MacroContext};
use crate::node::{BadNode, MacroNode, Position};
use crate::props::Properties;
use crate::registry::{MacroDefinition, MacroRegistry};

/// Optional two-character indent, `[`, then the macro name.
///
/// The rest of the opening tag (property text, `]` and the link guard) is
/// matched by hand since `regex` has no lookahead.
static OPEN_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<indent>[ \t]{2})?\[(?P<name>[A-Za-z0-9_]+)").unwrap());

/// Default cap on lines visited while looking for a closing tag.
pub const DEFAULT_MAX_BLOCK_LINES: usize = 10_000;

/// Limits applied while scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanLimits {
    /// Maximum lines a block scan visits before giving up.
    ///
    /// A block that is not closed within this many lines is reported as
    /// unclosed.
    pub max_block_lines: usize,
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self {
            max_block_lines: DEFAULT_MAX_BLOCK_LINES,
        }
    }
}

/// Result of a scan attempt.
///
/// Every variant except [`NoMatch`](Self::NoMatch) carries the number of
/// bytes the host must advance its cursor by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// No macro here. Leave the text to other tokenizers.
    NoMatch,
    /// The span is replaced by the handler's node.
    Replace {
        /// Bytes consumed.
        consumed: usize,
        /// Replacement node.
        node: MacroNode,
    },
    /// The span is consumed without producing a node.
    PassThrough {
        /// Bytes consumed.
        consumed: usize,
    },
    /// A structural problem, reported later through diagnostics.
    Bad {
        /// Bytes consumed.
        consumed: usize,
        /// Bad node to place in the tree.
        node: BadNode,
    },
}

impl ScanOutcome {
    fn from_handler(node: Option<MacroNode>, consumed: usize) -> Self {
        match node {
            None => Self::PassThrough { consumed },
            Some(MacroNode::Bad(node)) => Self::Bad { consumed, node },
            Some(node) => Self::Replace { consumed, node },
        }
    }

    /// Bytes the host must advance by (zero for `NoMatch`).
    #[must_use]
    pub fn consumed(&self) -> usize {
        match self {
            Self::NoMatch => 0,
            Self::Replace { consumed, .. }
            | Self::PassThrough { consumed }
            | Self::Bad { consumed, .. } => *consumed,
        }
    }

    /// Whether a macro was recognized.
    #[must_use]
    pub fn is_match(&self) -> bool {
        !matches!(self, Self::NoMatch)
    }

    /// The node to splice into the tree, if any.
    #[must_use]
    pub fn into_node(self) -> Option<MacroNode> {
        match self {
            Self::NoMatch | Self::PassThrough { .. } => None,
            Self::Replace { node, .. } => Some(node),
            Self::Bad { node, .. } => Some(MacroNode::Bad(node)),
        }
    }
}

/// A recognized opening tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TagMatch<'a> {
    /// Matched text, including one trailing newline if present.
    pub full: &'a str,
    /// Indent that must also prefix the closing tag and body lines.
    pub indent: &'a str,
    pub name: &'a str,
    /// Raw property text between the name and the closing `]`.
    pub props: &'a str,
}

/// Match an opening tag at the start of `text`.
///
/// The property text extends to the last `]` on the first line that is not
/// followed by `(`, so `[note](url)` is left for link parsing.
pub(crate) fn match_open_tag(text: &str) -> Option<TagMatch<'_>> {
    let caps = OPEN_TAG.captures(text)?;
    let head_end = caps.get(0)?.end();
    let indent = caps.name("indent").map_or("", |m| m.as_str());
    let name = caps.name("name")?.as_str();

    let line_end = text[head_end..]
        .find(['\n', '\r'])
        .map_or(text.len(), |i| head_end + i);

    let close = text[head_end..line_end]
        .rmatch_indices(']')
        .map(|(i, _)| head_end + i)
        .find(|&i| !text[i + 1..].starts_with('('))?;

    let mut end = close + 1;
    if text[end..].starts_with('\n') {
        end += 1;
    }

    Some(TagMatch {
        full: &text[..end],
        indent,
        name,
        props: &text[head_end..close],
    })
}

/// Lines visited while looking for a block's closing tag.
#[derive(Debug, Default)]
struct BlockScan<'a> {
    /// Raw lines from the opening tag through the closing tag.
    consumed_lines: Vec<&'a str>,
    /// Body lines with the indent stripped.
    body_lines: Vec<&'a str>,
    closed: bool,
}

impl<'a> BlockScan<'a> {
    fn run(text: &'a str, tag: &TagMatch<'_>, max_lines: usize) -> Self {
        let close_line = format!("{}[/{}]", tag.indent, tag.name);
        let open_prefix = format!("{}[{}", tag.indent, tag.name);
        let mut scan = Self::default();

        for line in text.split('\n').take(max_lines) {
            scan.consumed_lines.push(line);

            if line == close_line {
                scan.closed = true;
                break;
            }

            if !line.starts_with(&open_prefix) {
                scan.body_lines.push(line.strip_prefix(tag.indent).unwrap_or(line));
            }
        }

        scan
    }

    /// Byte length of the consumed lines joined with newlines.
    fn consumed_len(&self) -> usize {
        let bytes: usize = self.consumed_lines.iter().map(|l| l.len()).sum();
        bytes + self.consumed_lines.len().saturating_sub(1)
    }
}

/// Scanner for macro tags, bound to a registry.
///
/// The registry is borrowed for the scanner's lifetime, so registration
/// cannot interleave with scanning.
///
/// # Example
///
/// ```
/// use tagmark_core::{MacroNode, MacroRegistry, MacroScanner, PlainHost, Position, ScanOutcome};
///
/// let mut registry = MacroRegistry::new();
/// registry.register_block("note", |content, _, _| Some(MacroNode::text(content)))?;
///
/// let scanner = MacroScanner::new(&registry);
/// let text = "[note]\nHey dude\n[/note]\nafter";
/// let outcome = scanner.scan(text, false, Position::new(1, 1), &PlainHost);
///
/// assert_eq!(
///     outcome,
///     ScanOutcome::Replace { consumed: 23, node: MacroNode::text("Hey dude") }
/// );
/// # Ok::<(), tagmark_core::RegistryError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MacroScanner<'r> {
    registry: &'r MacroRegistry,
    limits: ScanLimits,
}

impl<'r> MacroScanner<'r> {
    /// Create a scanner with default limits.
    #[must_use]
    pub fn new(registry: &'r MacroRegistry) -> Self {
        Self {
            registry,
            limits: ScanLimits::default(),
        }
    }

    /// Set scan limits.
    #[must_use]
    pub fn with_limits(mut self, limits: ScanLimits) -> Self {
        self.limits = limits;
        self
    }

    /// The registry this scanner resolves names against.
    #[must_use]
    pub fn registry(&self) -> &'r MacroRegistry {
        self.registry
    }

    /// Limits in effect for this scanner.
    #[must_use]
    pub fn limits(&self) -> ScanLimits {
        self.limits
    }

    /// Scan the text remaining at the host's cursor.
    ///
    /// `silent` marks a non-committing check and always yields
    /// [`ScanOutcome::NoMatch`]. Unknown macro names also yield `NoMatch` so
    /// the bracketed text is rendered literally.
    pub fn scan(
        &self,
        text: &str,
        silent: bool,
        position: Position,
        host: &dyn HostParser,
    ) -> ScanOutcome {
        if !text.trim_start().starts_with('[') {
            return ScanOutcome::NoMatch;
        }

        let Some(tag) = match_open_tag(text) else {
            return ScanOutcome::NoMatch;
        };
        if silent {
            return ScanOutcome::NoMatch;
        }

        let Some(definition) = self.registry.resolve(tag.name) else {
            tracing::trace!(name = tag.name, line = position.line, "Ignoring unknown macro");
            return ScanOutcome::NoMatch;
        };

        let outcome = if definition.is_inline() {
            Self::expand_inline(definition, &tag, position, host)
        } else {
            self.expand_block(definition, &tag, text, position, host)
        };

        tracing::debug!(
            name = tag.name,
            line = position.line,
            consumed = outcome.consumed(),
            "Expanded macro"
        );
        outcome
    }

    fn expand_inline(
        definition: &MacroDefinition,
        tag: &TagMatch<'_>,
        position: Position,
        host: &dyn HostParser,
    ) -> ScanOutcome {
        let props = Properties::parse(tag.props);
        let ctx = MacroContext::new(host, tag.full, position);
        let node = definition.handler().expand_inline(&props, &ctx);
        ScanOutcome::from_handler(node, tag.full.len())
    }

    fn expand_block(
        &self,
        definition: &MacroDefinition,
        tag: &TagMatch<'_>,
        text: &str,
        position: Position,
        host: &dyn HostParser,
    ) -> ScanOutcome {
        let scan = BlockScan::run(text, tag, self.limits.max_block_lines);

        if !scan.closed {
            if scan.consumed_lines.len() >= self.limits.max_block_lines {
                tracing::warn!(
                    name = tag.name,
                    line = position.line,
                    max_block_lines = self.limits.max_block_lines,
                    "Block scan limit reached"
                );
            } else {
                tracing::warn!(name = tag.name, line = position.line, "Unclosed macro");
            }
            return ScanOutcome::Bad {
                consumed: tag.full.len(),
                node: BadNode::unclosed(tag.name),
            };
        }

        let consumed = scan.consumed_len();
        let content = scan.body_lines.join("\n");
        let props = Properties::parse(tag.props);
        let ctx = MacroContext::new(host, &text[..consumed], position);
        let node = definition.handler().expand_block(&content, &props, &ctx);
        ScanOutcome::from_handler(node, consumed)
    }
}
