//! Reporting of bad nodes left in a parsed document.
//!
//! Unclosed macros do not stop parsing. The scanner leaves a [`BadNode`] in
//! the tree and this pass turns each one into a positioned [`Diagnostic`].

use std::fmt;

use crate::node::{BadNode, MacroNode, Position};

/// How bad nodes are reported.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Block the overall document result.
    #[default]
    Fatal,
    /// Report without failing the document.
    Warning,
}

/// A message tied to a source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Human-readable message.
    pub message: String,
    /// Position of the offending node.
    pub position: Position,
    /// Whether the caller should treat the document as failed.
    pub fatal: bool,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.position, self.message)
    }
}

/// Destination for diagnostics.
pub trait MessageSink {
    /// Record one diagnostic.
    fn report(&mut self, diagnostic: Diagnostic);
}

impl MessageSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Report every bad node among `nodes`.
///
/// Returns the number of diagnostics emitted.
///
/// # Example
///
/// ```
/// use tagmark_core::{BadNode, Diagnostic, MacroNode, Position, Severity, report_bad_nodes};
///
/// let nodes = [
///     (MacroNode::text("ok"), Position::new(1, 1)),
///     (MacroNode::Bad(BadNode::unclosed("note")), Position::new(3, 1)),
/// ];
/// let mut sink: Vec<Diagnostic> = Vec::new();
/// let count = report_bad_nodes(nodes.iter().map(|(n, p)| (n, *p)), &mut sink, Severity::Fatal);
///
/// assert_eq!(count, 1);
/// assert_eq!(sink[0].to_string(), "3:1: Unclosed macro: note");
/// assert!(sink[0].fatal);
/// ```
pub fn report_bad_nodes<'a, I>(nodes: I, sink: &mut dyn MessageSink, severity: Severity) -> usize
where
    I: IntoIterator<Item = (&'a MacroNode, Position)>,
{
    let mut count = 0;

    for (bad, position) in nodes
        .into_iter()
        .filter_map(|(node, position)| node.as_bad().map(|bad| (bad, position)))
    {
        sink.report(diagnostic_for(bad, position, severity));
        count += 1;
    }

    count
}

fn diagnostic_for(bad: &BadNode, position: Position, severity: Severity) -> Diagnostic {
    Diagnostic {
        message: bad.message().to_owned(),
        position,
        fatal: severity == Severity::Fatal,
    }
}

/// Check if any diagnostic is fatal.
#[must_use]
pub fn has_fatal(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.fatal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes() -> Vec<(MacroNode, Position)> {
        vec![
            (MacroNode::html("<p>ok</p>"), Position::new(1, 1)),
            (MacroNode::Bad(BadNode::unclosed("note")), Position::new(3, 1)),
            (MacroNode::text("fine"), Position::new(5, 1)),
            (MacroNode::Bad(BadNode::unclosed("alert")), Position::new(9, 3)),
        ]
    }

    #[test]
    fn test_reports_each_bad_node() {
        let nodes = nodes();
        let mut sink: Vec<Diagnostic> = Vec::new();
        let count = report_bad_nodes(nodes.iter().map(|(n, p)| (n, *p)), &mut sink, Severity::Fatal);

        assert_eq!(count, 2);
        assert_eq!(
            sink,
            vec![
                Diagnostic {
                    message: "Unclosed macro: note".to_owned(),
                    position: Position::new(3, 1),
                    fatal: true,
                },
                Diagnostic {
                    message: "Unclosed macro: alert".to_owned(),
                    position: Position::new(9, 3),
                    fatal: true,
                },
            ]
        );
        assert!(has_fatal(&sink));
    }

    #[test]
    fn test_warning_severity() {
        let nodes = nodes();
        let mut sink: Vec<Diagnostic> = Vec::new();
        report_bad_nodes(nodes.iter().map(|(n, p)| (n, *p)), &mut sink, Severity::Warning);

        assert_eq!(sink.len(), 2);
        assert!(!has_fatal(&sink));
    }

    #[test]
    fn test_no_bad_nodes() {
        let nodes = [(MacroNode::text("fine"), Position::new(1, 1))];
        let mut sink: Vec<Diagnostic> = Vec::new();
        let count = report_bad_nodes(nodes.iter().map(|(n, p)| (n, *p)), &mut sink, Severity::Fatal);

        assert_eq!(count, 0);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_custom_sink() {
        #[derive(Default)]
        struct Counter(usize);

        impl MessageSink for Counter {
            fn report(&mut self, _diagnostic: Diagnostic) {
                self.0 += 1;
            }
        }

        let nodes = nodes();
        let mut counter = Counter::default();
        report_bad_nodes(nodes.iter().map(|(n, p)| (n, *p)), &mut counter, Severity::Fatal);
        assert_eq!(counter.0, 2);
    }
}
