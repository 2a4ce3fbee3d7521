//! List item and single-line block detection.
//!
//! Macros may sit inside list items. The document parser asks [`ListStack`]
//! how much indentation belongs to the enclosing items and scans the rest of
//! the line for a tag.

/// Container context of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Container {
    /// Bytes at the start of the line owned by enclosing list items.
    pub(crate) indent: usize,
    /// Whether the line opens a new list item.
    pub(crate) new_item: bool,
}

/// Content indents of the open list items, outermost first.
#[derive(Debug, Default)]
pub(crate) struct ListStack {
    indents: Vec<usize>,
}

impl ListStack {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn current(&self) -> usize {
        self.indents.last().copied().unwrap_or(0)
    }

    /// Classify `line` and update the open list items.
    ///
    /// `in_paragraph` is set when the previous line continues a paragraph. A
    /// less indented line there is a lazy continuation and keeps the items
    /// open, unless it starts a sibling item.
    pub(crate) fn enter(&mut self, line: &str, in_paragraph: bool) -> Container {
        if line.trim().is_empty() {
            return Container {
                indent: self.current(),
                new_item: false,
            };
        }

        let lead = leading_spaces(line);
        let starts_item = item_width(&line[lead..], in_paragraph).is_some();
        if !in_paragraph || starts_item {
            while self.indents.last().is_some_and(|&top| lead < top) {
                self.indents.pop();
            }
        }

        let base = self.current().min(lead);
        match item_width(&line[base..], in_paragraph) {
            Some(width) => {
                let indent = base + width;
                self.indents.push(indent);
                Container {
                    indent,
                    new_item: true,
                }
            }
            None => Container {
                indent: base,
                new_item: false,
            },
        }
    }
}

/// Content width of a list item marker at the start of `line`.
///
/// Covers up to three spaces of indent, the marker and the spaces after it.
/// Inside a paragraph only markers that may interrupt it count: bullets and
/// ordered items starting at 1, with content on the line.
fn item_width(line: &str, in_paragraph: bool) -> Option<usize> {
    if is_thematic_break(line) {
        return None;
    }

    let lead = leading_spaces(line);
    if lead > 3 {
        return None;
    }
    let after = &line[lead..];

    let digits = after.bytes().take_while(u8::is_ascii_digit).count();
    let (marker_len, interrupts) = match after.bytes().next()? {
        b'-' | b'+' | b'*' => (1, true),
        _ if (1..=9).contains(&digits) && matches!(after.as_bytes().get(digits), Some(b'.' | b')')) => {
            (digits + 1, &after[..digits] == "1")
        }
        _ => return None,
    };

    let rest = &after[marker_len..];
    let content = rest.trim_end_matches('\n');
    if content.trim().is_empty() {
        return (!in_paragraph).then_some(lead + marker_len + 1);
    }

    let spaces = leading_spaces(rest);
    if spaces == 0 || (in_paragraph && !interrupts) {
        return None;
    }
    // Five or more spaces start indented code inside the item.
    let padding = if spaces > 4 { 1 } else { spaces };
    Some(lead + marker_len + padding)
}

/// Whether `line` is a complete block on its own, so the next line starts a
/// new block.
pub(crate) fn ends_block(line: &str, in_paragraph: bool) -> bool {
    is_atx_heading(line) || is_thematic_break(line) || (in_paragraph && is_setext_underline(line))
}

fn is_atx_heading(line: &str) -> bool {
    let lead = leading_spaces(line);
    if lead > 3 {
        return false;
    }
    let after = &line[lead..];
    let hashes = after.bytes().take_while(|&b| b == b'#').count();
    (1..=6).contains(&hashes) && matches!(after.as_bytes().get(hashes), None | Some(b' ' | b'\t' | b'\n'))
}

fn is_thematic_break(line: &str) -> bool {
    if leading_spaces(line) > 3 {
        return false;
    }
    let mut marks = line.chars().filter(|c| !c.is_whitespace());
    let Some(mark @ ('*' | '-' | '_')) = marks.next() else {
        return false;
    };
    let mut count = 1;
    for c in marks {
        if c != mark {
            return false;
        }
        count += 1;
    }
    count >= 3
}

fn is_setext_underline(line: &str) -> bool {
    if leading_spaces(line) > 3 {
        return false;
    }
    let trimmed = line.trim();
    !trimmed.is_empty() && (trimmed.bytes().all(|b| b == b'=') || trimmed.bytes().all(|b| b == b'-'))
}

pub(crate) fn leading_spaces(line: &str) -> usize {
    line.bytes().take_while(|&b| b == b' ').count()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn indents(lines: &[&str]) -> Vec<usize> {
        let mut stack = ListStack::new();
        let mut in_paragraph = false;
        lines
            .iter()
            .map(|line| {
                let container = stack.enter(line, in_paragraph);
                in_paragraph = !line.trim().is_empty();
                container.indent
            })
            .collect()
    }

    #[test]
    fn test_top_level_lines() {
        assert_eq!(indents(&["Hello\n", "\n", "  [note]\n"]), vec![0, 0, 0]);
    }

    #[test]
    fn test_bullet_item() {
        assert_eq!(
            indents(&["- List item\n", "\n", "    [note]\n", "    Hey\n"]),
            vec![2, 2, 2, 2]
        );
    }

    #[test]
    fn test_nested_items() {
        assert_eq!(
            indents(&["- List item 1\n", "  - List item 1.1\n", "\n", "    [note]\n"]),
            vec![2, 4, 4, 4]
        );
    }

    #[test]
    fn test_sibling_items() {
        assert_eq!(indents(&["- a\n", "- b\n", "  c\n"]), vec![2, 2, 2]);
    }

    #[test]
    fn test_ordered_item() {
        assert_eq!(indents(&["10. ten\n", "\n", "    body\n"]), vec![4, 4, 4]);
    }

    #[test]
    fn test_outdented_line_closes_item() {
        assert_eq!(indents(&["- a\n", "\n", "[note]\n"]), vec![2, 2, 0]);
    }

    #[test]
    fn test_lazy_continuation_keeps_item() {
        let mut stack = ListStack::new();
        stack.enter("- a\n", false);
        assert_eq!(stack.enter("lazy\n", true).indent, 0);
        assert_eq!(stack.enter("\n", false).indent, 2);
        assert_eq!(stack.enter("  [note]\n", false).indent, 2);
    }

    #[test]
    fn test_new_item_flag() {
        let mut stack = ListStack::new();
        assert_eq!(
            stack.enter("- [note]\n", false),
            Container {
                indent: 2,
                new_item: true
            }
        );
    }

    #[test]
    fn test_item_width() {
        assert_eq!(item_width("- a", false), Some(2));
        assert_eq!(item_width("*   a", false), Some(4));
        assert_eq!(item_width("-      code", false), Some(2));
        assert_eq!(item_width("1) a", false), Some(3));
        assert_eq!(item_width("-\n", false), Some(2));
        assert_eq!(item_width("-a", false), None);
        assert_eq!(item_width("- - -", false), None);
        assert_eq!(item_width("    - a", false), None);
    }

    #[test]
    fn test_item_width_inside_paragraph() {
        assert_eq!(item_width("- a", true), Some(2));
        assert_eq!(item_width("1. a", true), Some(3));
        assert_eq!(item_width("2. a", true), None);
        assert_eq!(item_width("-\n", true), None);
    }

    #[test]
    fn test_ends_block() {
        assert!(ends_block("# Title\n", false));
        assert!(ends_block("###\n", false));
        assert!(ends_block("***\n", false));
        assert!(ends_block("- - -\n", false));
        assert!(ends_block("===\n", true));
        assert!(!ends_block("===\n", false));
        assert!(!ends_block("#hashtag\n", false));
        assert!(!ends_block("####### seven\n", false));
        assert!(!ends_block("**bold**\n", false));
        assert!(!ends_block("Some text\n", false));
    }
}
