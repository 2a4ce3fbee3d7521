//! Fenced code block tracking.
//!
//! Bracketed text inside a fenced code block is code, never a macro tag.

/// How a line relates to fenced code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FenceLine {
    /// Ordinary line outside any fence.
    Outside,
    /// Opening fence marker.
    Open,
    /// Line inside a fence.
    Inside,
    /// Closing fence marker.
    Close,
}

impl FenceLine {
    /// Whether the line belongs to a fenced code block (markers included).
    pub(crate) fn is_code(self) -> bool {
        !matches!(self, Self::Outside)
    }
}

/// Line-by-line fence state.
///
/// Fences use three or more backticks or tildes. A fence is closed by the
/// same character repeated at least as many times, with nothing but
/// whitespace after it.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    open: Option<(char, usize)>,
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn in_fence(&self) -> bool {
        self.open.is_some()
    }

    /// Classify `line` and advance the fence state.
    pub(crate) fn update(&mut self, line: &str) -> FenceLine {
        let trimmed = line.trim_start();

        match self.open {
            Some((ch, len)) if closes_fence(trimmed, ch, len) => {
                self.open = None;
                FenceLine::Close
            }
            Some(_) => FenceLine::Inside,
            None => match fence_marker(trimmed) {
                Some(marker) => {
                    self.open = Some(marker);
                    FenceLine::Open
                }
                None => FenceLine::Outside,
            },
        }
    }
}

/// Fence character and run length at the start of `trimmed`, if it opens a fence.
fn fence_marker(trimmed: &str) -> Option<(char, usize)> {
    let ch = trimmed.chars().next().filter(|c| matches!(c, '`' | '~'))?;
    let len = trimmed.chars().take_while(|&c| c == ch).count();
    (len >= 3).then_some((ch, len))
}

fn closes_fence(trimmed: &str, ch: char, min_len: usize) -> bool {
    let len = trimmed.chars().take_while(|&c| c == ch).count();
    len > 0 && len >= min_len && trimmed[len * ch.len_utf8()..].trim().is_empty()
}
