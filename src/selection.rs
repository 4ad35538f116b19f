use log::debug;

use crate::paginator::Page;
use crate::styled_text::{StyledText, is_cjk, is_word_char};

/// A draggable selection endpoint marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    Start,
    End,
}

/// Selection state as one explicit value. `anchor` is the stationary edge,
/// `focus` the edge under the user's finger; `active_handle` records which
/// visual end the focus currently is.
///
/// Invariant while `Selecting`: `anchor != focus`, both within
/// `[0, text.len()]`. Offsets are global document offsets; a page turn can
/// leave the anchor outside the rendered page, which is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Idle,
    Selecting {
        anchor: usize,
        focus: usize,
        active_handle: Handle,
    },
}

/// State machine driving selection offsets from gesture-level commands.
/// All transitions are total: out-of-context calls are no-ops.
#[derive(Debug)]
pub struct SelectionEngine {
    state: SelectionState,
}

impl Default for SelectionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionEngine {
    pub fn new() -> Self {
        Self {
            state: SelectionState::Idle,
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn is_selecting(&self) -> bool {
        matches!(self.state, SelectionState::Selecting { .. })
    }

    /// Normalized `(start, end)` with `start < end`, if a selection exists.
    pub fn range(&self) -> Option<(usize, usize)> {
        match self.state {
            SelectionState::Idle => None,
            SelectionState::Selecting { anchor, focus, .. } => {
                Some((anchor.min(focus), anchor.max(focus)))
            }
        }
    }

    pub fn active_handle(&self) -> Option<Handle> {
        match self.state {
            SelectionState::Idle => None,
            SelectionState::Selecting { active_handle, .. } => Some(active_handle),
        }
    }

    /// Offset of the edge currently being dragged.
    pub fn focus(&self) -> Option<usize> {
        match self.state {
            SelectionState::Idle => None,
            SelectionState::Selecting { focus, .. } => Some(focus),
        }
    }

    /// Word boundary at `offset`. A CJK ideograph is its own boundary;
    /// Latin/digit runs (plus apostrophes) expand to the full word; any
    /// other char seeds a single-char range.
    pub fn word_boundaries(text: &StyledText, offset: usize) -> (usize, usize) {
        if text.is_empty() {
            return (0, 0);
        }
        let offset = offset.min(text.len() - 1);
        let ch = text.char_at(offset).unwrap_or(' ');
        if is_cjk(ch) {
            return (offset, offset + 1);
        }
        if !is_word_char(ch) {
            return (offset, offset + 1);
        }
        let mut start = offset;
        while start > 0 && text.char_at(start - 1).is_some_and(is_word_char) {
            start -= 1;
        }
        let mut end = offset + 1;
        while end < text.len() && text.char_at(end).is_some_and(is_word_char) {
            end += 1;
        }
        (start, end)
    }

    /// Seed a selection from a long-press. Returns the seeded range, or
    /// `None` when there is no text to select.
    pub fn seed(&mut self, text: &StyledText, offset: usize) -> Option<(usize, usize)> {
        if text.is_empty() {
            return None;
        }
        let (start, end) = Self::word_boundaries(text, offset);
        debug!("selection seeded at {offset} -> [{start}, {end})");
        self.state = SelectionState::Selecting {
            anchor: start,
            focus: end,
            active_handle: Handle::End,
        };
        Some((start, end))
    }

    /// Make `handle` the dragged edge of an existing selection.
    pub fn grab(&mut self, handle: Handle) {
        if let SelectionState::Selecting { anchor, focus, .. } = self.state {
            let (start, end) = (anchor.min(focus), anchor.max(focus));
            self.state = match handle {
                Handle::Start => SelectionState::Selecting {
                    anchor: end,
                    focus: start,
                    active_handle: Handle::Start,
                },
                Handle::End => SelectionState::Selecting {
                    anchor: start,
                    focus: end,
                    active_handle: Handle::End,
                },
            };
        }
    }

    /// Move the dragged edge to `offset`, clamped to the displayed page's
    /// document-offset range. Crossing the stationary edge swaps which
    /// handle is active; a collapse is pushed back out to one char.
    pub fn drag_to(&mut self, offset: usize, page: &Page, text_len: usize) {
        let SelectionState::Selecting {
            anchor,
            active_handle,
            ..
        } = self.state
        else {
            return;
        };
        let focus = offset.clamp(page.start, page.end.min(text_len));
        self.state = Self::resolved(anchor, focus, active_handle, text_len);
    }

    /// Pointer released: normalize so the anchor is the start edge, and
    /// report the established range. The selection itself persists until
    /// cleared.
    pub fn commit(&mut self) -> Option<(usize, usize)> {
        let (start, end) = self.range()?;
        self.state = SelectionState::Selecting {
            anchor: start,
            focus: end,
            active_handle: Handle::End,
        };
        Some((start, end))
    }

    /// After an edge-hold page turn, pull the dragged edge into the new
    /// page's range and re-assert the minimum length. The stationary edge
    /// is left untouched even if it is now off-page.
    pub fn nudge_after_page_turn(&mut self, page: &Page, text_len: usize) {
        let SelectionState::Selecting {
            anchor,
            focus,
            active_handle,
        } = self.state
        else {
            return;
        };
        let clamped = focus.clamp(page.start, page.end.min(text_len));
        self.state = Self::resolved(anchor, clamped, active_handle, text_len);
        debug!("selection nudged into page [{}, {}): focus {focus} -> {clamped}", page.start, page.end);
    }

    /// Reset to `Idle`. Returns whether a selection was dropped.
    pub fn clear(&mut self) -> bool {
        let had = self.is_selecting();
        self.state = SelectionState::Idle;
        had
    }

    /// Build a `Selecting` state upholding `anchor != focus` and keeping the
    /// active handle aligned with the edge the focus sits on. A collapse is
    /// pushed back out one char in the direction of the dragged handle:
    /// `start = end - 1` for the start handle, `end = start + 1` for the end
    /// handle, falling back to the other side at a buffer boundary.
    fn resolved(anchor: usize, focus: usize, dragged: Handle, text_len: usize) -> SelectionState {
        let focus = if focus == anchor {
            match dragged {
                Handle::Start if anchor > 0 => anchor - 1,
                Handle::End if anchor < text_len => anchor + 1,
                Handle::Start => (anchor + 1).min(text_len),
                Handle::End => anchor.saturating_sub(1),
            }
        } else {
            focus
        };
        let active_handle = if focus < anchor { Handle::Start } else { Handle::End };
        SelectionState::Selecting {
            anchor,
            focus,
            active_handle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(start: usize, end: usize) -> Page {
        Page {
            start,
            end,
            first_line: 0,
            last_line: 0,
        }
    }

    #[test]
    fn test_seed_latin_word() {
        let text = StyledText::plain("say hello now");
        for offset in 4..9 {
            let mut sel = SelectionEngine::new();
            assert_eq!(sel.seed(&text, offset), Some((4, 9)), "offset {offset}");
            assert_eq!(sel.active_handle(), Some(Handle::End));
        }
    }

    #[test]
    fn test_seed_word_at_buffer_start() {
        let text = StyledText::plain("hello");
        let mut sel = SelectionEngine::new();
        assert_eq!(sel.seed(&text, 2), Some((0, 5)));
    }

    #[test]
    fn test_seed_cjk_selects_single_ideograph() {
        let text = StyledText::plain("中文排版");
        for offset in 0..4 {
            let mut sel = SelectionEngine::new();
            assert_eq!(sel.seed(&text, offset), Some((offset, offset + 1)));
        }
    }

    #[test]
    fn test_seed_punctuation_selects_one_char() {
        let text = StyledText::plain("a. b");
        let mut sel = SelectionEngine::new();
        assert_eq!(sel.seed(&text, 1), Some((1, 2)));
    }

    #[test]
    fn test_seed_apostrophe_stays_in_word() {
        let text = StyledText::plain("it's fine");
        let mut sel = SelectionEngine::new();
        assert_eq!(sel.seed(&text, 1), Some((0, 4)));
    }

    #[test]
    fn test_seed_empty_text_is_noop() {
        let text = StyledText::plain("");
        let mut sel = SelectionEngine::new();
        assert_eq!(sel.seed(&text, 0), None);
        assert!(!sel.is_selecting());
    }

    #[test]
    fn test_drag_end_handle_extends() {
        let text = StyledText::plain("one two three four");
        let mut sel = SelectionEngine::new();
        sel.seed(&text, 5); // "two" -> [4, 7)
        sel.drag_to(13, &page(0, text.len()), text.len());
        assert_eq!(sel.range(), Some((4, 13)));
        assert_eq!(sel.active_handle(), Some(Handle::End));
    }

    #[test]
    fn test_drag_crossing_swaps_active_handle() {
        let text = StyledText::plain("one two three");
        let mut sel = SelectionEngine::new();
        sel.seed(&text, 5); // [4, 7)
        sel.drag_to(1, &page(0, text.len()), text.len());
        assert_eq!(sel.range(), Some((1, 4)));
        assert_eq!(sel.active_handle(), Some(Handle::Start));
        // Dragging back across restores the end handle.
        sel.drag_to(9, &page(0, text.len()), text.len());
        assert_eq!(sel.range(), Some((4, 9)));
        assert_eq!(sel.active_handle(), Some(Handle::End));
    }

    #[test]
    fn test_collapse_forces_one_char_minimum() {
        let text = StyledText::plain("abcdef");
        let mut sel = SelectionEngine::new();
        sel.seed(&text, 0); // [0, 6)
        sel.grab(Handle::End);
        sel.drag_to(0, &page(0, 6), 6);
        let (start, end) = sel.range().unwrap();
        assert!(start < end, "selection must never collapse");
        assert_eq!((start, end), (0, 1));
    }

    #[test]
    fn test_collapse_on_start_handle_pushes_left() {
        let text = StyledText::plain("ab cd ef gh");
        let mut sel = SelectionEngine::new();
        sel.seed(&text, 3); // "cd" -> [3, 5)
        sel.grab(Handle::Start);
        // Dragging the start edge onto the end edge must push the start
        // back out, not grow the selection past the stationary end.
        sel.drag_to(5, &page(0, text.len()), text.len());
        assert_eq!(sel.range(), Some((4, 5)));
        assert_eq!(sel.active_handle(), Some(Handle::Start));
    }

    #[test]
    fn test_collapse_on_start_handle_at_buffer_start() {
        // Pushing the start edge left of offset 0 is impossible, so the
        // collapse falls back to the other side.
        let mut sel = SelectionEngine::new();
        sel.state = SelectionState::Selecting {
            anchor: 0,
            focus: 1,
            active_handle: Handle::Start,
        };
        sel.drag_to(0, &page(0, 3), 3);
        assert_eq!(sel.range(), Some((0, 1)));
    }

    #[test]
    fn test_grab_start_handle_then_drag() {
        let text = StyledText::plain("abcdef");
        let mut sel = SelectionEngine::new();
        sel.seed(&text, 2); // [0, 6)
        sel.grab(Handle::Start);
        sel.drag_to(3, &page(0, 6), 6);
        assert_eq!(sel.range(), Some((3, 6)));
        assert_eq!(sel.active_handle(), Some(Handle::Start));
    }

    #[test]
    fn test_drag_clamps_to_page_range() {
        let text = StyledText::plain("abcdefghij");
        let mut sel = SelectionEngine::new();
        sel.seed(&text, 0); // [0, 10)... seeded to whole word
        sel.drag_to(9, &page(0, 5), text.len());
        assert_eq!(sel.range(), Some((0, 5)));
    }

    #[test]
    fn test_commit_normalizes_and_persists() {
        let text = StyledText::plain("one two three");
        let mut sel = SelectionEngine::new();
        sel.seed(&text, 5);
        sel.drag_to(1, &page(0, text.len()), text.len());
        assert_eq!(sel.commit(), Some((1, 4)));
        assert!(sel.is_selecting());
        assert_eq!(sel.active_handle(), Some(Handle::End));
    }

    #[test]
    fn test_nudge_after_page_turn_clamps_focus_only() {
        let text = StyledText::plain("abcdefghijklmnop");
        let mut sel = SelectionEngine::new();
        sel.seed(&text, 4);
        sel.drag_to(7, &page(0, 8), text.len());
        // Page turned forward to [8, 16); anchor stays behind on page 0.
        sel.nudge_after_page_turn(&page(8, 16), text.len());
        let (start, end) = sel.range().unwrap();
        assert!(end >= 8, "focus must land inside the new page");
        assert!(start < 8, "anchor may legitimately stay off-page");
        assert!(start < end);
    }

    #[test]
    fn test_out_of_context_events_are_noops() {
        let mut sel = SelectionEngine::new();
        sel.drag_to(3, &page(0, 10), 10);
        assert!(!sel.is_selecting());
        assert_eq!(sel.commit(), None);
        sel.grab(Handle::Start);
        assert!(!sel.is_selecting());
        assert!(!sel.clear());
    }
}
