use log::debug;

use crate::font_metrics::FontMetrics;
use crate::styled_text::{StyledText, is_cjk};

/// One visual line produced by the line breaker. Offsets are document char
/// offsets; vertical coordinates are px from the top of the laid-out column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub start: usize,
    pub end: usize,
    pub top: f32,
    pub baseline: f32,
    pub bottom: f32,
}

impl Line {
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// The host asked for layout before it had measured a real viewport.
    /// Callers must defer and retry on the next layout pass.
    #[error("layout requested with non-positive width {0}")]
    InvalidWidth(f32),
    #[error("pagination requested with non-positive viewport height {0}")]
    InvalidHeight(f32),
}

/// The ordered line records for one chapter at one (width, font) pair.
///
/// Lines are totally ordered and cover `[0, text.len())` without gaps or
/// overlaps: `end` of line n is `start` of line n+1.
#[derive(Debug, Clone)]
pub struct Layout {
    lines: Vec<Line>,
    width: f32,
}

/// Horizontal snap region at line edges, as a fraction of the line width.
/// Makes grabbing the very first/last offset of a line practical on coarse
/// e-ink touch layers.
const EDGE_SNAP_FRACTION: f32 = 0.1;
const EDGE_SNAP_MAX_PX: f32 = 100.0;

impl Layout {
    /// Greedy line fill over the char sequence. Breaks at the last feasible
    /// breakpoint at or before `width`: after whitespace when possible,
    /// around CJK ideographs, and mid-token only when a single token is
    /// wider than the whole line. Newlines are hard breaks. Deterministic
    /// for identical inputs.
    pub fn compute(
        text: &StyledText,
        width: f32,
        fm: &dyn FontMetrics,
    ) -> Result<Layout, LayoutError> {
        if !(width > 0.0) {
            return Err(LayoutError::InvalidWidth(width));
        }

        let chars = text.chars();
        let mut ranges: Vec<(usize, usize)> = Vec::new();
        let mut line_start = 0usize;
        let mut x = 0.0f32;
        // Offset at which the current line may end (break opportunity).
        let mut last_break: Option<usize> = None;

        let mut i = 0usize;
        while i < chars.len() {
            let ch = chars[i];
            if ch == '\n' {
                // Hard break; the newline belongs to the line it ends.
                ranges.push((line_start, i + 1));
                line_start = i + 1;
                x = 0.0;
                last_break = None;
                i += 1;
                continue;
            }

            let adv = fm.advance_or_fallback(ch);
            if ch.is_whitespace() {
                // Trailing whitespace rides along on the line it follows and
                // never forces a break itself.
                x += adv;
                last_break = Some(i + 1);
                i += 1;
                continue;
            }

            if is_cjk(ch) && i > line_start {
                // Breaking before an ideograph is always allowed.
                last_break = match last_break {
                    Some(b) => Some(b.max(i)),
                    None => Some(i),
                };
            }

            if x + adv > width && i > line_start {
                match last_break {
                    Some(b) if b > line_start => {
                        ranges.push((line_start, b));
                        line_start = b;
                        x = fm.measure(&chars[b..i]) + adv;
                    }
                    _ => {
                        // Single token wider than the viewport: hard break.
                        ranges.push((line_start, i));
                        line_start = i;
                        x = adv;
                    }
                }
                last_break = None;
            } else {
                x += adv;
            }

            if is_cjk(ch) {
                last_break = Some(i + 1);
            }
            i += 1;
        }
        if line_start < chars.len() {
            ranges.push((line_start, chars.len()));
        }

        let lh = fm.line_height();
        let ascent = fm.ascent();
        let lines = ranges
            .into_iter()
            .enumerate()
            .map(|(idx, (start, end))| {
                let top = idx as f32 * lh;
                Line {
                    start,
                    end,
                    top,
                    baseline: top + ascent,
                    bottom: top + lh,
                }
            })
            .collect::<Vec<_>>();
        debug!("layout: {} chars -> {} lines at width {width}", chars.len(), lines.len());
        Ok(Layout { lines, width })
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.lines.last().map_or(0.0, |l| l.bottom)
    }

    /// Line containing `offset`; offsets at or past the end map to the last
    /// line. `None` only for an empty layout.
    pub fn line_for_offset(&self, offset: usize) -> Option<usize> {
        if self.lines.is_empty() {
            return None;
        }
        let idx = self.lines.partition_point(|l| l.end <= offset);
        Some(idx.min(self.lines.len() - 1))
    }

    /// Line at vertical position `y`, clamped into the column.
    pub fn line_for_y(&self, y: f32) -> Option<usize> {
        if self.lines.is_empty() {
            return None;
        }
        let idx = self.lines.partition_point(|l| l.bottom <= y);
        Some(idx.min(self.lines.len() - 1))
    }

    /// Offset range of a line minus its trailing hard-break newline, for
    /// measurement and hit testing.
    pub fn visible_range(&self, text: &StyledText, line_idx: usize) -> (usize, usize) {
        let line = self.lines[line_idx];
        let end = if line.end > line.start && text.char_at(line.end - 1) == Some('\n') {
            line.end - 1
        } else {
            line.end
        };
        (line.start, end)
    }

    /// Horizontal pen position of `offset` on its line.
    pub fn x_for_offset(&self, text: &StyledText, fm: &dyn FontMetrics, offset: usize) -> f32 {
        let Some(idx) = self.line_for_offset(offset) else {
            return 0.0;
        };
        let (start, end) = self.visible_range(text, idx);
        let clamped = offset.clamp(start, end);
        fm.measure(&text.chars()[start..clamped])
    }

    /// Resolve a point to the nearest char boundary. Points near a line's
    /// horizontal edges snap to the line start/end so the extremes stay
    /// reachable. `None` only for an empty layout.
    pub fn offset_for_position(
        &self,
        text: &StyledText,
        fm: &dyn FontMetrics,
        x: f32,
        y: f32,
    ) -> Option<usize> {
        let idx = self.line_for_y(y.clamp(0.0, self.height()))?;
        let (start, end) = self.visible_range(text, idx);

        let snap = (self.width * EDGE_SNAP_FRACTION).min(EDGE_SNAP_MAX_PX);
        if x < snap {
            return Some(start);
        }
        if x > self.width - snap {
            return Some(end);
        }

        let mut cum = 0.0f32;
        for (off, &ch) in (start..end).zip(&text.chars()[start..end]) {
            let adv = fm.advance_or_fallback(ch);
            if x < cum + adv * 0.5 {
                return Some(off);
            }
            cum += adv;
        }
        Some(end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font_metrics::MonospaceMetrics;

    fn fm() -> MonospaceMetrics {
        // cell 5 px, line height 14 px
        MonospaceMetrics::new(10.0)
    }

    fn offsets(layout: &Layout) -> Vec<(usize, usize)> {
        layout.lines().iter().map(|l| (l.start, l.end)).collect()
    }

    #[test]
    fn test_one_word_per_line() {
        let text = StyledText::plain("AAAA BBBB CCCC");
        let layout = Layout::compute(&text, 20.0, &fm()).unwrap();
        assert_eq!(offsets(&layout), vec![(0, 5), (5, 10), (10, 14)]);
    }

    #[test]
    fn test_lines_cover_text_without_gaps() {
        let text = StyledText::plain("the quick brown fox jumps over the lazy dog");
        let layout = Layout::compute(&text, 37.0, &fm()).unwrap();
        let lines = layout.lines();
        assert_eq!(lines[0].start, 0);
        assert_eq!(lines.last().unwrap().end, text.len());
        for pair in lines.windows(2) {
            assert_eq!(pair[0].end, pair[1].start, "gap or overlap between lines");
        }
    }

    #[test]
    fn test_deterministic() {
        let text = StyledText::plain("some words to wrap across a few lines of output");
        let a = Layout::compute(&text, 60.0, &fm()).unwrap();
        let b = Layout::compute(&text, 60.0, &fm()).unwrap();
        assert_eq!(a.lines(), b.lines());
    }

    #[test]
    fn test_overlong_token_hard_breaks() {
        let text = StyledText::plain("abcdefghij");
        // Width of 3 cells; no whitespace anywhere.
        let layout = Layout::compute(&text, 15.0, &fm()).unwrap();
        assert_eq!(offsets(&layout), vec![(0, 3), (3, 6), (6, 9), (9, 10)]);
    }

    #[test]
    fn test_cjk_breaks_between_ideographs() {
        let text = StyledText::plain("中文字排版");
        // Each ideograph is 10 px; width fits two.
        let layout = Layout::compute(&text, 20.0, &fm()).unwrap();
        assert_eq!(offsets(&layout), vec![(0, 2), (2, 4), (4, 5)]);
    }

    #[test]
    fn test_newlines_are_hard_breaks() {
        let text = StyledText::plain("ab\n\ncd");
        let layout = Layout::compute(&text, 100.0, &fm()).unwrap();
        assert_eq!(offsets(&layout), vec![(0, 3), (3, 4), (4, 6)]);
    }

    #[test]
    fn test_empty_text_yields_no_lines() {
        let layout = Layout::compute(&StyledText::plain(""), 100.0, &fm()).unwrap();
        assert!(layout.is_empty());
        assert_eq!(layout.height(), 0.0);
    }

    #[test]
    fn test_zero_width_is_an_error() {
        let err = Layout::compute(&StyledText::plain("x"), 0.0, &fm());
        assert!(matches!(err, Err(LayoutError::InvalidWidth(_))));
    }

    #[test]
    fn test_vertical_extents() {
        let text = StyledText::plain("aa bb");
        let layout = Layout::compute(&text, 10.0, &fm()).unwrap();
        let l0 = layout.lines()[0];
        let l1 = layout.lines()[1];
        assert_eq!(l0.top, 0.0);
        assert!((l0.baseline - 8.0).abs() < 1e-4);
        assert!((l0.bottom - 14.0).abs() < 1e-4);
        assert!((l1.top - 14.0).abs() < 1e-4);
    }

    #[test]
    fn test_offset_for_position_snaps_at_edges() {
        let text = StyledText::plain("hello world again");
        let layout = Layout::compute(&text, 30.0, &fm()).unwrap();
        // snap threshold is 3 px here
        assert_eq!(layout.offset_for_position(&text, &fm(), 0.5, 0.0), Some(0));
        let (_, end0) = layout.visible_range(&text, 0);
        assert_eq!(layout.offset_for_position(&text, &fm(), 29.0, 0.0), Some(end0));
    }

    #[test]
    fn test_offset_for_position_picks_nearest_boundary() {
        let text = StyledText::plain("abcdef");
        // Cell width 5: 'b' spans 5..10, so its left half resolves to
        // offset 1 and its right half to offset 2.
        let narrow = Layout::compute(&text, 40.0, &fm()).unwrap();
        assert_eq!(narrow.offset_for_position(&text, &fm(), 8.5, 5.0), Some(2));
        assert_eq!(narrow.offset_for_position(&text, &fm(), 6.0, 5.0), Some(1));
    }

    #[test]
    fn test_x_for_offset() {
        let text = StyledText::plain("abc def");
        let layout = Layout::compute(&text, 100.0, &fm()).unwrap();
        assert_eq!(layout.x_for_offset(&text, &fm(), 0), 0.0);
        assert!((layout.x_for_offset(&text, &fm(), 3) - 15.0).abs() < 1e-4);
    }
}
