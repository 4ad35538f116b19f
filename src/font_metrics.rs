use unicode_width::UnicodeWidthChar;

/// Vertical breathing room between lines, applied on top of ascent+descent.
pub const LINE_HEIGHT_MULTIPLIER: f32 = 1.4;

/// Measurement source for the active font and size.
///
/// Implementations wrap whatever text stack the platform provides. A lookup
/// miss for a glyph must not abort layout: `advance_or_fallback` substitutes
/// a monospace estimate instead.
pub trait FontMetrics {
    /// Distance from baseline to the top of the tallest glyph, in px (positive).
    fn ascent(&self) -> f32;

    /// Distance from baseline to the bottom of the lowest glyph, in px (positive).
    fn descent(&self) -> f32;

    /// Horizontal advance of `ch`, or `None` when the font has no metrics for it.
    fn advance(&self, ch: char) -> Option<f32>;

    /// Advance with a monospace fallback for unknown glyphs. Wide (CJK)
    /// chars fall back to a double-width cell.
    fn advance_or_fallback(&self, ch: char) -> f32 {
        self.advance(ch).unwrap_or_else(|| {
            let cells = ch.width().unwrap_or(1).max(1) as f32;
            cells * (self.ascent() + self.descent()) * 0.5
        })
    }

    /// Height of one laid-out line box.
    fn line_height(&self) -> f32 {
        (self.ascent() + self.descent()) * LINE_HEIGHT_MULTIPLIER
    }

    /// Total advance of a char run.
    fn measure(&self, chars: &[char]) -> f32 {
        chars.iter().map(|&c| self.advance_or_fallback(c)).sum()
    }
}

/// Fixed-cell metrics used by tests and the demo binary. One cell per
/// unicode-width column, so CJK chars are twice as wide as Latin ones.
#[derive(Debug, Clone, Copy)]
pub struct MonospaceMetrics {
    cell_width: f32,
    ascent: f32,
    descent: f32,
}

impl MonospaceMetrics {
    pub fn new(font_size: f32) -> Self {
        Self {
            cell_width: font_size * 0.5,
            ascent: font_size * 0.8,
            descent: font_size * 0.2,
        }
    }

    pub fn cell_width(&self) -> f32 {
        self.cell_width
    }
}

impl FontMetrics for MonospaceMetrics {
    fn ascent(&self) -> f32 {
        self.ascent
    }

    fn descent(&self) -> f32 {
        self.descent
    }

    fn advance(&self, ch: char) -> Option<f32> {
        // Control chars (including '\n') occupy no width.
        Some(ch.width().unwrap_or(0) as f32 * self.cell_width)
    }
}
