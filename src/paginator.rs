use log::debug;

use crate::layout::{Layout, LayoutError, Line};

/// A maximal run of whole lines that fits one viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Document char offset of the first char on the page.
    pub start: usize,
    /// Document char offset one past the last char on the page.
    pub end: usize,
    /// Index of the first line (into the layout's line slice).
    pub first_line: usize,
    /// Index of the last line, inclusive.
    pub last_line: usize,
}

impl Page {
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }

    pub fn line_count(&self) -> usize {
        self.last_line - self.first_line + 1
    }
}

/// Group lines into contiguous, non-overlapping pages whose union covers the
/// whole line range. A single line taller than the viewport still forms its
/// own page; empty layouts produce zero pages.
pub fn paginate(layout: &Layout, viewport_height: f32) -> Result<Vec<Page>, LayoutError> {
    if !(viewport_height > 0.0) {
        return Err(LayoutError::InvalidHeight(viewport_height));
    }
    let lines: &[Line] = layout.lines();
    let mut pages = Vec::new();
    let mut i = 0usize;
    while i < lines.len() {
        let top = lines[i].top;
        let mut j = i;
        while j + 1 < lines.len() && lines[j + 1].bottom - top <= viewport_height {
            j += 1;
        }
        pages.push(Page {
            start: lines[i].start,
            end: lines[j].end,
            first_line: i,
            last_line: j,
        });
        i = j + 1;
    }
    debug!(
        "paginate: {} lines -> {} pages at height {viewport_height}",
        lines.len(),
        pages.len()
    );
    Ok(pages)
}

/// Page containing `offset`; offsets at or past the end map to the last
/// page. `None` only when there are no pages.
pub fn page_for_offset(pages: &[Page], offset: usize) -> Option<usize> {
    if pages.is_empty() {
        return None;
    }
    let idx = pages.partition_point(|p| p.end <= offset);
    Some(idx.min(pages.len() - 1))
}

/// Position within the chapter as a fraction, used to survive re-pagination
/// when the font size or viewport changes.
pub fn progression_for_page(page_index: usize, page_count: usize) -> f64 {
    if page_count == 0 {
        return 0.0;
    }
    page_index as f64 / page_count as f64
}

/// Re-resolve a progression fraction against a (possibly new) pagination.
pub fn page_for_progression(progression: f64, page_count: usize) -> usize {
    if page_count == 0 {
        return 0;
    }
    ((progression * page_count as f64) as usize).min(page_count - 1)
}
