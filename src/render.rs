use crate::config::ReaderConfig;
use crate::font_metrics::FontMetrics;
use crate::layout::Layout;
use crate::paginator::Page;
use crate::selection::Handle;
use crate::styled_text::{Span, SpanKind, StyledText};
use crate::theme::{ReaderTheme, Rgb, SELECTION_ALPHA};

/// Width of the vertical bar part of a selection handle, px.
const HANDLE_BAR_WIDTH: f32 = 4.0;
/// Radius of the round grab knob on a selection handle, px.
const HANDLE_BALL_RADIUS: f32 = 9.0;
/// Corner radius of the card behind a block quote, px.
const QUOTE_CARD_RADIUS: f32 = 6.0;
/// Width of the accent bar along a quote's left edge, px.
const QUOTE_BAR_WIDTH: f32 = 3.0;
/// Extra probe distance when hit-testing links under a fat finger, px.
const LINK_PROBE_RADIUS: f32 = 12.0;
/// Horizontal padding added to a link run's bounds in the hit-test
/// fallback, px.
const LINK_X_PAD: f32 = 14.0;
/// Border thickness of the drag magnifier ring, px.
const MAGNIFIER_RING_WIDTH: f32 = 2.0;
/// Padding shaved off each side of a selection highlight rect, px.
const SELECTION_INSET: f32 = 1.0;

const NO_CONTENT_PLACEHOLDER: &str = "No content";

/// One paint instruction in page-local coordinates (origin at the top-left
/// of the visible page). The host rasterizer replays the list in order;
/// `Push*` ops nest and each is closed by a matching [`DrawOp::Pop`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear {
        color: Rgb,
    },
    TextRun {
        x: f32,
        baseline: f32,
        text: String,
        color: Rgb,
        /// Footnote markers render raised and smaller.
        superscript: bool,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
        alpha: u8,
    },
    RoundedRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radius: f32,
        color: Rgb,
    },
    Circle {
        cx: f32,
        cy: f32,
        radius: f32,
        color: Rgb,
    },
    Ring {
        cx: f32,
        cy: f32,
        radius: f32,
        thickness: f32,
        color: Rgb,
    },
    PushClipCircle {
        cx: f32,
        cy: f32,
        radius: f32,
    },
    /// Scale by `scale` after translating by `(dx, dy)`.
    PushTransform {
        dx: f32,
        dy: f32,
        scale: f32,
    },
    Pop,
}

/// Everything needed to paint one page.
pub struct PageScene<'a> {
    pub text: &'a StyledText,
    pub layout: &'a Layout,
    pub page: &'a Page,
    /// Normalized selection range, if one is active.
    pub selection: Option<(usize, usize)>,
    pub theme: &'a ReaderTheme,
    pub config: &'a ReaderConfig,
    /// Touch point (page-local) to magnify during a handle drag.
    pub magnifier: Option<(f32, f32)>,
}

/// Resolved style of a maximal run of same-styled chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunStyle {
    Body,
    Link,
    Footnote,
    Quote,
}

fn page_top(layout: &Layout, page: &Page) -> f32 {
    layout
        .lines()
        .get(page.first_line)
        .map_or(0.0, |line| line.top)
}

fn style_at(text: &StyledText, offset: usize) -> RunStyle {
    if let Some(span) = text.link_at(offset) {
        return match span.kind {
            SpanKind::Footnote => RunStyle::Footnote,
            _ => RunStyle::Link,
        };
    }
    if text.span_at(SpanKind::Quote, offset).is_some() {
        return RunStyle::Quote;
    }
    RunStyle::Body
}

/// Paint one page: quote cards, selection highlight, text, handles, and the
/// drag magnifier, in that order. Pure with respect to its inputs; the same
/// scene always yields the same list.
pub fn render_page(scene: &PageScene, fm: &dyn FontMetrics) -> Vec<DrawOp> {
    let mut ops = vec![DrawOp::Clear {
        color: scene.theme.background,
    }];

    if scene.text.is_blank() || scene.layout.is_empty() {
        ops.push(DrawOp::TextRun {
            x: scene.layout.width() / 3.0,
            baseline: fm.line_height(),
            text: NO_CONTENT_PLACEHOLDER.to_string(),
            color: scene.theme.quote_bar_color(),
            superscript: false,
        });
        return ops;
    }

    push_content(&mut ops, scene, fm);

    if let Some(range) = scene.selection {
        push_handles(&mut ops, scene, fm, range);
    }

    if let Some((mx, my)) = scene.magnifier {
        push_magnifier(&mut ops, scene, fm, mx, my);
    }

    ops
}

/// Quote chrome, selection highlight, and text runs. Shared between the
/// page itself and the magnified replay.
fn push_content(ops: &mut Vec<DrawOp>, scene: &PageScene, fm: &dyn FontMetrics) {
    let top = page_top(scene.layout, scene.page);
    let lines = scene.layout.lines();

    // Quote cards go in first so everything else paints over them.
    for span in scene.text.spans_of(SpanKind::Quote) {
        let s = span.start.max(scene.page.start);
        let e = span.end.min(scene.page.end);
        if s >= e {
            continue;
        }
        let (Some(first), Some(last)) = (
            scene.layout.line_for_offset(s),
            scene.layout.line_for_offset(e - 1),
        ) else {
            continue;
        };
        let first = first.max(scene.page.first_line);
        let last = last.min(scene.page.last_line);
        let y = lines[first].top - top;
        let height = lines[last].bottom - lines[first].top;
        ops.push(DrawOp::RoundedRect {
            x: 0.0,
            y,
            width: scene.layout.width(),
            height,
            radius: QUOTE_CARD_RADIUS,
            color: scene.theme.quote_card_color(),
        });
        ops.push(DrawOp::Rect {
            x: 0.0,
            y,
            width: QUOTE_BAR_WIDTH,
            height,
            color: scene.theme.quote_bar_color(),
            alpha: 0xFF,
        });
    }

    if let Some(range) = scene.selection {
        for (x, y, width, height) in selection_rects(scene, fm, range) {
            ops.push(DrawOp::Rect {
                x,
                y,
                width,
                height,
                color: scene.theme.accent_color(),
                alpha: SELECTION_ALPHA,
            });
        }
    }

    let link_color = scene.theme.link_color();
    for li in scene.page.first_line..=scene.page.last_line {
        let line = lines[li];
        let (vs, ve) = scene.layout.visible_range(scene.text, li);
        let mut run_start = vs;
        while run_start < ve {
            let style = style_at(scene.text, run_start);
            let mut run_end = run_start + 1;
            while run_end < ve && style_at(scene.text, run_end) == style {
                run_end += 1;
            }
            ops.push(DrawOp::TextRun {
                x: scene.layout.x_for_offset(scene.text, fm, run_start),
                baseline: line.baseline - top,
                text: scene.text.slice(run_start, run_end),
                color: match style {
                    RunStyle::Link | RunStyle::Footnote => link_color,
                    _ => scene.theme.text,
                },
                superscript: style == RunStyle::Footnote,
            });
            run_start = run_end;
        }
    }
}

/// Page-local highlight rects for the selection, one per covered line.
/// Vertical extent follows the font's ascent/descent rather than the full
/// line box, so the highlight hugs the glyphs.
fn selection_rects(
    scene: &PageScene,
    fm: &dyn FontMetrics,
    (start, end): (usize, usize),
) -> Vec<(f32, f32, f32, f32)> {
    let s = start.max(scene.page.start);
    let e = end.min(scene.page.end);
    if s >= e {
        return Vec::new();
    }
    let top = page_top(scene.layout, scene.page);
    let lines = scene.layout.lines();
    let (Some(first), Some(last)) = (
        scene.layout.line_for_offset(s),
        scene.layout.line_for_offset(e - 1),
    ) else {
        return Vec::new();
    };

    let mut rects = Vec::with_capacity(last - first + 1);
    for li in first..=last {
        let line = lines[li];
        let left = if li == first {
            scene.layout.x_for_offset(scene.text, fm, s)
        } else {
            0.0
        };
        let right = if li == last {
            scene.layout.x_for_offset(scene.text, fm, e)
        } else {
            scene.layout.width()
        };
        if right - left > 2.0 * SELECTION_INSET {
            rects.push((
                left + SELECTION_INSET,
                line.baseline - fm.ascent() - top + SELECTION_INSET,
                right - left - 2.0 * SELECTION_INSET,
                fm.ascent() + fm.descent() - 2.0 * SELECTION_INSET,
            ));
        }
    }
    rects
}

/// Handle anchors in page-local coordinates: the bar spans the edge line's
/// glyph box, the start knob sits above it and the end knob below.
fn handle_anchors(
    scene: &PageScene,
    fm: &dyn FontMetrics,
    (start, end): (usize, usize),
) -> [Option<(f32, f32, f32)>; 2] {
    let top = page_top(scene.layout, scene.page);
    let lines = scene.layout.lines();
    let mut anchors = [None, None];

    if scene.page.contains(start) {
        if let Some(li) = scene.layout.line_for_offset(start) {
            let x = scene.layout.x_for_offset(scene.text, fm, start);
            let glyph_top = lines[li].baseline - fm.ascent() - top;
            anchors[0] = Some((x, glyph_top, glyph_top + fm.ascent() + fm.descent()));
        }
    }
    if end > scene.page.start && end <= scene.page.end {
        if let Some(li) = scene.layout.line_for_offset(end.saturating_sub(1)) {
            let x = scene.layout.x_for_offset(scene.text, fm, end);
            let glyph_top = lines[li].baseline - fm.ascent() - top;
            anchors[1] = Some((x, glyph_top, glyph_top + fm.ascent() + fm.descent()));
        }
    }
    anchors
}

fn push_handles(
    ops: &mut Vec<DrawOp>,
    scene: &PageScene,
    fm: &dyn FontMetrics,
    range: (usize, usize),
) {
    let color = scene.theme.accent_color();
    let [start_anchor, end_anchor] = handle_anchors(scene, fm, range);

    if let Some((x, glyph_top, glyph_bottom)) = start_anchor {
        ops.push(DrawOp::Rect {
            x: x - HANDLE_BAR_WIDTH / 2.0,
            y: glyph_top,
            width: HANDLE_BAR_WIDTH,
            height: glyph_bottom - glyph_top,
            color,
            alpha: 0xFF,
        });
        ops.push(DrawOp::Circle {
            cx: x,
            cy: glyph_top - HANDLE_BALL_RADIUS,
            radius: HANDLE_BALL_RADIUS,
            color,
        });
    }
    if let Some((x, glyph_top, glyph_bottom)) = end_anchor {
        ops.push(DrawOp::Rect {
            x: x - HANDLE_BAR_WIDTH / 2.0,
            y: glyph_top,
            width: HANDLE_BAR_WIDTH,
            height: glyph_bottom - glyph_top,
            color,
            alpha: 0xFF,
        });
        ops.push(DrawOp::Circle {
            cx: x,
            cy: glyph_bottom + HANDLE_BALL_RADIUS,
            radius: HANDLE_BALL_RADIUS,
            color,
        });
    }
}

/// Circular loupe above the touch point, replaying the page content scaled
/// around the dragged position.
fn push_magnifier(ops: &mut Vec<DrawOp>, scene: &PageScene, fm: &dyn FontMetrics, mx: f32, my: f32) {
    let radius = scene.config.magnifier_radius;
    let scale = scene.config.magnifier_scale;
    let cx = mx;
    let cy = my - scene.config.magnifier_offset;

    ops.push(DrawOp::PushClipCircle { cx, cy, radius });
    ops.push(DrawOp::Clear {
        color: scene.theme.background,
    });
    // Map the touch point to the loupe center at the magnified scale.
    ops.push(DrawOp::PushTransform {
        dx: cx - scale * mx,
        dy: cy - scale * my,
        scale,
    });
    push_content(ops, scene, fm);
    ops.push(DrawOp::Pop);
    ops.push(DrawOp::Pop);
    ops.push(DrawOp::Ring {
        cx,
        cy,
        radius,
        thickness: MAGNIFIER_RING_WIDTH,
        color: scene.theme.magnifier_ring_color(),
    });
}

/// Resolve a touch to a link or footnote span. Tries the exact point first,
/// then four jittered probes, and finally falls back to padded per-line run
/// bounds so thin superscript markers stay tappable.
pub fn link_hit_test<'a>(
    text: &'a StyledText,
    layout: &Layout,
    fm: &dyn FontMetrics,
    page: &Page,
    x: f32,
    y: f32,
) -> Option<&'a Span> {
    let top = page_top(layout, page);
    let lines = layout.lines();
    let page_bottom = lines.get(page.last_line).map_or(0.0, |l| l.bottom);
    let clamp_y = |py: f32| (py + top).clamp(top, page_bottom - 0.01);

    let probes = [
        (x, clamp_y(y)),
        (x - LINK_PROBE_RADIUS, clamp_y(y)),
        (x + LINK_PROBE_RADIUS, clamp_y(y)),
        (x, clamp_y(y - LINK_PROBE_RADIUS)),
        (x, clamp_y(y + LINK_PROBE_RADIUS)),
    ];
    for (px, py) in probes {
        if let Some(offset) = layout.offset_for_position(text, fm, px, py) {
            if let Some(span) = text.link_at(offset) {
                return Some(span);
            }
        }
    }

    let line_idx = layout.line_for_y(clamp_y(y))?;
    let line = lines[line_idx];
    for span in text.spans() {
        if !matches!(span.kind, SpanKind::Link | SpanKind::Footnote) {
            continue;
        }
        let s = span.start.max(line.start);
        let e = span.end.min(line.end);
        if s >= e {
            continue;
        }
        let x0 = layout.x_for_offset(text, fm, s) - LINK_X_PAD;
        let x1 = layout.x_for_offset(text, fm, e) + LINK_X_PAD;
        if x >= x0 && x <= x1 {
            return Some(span);
        }
    }
    None
}

/// Which selection handle, if any, a touch at page-local `(x, y)` grabs.
/// Both knobs are tested by squared distance; the closer one wins a tie.
pub fn handle_near(
    scene: &PageScene,
    fm: &dyn FontMetrics,
    x: f32,
    y: f32,
) -> Option<Handle> {
    let range = scene.selection?;
    let radius2 = scene.config.handle_hit_radius * scene.config.handle_hit_radius;
    let [start_anchor, end_anchor] = handle_anchors(scene, fm, range);

    let d2 = |(hx, hy): (f32, f32)| {
        let (dx, dy) = (x - hx, y - hy);
        dx * dx + dy * dy
    };
    let start_d2 = start_anchor.map(|(hx, top, _)| d2((hx, top - HANDLE_BALL_RADIUS)));
    let end_d2 = end_anchor.map(|(hx, _, bottom)| d2((hx, bottom + HANDLE_BALL_RADIUS)));

    match (start_d2, end_d2) {
        (Some(sd), Some(ed)) if sd <= radius2 && ed <= radius2 => {
            Some(if sd <= ed { Handle::Start } else { Handle::End })
        }
        (Some(sd), _) if sd <= radius2 => Some(Handle::Start),
        (_, Some(ed)) if ed <= radius2 => Some(Handle::End),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font_metrics::MonospaceMetrics;
    use crate::paginator::paginate;

    fn scene_parts(
        text: StyledText,
        width: f32,
        height: f32,
    ) -> (StyledText, Layout, Vec<Page>, MonospaceMetrics) {
        let fm = MonospaceMetrics::new(10.0);
        let layout = Layout::compute(&text, width, &fm).unwrap();
        let pages = paginate(&layout, height).unwrap();
        (text, layout, pages, fm)
    }

    fn scene<'a>(
        text: &'a StyledText,
        layout: &'a Layout,
        page: &'a Page,
        theme: &'a ReaderTheme,
        config: &'a ReaderConfig,
    ) -> PageScene<'a> {
        PageScene {
            text,
            layout,
            page,
            selection: None,
            theme,
            config,
            magnifier: None,
        }
    }

    #[test]
    fn test_page_starts_with_clear() {
        let (text, layout, pages, fm) = scene_parts(StyledText::plain("hello"), 100.0, 100.0);
        let theme = ReaderTheme::default();
        let config = ReaderConfig::default();
        let ops = render_page(&scene(&text, &layout, &pages[0], &theme, &config), &fm);
        assert_eq!(ops[0], DrawOp::Clear { color: theme.background });
        assert!(matches!(ops[1], DrawOp::TextRun { .. }));
    }

    #[test]
    fn test_blank_text_renders_placeholder() {
        let (text, layout, _, fm) = scene_parts(StyledText::plain("   "), 100.0, 100.0);
        let pages = paginate(&layout, 100.0).unwrap();
        let theme = ReaderTheme::default();
        let config = ReaderConfig::default();
        let ops = render_page(&scene(&text, &layout, &pages[0], &theme, &config), &fm);
        assert_eq!(ops.len(), 2);
        assert!(matches!(
            &ops[1],
            DrawOp::TextRun { text, .. } if text == NO_CONTENT_PLACEHOLDER
        ));
    }

    #[test]
    fn test_second_page_coordinates_are_page_local() {
        // Two 14 px lines per page; page 1 holds the third line.
        let (text, layout, pages, fm) = scene_parts(StyledText::plain("AAAA BBBB CCCC"), 20.0, 28.0);
        let theme = ReaderTheme::default();
        let config = ReaderConfig::default();
        let ops = render_page(&scene(&text, &layout, &pages[1], &theme, &config), &fm);
        let baselines: Vec<f32> = ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::TextRun { baseline, .. } => Some(*baseline),
                _ => None,
            })
            .collect();
        assert_eq!(baselines, vec![8.0], "page-local baseline of the first line");
    }

    #[test]
    fn test_selection_rects_span_lines() {
        let (text, layout, pages, fm) = scene_parts(StyledText::plain("AAAA BBBB CCCC"), 20.0, 28.0);
        let theme = ReaderTheme::default();
        let config = ReaderConfig::default();
        let mut sc = scene(&text, &layout, &pages[0], &theme, &config);
        sc.selection = Some((2, 8));
        let rects = selection_rects(&sc, &fm, (2, 8));
        assert_eq!(rects.len(), 2);
        // Line 0 from 'A' index 2 to the right edge of the layout, minus
        // the 1 px inset on every side.
        assert_eq!(rects[0], (11.0, 1.0, 8.0, 8.0));
        // Continuation line starts at the left margin.
        assert_eq!(rects[1], (1.0, 15.0, 13.0, 8.0));
    }

    #[test]
    fn test_selection_clipped_to_page() {
        let (text, layout, pages, fm) = scene_parts(StyledText::plain("AAAA BBBB CCCC"), 20.0, 28.0);
        let theme = ReaderTheme::default();
        let config = ReaderConfig::default();
        let sc = scene(&text, &layout, &pages[1], &theme, &config);
        // Selection lives entirely on page 0.
        assert!(selection_rects(&sc, &fm, (0, 4)).is_empty());
    }

    #[test]
    fn test_link_runs_get_link_color() {
        let styled = StyledText::with_spans(
            "read the appendix now",
            vec![Span::link(9, 17, "#appendix")],
        );
        let (text, layout, pages, fm) = scene_parts(styled, 200.0, 100.0);
        let theme = ReaderTheme::default();
        let config = ReaderConfig::default();
        let ops = render_page(&scene(&text, &layout, &pages[0], &theme, &config), &fm);
        let runs: Vec<(&String, Rgb)> = ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::TextRun { text, color, .. } => Some((text, *color)),
                _ => None,
            })
            .collect();
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[1].0, "appendix");
        assert_eq!(runs[1].1, theme.link_color());
        assert_eq!(runs[0].1, theme.text);
    }

    #[test]
    fn test_footnote_marker_superscripted() {
        let styled = StyledText::with_spans("fact[3] here", vec![Span::link(4, 7, "#fn3")]);
        let (text, layout, pages, fm) = scene_parts(styled, 200.0, 100.0);
        let theme = ReaderTheme::default();
        let config = ReaderConfig::default();
        let ops = render_page(&scene(&text, &layout, &pages[0], &theme, &config), &fm);
        assert!(ops.iter().any(|op| matches!(
            op,
            DrawOp::TextRun { text, superscript: true, .. } if text == "[3]"
        )));
    }

    #[test]
    fn test_quote_card_behind_text() {
        let styled = StyledText::with_spans("before\nquoted words\nafter", vec![Span::quote(7, 19)]);
        let (text, layout, pages, fm) = scene_parts(styled, 200.0, 100.0);
        let theme = ReaderTheme::default();
        let config = ReaderConfig::default();
        let ops = render_page(&scene(&text, &layout, &pages[0], &theme, &config), &fm);
        let card_idx = ops
            .iter()
            .position(|op| matches!(op, DrawOp::RoundedRect { .. }))
            .expect("quote card present");
        let first_text = ops
            .iter()
            .position(|op| matches!(op, DrawOp::TextRun { .. }))
            .unwrap();
        assert!(card_idx < first_text, "card must paint before the text");
    }

    #[test]
    fn test_handles_drawn_for_selection() {
        let (text, layout, pages, fm) = scene_parts(StyledText::plain("hello world"), 200.0, 100.0);
        let theme = ReaderTheme::default();
        let config = ReaderConfig::default();
        let mut sc = scene(&text, &layout, &pages[0], &theme, &config);
        sc.selection = Some((0, 5));
        let ops = render_page(&sc, &fm);
        let circles: Vec<(f32, f32)> = ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Circle { cx, cy, .. } => Some((*cx, *cy)),
                _ => None,
            })
            .collect();
        assert_eq!(circles.len(), 2);
        // Start knob above the glyph box, end knob below it.
        assert!(circles[0].1 < 0.0);
        assert!(circles[1].1 > 10.0);
        assert_eq!(circles[1].0, 25.0);
    }

    #[test]
    fn test_magnifier_block_shape() {
        let (text, layout, pages, fm) = scene_parts(StyledText::plain("hello world"), 200.0, 100.0);
        let theme = ReaderTheme::default();
        let config = ReaderConfig::default();
        let mut sc = scene(&text, &layout, &pages[0], &theme, &config);
        sc.selection = Some((0, 5));
        sc.magnifier = Some((25.0, 5.0));
        let ops = render_page(&sc, &fm);

        let clip = ops.iter().position(|op| matches!(op, DrawOp::PushClipCircle { .. }));
        let transform = ops.iter().position(|op| matches!(op, DrawOp::PushTransform { .. }));
        let ring = ops.iter().position(|op| matches!(op, DrawOp::Ring { .. }));
        let pops = ops.iter().filter(|op| matches!(op, DrawOp::Pop)).count();
        assert!(clip.unwrap() < transform.unwrap());
        assert!(transform.unwrap() < ring.unwrap());
        assert_eq!(pops, 2);

        // Loupe center sits magnifier_offset above the touch point and the
        // transform maps the touch point onto that center.
        match ops[clip.unwrap()] {
            DrawOp::PushClipCircle { cx, cy, radius } => {
                assert_eq!((cx, cy), (25.0, 5.0 - config.magnifier_offset));
                assert_eq!(radius, config.magnifier_radius);
            }
            _ => unreachable!(),
        }
        match ops[transform.unwrap()] {
            DrawOp::PushTransform { dx, dy, scale } => {
                assert_eq!(scale, config.magnifier_scale);
                assert!((dx + scale * 25.0 - 25.0).abs() < 1e-3);
                assert!((dy + scale * 5.0 - (5.0 - config.magnifier_offset)).abs() < 1e-3);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_link_hit_test_direct_and_jittered() {
        let styled = StyledText::with_spans("click here please", vec![Span::link(6, 10, "#x")]);
        let (text, layout, pages, fm) = scene_parts(styled, 200.0, 100.0);
        // "here" spans x 30..50 on the only line.
        let hit = link_hit_test(&text, &layout, &fm, &pages[0], 35.0, 5.0);
        assert_eq!(hit.unwrap().payload.as_deref(), Some("#x"));
        // A touch 10 px left of the run still resolves through the probes.
        let near = link_hit_test(&text, &layout, &fm, &pages[0], 22.0, 5.0);
        assert!(near.is_some());
        // Far away resolves to nothing.
        assert!(link_hit_test(&text, &layout, &fm, &pages[0], 120.0, 5.0).is_none());
    }

    #[test]
    fn test_handle_near_picks_closest_knob() {
        let (text, layout, pages, fm) = scene_parts(StyledText::plain("hello world"), 200.0, 100.0);
        let theme = ReaderTheme::default();
        let config = ReaderConfig::default();
        let mut sc = scene(&text, &layout, &pages[0], &theme, &config);
        sc.selection = Some((0, 5));
        // Start knob near (0, -9), end knob near (25, 19).
        assert_eq!(handle_near(&sc, &fm, 2.0, -5.0), Some(Handle::Start));
        assert_eq!(handle_near(&sc, &fm, 24.0, 20.0), Some(Handle::End));
        assert_eq!(handle_near(&sc, &fm, 100.0, 50.0), None);
        sc.selection = None;
        assert_eq!(handle_near(&sc, &fm, 2.0, -5.0), None);
    }
}
