use log::debug;

use crate::config::ReaderConfig;
use crate::font_metrics::FontMetrics;
use crate::gestures::{GestureContext, PageDirection, PointerEvent, ReaderCommand};
use crate::layout::Layout;
use crate::paginator::Page;
use crate::render::{self, PageScene};
use crate::selection::Handle;
use crate::styled_text::StyledText;
use crate::theme::ReaderTheme;

use super::{ReaderEvent, ReaderSession};

/// Read-only view over the session that the gesture interpreter consults
/// while classifying events. Built fresh per event so the interpreter can be
/// borrowed mutably alongside it.
struct SessionCtx<'a> {
    text: &'a StyledText,
    layout: &'a Layout,
    page: Option<&'a Page>,
    config: &'a ReaderConfig,
    theme: &'a ReaderTheme,
    fm: &'a dyn FontMetrics,
    selection: Option<(usize, usize)>,
    active_handle: Option<Handle>,
    viewport_width: f32,
    page_index: usize,
    page_count: usize,
}

impl SessionCtx<'_> {
    /// Page-local point to document char offset, clamping y into the
    /// displayed page's band.
    fn offset_at(&self, x: f32, y: f32) -> Option<usize> {
        let page = self.page?;
        let lines = self.layout.lines();
        let top = lines.get(page.first_line)?.top;
        let bottom = lines.get(page.last_line)?.bottom;
        let doc_y = (y + top).clamp(top, bottom - 0.01);
        self.layout.offset_for_position(self.text, self.fm, x, doc_y)
    }
}

impl GestureContext for SessionCtx<'_> {
    fn viewport_width(&self) -> f32 {
        self.viewport_width
    }

    fn has_selection(&self) -> bool {
        self.selection.is_some()
    }

    fn handle_near(&self, x: f32, y: f32) -> Option<Handle> {
        let page = self.page?;
        render::handle_near(
            &PageScene {
                text: self.text,
                layout: self.layout,
                page,
                selection: self.selection,
                theme: self.theme,
                config: self.config,
                magnifier: None,
            },
            self.fm,
            x,
            y,
        )
    }

    fn link_at(&self, x: f32, y: f32) -> bool {
        let Some(page) = self.page else {
            return false;
        };
        render::link_hit_test(self.text, self.layout, self.fm, page, x, y).is_some()
    }

    fn edge_hold_direction(&self, x: f32, y: f32) -> Option<PageDirection> {
        let page = self.page?;
        let (start, end) = self.selection?;
        let active = self.active_handle?;
        let offset = self.offset_at(x, y)?;
        // The stationary edge is opposite the active handle; the dragged
        // edge is whichever side of it the finger currently resolves to.
        let anchor = match active {
            Handle::Start => end,
            Handle::End => start,
        };
        let dragged = if offset < anchor {
            Handle::Start
        } else if offset > anchor {
            Handle::End
        } else {
            active
        };
        let line = self.layout.line_for_offset(offset)?;
        match dragged {
            Handle::Start if line <= page.first_line && self.page_index > 0 => {
                Some(PageDirection::Previous)
            }
            Handle::End if line >= page.last_line && self.page_index + 1 < self.page_count => {
                Some(PageDirection::Next)
            }
            _ => None,
        }
    }
}

macro_rules! session_ctx {
    ($session:expr) => {
        SessionCtx {
            text: &$session.text,
            layout: &$session.layout,
            page: $session.pages.get($session.page_index),
            config: &$session.config,
            theme: &$session.theme,
            fm: $session.metrics.as_ref(),
            selection: $session.selection.range(),
            active_handle: $session.selection.active_handle(),
            viewport_width: $session.viewport.0,
            page_index: $session.page_index,
            page_count: $session.pages.len(),
        }
    };
}

impl ReaderSession {
    /// Feed one touch sample. Coordinates are page-local px.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Vec<ReaderEvent> {
        let commands = {
            let ctx = session_ctx!(self);
            self.gestures.update(event, &ctx)
        };
        self.apply_commands(commands)
    }

    /// Drive time-based gestures (long-press, edge-hold) forward.
    pub fn tick(&mut self, t_ms: u64) -> Vec<ReaderEvent> {
        let commands = {
            let ctx = session_ctx!(self);
            self.gestures.tick(t_ms, &ctx)
        };
        self.apply_commands(commands)
    }

    fn apply_commands(&mut self, commands: Vec<ReaderCommand>) -> Vec<ReaderEvent> {
        let mut events = Vec::new();
        for command in commands {
            events.extend(self.apply_command(command));
        }
        events
    }

    pub(crate) fn apply_command(&mut self, command: ReaderCommand) -> Vec<ReaderEvent> {
        match command {
            ReaderCommand::TurnPage(direction) => self.turn_page(direction),
            ReaderCommand::ClearSelection => {
                self.magnifier = None;
                if self.selection.clear() {
                    vec![ReaderEvent::SelectionCleared]
                } else {
                    Vec::new()
                }
            }
            ReaderCommand::ActivateLink { x, y } => self.activate_link(x, y),
            ReaderCommand::SeedSelection { x, y } => {
                if let Some(offset) = self.offset_at(x, y) {
                    let text = &*self.text;
                    if self.selection.seed(text, offset).is_some() {
                        self.magnifier = Some((x, y));
                    }
                }
                Vec::new()
            }
            ReaderCommand::GrabHandle(handle) => {
                self.selection.grab(handle);
                Vec::new()
            }
            ReaderCommand::DragSelection { x, y } => {
                if let (Some(offset), Some(page)) = (
                    self.offset_at(x, y),
                    self.pages.get(self.page_index).copied(),
                ) {
                    self.selection.drag_to(offset, &page, self.text.len());
                }
                self.magnifier = Some((x, y));
                Vec::new()
            }
            ReaderCommand::CommitSelection => {
                self.magnifier = None;
                match self.selection.commit() {
                    Some((start, end)) => {
                        let (anchor_x, anchor_y) = self.menu_anchor(end);
                        vec![ReaderEvent::SelectionEstablished {
                            text: self.text.slice(start, end),
                            anchor_x,
                            anchor_y,
                        }]
                    }
                    None => Vec::new(),
                }
            }
        }
    }

    fn turn_page(&mut self, direction: PageDirection) -> Vec<ReaderEvent> {
        let target = match direction {
            PageDirection::Previous => self.page_index.checked_sub(1),
            PageDirection::Next => {
                (self.page_index + 1 < self.pages.len()).then(|| self.page_index + 1)
            }
        };
        let Some(target) = target else {
            debug!("page turn hit chapter boundary ({direction:?})");
            return vec![ReaderEvent::ChapterBoundaryReached { direction }];
        };
        self.page_index = target;
        if let Some(page) = self.pages.get(target).copied() {
            // A mid-drag turn must keep the dragged edge on screen.
            self.selection.nudge_after_page_turn(&page, self.text.len());
        }
        vec![ReaderEvent::LocatorChanged(self.locator())]
    }

    fn activate_link(&mut self, x: f32, y: f32) -> Vec<ReaderEvent> {
        let Some(page) = self.pages.get(self.page_index) else {
            return Vec::new();
        };
        let span = render::link_hit_test(&self.text, &self.layout, self.metrics.as_ref(), page, x, y);
        match span.and_then(|s| s.payload.clone()) {
            Some(href) => {
                debug!("link activated: {href}");
                vec![ReaderEvent::LinkActivated { href }]
            }
            None => Vec::new(),
        }
    }

    /// Resolve a page-local point to a document char offset.
    fn offset_at(&self, x: f32, y: f32) -> Option<usize> {
        let page = self.pages.get(self.page_index)?;
        let lines = self.layout.lines();
        let top = lines.get(page.first_line)?.top;
        let bottom = lines.get(page.last_line)?.bottom;
        let doc_y = (y + top).clamp(top, bottom - 0.01);
        self.layout
            .offset_for_position(&self.text, self.metrics.as_ref(), x, doc_y)
    }

    /// Page-local point where the host should anchor the selection menu:
    /// the end handle's position at the top of its line.
    fn menu_anchor(&self, end: usize) -> (f32, f32) {
        let x = self.layout.x_for_offset(&self.text, self.metrics.as_ref(), end);
        let page_top = self
            .pages
            .get(self.page_index)
            .and_then(|p| self.layout.lines().get(p.first_line))
            .map_or(0.0, |l| l.top);
        let line_top = self
            .layout
            .line_for_offset(end.saturating_sub(1))
            .map_or(0.0, |li| self.layout.lines()[li].top);
        (x, line_top - page_top)
    }
}
