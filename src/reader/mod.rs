mod input;
mod pagination_task;

pub use pagination_task::{PaginationRequest, PaginationResult, PaginationWorker};

use std::sync::Arc;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::ReaderConfig;
use crate::font_metrics::FontMetrics;
use crate::gestures::{GestureInterpreter, PageDirection};
use crate::layout::{Layout, LayoutError};
use crate::paginator::{self, Page};
use crate::render::{self, DrawOp, PageScene};
use crate::selection::SelectionEngine;
use crate::styled_text::StyledText;
use crate::theme::ReaderTheme;

/// Where the reader currently is, in a form that survives re-pagination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Locator {
    /// Resource (chapter) href within the publication.
    pub href: String,
    /// Position within the resource, `[0, 1)`.
    pub progression: f64,
    /// Position within the whole publication, `[0, 1)`.
    pub total_progression: f64,
}

/// Outbound notifications for the host UI.
#[derive(Debug, Clone, PartialEq)]
pub enum ReaderEvent {
    /// A selection was established or updated on release. The anchor is the
    /// page-local point where a context menu should attach.
    SelectionEstablished {
        text: String,
        anchor_x: f32,
        anchor_y: f32,
    },
    SelectionCleared,
    LinkActivated {
        href: String,
    },
    LocatorChanged(Locator),
    /// A page turn ran off the end of the chapter; the host decides whether
    /// a neighboring resource exists.
    ChapterBoundaryReached {
        direction: PageDirection,
    },
}

/// One chapter's worth of reading state: text, pagination, selection, and
/// gesture recognition, glued together behind a pointer-event interface.
///
/// The session is synchronous; hosts that want pagination off the UI thread
/// wrap it with [`PaginationWorker`] and feed results back through
/// [`apply_pagination`](Self::apply_pagination).
pub struct ReaderSession {
    text: Arc<StyledText>,
    metrics: Arc<dyn FontMetrics + Send + Sync>,
    config: ReaderConfig,
    theme: ReaderTheme,
    viewport: (f32, f32),
    layout: Layout,
    pages: Vec<Page>,
    page_index: usize,
    pub(crate) selection: SelectionEngine,
    pub(crate) gestures: GestureInterpreter,
    /// Page-local touch point while a handle drag is live.
    pub(crate) magnifier: Option<(f32, f32)>,
    href: String,
    resource_index: usize,
    resource_count: usize,
    /// Bumped on every relayout trigger; stale async results are dropped.
    generation: u64,
}

impl ReaderSession {
    pub fn new(
        text: Arc<StyledText>,
        metrics: Arc<dyn FontMetrics + Send + Sync>,
        config: ReaderConfig,
        theme: ReaderTheme,
        viewport: (f32, f32),
        href: impl Into<String>,
        resource_index: usize,
        resource_count: usize,
    ) -> Result<Self, LayoutError> {
        let layout = Layout::compute(&text, viewport.0, metrics.as_ref())?;
        let pages = paginator::paginate(&layout, viewport.1)?;
        let gestures = GestureInterpreter::new(config.clone());
        let href = href.into();
        info!(
            "reader session for {href}: {} chars, {} pages",
            text.len(),
            pages.len()
        );
        Ok(Self {
            text,
            metrics,
            config,
            theme,
            viewport,
            layout,
            pages,
            page_index: 0,
            selection: SelectionEngine::new(),
            gestures,
            magnifier: None,
            href,
            resource_index,
            resource_count: resource_count.max(1),
            generation: 0,
        })
    }

    pub fn text(&self) -> &StyledText {
        &self.text
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.pages.get(self.page_index)
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn selection_range(&self) -> Option<(usize, usize)> {
        self.selection.range()
    }

    pub fn locator(&self) -> Locator {
        let progression = paginator::progression_for_page(self.page_index, self.pages.len());
        Locator {
            href: self.href.clone(),
            progression,
            total_progression: (self.resource_index as f64 + progression)
                / self.resource_count as f64,
        }
    }

    /// Jump to the page holding `progression`, e.g. when restoring a saved
    /// position.
    pub fn go_to_progression(&mut self, progression: f64) -> Vec<ReaderEvent> {
        let target = paginator::page_for_progression(progression, self.pages.len());
        if target == self.page_index {
            return Vec::new();
        }
        self.page_index = target;
        vec![ReaderEvent::LocatorChanged(self.locator())]
    }

    /// Synchronous relayout after a viewport change, keeping the reading
    /// position by progression.
    pub fn set_viewport(&mut self, width: f32, height: f32) -> Result<Vec<ReaderEvent>, LayoutError> {
        self.viewport = (width, height);
        self.rebuild()
    }

    /// Synchronous relayout with new font metrics (font size change).
    pub fn set_metrics(
        &mut self,
        metrics: Arc<dyn FontMetrics + Send + Sync>,
    ) -> Result<Vec<ReaderEvent>, LayoutError> {
        self.metrics = metrics;
        self.rebuild()
    }

    /// Stamp a request for [`PaginationWorker`]. Anything the worker sends
    /// back for an older generation is ignored on apply.
    pub fn repagination_request(&mut self, width: f32, height: f32) -> PaginationRequest {
        self.generation += 1;
        PaginationRequest {
            generation: self.generation,
            text: Arc::clone(&self.text),
            metrics: Arc::clone(&self.metrics),
            width,
            height,
        }
    }

    /// Adopt an async pagination result. Stale generations are dropped so
    /// only the latest request ever wins.
    pub fn apply_pagination(&mut self, result: PaginationResult) -> Vec<ReaderEvent> {
        if result.generation != self.generation {
            debug!(
                "dropping stale pagination (generation {} < {})",
                result.generation, self.generation
            );
            return Vec::new();
        }
        let progression = paginator::progression_for_page(self.page_index, self.pages.len());
        self.viewport = (result.layout.width(), result.viewport_height);
        self.layout = result.layout;
        self.pages = result.pages;
        self.page_index = paginator::page_for_progression(progression, self.pages.len());
        self.reclamp_selection();
        vec![ReaderEvent::LocatorChanged(self.locator())]
    }

    /// Display list for the current page.
    pub fn render(&self) -> Vec<DrawOp> {
        let empty_page = Page {
            start: 0,
            end: 0,
            first_line: 0,
            last_line: 0,
        };
        let page = self.pages.get(self.page_index).unwrap_or(&empty_page);
        render::render_page(
            &PageScene {
                text: &self.text,
                layout: &self.layout,
                page,
                selection: self.selection.range(),
                theme: &self.theme,
                config: &self.config,
                magnifier: self.magnifier,
            },
            self.metrics.as_ref(),
        )
    }

    fn rebuild(&mut self) -> Result<Vec<ReaderEvent>, LayoutError> {
        let progression = paginator::progression_for_page(self.page_index, self.pages.len());
        self.generation += 1;
        self.layout = Layout::compute(&self.text, self.viewport.0, self.metrics.as_ref())?;
        self.pages = paginator::paginate(&self.layout, self.viewport.1)?;
        self.page_index = paginator::page_for_progression(progression, self.pages.len());
        self.reclamp_selection();
        debug!(
            "relayout: {} pages, back on page {}",
            self.pages.len(),
            self.page_index
        );
        Ok(vec![ReaderEvent::LocatorChanged(self.locator())])
    }

    fn reclamp_selection(&mut self) {
        if let Some(page) = self.pages.get(self.page_index).copied() {
            self.selection.nudge_after_page_turn(&page, self.text.len());
        } else {
            self.selection.clear();
        }
    }
}
