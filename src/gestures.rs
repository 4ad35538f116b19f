use log::debug;

use crate::config::{MiddleTapAction, ReaderConfig};
use crate::selection::Handle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
    Cancel,
}

/// One raw touch sample in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub x: f32,
    pub y: f32,
    /// Monotonic timestamp in ms.
    pub t_ms: u64,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, x: f32, y: f32, t_ms: u64) -> Self {
        Self { kind, x, y, t_ms }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDirection {
    Previous,
    Next,
}

/// What the session should do in response to a recognized gesture.
/// Coordinates are passed through untouched; offset resolution stays with
/// the session, which owns the layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReaderCommand {
    TurnPage(PageDirection),
    ActivateLink { x: f32, y: f32 },
    ClearSelection,
    SeedSelection { x: f32, y: f32 },
    GrabHandle(Handle),
    DragSelection { x: f32, y: f32 },
    CommitSelection,
}

/// The session-side facts the interpreter needs to classify a gesture.
/// Kept as a trait so tests can drive the interpreter without a full
/// session behind it.
pub trait GestureContext {
    fn viewport_width(&self) -> f32;

    fn has_selection(&self) -> bool;

    /// Handle whose grab zone covers the point, if any.
    fn handle_near(&self, x: f32, y: f32) -> Option<Handle>;

    /// Whether a link or footnote target sits under the point.
    fn link_at(&self, x: f32, y: f32) -> bool;

    /// During a selection drag: the turn direction a dwell at `(x, y)`
    /// would trigger. `Some` only while the dragged handle sits on the
    /// displayed page's first line (start handle, previous page) or last
    /// line (end handle, next page) and a page exists in that direction.
    fn edge_hold_direction(&self, x: f32, y: f32) -> Option<PageDirection>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    /// Finger down, not yet classified as tap, long-press, or scroll.
    Pending { x0: f32, y0: f32, t0: u64 },
    DraggingHandle,
    /// Slop exceeded without entering a drag; wait for the finger to lift.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct EdgeHold {
    direction: PageDirection,
    deadline: u64,
}

/// Turns a raw pointer stream into [`ReaderCommand`]s.
///
/// Single-finger model: taps clear a selection, follow links, or turn pages
/// by zone; a long-press seeds a selection and transitions into handle
/// dragging; dwelling at a horizontal edge mid-drag turns the page without
/// lifting. Time is driven externally through [`tick`](Self::tick) so the
/// interpreter itself owns no clock.
#[derive(Debug)]
pub struct GestureInterpreter {
    config: ReaderConfig,
    phase: Phase,
    edge_hold: Option<EdgeHold>,
    /// Last pointer position while dragging, for edge re-arming after a fire.
    last_drag: Option<(f32, f32)>,
}

impl GestureInterpreter {
    pub fn new(config: ReaderConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            edge_hold: None,
            last_drag: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.phase == Phase::DraggingHandle
    }

    /// Feed one pointer event; returns the commands it resolved to.
    pub fn update(&mut self, event: PointerEvent, ctx: &dyn GestureContext) -> Vec<ReaderCommand> {
        match event.kind {
            PointerKind::Down => self.on_down(event, ctx),
            PointerKind::Move => self.on_move(event, ctx),
            PointerKind::Up => self.on_up(event, ctx),
            PointerKind::Cancel => self.on_cancel(),
        }
    }

    /// Advance time-based recognition (long-press, edge-hold). Call at the
    /// host's input cadence; granularity only delays, never re-orders.
    pub fn tick(&mut self, t_ms: u64, ctx: &dyn GestureContext) -> Vec<ReaderCommand> {
        let mut out = Vec::new();
        match self.phase {
            Phase::Pending { x0, y0, t0 } if t_ms.saturating_sub(t0) >= self.config.long_press_ms => {
                debug!("long-press at ({x0}, {y0})");
                self.phase = Phase::DraggingHandle;
                self.last_drag = Some((x0, y0));
                out.push(ReaderCommand::SeedSelection { x: x0, y: y0 });
            }
            Phase::DraggingHandle => {
                if let Some(hold) = self.edge_hold.filter(|h| t_ms >= h.deadline) {
                    debug!("edge-hold fired: {:?}", hold.direction);
                    out.push(ReaderCommand::TurnPage(hold.direction));
                    // One turn per dwell: re-arm with a fresh deadline so a
                    // finger parked at the edge keeps paging at a steady rate.
                    self.edge_hold = None;
                    if let Some((x, y)) = self.last_drag {
                        self.arm_edge_hold(x, y, t_ms, ctx);
                    }
                }
            }
            _ => {}
        }
        out
    }

    fn on_down(&mut self, event: PointerEvent, ctx: &dyn GestureContext) -> Vec<ReaderCommand> {
        self.edge_hold = None;
        if let Some(handle) = ctx.handle_near(event.x, event.y) {
            self.phase = Phase::DraggingHandle;
            self.last_drag = Some((event.x, event.y));
            return vec![ReaderCommand::GrabHandle(handle)];
        }
        self.phase = Phase::Pending {
            x0: event.x,
            y0: event.y,
            t0: event.t_ms,
        };
        Vec::new()
    }

    fn on_move(&mut self, event: PointerEvent, ctx: &dyn GestureContext) -> Vec<ReaderCommand> {
        match self.phase {
            Phase::Pending { x0, y0, .. } => {
                let (dx, dy) = (event.x - x0, event.y - y0);
                if dx * dx + dy * dy > self.config.tap_slop * self.config.tap_slop {
                    self.phase = Phase::Ignored;
                }
                Vec::new()
            }
            Phase::DraggingHandle => {
                self.last_drag = Some((event.x, event.y));
                match ctx.edge_hold_direction(event.x, event.y) {
                    Some(direction) => match self.edge_hold {
                        // An armed hold keeps its deadline while the handle
                        // stays on the same boundary line.
                        Some(hold) if hold.direction == direction => {}
                        _ => self.arm_edge_hold(event.x, event.y, event.t_ms, ctx),
                    },
                    None => self.edge_hold = None,
                }
                vec![ReaderCommand::DragSelection {
                    x: event.x,
                    y: event.y,
                }]
            }
            _ => Vec::new(),
        }
    }

    fn on_up(&mut self, event: PointerEvent, ctx: &dyn GestureContext) -> Vec<ReaderCommand> {
        let phase = std::mem::replace(&mut self.phase, Phase::Idle);
        self.edge_hold = None;
        self.last_drag = None;
        match phase {
            Phase::Pending { x0, y0, t0 } => {
                if event.t_ms.saturating_sub(t0) >= self.config.long_press_ms {
                    // Long-press that never saw a tick: seed and release.
                    return vec![
                        ReaderCommand::SeedSelection { x: x0, y: y0 },
                        ReaderCommand::CommitSelection,
                    ];
                }
                self.classify_tap(event.x, event.y, ctx).into_iter().collect()
            }
            Phase::DraggingHandle => vec![ReaderCommand::CommitSelection],
            _ => Vec::new(),
        }
    }

    fn on_cancel(&mut self) -> Vec<ReaderCommand> {
        let phase = std::mem::replace(&mut self.phase, Phase::Idle);
        self.edge_hold = None;
        self.last_drag = None;
        if phase == Phase::DraggingHandle {
            vec![ReaderCommand::CommitSelection]
        } else {
            Vec::new()
        }
    }

    /// Tap resolution order: an existing selection swallows the tap, then
    /// links, then the page-turn zones.
    fn classify_tap(&self, x: f32, y: f32, ctx: &dyn GestureContext) -> Option<ReaderCommand> {
        if ctx.has_selection() {
            return Some(ReaderCommand::ClearSelection);
        }
        if ctx.link_at(x, y) {
            return Some(ReaderCommand::ActivateLink { x, y });
        }
        let width = ctx.viewport_width();
        let zone = self.config.tap_zone_fraction;
        if x < width * zone {
            return Some(ReaderCommand::TurnPage(PageDirection::Previous));
        }
        if x > width * (1.0 - zone) {
            return Some(ReaderCommand::TurnPage(PageDirection::Next));
        }
        match self.config.middle_tap {
            MiddleTapAction::None => None,
            MiddleTapAction::NextPage => Some(ReaderCommand::TurnPage(PageDirection::Next)),
        }
    }

    fn arm_edge_hold(&mut self, x: f32, y: f32, t_ms: u64, ctx: &dyn GestureContext) {
        self.edge_hold = ctx.edge_hold_direction(x, y).map(|direction| EdgeHold {
            direction,
            deadline: t_ms + self.config.edge_hold_ms,
        });
    }
}
