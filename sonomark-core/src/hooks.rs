//! Callbacks from the core into the host UI.
//!
//! Within one event the core always calls, in order: state mutation, derived
//! value recomputation, [`HostHooks::request_render`], then
//! [`HostHooks::notify`].

use crate::analytics::TwoPointDelta;
use crate::annotation::{ModeKind, Selection};
use crate::viewport::ViewportState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CursorHint {
    #[default]
    Default,
    /// Hovering a draggable target.
    Grab,
    /// A drag or pan is in progress.
    Grabbing,
}

impl CursorHint {
    /// CSS `cursor` value.
    pub fn css(self) -> &'static str {
        match self {
            CursorHint::Default => "crosshair",
            CursorHint::Grab => "grab",
            CursorHint::Grabbing => "grabbing",
        }
    }
}

/// Observer notifications, sent after the re-render request.
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceEvent {
    AnnotationsChanged(ModeKind),
    MeasurementChanged(TwoPointDelta),
    SelectionChanged(Option<Selection>),
    ViewportChanged(ViewportState),
    ModeChanged(ModeKind),
    ImageLoaded,
}

pub trait HostHooks {
    fn set_cursor(&mut self, _cursor: CursorHint) {}
    fn request_render(&mut self) {}
    fn notify(&mut self, _event: &SurfaceEvent) {}
}

/// Hooks that ignore everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHooks;

impl HostHooks for NoopHooks {}

/// Hooks that record what was asked of them; hosts can drain it once per
/// animation frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HookLog {
    pub cursor: Option<CursorHint>,
    pub renders: usize,
    pub events: Vec<SurfaceEvent>,
}

impl HookLog {
    pub fn take_events(&mut self) -> Vec<SurfaceEvent> {
        std::mem::take(&mut self.events)
    }

    /// Consume pending render requests; true if any were made.
    pub fn take_render(&mut self) -> bool {
        std::mem::take(&mut self.renders) > 0
    }
}

impl HostHooks for HookLog {
    fn set_cursor(&mut self, cursor: CursorHint) {
        self.cursor = Some(cursor);
    }

    fn request_render(&mut self) {
        self.renders += 1;
    }

    fn notify(&mut self, event: &SurfaceEvent) {
        self.events.push(event.clone());
    }
}
