//! Pointer-drag lifecycle shared by every annotation mode.
//!
//! `Idle → Dragging → Idle`. At most one drag exists per controller; the
//! controller is owned by one surface instance, so separate surfaces never
//! interfere.

use crate::annotation::{AnnotationId, HarmonicSet, Marker, TargetKind, TwoPointMeasurement};
use crate::geometry::DomainPoint;
use crate::hooks::{CursorHint, HostHooks};

/// An annotation addressed by id and kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DragTarget {
    pub id: AnnotationId,
    pub kind: TargetKind,
}

impl DragTarget {
    pub const fn new(id: AnnotationId, kind: TargetKind) -> Self {
        Self { id, kind }
    }
}

/// Pre-drag copy of the target's data, kept for rollback.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TargetPayload {
    Marker(Marker),
    HarmonicSet(HarmonicSet),
    TwoPoint(TwoPointMeasurement),
}

#[derive(Clone, Debug, PartialEq)]
pub struct DragState {
    pub target: DragTarget,
    pub start_position: DomainPoint,
    pub last_position: DomainPoint,
    pub original_payload: Option<TargetPayload>,
}

/// What a drag needs from the mode that owns the targets.
pub trait DragTargets {
    fn find_target_at(&self, position: DomainPoint) -> Option<DragTarget>;
    fn snapshot(&self, target: &DragTarget) -> Option<TargetPayload>;
    fn on_drag_start(&mut self, target: &DragTarget, position: DomainPoint);
    fn on_drag_update(&mut self, target: &DragTarget, position: DomainPoint, start: DomainPoint);
    fn on_drag_end(&mut self, target: &DragTarget, position: DomainPoint);
}

#[derive(Clone, Debug, Default)]
pub struct DragController {
    state: Option<DragState>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&DragState> {
        self.state.as_ref()
    }

    pub fn target(&self) -> Option<DragTarget> {
        self.state.as_ref().map(|s| s.target)
    }

    /// Begin dragging whatever `targets` reports under `position`. Fails,
    /// leaving any current drag untouched, when already dragging or when
    /// nothing is hit.
    pub fn start_drag(
        &mut self,
        position: DomainPoint,
        targets: &mut impl DragTargets,
        hooks: &mut impl HostHooks,
    ) -> bool {
        if let Some(active) = &self.state {
            log::debug!("drag already active on {:?}, ignoring start", active.target.id);
            return false;
        }
        let Some(target) = targets.find_target_at(position) else {
            return false;
        };
        self.begin(target, position, targets, hooks);
        true
    }

    /// Begin dragging a target the caller already knows, such as an entity
    /// created under the pointer. Same rejection rule as
    /// [`start_drag`](Self::start_drag).
    pub fn start_drag_on(
        &mut self,
        target: DragTarget,
        position: DomainPoint,
        targets: &mut impl DragTargets,
        hooks: &mut impl HostHooks,
    ) -> bool {
        if self.is_dragging() {
            log::debug!("drag already active, ignoring start on {:?}", target.id);
            return false;
        }
        self.begin(target, position, targets, hooks);
        true
    }

    fn begin(
        &mut self,
        target: DragTarget,
        position: DomainPoint,
        targets: &mut impl DragTargets,
        hooks: &mut impl HostHooks,
    ) {
        self.state = Some(DragState {
            target,
            start_position: position,
            last_position: position,
            original_payload: targets.snapshot(&target),
        });
        targets.on_drag_start(&target, position);
        hooks.set_cursor(CursorHint::Grabbing);
    }

    /// Forward a pointer move to the active drag. Every call is delivered;
    /// the caller decides how often to call.
    pub fn handle_move(&mut self, position: DomainPoint, targets: &mut impl DragTargets) -> bool {
        let Some(state) = self.state.as_mut() else {
            return false;
        };
        state.last_position = position;
        targets.on_drag_update(&state.target, position, state.start_position);
        true
    }

    /// Finish the drag at `position`. Returns the target that was released.
    pub fn end_drag(
        &mut self,
        position: DomainPoint,
        targets: &mut impl DragTargets,
        hooks: &mut impl HostHooks,
    ) -> Option<DragTarget> {
        let state = self.state.take()?;
        targets.on_drag_end(&state.target, position);
        hooks.set_cursor(CursorHint::Default);
        Some(state.target)
    }

    /// Abandon the drag without calling `on_drag_end`. The returned state
    /// carries the original payload; undoing mutations already applied by
    /// `on_drag_update` is up to the caller.
    pub fn cancel_drag(&mut self, hooks: &mut impl HostHooks) -> Option<DragState> {
        let state = self.state.take()?;
        hooks.set_cursor(CursorHint::Default);
        Some(state)
    }

    /// Read-only hover probe: sets the grab cursor over a target. Does
    /// nothing while a drag is active.
    pub fn update_cursor_for_hover(
        &self,
        position: DomainPoint,
        targets: &impl DragTargets,
        hooks: &mut impl HostHooks,
    ) -> Option<DragTarget> {
        if self.is_dragging() {
            return None;
        }
        let hit = targets.find_target_at(position);
        hooks.set_cursor(if hit.is_some() { CursorHint::Grab } else { CursorHint::Default });
        hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::HookLog;

    /// Two markers at fixed positions; records callback order.
    struct Fixture {
        markers: Vec<Marker>,
        calls: Vec<&'static str>,
    }

    impl Fixture {
        fn new() -> Self {
            let marker = |id, time, freq| Marker { id: AnnotationId(id), color: [0, 0, 0], position: DomainPoint::new(time, freq) };
            Self { markers: vec![marker(1, 10.0, 10.0), marker(2, 50.0, 50.0)], calls: Vec::new() }
        }
    }

    impl DragTargets for Fixture {
        fn find_target_at(&self, position: DomainPoint) -> Option<DragTarget> {
            self.markers
                .iter()
                .find(|m| (m.position.time - position.time).abs() < 1.0 && (m.position.freq - position.freq).abs() < 1.0)
                .map(|m| DragTarget::new(m.id, TargetKind::Marker))
        }

        fn snapshot(&self, target: &DragTarget) -> Option<TargetPayload> {
            self.markers.iter().find(|m| m.id == target.id).copied().map(TargetPayload::Marker)
        }

        fn on_drag_start(&mut self, _target: &DragTarget, _position: DomainPoint) {
            self.calls.push("start");
        }

        fn on_drag_update(&mut self, target: &DragTarget, position: DomainPoint, _start: DomainPoint) {
            self.calls.push("update");
            if let Some(m) = self.markers.iter_mut().find(|m| m.id == target.id) {
                m.position = position;
            }
        }

        fn on_drag_end(&mut self, _target: &DragTarget, _position: DomainPoint) {
            self.calls.push("end");
        }
    }

    #[test]
    fn test_full_drag_lifecycle() {
        let mut fx = Fixture::new();
        let mut hooks = HookLog::default();
        let mut drag = DragController::new();

        assert!(drag.start_drag(DomainPoint::new(10.2, 9.9), &mut fx, &mut hooks));
        assert_eq!(hooks.cursor, Some(CursorHint::Grabbing));
        assert_eq!(drag.state().map(|s| s.start_position), Some(DomainPoint::new(10.2, 9.9)));

        assert!(drag.handle_move(DomainPoint::new(20.0, 20.0), &mut fx));
        assert!(drag.handle_move(DomainPoint::new(21.0, 22.0), &mut fx));
        let released = drag.end_drag(DomainPoint::new(21.0, 22.0), &mut fx, &mut hooks);

        assert_eq!(released.map(|t| t.id), Some(AnnotationId(1)));
        assert!(!drag.is_dragging());
        assert_eq!(hooks.cursor, Some(CursorHint::Default));
        assert_eq!(fx.calls, vec!["start", "update", "update", "end"]);
        assert_eq!(fx.markers[0].position, DomainPoint::new(21.0, 22.0));
    }

    #[test]
    fn test_miss_stays_idle() {
        let mut fx = Fixture::new();
        let mut drag = DragController::new();
        assert!(!drag.start_drag(DomainPoint::new(30.0, 30.0), &mut fx, &mut HookLog::default()));
        assert!(!drag.is_dragging());
        assert!(!drag.handle_move(DomainPoint::new(1.0, 1.0), &mut fx));
        assert!(fx.calls.is_empty());
    }

    #[test]
    fn test_second_start_is_rejected() {
        let mut fx = Fixture::new();
        let mut hooks = HookLog::default();
        let mut drag = DragController::new();
        assert!(drag.start_drag(DomainPoint::new(10.0, 10.0), &mut fx, &mut hooks));
        assert!(!drag.start_drag(DomainPoint::new(50.0, 50.0), &mut fx, &mut hooks));
        assert_eq!(drag.target().map(|t| t.id), Some(AnnotationId(1)));
        assert_eq!(fx.calls, vec!["start"]);
    }

    #[test]
    fn test_start_on_known_target_respects_single_drag() {
        let mut fx = Fixture::new();
        let mut hooks = HookLog::default();
        let mut drag = DragController::new();
        let target = DragTarget::new(AnnotationId(2), TargetKind::Marker);
        assert!(drag.start_drag_on(target, DomainPoint::new(0.0, 0.0), &mut fx, &mut hooks));
        assert_eq!(drag.target(), Some(target));
        let other = DragTarget::new(AnnotationId(1), TargetKind::Marker);
        assert!(!drag.start_drag_on(other, DomainPoint::new(0.0, 0.0), &mut fx, &mut hooks));
        assert_eq!(drag.target(), Some(target));
    }

    #[test]
    fn test_cancel_skips_end_and_returns_payload() {
        let mut fx = Fixture::new();
        let mut hooks = HookLog::default();
        let mut drag = DragController::new();
        drag.start_drag(DomainPoint::new(50.0, 50.0), &mut fx, &mut hooks);
        drag.handle_move(DomainPoint::new(5.0, 5.0), &mut fx);

        let state = drag.cancel_drag(&mut hooks).expect("drag was active");
        assert!(!drag.is_dragging());
        assert!(!fx.calls.contains(&"end"));
        match state.original_payload {
            Some(TargetPayload::Marker(m)) => assert_eq!(m.position, DomainPoint::new(50.0, 50.0)),
            other => panic!("unexpected payload {other:?}"),
        }
        assert!(drag.cancel_drag(&mut hooks).is_none());
    }

    #[test]
    fn test_hover_probe_is_read_only() {
        let fx = Fixture::new();
        let mut hooks = HookLog::default();
        let drag = DragController::new();
        let hit = drag.update_cursor_for_hover(DomainPoint::new(10.0, 10.5), &fx, &mut hooks);
        assert_eq!(hit.map(|t| t.id), Some(AnnotationId(1)));
        assert_eq!(hooks.cursor, Some(CursorHint::Grab));
        drag.update_cursor_for_hover(DomainPoint::new(30.0, 30.0), &fx, &mut hooks);
        assert_eq!(hooks.cursor, Some(CursorHint::Default));
        assert!(!drag.is_dragging());
    }
}
