use crate::annotation::{AnnotationId, Endpoint, IdAllocator, TargetKind, TwoPointMeasurement};
use crate::domain::DomainBounds;
use crate::drag::{DragState, DragTarget, TargetPayload};
use crate::geometry::DomainPoint;
use crate::modes::{offset, AnnotationLayer, OverlayItem};
use crate::tolerance::{find_closest_target, DomainTolerance};
use crate::transform::Transform;

/// A single start/end measurement.
///
/// Clicks on empty space go start → end → start again (dropping the old
/// end). Edits are made on a working copy that replaces the committed
/// measurement on pointer up.
#[derive(Clone, Debug)]
pub struct TwoPointLayer {
    id: AnnotationId,
    measurement: TwoPointMeasurement,
    pending: Option<TwoPointMeasurement>,
    rate_factor: f64,
}

impl TwoPointLayer {
    pub fn new(id: AnnotationId, rate_factor: f64) -> Self {
        Self { id, measurement: TwoPointMeasurement::default(), pending: None, rate_factor }
    }

    pub fn id(&self) -> AnnotationId {
        self.id
    }

    /// The committed measurement.
    pub fn measurement(&self) -> &TwoPointMeasurement {
        &self.measurement
    }

    /// What is currently shown: the working copy while editing, else the
    /// committed measurement.
    pub fn working(&self) -> &TwoPointMeasurement {
        self.pending.as_ref().unwrap_or(&self.measurement)
    }

    fn working_mut(&mut self) -> &mut TwoPointMeasurement {
        match self.pending {
            Some(ref mut pending) => pending,
            None => &mut self.measurement,
        }
    }

    pub fn rate_factor(&self) -> f64 {
        self.rate_factor
    }

    pub fn set_rate_factor(&mut self, rate_factor: f64) {
        self.rate_factor = rate_factor;
        self.measurement.recompute(rate_factor);
        if let Some(pending) = self.pending.as_mut() {
            pending.recompute(rate_factor);
        }
    }

    fn endpoint(&self, target: &DragTarget) -> Option<Endpoint> {
        match target.kind {
            TargetKind::TwoPointMarker(endpoint) if target.id == self.id => Some(endpoint),
            _ => None,
        }
    }
}

impl AnnotationLayer for TwoPointLayer {
    fn hit_test(&self, position: DomainPoint, tolerance: &DomainTolerance, _bounds: &DomainBounds) -> Option<DragTarget> {
        let m = self.working();
        let candidates = [Endpoint::Start, Endpoint::End].into_iter().filter_map(|e| {
            m.point(e).map(|p| (DragTarget::new(self.id, TargetKind::TwoPointMarker(e)), p))
        });
        find_closest_target(candidates, position, tolerance)
    }

    fn create_at(&mut self, position: DomainPoint, _ids: &mut IdAllocator) -> Option<DragTarget> {
        let mut next = self.measurement;
        let endpoint = match (next.start, next.end) {
            (Some(_), None) => {
                next.end = Some(position);
                Endpoint::End
            }
            _ => {
                next.start = Some(position);
                next.end = None;
                Endpoint::Start
            }
        };
        next.recompute(self.rate_factor);
        self.pending = Some(next);
        Some(DragTarget::new(self.id, TargetKind::TwoPointMarker(endpoint)))
    }

    fn snapshot(&self, target: &DragTarget) -> Option<TargetPayload> {
        self.endpoint(target).map(|_| TargetPayload::TwoPoint(*self.working()))
    }

    fn drag_to(&mut self, target: &DragTarget, position: DomainPoint, _start: DomainPoint) {
        let Some(endpoint) = self.endpoint(target) else {
            return;
        };
        let rate_factor = self.rate_factor;
        let m = self.working_mut();
        m.set_point(endpoint, Some(position));
        m.recompute(rate_factor);
    }

    fn drop_at(&mut self, target: &DragTarget, position: DomainPoint) {
        self.drag_to(target, position, position);
        if let Some(pending) = self.pending.take() {
            self.measurement = pending;
        }
    }

    fn rollback(&mut self, state: &DragState) {
        if self.pending.take().is_some() {
            return;
        }
        if let Some(TargetPayload::TwoPoint(original)) = state.original_payload {
            self.measurement = original;
        }
    }

    fn nudge(&mut self, target: &DragTarget, delta: DomainPoint, bounds: &DomainBounds) -> bool {
        let Some(endpoint) = self.endpoint(target) else {
            return false;
        };
        let Some(p) = self.measurement.point(endpoint) else {
            return false;
        };
        self.measurement.set_point(endpoint, Some(offset(p, delta, bounds)));
        self.measurement.recompute(self.rate_factor);
        true
    }

    fn remove(&mut self, target: &DragTarget) -> bool {
        let Some(endpoint) = self.endpoint(target) else {
            return false;
        };
        let existed = self.measurement.point(endpoint).is_some();
        self.measurement.set_point(endpoint, None);
        self.measurement.recompute(self.rate_factor);
        existed
    }

    fn render_overlay(&self, transform: &Transform) -> Vec<OverlayItem> {
        let m = self.working();
        let visible = transform.visible_rect();
        let start = m.start.map(|p| transform.domain_to_drawing(p));
        let end = m.end.map(|p| transform.domain_to_drawing(p));
        let mut items = Vec::new();
        if let (Some(from), Some(to)) = (start, end) {
            items.push(OverlayItem::MeasurementLine { from, to });
        }
        for (endpoint, at) in [(Endpoint::Start, start), (Endpoint::End, end)] {
            if let Some(at) = at.filter(|at| visible.contains(*at)) {
                items.push(OverlayItem::MeasurementPoint { endpoint, at });
            }
        }
        items
    }

    fn clear(&mut self) {
        self.measurement = TwoPointMeasurement::default();
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn click(layer: &mut TwoPointLayer, ids: &mut IdAllocator, at: DomainPoint) -> DragTarget {
        let target = layer.create_at(at, ids).unwrap();
        layer.drop_at(&target, at);
        target
    }

    #[test]
    fn test_click_sequence_start_end_restart() {
        let mut ids = IdAllocator::new();
        let mut layer = TwoPointLayer::new(ids.next_id(), 1.0);

        let t = click(&mut layer, &mut ids, DomainPoint::new(0.0, 100.0));
        assert_eq!(t.kind, TargetKind::TwoPointMarker(Endpoint::Start));
        assert_eq!(layer.measurement().speed(), None);

        let t = click(&mut layer, &mut ids, DomainPoint::new(2.0, 120.0));
        assert_eq!(t.kind, TargetKind::TwoPointMarker(Endpoint::End));
        assert_eq!(layer.measurement().speed(), Some(40.0));

        click(&mut layer, &mut ids, DomainPoint::new(5.0, 50.0));
        assert_eq!(layer.measurement().start, Some(DomainPoint::new(5.0, 50.0)));
        assert_eq!(layer.measurement().end, None);
        assert_eq!(layer.measurement().delta_time(), None);
    }

    #[test]
    fn test_cancelled_click_keeps_committed_measurement() {
        let mut ids = IdAllocator::new();
        let mut layer = TwoPointLayer::new(ids.next_id(), 1.0);
        click(&mut layer, &mut ids, DomainPoint::new(0.0, 100.0));
        click(&mut layer, &mut ids, DomainPoint::new(2.0, 120.0));

        let target = layer.create_at(DomainPoint::new(9.0, 9.0), &mut ids).unwrap();
        let state = DragState {
            target,
            start_position: DomainPoint::new(9.0, 9.0),
            last_position: DomainPoint::new(9.0, 9.0),
            original_payload: layer.snapshot(&target),
        };
        assert_eq!(layer.working().end, None);
        layer.rollback(&state);
        assert_eq!(layer.working().end, Some(DomainPoint::new(2.0, 120.0)));
        assert_eq!(layer.measurement().speed(), Some(40.0));
    }

    #[test]
    fn test_dragging_endpoint_updates_delta_live() {
        let mut ids = IdAllocator::new();
        let mut layer = TwoPointLayer::new(ids.next_id(), 0.5);
        click(&mut layer, &mut ids, DomainPoint::new(0.0, 100.0));
        click(&mut layer, &mut ids, DomainPoint::new(2.0, 120.0));

        let tol = DomainTolerance::new(1.0, 1.0);
        let target = layer.hit_test(DomainPoint::new(2.1, 119.8), &tol, &DomainBounds::new(0.0, 60.0, 0.0, 200.0)).unwrap();
        assert_eq!(target.kind, TargetKind::TwoPointMarker(Endpoint::End));
        layer.drag_to(&target, DomainPoint::new(4.0, 120.0), DomainPoint::new(2.0, 120.0));
        assert_eq!(layer.measurement().delta_time(), Some(4.0));
        assert_eq!(layer.measurement().speed(), Some(40.0));
    }

    #[test]
    fn test_remove_endpoint_clears_delta() {
        let mut ids = IdAllocator::new();
        let mut layer = TwoPointLayer::new(ids.next_id(), 1.0);
        click(&mut layer, &mut ids, DomainPoint::new(0.0, 100.0));
        click(&mut layer, &mut ids, DomainPoint::new(2.0, 120.0));
        let end = DragTarget::new(layer.id(), TargetKind::TwoPointMarker(Endpoint::End));
        assert!(layer.remove(&end));
        assert!(!layer.remove(&end));
        assert_eq!(layer.measurement().speed(), None);
        assert!(layer.measurement().start.is_some());
    }
}
