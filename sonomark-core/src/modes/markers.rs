use crate::annotation::{palette_color, AnnotationId, IdAllocator, Marker, TargetKind};
use crate::domain::DomainBounds;
use crate::drag::{DragState, DragTarget, TargetPayload};
use crate::geometry::DomainPoint;
use crate::modes::{offset, AnnotationLayer, OverlayItem};
use crate::tolerance::{find_closest_target, DomainTolerance};
use crate::transform::Transform;

/// Point markers. A click on empty image area stages a marker that is
/// committed when the pointer is released.
#[derive(Clone, Debug, Default)]
pub struct MarkerLayer {
    markers: Vec<Marker>,
    pending: Option<Marker>,
    colors_used: usize,
}

impl MarkerLayer {
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn pending(&self) -> Option<&Marker> {
        self.pending.as_ref()
    }

    /// Committed or staged marker with this id.
    pub fn get(&self, id: AnnotationId) -> Option<&Marker> {
        self.markers.iter().chain(self.pending.iter()).find(|m| m.id == id)
    }

    fn get_mut(&mut self, id: AnnotationId) -> Option<&mut Marker> {
        self.markers.iter_mut().chain(self.pending.iter_mut()).find(|m| m.id == id)
    }

    /// Add a committed marker directly.
    pub fn add(&mut self, id: AnnotationId, position: DomainPoint) -> Marker {
        let marker = Marker { id, color: palette_color(self.colors_used), position };
        self.colors_used += 1;
        self.markers.push(marker);
        marker
    }
}

impl AnnotationLayer for MarkerLayer {
    fn hit_test(&self, position: DomainPoint, tolerance: &DomainTolerance, _bounds: &DomainBounds) -> Option<DragTarget> {
        let candidates = self
            .markers
            .iter()
            .chain(self.pending.iter())
            .map(|m| (DragTarget::new(m.id, TargetKind::Marker), m.position));
        find_closest_target(candidates, position, tolerance)
    }

    fn create_at(&mut self, position: DomainPoint, ids: &mut IdAllocator) -> Option<DragTarget> {
        let marker = Marker { id: ids.next_id(), color: palette_color(self.colors_used), position };
        self.pending = Some(marker);
        Some(DragTarget::new(marker.id, TargetKind::Marker))
    }

    fn snapshot(&self, target: &DragTarget) -> Option<TargetPayload> {
        self.get(target.id).copied().map(TargetPayload::Marker)
    }

    fn drag_to(&mut self, target: &DragTarget, position: DomainPoint, _start: DomainPoint) {
        if let Some(m) = self.get_mut(target.id) {
            m.position = position;
        }
    }

    fn drop_at(&mut self, target: &DragTarget, position: DomainPoint) {
        self.drag_to(target, position, position);
        if self.pending.is_some_and(|p| p.id == target.id) {
            if let Some(marker) = self.pending.take() {
                self.markers.push(marker);
                self.colors_used += 1;
            }
        }
    }

    fn rollback(&mut self, state: &DragState) {
        if self.pending.is_some_and(|p| p.id == state.target.id) {
            self.pending = None;
            return;
        }
        if let Some(TargetPayload::Marker(original)) = state.original_payload {
            if let Some(m) = self.markers.iter_mut().find(|m| m.id == original.id) {
                *m = original;
            }
        }
    }

    fn nudge(&mut self, target: &DragTarget, delta: DomainPoint, bounds: &DomainBounds) -> bool {
        match self.markers.iter_mut().find(|m| m.id == target.id) {
            Some(m) => {
                m.position = offset(m.position, delta, bounds);
                true
            }
            None => false,
        }
    }

    fn remove(&mut self, target: &DragTarget) -> bool {
        let before = self.markers.len();
        self.markers.retain(|m| m.id != target.id);
        self.markers.len() != before
    }

    fn render_overlay(&self, transform: &Transform) -> Vec<OverlayItem> {
        let visible = transform.visible_rect();
        self.markers
            .iter()
            .chain(self.pending.iter())
            .filter_map(|m| {
                let at = transform.domain_to_drawing(m.position);
                visible.contains(at).then_some(OverlayItem::Marker { id: m.id, color: m.color, at })
            })
            .collect()
    }

    fn clear(&mut self) {
        self.markers.clear();
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DomainConfig, Margins};
    use crate::viewport::ViewportState;

    fn bounds() -> DomainBounds {
        DomainBounds::new(0.0, 60.0, 0.0, 100.0)
    }

    #[test]
    fn test_created_marker_commits_on_drop() {
        let mut layer = MarkerLayer::default();
        let mut ids = IdAllocator::new();
        let target = layer.create_at(DomainPoint::new(10.0, 20.0), &mut ids).unwrap();
        assert!(layer.markers().is_empty());
        layer.drag_to(&target, DomainPoint::new(11.0, 21.0), DomainPoint::new(10.0, 20.0));
        layer.drop_at(&target, DomainPoint::new(12.0, 22.0));
        assert_eq!(layer.markers().len(), 1);
        assert_eq!(layer.markers()[0].position, DomainPoint::new(12.0, 22.0));
        assert!(layer.pending().is_none());
    }

    #[test]
    fn test_rollback_discards_staged_and_restores_existing() {
        let mut layer = MarkerLayer::default();
        let mut ids = IdAllocator::new();
        let existing = layer.add(ids.next_id(), DomainPoint::new(5.0, 5.0));
        let target = DragTarget::new(existing.id, TargetKind::Marker);
        let state = DragState {
            target,
            start_position: existing.position,
            last_position: existing.position,
            original_payload: layer.snapshot(&target),
        };
        layer.drag_to(&target, DomainPoint::new(40.0, 40.0), existing.position);
        layer.rollback(&state);
        assert_eq!(layer.markers()[0].position, DomainPoint::new(5.0, 5.0));

        let staged = layer.create_at(DomainPoint::new(1.0, 1.0), &mut ids).unwrap();
        let state = DragState { target: staged, start_position: DomainPoint::new(1.0, 1.0), last_position: DomainPoint::new(1.0, 1.0), original_payload: None };
        layer.rollback(&state);
        assert!(layer.pending().is_none());
        assert_eq!(layer.markers().len(), 1);
    }

    #[test]
    fn test_hit_test_picks_closest() {
        let mut layer = MarkerLayer::default();
        let mut ids = IdAllocator::new();
        let a = layer.add(ids.next_id(), DomainPoint::new(10.0, 10.0));
        let b = layer.add(ids.next_id(), DomainPoint::new(10.0, 11.0));
        let tol = DomainTolerance::new(2.0, 2.0);
        let hit = layer.hit_test(DomainPoint::new(10.0, 10.8), &tol, &bounds());
        assert_eq!(hit.map(|t| t.id), Some(b.id));
        let hit = layer.hit_test(DomainPoint::new(10.0, 9.0), &tol, &bounds());
        assert_eq!(hit.map(|t| t.id), Some(a.id));
        assert_eq!(layer.hit_test(DomainPoint::new(30.0, 30.0), &tol, &bounds()), None);
        assert_ne!(a.color, b.color);
    }

    #[test]
    fn test_nudge_clamps_to_bounds_and_overlay_culls() {
        let mut layer = MarkerLayer::default();
        let mut ids = IdAllocator::new();
        let m = layer.add(ids.next_id(), DomainPoint::new(59.5, 99.5));
        let target = DragTarget::new(m.id, TargetKind::Marker);
        assert!(layer.nudge(&target, DomainPoint::new(1.0, 1.0), &bounds()));
        assert_eq!(layer.markers()[0].position, DomainPoint::new(60.0, 100.0));

        let d = DomainConfig::new(bounds(), 1000.0, 600.0, Margins::default()).unwrap();
        // Zoomed onto the bottom-left quarter: the top-right marker is off screen.
        let t = Transform::new(d, ViewportState::new(2.0, 2.0, 0.0, -600.0, &d));
        assert!(layer.render_overlay(&t).is_empty());
        let t = Transform::new(d, ViewportState::IDENTITY);
        assert_eq!(layer.render_overlay(&t).len(), 1);
    }
}
