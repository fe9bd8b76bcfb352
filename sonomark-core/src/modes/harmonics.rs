use crate::analytics::generate_harmonic_series;
use crate::annotation::{palette_color, AnnotationId, HarmonicSet, IdAllocator, TargetKind};
use crate::domain::DomainBounds;
use crate::drag::{DragState, DragTarget, TargetPayload};
use crate::geometry::DomainPoint;
use crate::modes::{AnnotationLayer, OverlayItem};
use crate::tolerance::{find_closest_target, DomainTolerance};
use crate::transform::Transform;

/// Harmonic combs. Each set draws vertical lines at `n · spacing` Hz running
/// from its anchor time up to the top of the image.
///
/// Grabbing harmonic `n` and dragging to frequency `f` sets the spacing to
/// `f / n`, so the grabbed line follows the pointer while the rest of the comb
/// rescales around it. Spacing never drops below `min_spacing`, which keeps
/// the number of lines per comb bounded.
#[derive(Clone, Debug, Default)]
pub struct HarmonicLayer {
    sets: Vec<HarmonicSet>,
    pending: Option<HarmonicSet>,
    colors_used: usize,
    min_spacing: f64,
}

impl HarmonicLayer {
    pub fn new(min_spacing: f64) -> Self {
        Self { min_spacing: min_spacing.max(0.0), ..Self::default() }
    }

    pub fn min_spacing(&self) -> f64 {
        self.min_spacing
    }

    /// `None` for non-positive or non-finite spacing, otherwise raised to the
    /// floor.
    fn floored(&self, spacing: f64) -> Option<f64> {
        (spacing.is_finite() && spacing > 0.0).then(|| spacing.max(self.min_spacing))
    }

    pub fn sets(&self) -> &[HarmonicSet] {
        &self.sets
    }

    pub fn pending(&self) -> Option<&HarmonicSet> {
        self.pending.as_ref()
    }

    pub fn get(&self, id: AnnotationId) -> Option<&HarmonicSet> {
        self.sets.iter().chain(self.pending.iter()).find(|s| s.id == id)
    }

    fn get_mut(&mut self, id: AnnotationId) -> Option<&mut HarmonicSet> {
        self.sets.iter_mut().chain(self.pending.iter_mut()).find(|s| s.id == id)
    }

    /// Add a committed set directly. Non-positive spacing is refused.
    pub fn add(&mut self, id: AnnotationId, anchor_time: f64, spacing: f64) -> Option<HarmonicSet> {
        let spacing = self.floored(spacing)?;
        let set = HarmonicSet { id, color: palette_color(self.colors_used), anchor_time, spacing };
        self.colors_used += 1;
        self.sets.push(set);
        Some(set)
    }
}

fn harmonic_number(target: &DragTarget) -> u32 {
    match target.kind {
        TargetKind::HarmonicSet { harmonic } => harmonic.max(1),
        _ => 1,
    }
}

impl AnnotationLayer for HarmonicLayer {
    /// Each line is a segment from the anchor time upward, so the pointer is
    /// compared against its projection onto the nearest line of every set.
    fn hit_test(&self, position: DomainPoint, tolerance: &DomainTolerance, bounds: &DomainBounds) -> Option<DragTarget> {
        let candidates = self
            .sets
            .iter()
            .chain(self.pending.iter())
            .filter(|s| s.spacing > 0.0)
            .filter_map(|s| {
                let n = s.nearest_harmonic(position.freq);
                let freq = s.harmonic_frequency(n);
                if freq < bounds.freq_min || freq > bounds.freq_max {
                    return None;
                }
                let time = position.time.max(s.anchor_time).min(bounds.time_max);
                Some((DragTarget::new(s.id, TargetKind::HarmonicSet { harmonic: n }), DomainPoint::new(time, freq)))
            });
        find_closest_target(candidates, position, tolerance)
    }

    fn create_at(&mut self, position: DomainPoint, ids: &mut IdAllocator) -> Option<DragTarget> {
        let Some(spacing) = self.floored(position.freq) else {
            log::debug!("no harmonic set at {:.1} Hz", position.freq);
            return None;
        };
        let set = HarmonicSet {
            id: ids.next_id(),
            color: palette_color(self.colors_used),
            anchor_time: position.time,
            spacing,
        };
        self.pending = Some(set);
        Some(DragTarget::new(set.id, TargetKind::HarmonicSet { harmonic: 1 }))
    }

    fn snapshot(&self, target: &DragTarget) -> Option<TargetPayload> {
        self.get(target.id).copied().map(TargetPayload::HarmonicSet)
    }

    fn drag_to(&mut self, target: &DragTarget, position: DomainPoint, _start: DomainPoint) {
        let spacing = self.floored(position.freq / harmonic_number(target) as f64);
        if let Some(set) = self.get_mut(target.id) {
            set.anchor_time = position.time;
            if let Some(spacing) = spacing {
                set.spacing = spacing;
            }
        }
    }

    fn drop_at(&mut self, target: &DragTarget, position: DomainPoint) {
        self.drag_to(target, position, position);
        if self.pending.is_some_and(|p| p.id == target.id) {
            if let Some(set) = self.pending.take() {
                self.sets.push(set);
                self.colors_used += 1;
            }
        }
    }

    fn rollback(&mut self, state: &DragState) {
        if self.pending.is_some_and(|p| p.id == state.target.id) {
            self.pending = None;
            return;
        }
        if let Some(TargetPayload::HarmonicSet(original)) = state.original_payload {
            if let Some(set) = self.sets.iter_mut().find(|s| s.id == original.id) {
                *set = original;
            }
        }
    }

    /// Time moves the anchor; frequency moves the addressed harmonic line,
    /// rescaling the spacing.
    fn nudge(&mut self, target: &DragTarget, delta: DomainPoint, bounds: &DomainBounds) -> bool {
        let n = harmonic_number(target) as f64;
        let min_spacing = self.min_spacing;
        let Some(set) = self.sets.iter_mut().find(|s| s.id == target.id) else {
            return false;
        };
        let spacing = set.spacing + delta.freq / n;
        if spacing > 0.0 && spacing * n <= bounds.freq_max {
            set.spacing = spacing.max(min_spacing);
        }
        set.anchor_time = (set.anchor_time + delta.time).max(bounds.time_min).min(bounds.time_max);
        true
    }

    fn remove(&mut self, target: &DragTarget) -> bool {
        let before = self.sets.len();
        self.sets.retain(|s| s.id != target.id);
        self.sets.len() != before
    }

    /// At most one line per visible drawing column per set.
    fn render_overlay(&self, transform: &Transform) -> Vec<OverlayItem> {
        let visible = transform.visible_rect();
        let bounds = *transform.domain().bounds();
        let max_lines = visible.width.max(1.0).ceil() as usize;
        let mut items = Vec::new();
        for set in self.sets.iter().chain(self.pending.iter()) {
            let anchor_y = transform.domain_to_drawing(DomainPoint::new(set.anchor_time, bounds.freq_min)).y;
            if anchor_y < visible.y {
                continue;
            }
            let y_bottom = anchor_y.min(visible.bottom());
            let lines = generate_harmonic_series(set.spacing, bounds, visible.right(), transform)
                .filter(|h| h.drawing_x >= visible.x)
                .take(max_lines);
            for h in lines {
                items.push(OverlayItem::HarmonicLine {
                    id: set.id,
                    color: set.color,
                    number: h.number,
                    frequency: h.frequency,
                    x: h.drawing_x,
                    y_top: visible.y,
                    y_bottom,
                });
            }
        }
        items
    }

    fn clear(&mut self) {
        self.sets.clear();
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

    fn layer_with_set() -> (HarmonicLayer, HarmonicSet) {
        let mut layer = HarmonicLayer::default();
        let set = layer.add(AnnotationId(1), 20.0, 10.0).unwrap();
        (layer, set)
    }

    #[test]
    fn test_hit_test_projects_onto_line_segment() {
        let (layer, set) = layer_with_set();
        let tol = DomainTolerance::new(2.0, 2.0);
        let hit = layer.hit_test(DomainPoint::new(30.0, 31.0), &tol, &bounds());
        assert_eq!(hit, Some(DragTarget::new(set.id, TargetKind::HarmonicSet { harmonic: 3 })));
        // Below the anchor: 10 s away from the segment start.
        assert_eq!(layer.hit_test(DomainPoint::new(10.0, 30.0), &tol, &bounds()), None);
        // Between lines.
        assert_eq!(layer.hit_test(DomainPoint::new(30.0, 35.0), &tol, &bounds()), None);
    }

    #[test]
    fn test_dragging_harmonic_rescales_spacing() {
        let (mut layer, set) = layer_with_set();
        let target = DragTarget::new(set.id, TargetKind::HarmonicSet { harmonic: 3 });
        layer.drag_to(&target, DomainPoint::new(25.0, 45.0), DomainPoint::new(20.0, 30.0));
        let moved = layer.sets()[0];
        assert_eq!(moved.spacing, 15.0);
        assert_eq!(moved.anchor_time, 25.0);

        // Non-positive frequency keeps the spacing.
        layer.drag_to(&target, DomainPoint::new(26.0, 0.0), DomainPoint::new(20.0, 30.0));
        assert_eq!(layer.sets()[0].spacing, 15.0);
        assert_eq!(layer.sets()[0].anchor_time, 26.0);
    }

    #[test]
    fn test_creation_is_staged_until_drop() {
        let mut layer = HarmonicLayer::default();
        let mut ids = IdAllocator::new();
        assert!(layer.create_at(DomainPoint::new(5.0, 0.0), &mut ids).is_none());

        let target = layer.create_at(DomainPoint::new(5.0, 12.0), &mut ids).unwrap();
        assert!(layer.sets().is_empty());
        assert_eq!(layer.pending().map(|s| s.spacing), Some(12.0));
        let state = DragState {
            target,
            start_position: DomainPoint::new(5.0, 12.0),
            last_position: DomainPoint::new(5.0, 12.0),
            original_payload: layer.snapshot(&target),
        };
        layer.rollback(&state);
        assert!(layer.pending().is_none());

        let target = layer.create_at(DomainPoint::new(5.0, 12.0), &mut ids).unwrap();
        layer.drop_at(&target, DomainPoint::new(6.0, 14.0));
        assert_eq!(layer.sets().len(), 1);
        assert_eq!(layer.sets()[0].spacing, 14.0);
    }

    #[test]
    fn test_nudge_keeps_spacing_positive() {
        let (mut layer, set) = layer_with_set();
        let target = DragTarget::new(set.id, TargetKind::HarmonicSet { harmonic: 2 });
        assert!(layer.nudge(&target, DomainPoint::new(1.0, 2.0), &bounds()));
        assert_eq!(layer.sets()[0].spacing, 11.0);
        assert_eq!(layer.sets()[0].anchor_time, 21.0);
        layer.nudge(&target, DomainPoint::new(0.0, -50.0), &bounds());
        assert_eq!(layer.sets()[0].spacing, 11.0);
    }

    #[test]
    fn test_overlay_lines_run_from_top_to_anchor() {
        let (layer, _) = layer_with_set();
        let d = DomainConfig::new(bounds(), 1000.0, 600.0, Margins::default()).unwrap();
        let t = Transform::new(d, ViewportState::IDENTITY);
        let items = layer.render_overlay(&t);
        // 10, 20, …, 100 Hz.
        assert_eq!(items.len(), 10);
        match &items[0] {
            OverlayItem::HarmonicLine { number, x, y_top, y_bottom, .. } => {
                assert_eq!(*number, 1);
                assert!((x - 100.0).abs() < 1e-9);
                assert_eq!(*y_top, 0.0);
                // 20 s of 60 s is 400 px from the top of a 600 px image.
                assert!((y_bottom - 400.0).abs() < 1e-9);
            }
            other => panic!("unexpected overlay {other:?}"),
        }
    }

    #[test]
    fn test_dragging_toward_zero_stops_at_spacing_floor() {
        let mut layer = HarmonicLayer::new(0.5);
        let set = layer.add(AnnotationId(1), 20.0, 10.0).unwrap();
        let first = DragTarget::new(set.id, TargetKind::HarmonicSet { harmonic: 1 });
        layer.drag_to(&first, DomainPoint::new(20.0, 0.1), DomainPoint::new(20.0, 10.0));
        assert_eq!(layer.sets()[0].spacing, 0.5);

        // A high harmonic would otherwise divide the spacing again.
        let high = DragTarget::new(set.id, TargetKind::HarmonicSet { harmonic: 180 });
        layer.drag_to(&high, DomainPoint::new(20.0, 0.1), DomainPoint::new(20.0, 90.0));
        assert_eq!(layer.sets()[0].spacing, 0.5);

        layer.nudge(&first, DomainPoint::new(0.0, -0.4), &bounds());
        assert_eq!(layer.sets()[0].spacing, 0.5);
        assert_eq!(layer.add(AnnotationId(2), 20.0, 0.001).map(|s| s.spacing), Some(0.5));
    }

    #[test]
    fn test_overlay_has_at_most_one_line_per_column() {
        let mut layer = HarmonicLayer::default();
        layer.add(AnnotationId(1), 0.0, 0.01).unwrap();
        let d = DomainConfig::new(bounds(), 1000.0, 600.0, Margins::default()).unwrap();
        let t = Transform::new(d, ViewportState::IDENTITY);
        assert_eq!(layer.render_overlay(&t).len(), 1000);
    }
}
