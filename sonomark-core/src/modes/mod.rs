//! Annotation layers, one per interaction mode.
//!
//! Every layer implements the same [`AnnotationLayer`] contract; the surface
//! picks the active one with a `match` on [`ModeKind`] and drives it through
//! the shared [`DragController`](crate::drag::DragController).

pub mod harmonics;
pub mod markers;
pub mod two_point;

pub use harmonics::HarmonicLayer;
pub use markers::MarkerLayer;
pub use two_point::TwoPointLayer;

use crate::annotation::{AnnotationId, Endpoint, IdAllocator, ModeKind};
use crate::domain::DomainBounds;
use crate::drag::{DragState, DragTarget, DragTargets, TargetPayload};
use crate::geometry::{DomainPoint, DrawingPoint};
use crate::tolerance::DomainTolerance;
use crate::transform::Transform;

/// Drawing-surface primitive for the host renderer. Styling is the host's
/// business; only geometry and identity are given.
#[derive(Clone, Debug, PartialEq)]
pub enum OverlayItem {
    Marker {
        id: AnnotationId,
        color: [u8; 3],
        at: DrawingPoint,
    },
    /// Vertical comb line at `x`, from `y_top` down to the anchor at `y_bottom`.
    HarmonicLine {
        id: AnnotationId,
        color: [u8; 3],
        number: u32,
        frequency: f64,
        x: f64,
        y_top: f64,
        y_bottom: f64,
    },
    MeasurementPoint {
        endpoint: Endpoint,
        at: DrawingPoint,
    },
    MeasurementLine {
        from: DrawingPoint,
        to: DrawingPoint,
    },
}

/// Capability contract shared by all annotation layers.
pub trait AnnotationLayer {
    /// Closest draggable target under `position`, if any.
    fn hit_test(&self, position: DomainPoint, tolerance: &DomainTolerance, bounds: &DomainBounds)
        -> Option<DragTarget>;

    /// Pointer down on empty space: stage a new entity in scratch space.
    /// It becomes durable only in [`drop_at`](Self::drop_at).
    fn create_at(&mut self, position: DomainPoint, ids: &mut IdAllocator) -> Option<DragTarget>;

    fn snapshot(&self, target: &DragTarget) -> Option<TargetPayload>;

    /// Pointer move while dragging `target`.
    fn drag_to(&mut self, target: &DragTarget, position: DomainPoint, start: DomainPoint);

    /// Pointer up: final position, commits a staged entity.
    fn drop_at(&mut self, target: &DragTarget, position: DomainPoint);

    /// Undo a cancelled drag: discard a staged entity or restore the
    /// pre-drag payload.
    fn rollback(&mut self, state: &DragState);

    /// Keyboard fine adjustment by a domain-space delta.
    fn nudge(&mut self, target: &DragTarget, delta: DomainPoint, bounds: &DomainBounds) -> bool;

    fn remove(&mut self, target: &DragTarget) -> bool;

    fn render_overlay(&self, transform: &Transform) -> Vec<OverlayItem>;

    fn clear(&mut self);
}

/// All annotation layers of one surface.
#[derive(Clone, Debug)]
pub struct Layers {
    pub markers: MarkerLayer,
    pub harmonics: HarmonicLayer,
    pub two_point: TwoPointLayer,
}

impl Layers {
    pub fn new(ids: &mut IdAllocator, rate_factor: f64, min_harmonic_spacing: f64) -> Self {
        Self {
            markers: MarkerLayer::default(),
            harmonics: HarmonicLayer::new(min_harmonic_spacing),
            two_point: TwoPointLayer::new(ids.next_id(), rate_factor),
        }
    }

    pub fn get(&self, mode: ModeKind) -> &dyn AnnotationLayer {
        match mode {
            ModeKind::Markers => &self.markers,
            ModeKind::Harmonics => &self.harmonics,
            ModeKind::TwoPoint => &self.two_point,
        }
    }

    pub fn get_mut(&mut self, mode: ModeKind) -> &mut dyn AnnotationLayer {
        match mode {
            ModeKind::Markers => &mut self.markers,
            ModeKind::Harmonics => &mut self.harmonics,
            ModeKind::TwoPoint => &mut self.two_point,
        }
    }

    /// Overlays of every layer, markers first.
    pub fn render_overlay(&self, transform: &Transform) -> Vec<OverlayItem> {
        let mut items = self.markers.render_overlay(transform);
        items.extend(self.harmonics.render_overlay(transform));
        items.extend(self.two_point.render_overlay(transform));
        items
    }

    pub fn clear(&mut self) {
        self.markers.clear();
        self.harmonics.clear();
        self.two_point.clear();
    }
}

/// Binds a layer to the tolerance and bounds of the current event so the drag
/// controller can use it.
pub struct LayerTargets<'a> {
    pub layer: &'a mut dyn AnnotationLayer,
    pub tolerance: DomainTolerance,
    pub bounds: DomainBounds,
}

impl DragTargets for LayerTargets<'_> {
    fn find_target_at(&self, position: DomainPoint) -> Option<DragTarget> {
        self.layer.hit_test(position, &self.tolerance, &self.bounds)
    }

    fn snapshot(&self, target: &DragTarget) -> Option<TargetPayload> {
        self.layer.snapshot(target)
    }

    fn on_drag_start(&mut self, _target: &DragTarget, _position: DomainPoint) {}

    fn on_drag_update(&mut self, target: &DragTarget, position: DomainPoint, start: DomainPoint) {
        self.layer.drag_to(target, position, start);
    }

    fn on_drag_end(&mut self, target: &DragTarget, position: DomainPoint) {
        self.layer.drop_at(target, position);
    }
}

pub(crate) fn offset(p: DomainPoint, delta: DomainPoint, bounds: &DomainBounds) -> DomainPoint {
    bounds.clamp(DomainPoint::new(p.time + delta.time, p.freq + delta.freq))
}
