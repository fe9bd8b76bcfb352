use serde::{Deserialize, Serialize};

use crate::analytics::{compute_two_point_delta, TwoPointDelta};
use crate::geometry::DomainPoint;

/// Stable handle for an annotation entity. Unique within one surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnnotationId(pub u64);

/// Hands out annotation ids for one surface instance.
#[derive(Clone, Debug, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> AnnotationId {
        self.next += 1;
        AnnotationId(self.next)
    }
}

/// Colors handed to new markers and harmonic sets, in order.
pub const PALETTE: [[u8; 3]; 8] = [
    [255, 200, 50],  // amber
    [80, 180, 130],  // green
    [100, 160, 255], // blue
    [255, 100, 100], // red
    [200, 120, 255], // violet
    [255, 165, 0],   // orange
    [0, 200, 200],   // cyan
    [230, 230, 230], // white
];

pub fn palette_color(index: usize) -> [u8; 3] {
    PALETTE[index % PALETTE.len()]
}

/// Which interaction mode is active on the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeKind {
    #[default]
    Markers,
    Harmonics,
    TwoPoint,
}

impl ModeKind {
    pub fn name(self) -> &'static str {
        match self {
            ModeKind::Markers => "markers",
            ModeKind::Harmonics => "harmonics",
            ModeKind::TwoPoint => "two_point",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Start,
    End,
}

/// What part of which annotation kind is addressed by a drag or selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Marker,
    /// `harmonic` is the line number (≥ 1) that was grabbed.
    HarmonicSet { harmonic: u32 },
    TwoPointMarker(Endpoint),
}

impl TargetKind {
    /// The mode whose layer owns entities of this kind.
    pub fn mode(self) -> ModeKind {
        match self {
            TargetKind::Marker => ModeKind::Markers,
            TargetKind::HarmonicSet { .. } => ModeKind::Harmonics,
            TargetKind::TwoPointMarker(_) => ModeKind::TwoPoint,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: AnnotationId,
    pub color: [u8; 3],
    pub position: DomainPoint,
}

/// Comb of lines at `n · spacing` Hz for every integer `n ≥ 1`, anchored at a
/// time position.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HarmonicSet {
    pub id: AnnotationId,
    pub color: [u8; 3],
    pub anchor_time: f64,
    /// Hz, always > 0.
    pub spacing: f64,
}

impl HarmonicSet {
    pub fn harmonic_frequency(&self, number: u32) -> f64 {
        number as f64 * self.spacing
    }

    /// Harmonic number whose line is closest to `freq` (never below 1).
    pub fn nearest_harmonic(&self, freq: f64) -> u32 {
        if !(self.spacing > 0.0) || !freq.is_finite() {
            return 1;
        }
        let n = (freq / self.spacing).round();
        if n < 1.0 {
            1
        } else if n >= u32::MAX as f64 {
            u32::MAX
        } else {
            n as u32
        }
    }
}

/// Two-point delta measurement. The derived delta is kept in sync by
/// [`TwoPointMeasurement::recompute`].
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct TwoPointMeasurement {
    pub start: Option<DomainPoint>,
    pub end: Option<DomainPoint>,
    delta: TwoPointDelta,
}

impl TwoPointMeasurement {
    pub fn new(start: Option<DomainPoint>, end: Option<DomainPoint>, rate_factor: f64) -> Self {
        let mut m = Self { start, end, delta: TwoPointDelta::default() };
        m.recompute(rate_factor);
        m
    }

    pub fn point(&self, endpoint: Endpoint) -> Option<DomainPoint> {
        match endpoint {
            Endpoint::Start => self.start,
            Endpoint::End => self.end,
        }
    }

    pub fn set_point(&mut self, endpoint: Endpoint, point: Option<DomainPoint>) {
        match endpoint {
            Endpoint::Start => self.start = point,
            Endpoint::End => self.end = point,
        }
    }

    pub fn recompute(&mut self, rate_factor: f64) {
        self.delta = compute_two_point_delta(self.start, self.end, rate_factor);
    }

    pub fn delta(&self) -> &TwoPointDelta {
        &self.delta
    }

    pub fn delta_time(&self) -> Option<f64> {
        self.delta.delta_time
    }

    pub fn delta_frequency(&self) -> Option<f64> {
        self.delta.delta_frequency
    }

    /// `|Δt · Δf · rate_factor|`.
    pub fn speed(&self) -> Option<f64> {
        self.delta.magnitude
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// The annotation currently targeted by keyboard fine adjustment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub kind: TargetKind,
    pub id: AnnotationId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct SelectionState {
    selected: Option<Selection>,
}

impl SelectionState {
    pub fn selected(&self) -> Option<Selection> {
        self.selected
    }

    pub fn select(&mut self, selection: Selection) -> bool {
        let changed = self.selected != Some(selection);
        self.selected = Some(selection);
        changed
    }

    pub fn clear(&mut self) -> bool {
        self.selected.take().is_some()
    }

    /// Drop the selection if it references `id`.
    pub fn clear_if(&mut self, id: AnnotationId) -> bool {
        if self.selected.is_some_and(|s| s.id == id) {
            self.selected = None;
            true
        } else {
            false
        }
    }
}
