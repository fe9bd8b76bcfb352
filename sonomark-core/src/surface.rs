//! One analysis surface: an image, its viewport, annotation layers and the
//! single active drag, driven by host input events.
//!
//! Each surface owns all of its state, so any number of them can live on one
//! page. Within one event the order is always: mutate, recompute derived
//! values, [`HostHooks::request_render`], then [`HostHooks::notify`].

use crate::annotation::{
    HarmonicSet, IdAllocator, Marker, ModeKind, Selection, SelectionState, TwoPointMeasurement,
};
use crate::config::SurfaceConfig;
use crate::domain::{DomainBounds, DomainConfig};
use crate::drag::{DragController, DragTarget};
use crate::error::ConfigError;
use crate::geometry::{DomainPoint, ScreenPoint, SurfaceGeometry};
use crate::hooks::{CursorHint, HostHooks, SurfaceEvent};
use crate::input::{Key, KeyInput, PointerInput, PointerKind, WheelInput};
use crate::modes::{Layers, LayerTargets, OverlayItem};
use crate::tolerance::{DomainTolerance, ToleranceCalculator};
use crate::transform::{screen_to_drawing, Transform};
use crate::viewport::{ViewportController, ViewportState};

/// Arrow keys move this many steps at once with Shift held.
const COARSE_STEPS: f64 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Gesture {
    Idle,
    Panning { last: ScreenPoint },
}

#[derive(Clone, Debug)]
pub struct AnalysisSurface {
    config: SurfaceConfig,
    viewport: ViewportController,
    drag: DragController,
    tolerance: ToleranceCalculator,
    layers: Layers,
    mode: ModeKind,
    selection: SelectionState,
    ids: IdAllocator,
    gesture: Gesture,
}

impl AnalysisSurface {
    /// Validates `config` and binds it to an image of the given natural size.
    pub fn new(config: SurfaceConfig, image_width: f64, image_height: f64) -> Result<Self, ConfigError> {
        config.validate()?;
        let domain = config.domain_for_image(image_width, image_height)?;
        let viewport = ViewportController::new(domain, config.zoom).with_history_limit(config.history_limit);
        let mut ids = IdAllocator::new();
        let layers = Layers::new(&mut ids, config.rate_factor, config.min_harmonic_spacing());
        Ok(Self {
            tolerance: ToleranceCalculator::new(config.tolerance),
            config,
            viewport,
            drag: DragController::new(),
            layers,
            mode: ModeKind::default(),
            selection: SelectionState::default(),
            ids,
            gesture: Gesture::Idle,
        })
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    pub fn domain(&self) -> &DomainConfig {
        self.viewport.domain()
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn viewport_state(&self) -> &ViewportState {
        self.viewport.state()
    }

    pub fn transform(&self) -> Transform {
        Transform::new(*self.viewport.domain(), *self.viewport.state())
    }

    pub fn mode(&self) -> ModeKind {
        self.mode
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection.selected()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn layers(&self) -> &Layers {
        &self.layers
    }

    pub fn markers(&self) -> &[Marker] {
        self.layers.markers.markers()
    }

    pub fn harmonic_sets(&self) -> &[HarmonicSet] {
        self.layers.harmonics.sets()
    }

    /// The measurement as currently shown, including an edit in progress.
    pub fn measurement(&self) -> &TwoPointMeasurement {
        self.layers.two_point.working()
    }

    /// Hit tolerance of the active mode at the current zoom.
    pub fn tolerance(&self) -> DomainTolerance {
        self.tolerance.get_tolerance(self.mode, self.viewport.domain(), self.viewport.state())
    }

    pub fn overlay(&self) -> Vec<OverlayItem> {
        self.layers.render_overlay(&self.transform())
    }

    // ── Lifecycle ───────────────────────────────────────────────────────────

    /// Replace the image. Annotations, selection and the viewport start over.
    pub fn load_image(
        &mut self,
        image_width: f64,
        image_height: f64,
        hooks: &mut impl HostHooks,
    ) -> Result<(), ConfigError> {
        let domain = self.config.domain_for_image(image_width, image_height)?;
        self.drag.cancel_drag(hooks);
        self.gesture = Gesture::Idle;
        self.layers.clear();
        self.selection.clear();
        self.viewport.load_image(domain);
        hooks.request_render();
        hooks.notify(&SurfaceEvent::ImageLoaded);
        Ok(())
    }

    /// Switch the active mode. An active drag is cancelled and rolled back
    /// first.
    pub fn set_mode(&mut self, mode: ModeKind, hooks: &mut impl HostHooks) -> bool {
        if mode == self.mode {
            return false;
        }
        self.cancel_drag(hooks);
        self.mode = mode;
        let cleared = self.selection.clear();
        hooks.request_render();
        hooks.notify(&SurfaceEvent::ModeChanged(mode));
        if cleared {
            hooks.notify(&SurfaceEvent::SelectionChanged(None));
        }
        true
    }

    /// Abort the active drag and undo what it changed, including a
    /// not-yet-committed creation.
    pub fn cancel_drag(&mut self, hooks: &mut impl HostHooks) -> bool {
        let Some(state) = self.drag.cancel_drag(hooks) else {
            return false;
        };
        let mode = state.target.kind.mode();
        self.layers.get_mut(mode).rollback(&state);
        hooks.request_render();
        self.notify_annotations(mode, hooks);
        true
    }

    /// Run a viewport command (zoom in/out, reset, history, …) and report
    /// the change.
    pub fn with_viewport(
        &mut self,
        hooks: &mut impl HostHooks,
        command: impl FnOnce(&mut ViewportController) -> bool,
    ) -> bool {
        let changed = command(&mut self.viewport);
        if changed {
            self.viewport_changed(hooks);
        }
        changed
    }

    // ── Input ───────────────────────────────────────────────────────────────

    /// Only the primary pointer annotates. A second finger going down turns
    /// the gesture into a host pinch, so an active drag is rolled back.
    pub fn handle_pointer(&mut self, input: PointerInput, geometry: &SurfaceGeometry, hooks: &mut impl HostHooks) {
        if !input.is_primary {
            if input.kind == PointerKind::Down {
                self.gesture = Gesture::Idle;
                self.cancel_drag(hooks);
            }
            return;
        }
        match input.kind {
            PointerKind::Down => self.pointer_down(input, geometry, hooks),
            PointerKind::Move => self.pointer_move(input, geometry, hooks),
            PointerKind::Up => self.pointer_up(input, geometry, hooks),
            PointerKind::Leave => self.pointer_leave(hooks),
        }
    }

    /// Ctrl/Meta + wheel zooms about the pointer; a plain wheel pans
    /// vertically. Returns whether the view changed.
    pub fn handle_wheel(&mut self, input: WheelInput, geometry: &SurfaceGeometry, hooks: &mut impl HostHooks) -> bool {
        if input.delta_y == 0.0 || !input.delta_y.is_finite() {
            return false;
        }
        let changed = if input.zoom {
            let step = self.viewport.limits().wheel_step;
            let factor = if input.delta_y < 0.0 { step } else { 1.0 / step };
            let anchor = screen_to_drawing(input.screen, geometry.rect, geometry.logical);
            self.viewport.zoom_at(factor, anchor)
        } else {
            self.viewport.pan(0.0, -input.delta_y, geometry)
        };
        if changed {
            self.viewport_changed(hooks);
        }
        changed
    }

    /// Returns whether the key was consumed.
    pub fn handle_key(&mut self, input: KeyInput, hooks: &mut impl HostHooks) -> bool {
        match input.key {
            Key::Escape => {
                let panning = matches!(self.gesture, Gesture::Panning { .. });
                self.gesture = Gesture::Idle;
                self.cancel_drag(hooks) || panning
            }
            Key::Delete => self.delete_selected(hooks),
            Key::ArrowLeft | Key::ArrowRight | Key::ArrowUp | Key::ArrowDown => self.nudge_selected(input, hooks),
        }
    }

    // ── Pointer handling ────────────────────────────────────────────────────

    fn pointer_down(&mut self, input: PointerInput, geometry: &SurfaceGeometry, hooks: &mut impl HostHooks) {
        if self.drag.is_dragging() {
            return;
        }
        if input.pan_held() && !input.primary_held() {
            self.gesture = Gesture::Panning { last: input.screen };
            hooks.set_cursor(CursorHint::Grabbing);
            return;
        }
        if !input.primary_held() {
            return;
        }
        let Some(position) = self.transform().screen_to_domain_checked(input.screen, geometry) else {
            return;
        };

        let tolerance = self.tolerance();
        let bounds = *self.viewport.domain().bounds();
        let mut targets = LayerTargets { layer: self.layers.get_mut(self.mode), tolerance, bounds };
        if self.drag.start_drag(position, &mut targets, hooks) {
            let changed = match self.drag.target() {
                Some(target) => self.selection.select(Selection { kind: target.kind, id: target.id }),
                None => false,
            };
            hooks.request_render();
            if changed {
                hooks.notify(&SurfaceEvent::SelectionChanged(self.selection.selected()));
            }
            return;
        }

        let Some(target) = targets.layer.create_at(position, &mut self.ids) else {
            return;
        };
        if self.drag.start_drag_on(target, position, &mut targets, hooks) {
            hooks.request_render();
            if self.mode == ModeKind::TwoPoint {
                hooks.notify(&SurfaceEvent::MeasurementChanged(*self.layers.two_point.working().delta()));
            }
        }
    }

    fn pointer_move(&mut self, input: PointerInput, geometry: &SurfaceGeometry, hooks: &mut impl HostHooks) {
        if let Gesture::Panning { last } = self.gesture {
            if !input.pan_held() {
                self.gesture = Gesture::Idle;
                hooks.set_cursor(CursorHint::Default);
                return;
            }
            self.gesture = Gesture::Panning { last: input.screen };
            if self.viewport.pan(input.screen.x - last.x, input.screen.y - last.y, geometry) {
                self.viewport_changed(hooks);
            }
            return;
        }

        let transform = self.transform();
        if self.drag.is_dragging() {
            let position = transform.screen_to_domain(input.screen, geometry);
            if !input.primary_held() {
                // Button released outside the window.
                self.finish_drag(position, hooks);
                return;
            }
            let tolerance = self.tolerance();
            let bounds = *self.viewport.domain().bounds();
            let mut targets = LayerTargets { layer: self.layers.get_mut(self.mode), tolerance, bounds };
            if self.drag.handle_move(position, &mut targets) {
                hooks.request_render();
                if self.mode == ModeKind::TwoPoint {
                    hooks.notify(&SurfaceEvent::MeasurementChanged(*self.layers.two_point.working().delta()));
                }
            }
            return;
        }

        match transform.screen_to_domain_checked(input.screen, geometry) {
            Some(position) => {
                let tolerance = self.tolerance();
                let bounds = *self.viewport.domain().bounds();
                let targets = LayerTargets { layer: self.layers.get_mut(self.mode), tolerance, bounds };
                self.drag.update_cursor_for_hover(position, &targets, hooks);
            }
            None => hooks.set_cursor(CursorHint::Default),
        }
    }

    fn pointer_up(&mut self, input: PointerInput, geometry: &SurfaceGeometry, hooks: &mut impl HostHooks) {
        if matches!(self.gesture, Gesture::Panning { .. }) {
            self.gesture = Gesture::Idle;
            hooks.set_cursor(CursorHint::Default);
            return;
        }
        if self.drag.is_dragging() {
            let position = self.transform().screen_to_domain(input.screen, geometry);
            self.finish_drag(position, hooks);
        }
    }

    /// Leaving the surface commits an active drag where the pointer was last
    /// seen over it.
    fn pointer_leave(&mut self, hooks: &mut impl HostHooks) {
        self.gesture = Gesture::Idle;
        match self.drag.state().map(|s| s.last_position) {
            Some(last) => self.finish_drag(last, hooks),
            None => hooks.set_cursor(CursorHint::Default),
        }
    }

    fn finish_drag(&mut self, position: DomainPoint, hooks: &mut impl HostHooks) {
        let tolerance = self.tolerance();
        let bounds = *self.viewport.domain().bounds();
        let mut targets = LayerTargets { layer: self.layers.get_mut(self.mode), tolerance, bounds };
        let Some(released) = self.drag.end_drag(position, &mut targets, hooks) else {
            return;
        };
        let selection_changed = self.selection.select(Selection { kind: released.kind, id: released.id });
        hooks.request_render();
        self.notify_annotations(released.kind.mode(), hooks);
        if selection_changed {
            hooks.notify(&SurfaceEvent::SelectionChanged(self.selection.selected()));
        }
    }

    // ── Keyboard handling ───────────────────────────────────────────────────

    fn delete_selected(&mut self, hooks: &mut impl HostHooks) -> bool {
        if self.drag.is_dragging() {
            return false;
        }
        let Some(selected) = self.selection.selected() else {
            return false;
        };
        let mode = selected.kind.mode();
        if !self.layers.get_mut(mode).remove(&DragTarget::new(selected.id, selected.kind)) {
            return false;
        }
        self.selection.clear_if(selected.id);
        hooks.request_render();
        self.notify_annotations(mode, hooks);
        hooks.notify(&SurfaceEvent::SelectionChanged(None));
        true
    }

    /// Arrow keys move the selection by `keyboard_step_px` image pixels as
    /// currently drawn: left/right along frequency, up/down along time.
    fn nudge_selected(&mut self, input: KeyInput, hooks: &mut impl HostHooks) -> bool {
        if self.drag.is_dragging() {
            return false;
        }
        let Some(selected) = self.selection.selected() else {
            return false;
        };
        let steps = if input.coarse { COARSE_STEPS } else { 1.0 } * self.config.keyboard_step_px;
        let (time_per_px, freq_per_px) = self.transform().domain_per_pixel();
        let delta = match input.key {
            Key::ArrowLeft => DomainPoint::new(0.0, -steps * freq_per_px),
            Key::ArrowRight => DomainPoint::new(0.0, steps * freq_per_px),
            Key::ArrowUp => DomainPoint::new(steps * time_per_px, 0.0),
            Key::ArrowDown => DomainPoint::new(-steps * time_per_px, 0.0),
            Key::Delete | Key::Escape => return false,
        };
        let mode = selected.kind.mode();
        let bounds: DomainBounds = *self.viewport.domain().bounds();
        if !self.layers.get_mut(mode).nudge(&DragTarget::new(selected.id, selected.kind), delta, &bounds) {
            return false;
        }
        hooks.request_render();
        self.notify_annotations(mode, hooks);
        true
    }

    // ── Notifications ───────────────────────────────────────────────────────

    fn viewport_changed(&self, hooks: &mut impl HostHooks) {
        hooks.request_render();
        hooks.notify(&SurfaceEvent::ViewportChanged(*self.viewport.state()));
    }

    fn notify_annotations(&self, mode: ModeKind, hooks: &mut impl HostHooks) {
        hooks.notify(&SurfaceEvent::AnnotationsChanged(mode));
        if mode == ModeKind::TwoPoint {
            hooks.notify(&SurfaceEvent::MeasurementChanged(*self.layers.two_point.working().delta()));
        }
    }
}
