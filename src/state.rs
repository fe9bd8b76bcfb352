use leptos::prelude::*;
use sonomark_core::{
    AnalysisSurface, CursorHint, HookLog, HostHooks, ModeKind, SurfaceConfig, SurfaceEvent, TwoPointDelta,
};

/// Reactive wrapper around one [`AnalysisSurface`]. Provided as context by
/// `AnalysisCanvas`.
#[derive(Clone, Copy)]
pub struct SurfaceState {
    pub config: RwSignal<SurfaceConfig>,
    /// `None` until the image has loaded and its natural size is known.
    pub surface: RwSignal<Option<AnalysisSurface>>,
    /// Bumped whenever the surface asks for a re-render.
    pub revision: RwSignal<u64>,
    pub cursor: RwSignal<CursorHint>,
    pub mode: RwSignal<ModeKind>,
    pub measurement: RwSignal<TwoPointDelta>,
    pub error: RwSignal<Option<String>>,
}

impl SurfaceState {
    pub fn new(config: SurfaceConfig) -> Self {
        Self {
            config: RwSignal::new(config),
            surface: RwSignal::new(None),
            revision: RwSignal::new(0),
            cursor: RwSignal::new(CursorHint::Default),
            mode: RwSignal::new(ModeKind::default()),
            measurement: RwSignal::new(TwoPointDelta::default()),
            error: RwSignal::new(None),
        }
    }

    /// Bind the surface to a freshly loaded image, creating it on first load.
    pub fn load_image(&self, width: f64, height: f64) {
        let mut hooks = HookLog::default();
        let mut failure = None;
        let config = self.config.get_untracked();
        self.surface.update_untracked(|slot| match slot {
            Some(surface) => {
                if let Err(e) = surface.load_image(width, height, &mut hooks) {
                    failure = Some(e);
                }
            }
            None => match AnalysisSurface::new(config, width, height) {
                Ok(surface) => {
                    *slot = Some(surface);
                    hooks.request_render();
                    hooks.notify(&SurfaceEvent::ImageLoaded);
                }
                Err(e) => failure = Some(e),
            },
        });
        match failure {
            Some(e) => {
                log::warn!("cannot show {width}x{height} image: {e}");
                self.error.set(Some(e.to_string()));
            }
            None => self.error.set(None),
        }
        self.drain(hooks);
    }

    /// Run `f` against the surface, then apply what it asked of the host.
    /// Returns `None` before an image is loaded.
    pub fn dispatch<R>(&self, f: impl FnOnce(&mut AnalysisSurface, &mut HookLog) -> R) -> Option<R> {
        let mut hooks = HookLog::default();
        let mut out = None;
        self.surface.update_untracked(|slot| {
            if let Some(surface) = slot.as_mut() {
                out = Some(f(surface, &mut hooks));
            }
        });
        self.drain(hooks);
        out
    }

    pub fn with_surface<R>(&self, f: impl FnOnce(&AnalysisSurface) -> R) -> Option<R> {
        self.surface.with_untracked(|slot| slot.as_ref().map(f))
    }

    fn drain(&self, mut hooks: HookLog) {
        if let Some(cursor) = hooks.cursor {
            if self.cursor.get_untracked() != cursor {
                self.cursor.set(cursor);
            }
        }
        let rendered = hooks.take_render();
        if rendered {
            self.revision.update(|r| *r += 1);
        }
        for event in hooks.take_events() {
            match event {
                SurfaceEvent::ModeChanged(mode) => self.mode.set(mode),
                SurfaceEvent::MeasurementChanged(delta) => self.measurement.set(delta),
                SurfaceEvent::ImageLoaded => self.measurement.set(TwoPointDelta::default()),
                SurfaceEvent::ViewportChanged(_) => {}
                other => log::debug!("surface event {other:?}"),
            }
        }
    }
}
