//! DOM event translation. Everything browser-specific about input ends here;
//! the core only sees [`PointerInput`], [`WheelInput`] and [`KeyInput`].

use sonomark_core::{
    Key, KeyInput, LogicalSize, PointerInput, PointerKind, ScreenPoint, SurfaceGeometry, SurfaceRect, WheelInput,
};
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, KeyboardEvent, MouseEvent, PointerEvent, WheelEvent};

/// `WheelEvent.deltaMode` values.
const DOM_DELTA_LINE: u32 = 1;
const DOM_DELTA_PAGE: u32 = 2;

const LINE_HEIGHT_PX: f64 = 16.0;
const PAGE_HEIGHT_PX: f64 = 800.0;

/// Pointer and mouse events (`PointerEvent` derefs to `MouseEvent`). `None`
/// for event types the surface does not handle. Plain mouse events count as
/// the primary pointer.
pub fn pointer_input(ev: &MouseEvent) -> Option<PointerInput> {
    let kind = PointerKind::from_event_type(&ev.type_())?;
    let is_primary = ev.dyn_ref::<PointerEvent>().map_or(true, |p| p.is_primary());
    let input = PointerInput::new(
        kind,
        ScreenPoint::new(ev.client_x() as f64, ev.client_y() as f64),
        ev.buttons(),
    );
    Some(input.with_primary(is_primary))
}

pub fn wheel_input(ev: &WheelEvent) -> WheelInput {
    WheelInput {
        screen: ScreenPoint::new(ev.client_x() as f64, ev.client_y() as f64),
        delta_y: wheel_delta_px(ev.delta_y(), ev.delta_mode()),
        zoom: ev.ctrl_key() || ev.meta_key(),
    }
}

/// Normalize a wheel delta to pixels.
pub fn wheel_delta_px(delta: f64, delta_mode: u32) -> f64 {
    match delta_mode {
        DOM_DELTA_LINE => delta * LINE_HEIGHT_PX,
        DOM_DELTA_PAGE => delta * PAGE_HEIGHT_PX,
        _ => delta,
    }
}

pub fn key_input(ev: &KeyboardEvent) -> Option<KeyInput> {
    Some(KeyInput { key: Key::from_key_name(&ev.key())?, coarse: ev.shift_key() })
}

/// On-screen box of the drawing surface, in the same client coordinates as
/// pointer events.
pub fn surface_rect(element: &Element) -> SurfaceRect {
    let r = element.get_bounding_client_rect();
    SurfaceRect::new(r.left(), r.top(), r.width(), r.height())
}

pub fn surface_geometry(element: &Element, logical: LogicalSize) -> SurfaceGeometry {
    SurfaceGeometry::new(surface_rect(element), logical)
}

/// The element the listener is attached to.
pub fn event_element(ev: &Event) -> Option<Element> {
    ev.current_target()?.dyn_into::<Element>().ok()
}
