//! Host-neutral input events. The web host translates DOM events into these.

use crate::geometry::ScreenPoint;

/// `MouseEvent.buttons` bits.
pub const BUTTON_PRIMARY: u16 = 1;
pub const BUTTON_SECONDARY: u16 = 2;
pub const BUTTON_MIDDLE: u16 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
    /// Pointer left the surface or the platform cancelled it.
    Leave,
}

impl PointerKind {
    pub fn from_event_type(name: &str) -> Option<Self> {
        match name {
            "pointerdown" | "mousedown" => Some(PointerKind::Down),
            "pointermove" | "mousemove" => Some(PointerKind::Move),
            "pointerup" | "mouseup" => Some(PointerKind::Up),
            "pointerleave" | "mouseleave" | "pointercancel" => Some(PointerKind::Leave),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerInput {
    pub kind: PointerKind,
    pub screen: ScreenPoint,
    /// Buttons held during the event, as a `BUTTON_*` bit set.
    pub buttons: u16,
    /// False for the second and later fingers of a multi-touch gesture.
    pub is_primary: bool,
}

impl PointerInput {
    pub const fn new(kind: PointerKind, screen: ScreenPoint, buttons: u16) -> Self {
        Self { kind, screen, buttons, is_primary: true }
    }

    pub fn with_primary(self, is_primary: bool) -> Self {
        Self { is_primary, ..self }
    }

    pub fn primary_held(&self) -> bool {
        self.buttons & BUTTON_PRIMARY != 0
    }

    /// Middle or secondary button: pans instead of annotating.
    pub fn pan_held(&self) -> bool {
        self.buttons & (BUTTON_MIDDLE | BUTTON_SECONDARY) != 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WheelInput {
    pub screen: ScreenPoint,
    /// Positive scrolls down, i.e. zooms out.
    pub delta_y: f64,
    /// Ctrl/Meta held: zoom instead of letting the page scroll.
    pub zoom: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Delete,
    Escape,
}

impl Key {
    /// Map a `KeyboardEvent.key` value.
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name {
            "ArrowLeft" => Some(Key::ArrowLeft),
            "ArrowRight" => Some(Key::ArrowRight),
            "ArrowUp" => Some(Key::ArrowUp),
            "ArrowDown" => Some(Key::ArrowDown),
            "Delete" | "Backspace" => Some(Key::Delete),
            "Escape" => Some(Key::Escape),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    /// Shift held: move ten steps at once.
    pub coarse: bool,
}
