//! Pointer input in surface-local coordinates.

use fsm_core::kurbo::Point;

/// Modifier keys held during an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        alt: false,
        meta: false,
    };

    /// Ctrl on most platforms, ⌘ on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp { x: f64, y: f64 },
    DoubleClick { x: f64, y: f64 },
}

impl InputEvent {
    pub fn point(&self) -> Point {
        match *self {
            InputEvent::PointerDown { x, y }
            | InputEvent::PointerMove { x, y }
            | InputEvent::PointerUp { x, y }
            | InputEvent::DoubleClick { x, y } => Point::new(x, y),
        }
    }

    /// Whether the session needs to know what lies under the pointer.
    pub fn needs_hit(&self) -> bool {
        matches!(self, InputEvent::PointerDown { .. } | InputEvent::DoubleClick { .. })
    }
}
