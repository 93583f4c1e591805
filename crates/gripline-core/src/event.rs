#![forbid(unsafe_code)]

//! Canonical input types.
//!
//! Hosts translate DOM pointer and keyboard events into these values before
//! handing them to a control. Coordinates are CSS pixels relative to the
//! control's positioning container, the same space [`crate::metrics`]
//! measures track offsets in.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Pointer button that initiated or ended a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    /// Left mouse button, pen contact, or touch.
    #[default]
    Primary,
    /// Right mouse button.
    Secondary,
    /// Middle mouse button.
    Auxiliary,
}

/// One pointer sample as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    /// Host pointer id. `0` is reserved and always rejected.
    pub pointer_id: u32,
    /// Button associated with the sample.
    pub button: PointerButton,
    /// Container-local position.
    pub position: Point,
}

impl PointerInput {
    /// Create a pointer sample.
    #[must_use]
    pub const fn new(pointer_id: u32, button: PointerButton, position: Point) -> Self {
        Self {
            pointer_id,
            button,
            position,
        }
    }

    /// Create a primary-button sample at `(x, y)`.
    #[must_use]
    pub const fn primary(pointer_id: u32, x: f64, y: f64) -> Self {
        Self::new(pointer_id, PointerButton::Primary, Point::new(x, y))
    }

    /// Same pointer and button, moved to `(x, y)`.
    #[must_use]
    pub const fn at(self, x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            ..self
        }
    }
}

/// Keys the interaction engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyCode {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
    Escape,
    /// Any key the engine does not interpret.
    Other,
}

bitflags! {
    /// Modifier keys held during an input event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Modifiers: u8 {
        const NONE  = 0b0000;
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const META  = 0b1000;
    }
}

/// A key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Create a key event with no modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
        }
    }

    /// Attach modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Check if Shift is held.
    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }
}

impl From<KeyCode> for KeyEvent {
    fn from(code: KeyCode) -> Self {
        Self::new(code)
    }
}
