#![forbid(unsafe_code)]

//! gripline public facade crate.
//!
//! This crate provides the stable surface area for hosts. It re-exports the
//! controls and the types needed to drive them, and offers a prelude for
//! day-to-day usage.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use gripline_core::drag::{CancelReason, DragEffect, DragMachineError};
pub use gripline_core::event::{KeyCode, KeyEvent, Modifiers, PointerButton, PointerInput};
pub use gripline_core::frame_throttle::Triggers;
pub use gripline_core::geometry::{Axis, Point, RatioPair, Rect, TrackMapping};
pub use gripline_core::metrics::{
    LayoutSource, ObserverCommand, ScrollMetrics, TrackMetrics, TrackMetricsObserver,
};
pub use gripline_core::value::{ContinuousValue, ValueRange, ValueRangeError};

// --- Web re-exports --------------------------------------------------------

pub use gripline_web::{
    DragController, DragControllerConfig, DragDispatch, DragHost, HostCommand, IgnoredReason,
};

// --- Widget re-exports -----------------------------------------------------

pub use gripline_widgets::Unmount;
pub use gripline_widgets::color::{ColorField, ColorFieldConfig, ColorPicker, Hsv, Rgb};
pub use gripline_widgets::focus_guard::{CloseReason, FocusDecision, ReopenGuard};
pub use gripline_widgets::resize_handle::{
    AxisMask, BoxSize, ResizableBox, ResizeBoxError, ResizeHandle, ResizeHandleConfig,
    ResizeHandleError,
};
pub use gripline_widgets::scroll_area::ScrollArea;
pub use gripline_widgets::scrollbar::{ScrollTarget, ScrollbarConfig, ScrollbarOverlay, ThumbState};
pub use gripline_widgets::slider::{FillGeometry, FillMode, Slider, SliderConfig, SliderUpdate};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for gripline configuration.
///
/// Runtime input never fails; only configuration that a host may want to
/// validate up front produces one of these.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Error {
    /// A value range with a bad step or inverted bounds.
    Range(ValueRangeError),
    /// An invalid drag threshold or hysteresis.
    Drag(DragMachineError),
    /// Inconsistent resize bounds or drag settings for a resize handle.
    Resize(ResizeHandleError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Range(err) => write!(f, "{err}"),
            Self::Drag(err) => write!(f, "{err}"),
            Self::Resize(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Range(err) => Some(err),
            Self::Drag(err) => Some(err),
            Self::Resize(err) => Some(err),
        }
    }
}

impl From<ValueRangeError> for Error {
    fn from(err: ValueRangeError) -> Self {
        Self::Range(err)
    }
}

impl From<DragMachineError> for Error {
    fn from(err: DragMachineError) -> Self {
        Self::Drag(err)
    }
}

impl From<ResizeHandleError> for Error {
    fn from(err: ResizeHandleError) -> Self {
        Self::Resize(err)
    }
}

impl From<ResizeBoxError> for Error {
    fn from(err: ResizeBoxError) -> Self {
        Self::Resize(ResizeHandleError::Bounds(err))
    }
}

/// Standard result type for gripline APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Check a slider configuration before handing it to [`Slider::new`].
///
/// `Slider::new` itself never fails; out-of-range settings are normalized.
pub fn validate_slider(config: &SliderConfig) -> Result<()> {
    config.value_range().validate()?;
    Ok(())
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Axis, ColorPicker, DragDispatch, DragHost, Error, HostCommand, KeyCode, KeyEvent,
        LayoutSource, Modifiers, ObserverCommand, Point, PointerInput, Rect, ResizeHandle,
        Result, ScrollArea, ScrollTarget, ScrollbarOverlay, Slider, SliderConfig, Triggers,
    };

    pub use crate::{core, web, widgets};
}

pub use gripline_core as core;
pub use gripline_web as web;
pub use gripline_widgets as widgets;
