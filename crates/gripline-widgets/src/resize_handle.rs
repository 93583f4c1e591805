#![forbid(unsafe_code)]

//! Corner grip that resizes a box by pointer drag or arrow keys.
//!
//! A dimension the host supplies is *controlled*: the handle reports the
//! size it would like through `on_size_change` but keeps rendering the
//! supplied value until the host calls `set_controlled_*`. Dimensions the
//! host leaves out are owned by the handle and updated in place.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use gripline_core::drag::{DragEffect, DragMachineError};
use gripline_core::event::{KeyCode, KeyEvent, PointerInput};
use gripline_core::geometry::Point;
use gripline_core::value::clamp;
use gripline_web::pointer_capture::{DragController, DragControllerConfig, DragDispatch};

bitflags! {
    /// Axes a handle may change.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct AxisMask: u8 {
        const X = 0b01;
        const Y = 0b10;
        const BOTH = Self::X.bits() | Self::Y.bits();
    }
}

impl Default for AxisMask {
    fn default() -> Self {
        Self::BOTH
    }
}

/// Width and height in px.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoxSize {
    pub width: f64,
    pub height: f64,
}

impl BoxSize {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Which dimension a bounds problem concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Width,
    Height,
}

/// Inconsistent resize bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeBoxError {
    MinExceedsMax {
        dimension: Dimension,
        min: f64,
        max: f64,
    },
}

impl fmt::Display for ResizeBoxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MinExceedsMax { dimension, min, max } => {
                write!(f, "{dimension:?} minimum ({min}) exceeds maximum ({max})")
            }
        }
    }
}

impl std::error::Error for ResizeBoxError {}

/// Errors from validating or building a resize handle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeHandleError {
    Bounds(ResizeBoxError),
    Drag(DragMachineError),
}

impl fmt::Display for ResizeHandleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounds(err) => write!(f, "invalid resize bounds: {err}"),
            Self::Drag(err) => write!(f, "invalid drag configuration: {err}"),
        }
    }
}

impl std::error::Error for ResizeHandleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bounds(err) => Some(err),
            Self::Drag(err) => Some(err),
        }
    }
}

impl From<ResizeBoxError> for ResizeHandleError {
    fn from(err: ResizeBoxError) -> Self {
        Self::Bounds(err)
    }
}

impl From<DragMachineError> for ResizeHandleError {
    fn from(err: DragMachineError) -> Self {
        Self::Drag(err)
    }
}

/// Controlled dimensions and size limits.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizableBox {
    /// Host-supplied width. `Some` makes the width controlled.
    pub width: Option<f64>,
    /// Host-supplied height. `Some` makes the height controlled.
    pub height: Option<f64>,
    pub min_width: f64,
    pub min_height: f64,
    pub max_width: Option<f64>,
    pub max_height: Option<f64>,
}

impl ResizableBox {
    pub fn validate(&self) -> Result<(), ResizeBoxError> {
        let checks = [
            (Dimension::Width, self.min_width, self.max_width),
            (Dimension::Height, self.min_height, self.max_height),
        ];
        for (dimension, min, max) in checks {
            if let Some(max) = max
                && min > max
            {
                return Err(ResizeBoxError::MinExceedsMax {
                    dimension,
                    min,
                    max,
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn clamp_width(&self, width: f64) -> f64 {
        clamp(width, self.min_width, self.max_width.unwrap_or(f64::INFINITY))
    }

    #[must_use]
    pub fn clamp_height(&self, height: f64) -> f64 {
        clamp(height, self.min_height, self.max_height.unwrap_or(f64::INFINITY))
    }
}

/// Handle configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeHandleConfig {
    pub axis: AxisMask,
    /// Arrow key nudge in px.
    pub step: f64,
    /// Shift+Arrow nudge in px.
    pub large_step: f64,
    pub drag_threshold: f64,
    pub disabled: bool,
}

impl Default for ResizeHandleConfig {
    fn default() -> Self {
        Self {
            axis: AxisMask::BOTH,
            step: 10.0,
            large_step: 50.0,
            drag_threshold: 0.0,
            disabled: false,
        }
    }
}

impl ResizeHandleConfig {
    #[must_use]
    pub const fn axis(mut self, axis: AxisMask) -> Self {
        self.axis = axis;
        self
    }

    #[must_use]
    pub const fn step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    #[must_use]
    pub const fn large_step(mut self, large_step: f64) -> Self {
        self.large_step = large_step;
        self
    }

    #[must_use]
    pub const fn drag_threshold(mut self, drag_threshold: f64) -> Self {
        self.drag_threshold = drag_threshold;
        self
    }

    #[must_use]
    pub const fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// Pointer- and keyboard-driven box resizer.
pub struct ResizeHandle {
    config: ResizeHandleConfig,
    bounds: ResizableBox,
    local: BoxSize,
    last_emitted: BoxSize,
    controller: DragController<BoxSize>,
    on_size_change: Option<Box<dyn FnMut(BoxSize)>>,
}

impl fmt::Debug for ResizeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResizeHandle")
            .field("config", &self.config)
            .field("bounds", &self.bounds)
            .field("local", &self.local)
            .field("last_emitted", &self.last_emitted)
            .field("controller", &self.controller)
            .finish_non_exhaustive()
    }
}

impl ResizeHandle {
    /// Create a handle. `initial` seeds the dimensions the host does not
    /// control and is clamped into the bounds.
    ///
    /// Bounds are not validated here: a minimum above its maximum clamps
    /// every size to the maximum. Call [`ResizableBox::validate`] to reject
    /// such bounds up front.
    pub fn new(
        config: ResizeHandleConfig,
        bounds: ResizableBox,
        initial: BoxSize,
    ) -> Result<Self, ResizeHandleError> {
        let controller = DragController::new(
            DragControllerConfig::default().drag_threshold(config.drag_threshold),
        )?;
        let local = BoxSize::new(
            bounds.clamp_width(initial.width),
            bounds.clamp_height(initial.height),
        );
        let mut handle = Self {
            config,
            bounds,
            local,
            last_emitted: local,
            controller,
            on_size_change: None,
        };
        handle.last_emitted = handle.size();
        Ok(handle)
    }

    /// Register the callback invoked with each distinct desired size.
    #[must_use]
    pub fn on_size_change(mut self, callback: impl FnMut(BoxSize) + 'static) -> Self {
        self.on_size_change = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub const fn config(&self) -> ResizeHandleConfig {
        self.config
    }

    #[must_use]
    pub const fn bounds(&self) -> ResizableBox {
        self.bounds
    }

    /// Size to render. Controlled dimensions are returned exactly as supplied.
    #[must_use]
    pub fn size(&self) -> BoxSize {
        BoxSize::new(
            self.bounds.width.unwrap_or(self.local.width),
            self.bounds.height.unwrap_or(self.local.height),
        )
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.controller.is_dragging()
    }

    /// Host updated (or released, with `None`) the controlled width.
    pub fn set_controlled_width(&mut self, width: Option<f64>) {
        self.bounds.width = width;
        self.last_emitted.width = self.size().width;
    }

    /// Host updated (or released, with `None`) the controlled height.
    pub fn set_controlled_height(&mut self, height: Option<f64>) {
        self.bounds.height = height;
        self.last_emitted.height = self.size().height;
    }

    pub fn pointer_down(&mut self, input: PointerInput) -> Option<DragDispatch<BoxSize>> {
        if self.config.disabled {
            return None;
        }
        Some(self.controller.pointer_down(input, self.size()))
    }

    pub fn pointer_move(&mut self, input: PointerInput) -> DragDispatch<BoxSize> {
        let origin = self.controller.session().map(|session| session.origin_value);
        let dispatch = self.controller.pointer_move(input);
        if let Some(origin) = origin
            && let Some(
                DragEffect::DragStarted { total_delta, .. }
                | DragEffect::DragUpdated { total_delta, .. },
            ) = dispatch.effect()
        {
            self.resize_from(origin, total_delta);
        }
        dispatch
    }

    pub fn pointer_up(&mut self, input: PointerInput) -> DragDispatch<BoxSize> {
        let origin = self.controller.session().map(|session| session.origin_value);
        let dispatch = self.controller.pointer_up(input);
        if let Some(origin) = origin
            && let Some(DragEffect::Committed {
                total_delta,
                dragged: true,
                ..
            }) = dispatch.effect()
        {
            self.resize_from(origin, total_delta);
        }
        dispatch
    }

    pub fn capture_acquired(&mut self, pointer_id: u32) -> DragDispatch<BoxSize> {
        self.controller.capture_acquired(pointer_id)
    }

    pub fn pointer_cancel(&mut self, pointer_id: Option<u32>) -> DragDispatch<BoxSize> {
        self.controller.pointer_cancel(pointer_id)
    }

    pub fn pointer_leave(&mut self, pointer_id: u32) -> DragDispatch<BoxSize> {
        self.controller.pointer_leave(pointer_id)
    }

    pub fn lost_pointer_capture(&mut self, pointer_id: u32) -> DragDispatch<BoxSize> {
        self.controller.lost_pointer_capture(pointer_id)
    }

    pub fn window_blur(&mut self) -> DragDispatch<BoxSize> {
        self.controller.blur()
    }

    pub fn visibility_hidden(&mut self) -> DragDispatch<BoxSize> {
        self.controller.visibility_hidden()
    }

    pub fn teardown(&mut self) -> DragDispatch<BoxSize> {
        self.controller.teardown()
    }

    /// Arrow keys nudge the enabled axes; Shift uses the large step.
    /// Returns `true` if the key was handled.
    pub fn key_down(&mut self, key: KeyEvent) -> bool {
        if self.config.disabled {
            return false;
        }
        let amount = if key.shift() {
            self.config.large_step
        } else {
            self.config.step
        };
        let (axis, delta) = match key.code {
            KeyCode::ArrowRight => (AxisMask::X, Point::new(amount, 0.0)),
            KeyCode::ArrowLeft => (AxisMask::X, Point::new(-amount, 0.0)),
            KeyCode::ArrowDown => (AxisMask::Y, Point::new(0.0, amount)),
            KeyCode::ArrowUp => (AxisMask::Y, Point::new(0.0, -amount)),
            _ => return false,
        };
        if !self.config.axis.contains(axis) {
            return false;
        }
        self.resize_from(self.size(), delta);
        true
    }

    fn resize_from(&mut self, origin: BoxSize, delta: Point) {
        let mask = self.config.axis;
        let desired = BoxSize::new(
            if mask.contains(AxisMask::X) {
                self.bounds.clamp_width(origin.width + delta.x)
            } else {
                origin.width
            },
            if mask.contains(AxisMask::Y) {
                self.bounds.clamp_height(origin.height + delta.y)
            } else {
                origin.height
            },
        );
        if self.bounds.width.is_none() {
            self.local.width = desired.width;
        }
        if self.bounds.height.is_none() {
            self.local.height = desired.height;
        }
        if desired == self.last_emitted {
            return;
        }
        self.last_emitted = desired;
        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: gripline_core::logging::TARGET_COMMIT,
            width = desired.width,
            height = desired.height,
            controlled_width = self.bounds.width.is_some(),
            controlled_height = self.bounds.height.is_some(),
            "resize requested"
        );
        if let Some(callback) = self.on_size_change.as_mut() {
            callback(desired);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gripline_core::event::Modifiers;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn bounds() -> ResizableBox {
        ResizableBox {
            min_width: 100.0,
            min_height: 50.0,
            max_width: Some(400.0),
            ..ResizableBox::default()
        }
    }

    #[test]
    fn uncontrolled_drag_resizes_and_clamps() {
        let mut handle = ResizeHandle::new(
            ResizeHandleConfig::default(),
            bounds(),
            BoxSize::new(200.0, 100.0),
        )
        .expect("valid bounds");
        handle.pointer_down(PointerInput::primary(1, 200.0, 100.0));
        handle.pointer_move(PointerInput::primary(1, 250.0, 130.0));
        assert_eq!(handle.size(), BoxSize::new(250.0, 130.0));
        handle.pointer_move(PointerInput::primary(1, 900.0, -500.0));
        assert_eq!(handle.size(), BoxSize::new(400.0, 50.0));
        handle.pointer_up(PointerInput::primary(1, 900.0, -500.0));
        assert!(!handle.is_dragging());
    }

    #[test]
    fn axis_mask_pins_the_other_dimension() {
        let mut handle = ResizeHandle::new(
            ResizeHandleConfig::default().axis(AxisMask::X),
            bounds(),
            BoxSize::new(200.0, 100.0),
        )
        .expect("valid bounds");
        handle.pointer_down(PointerInput::primary(1, 0.0, 0.0));
        handle.pointer_move(PointerInput::primary(1, 30.0, 30.0));
        assert_eq!(handle.size(), BoxSize::new(230.0, 100.0));
        assert!(!handle.key_down(KeyCode::ArrowDown.into()));
    }

    #[test]
    fn keyboard_nudges_use_step_and_large_step() {
        let mut handle = ResizeHandle::new(
            ResizeHandleConfig::default(),
            bounds(),
            BoxSize::new(200.0, 100.0),
        )
        .expect("valid bounds");
        assert!(handle.key_down(KeyCode::ArrowRight.into()));
        assert_eq!(handle.size().width, 210.0);
        let shift_up = KeyEvent::new(KeyCode::ArrowUp).with_modifiers(Modifiers::SHIFT);
        assert!(handle.key_down(shift_up));
        assert_eq!(handle.size().height, 50.0);
        assert!(!handle.key_down(KeyCode::Home.into()));
    }

    #[test]
    fn repeated_desired_size_is_reported_once() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut handle = ResizeHandle::new(
            ResizeHandleConfig::default(),
            bounds(),
            BoxSize::new(390.0, 100.0),
        )
        .expect("valid bounds")
        .on_size_change(move |size| sink.borrow_mut().push(size));
        handle.key_down(KeyCode::ArrowRight.into());
        handle.key_down(KeyCode::ArrowRight.into());
        assert_eq!(*seen.borrow(), vec![BoxSize::new(400.0, 100.0)]);
    }

    #[test]
    fn inverted_bounds_clamp_instead_of_failing() {
        let inverted = ResizableBox {
            min_width: 300.0,
            max_width: Some(200.0),
            ..ResizableBox::default()
        };
        let mut handle = ResizeHandle::new(
            ResizeHandleConfig::default(),
            inverted,
            BoxSize::new(250.0, 100.0),
        )
        .expect("inverted bounds still build");
        assert_eq!(handle.size(), BoxSize::new(200.0, 100.0));
        assert!(handle.key_down(KeyCode::ArrowLeft.into()));
        assert_eq!(handle.size().width, 200.0);

        let err: ResizeHandleError = inverted.validate().expect_err("min above max").into();
        assert_eq!(
            err,
            ResizeHandleError::Bounds(ResizeBoxError::MinExceedsMax {
                dimension: Dimension::Width,
                min: 300.0,
                max: 200.0,
            })
        );
        assert!(err.to_string().contains("Width minimum (300) exceeds maximum (200)"));
    }

    #[test]
    fn leave_and_hidden_document_end_the_resize() {
        let mut handle = ResizeHandle::new(
            ResizeHandleConfig::default(),
            bounds(),
            BoxSize::new(200.0, 100.0),
        )
        .expect("valid bounds");
        handle.pointer_down(PointerInput::primary(1, 0.0, 0.0));
        handle.pointer_move(PointerInput::primary(1, 20.0, 0.0));
        assert!(handle.is_dragging());
        let hidden = handle.visibility_hidden();
        assert!(!hidden.is_ignored());
        assert!(!handle.is_dragging());

        handle.pointer_down(PointerInput::primary(2, 0.0, 0.0));
        let left = handle.pointer_leave(2);
        assert!(matches!(
            left.effect(),
            Some(DragEffect::Canceled {
                reason: gripline_core::drag::CancelReason::PointerLeave,
                ..
            })
        ));
        assert_eq!(handle.size(), BoxSize::new(220.0, 100.0));
    }

    #[test]
    fn bounds_hydrate_from_json() {
        let bounds: ResizableBox =
            serde_json::from_str(r#"{"width": 320, "min_width": 120}"#).expect("valid json");
        assert_eq!(bounds.width, Some(320.0));
        assert_eq!(bounds.max_height, None);
        assert_eq!(ResizeHandleConfig::default().axis, AxisMask::BOTH);
    }

    #[cfg(feature = "tracing")]
    mod tracing_capture {
        use super::*;
        use std::sync::{Arc, Mutex};
        use tracing::Subscriber;
        use tracing_subscriber::Layer;
        use tracing_subscriber::layer::{Context, SubscriberExt};

        struct CommitCapture {
            messages: Arc<Mutex<Vec<String>>>,
        }

        impl<S> Layer<S> for CommitCapture
        where
            S: Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
        {
            fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
                if event.metadata().target() != gripline_core::logging::TARGET_COMMIT {
                    return;
                }
                struct MessageVisitor(Option<String>);
                impl tracing::field::Visit for MessageVisitor {
                    fn record_debug(
                        &mut self,
                        field: &tracing::field::Field,
                        value: &dyn std::fmt::Debug,
                    ) {
                        if field.name() == "message" {
                            self.0 = Some(format!("{value:?}"));
                        }
                    }
                }
                let mut visitor = MessageVisitor(None);
                event.record(&mut visitor);
                if let Some(message) = visitor.0 {
                    self.messages.lock().expect("capture lock").push(message);
                }
            }
        }

        #[test]
        fn controlled_resize_logs_the_request_once() {
            let messages = Arc::new(Mutex::new(Vec::new()));
            let subscriber = tracing_subscriber::registry().with(CommitCapture {
                messages: Arc::clone(&messages),
            });
            let _guard = tracing::subscriber::set_default(subscriber);
            tracing::callsite::rebuild_interest_cache();

            let controlled = ResizableBox {
                width: Some(300.0),
                ..bounds()
            };
            let mut handle = ResizeHandle::new(
                ResizeHandleConfig::default().axis(AxisMask::X),
                controlled,
                BoxSize::new(0.0, 100.0),
            )
            .expect("valid bounds");
            handle.key_down(KeyCode::ArrowRight.into());
            handle.key_down(KeyCode::ArrowRight.into());
            assert_eq!(handle.size().width, 300.0);

            let messages = messages.lock().expect("capture lock");
            let requests = messages
                .iter()
                .filter(|m| m.contains("resize requested"))
                .count();
            assert_eq!(requests, 1);
        }
    }
}
