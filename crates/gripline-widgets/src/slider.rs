#![forbid(unsafe_code)]

//! One-dimensional continuous value control.
//!
//! A [`Slider`] maps pointer positions on its track to stepped values and
//! back to a thumb offset. A press on the thumb grabs it where it was hit;
//! a press on the bare track jumps the value under the pointer and keeps
//! dragging from there. Keyboard stepping works without any pointer
//! session.

use std::fmt;

use serde::{Deserialize, Serialize};

use gripline_core::drag::DragEffect;
use gripline_core::event::{KeyCode, KeyEvent, PointerInput};
use gripline_core::frame_throttle::Triggers;
use gripline_core::geometry::{Axis, TrackMapping};
use gripline_core::metrics::{
    LayoutSource, ObserverCommand, ObserverConfig, TrackMetrics, TrackMetricsObserver,
};
use gripline_core::value::{ContinuousValue, DEFAULT_STEP, ValueRange, normalize_step};
use gripline_web::pointer_capture::{DragController, DragDispatch};

use crate::Unmount;

/// Thumb size used when none is configured.
pub const DEFAULT_THUMB_SIZE: f64 = 16.0;

/// Steps per PageUp/PageDown when no page step is configured.
pub const DEFAULT_PAGE_STEPS: f64 = 10.0;

/// How the filled part of the track paints its gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillMode {
    /// The gradient is scaled to exactly the filled portion.
    #[default]
    Stretch,
    /// The gradient spans the whole track and the fill reveals part of it.
    Mask,
}

/// Slider configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliderConfig {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    /// PageUp/PageDown increment; `None` means ten steps.
    pub page_step: Option<f64>,
    pub orientation: Axis,
    /// Put the minimum at the right (horizontal) or bottom (vertical).
    pub reversed: bool,
    pub thumb_size: f64,
    /// How far the thumb centre may travel past each track end.
    pub edge_overlap: f64,
    pub fill_mode: FillMode,
    pub disabled: bool,
}

impl Default for SliderConfig {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 100.0,
            step: DEFAULT_STEP,
            page_step: None,
            orientation: Axis::Horizontal,
            reversed: false,
            thumb_size: DEFAULT_THUMB_SIZE,
            edge_overlap: 0.0,
            fill_mode: FillMode::Stretch,
            disabled: false,
        }
    }
}

impl SliderConfig {
    /// Value range described by `min`, `max`, and `step`.
    #[must_use]
    pub const fn value_range(&self) -> ValueRange {
        ValueRange::new(self.min, self.max, self.step)
    }

    /// Effective PageUp/PageDown increment.
    #[must_use]
    pub fn page_increment(&self) -> f64 {
        match self.page_step {
            Some(page) if page.is_finite() && page > 0.0 => page,
            _ => normalize_step(self.step) * DEFAULT_PAGE_STEPS,
        }
    }

    #[must_use]
    pub const fn range(mut self, min: f64, max: f64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    #[must_use]
    pub const fn step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    #[must_use]
    pub const fn page_step(mut self, page_step: f64) -> Self {
        self.page_step = Some(page_step);
        self
    }

    #[must_use]
    pub const fn orientation(mut self, orientation: Axis) -> Self {
        self.orientation = orientation;
        self
    }

    #[must_use]
    pub const fn reversed(mut self, reversed: bool) -> Self {
        self.reversed = reversed;
        self
    }

    #[must_use]
    pub const fn thumb_size(mut self, thumb_size: f64) -> Self {
        self.thumb_size = thumb_size;
        self
    }

    #[must_use]
    pub const fn edge_overlap(mut self, edge_overlap: f64) -> Self {
        self.edge_overlap = edge_overlap;
        self
    }

    #[must_use]
    pub const fn fill_mode(mut self, fill_mode: FillMode) -> Self {
        self.fill_mode = fill_mode;
        self
    }

    #[must_use]
    pub const fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// Geometry of the filled segment, relative to the track start.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FillGeometry {
    pub start: f64,
    pub length: f64,
    /// Gradient size along the axis.
    pub background_size: f64,
    /// Gradient position along the axis, relative to the fill's own start.
    pub background_offset: f64,
}

/// Map a logical arrow key to a step direction.
///
/// Up and Right increase. Reversal only flips the keys along the control's
/// own axis.
pub(crate) fn arrow_direction(code: KeyCode, orientation: Axis, reversed: bool) -> Option<f64> {
    let (direction, along_axis) = match code {
        KeyCode::ArrowRight => (1.0, orientation == Axis::Horizontal),
        KeyCode::ArrowLeft => (-1.0, orientation == Axis::Horizontal),
        KeyCode::ArrowUp => (1.0, orientation == Axis::Vertical),
        KeyCode::ArrowDown => (-1.0, orientation == Axis::Vertical),
        _ => return None,
    };
    Some(if reversed && along_axis {
        -direction
    } else {
        direction
    })
}

/// Side effects of [`Slider::set_config`].
#[derive(Debug, Clone, PartialEq, Default)]
#[must_use]
pub struct SliderUpdate {
    /// Observer re-subscription after an orientation change.
    pub observer: Vec<ObserverCommand>,
    /// Teardown of the drag that was live when the slider got disabled.
    pub drag: Option<DragDispatch<f64>>,
}

/// A 1-D value slider.
pub struct Slider {
    config: SliderConfig,
    value: ContinuousValue,
    observer: TrackMetricsObserver,
    metrics: Option<TrackMetrics>,
    controller: DragController<f64>,
    grab_offset: f64,
    focused: bool,
    on_change: Option<Box<dyn FnMut(f64)>>,
}

impl fmt::Debug for Slider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slider")
            .field("config", &self.config)
            .field("value", &self.value)
            .field("metrics", &self.metrics)
            .field("controller", &self.controller)
            .field("focused", &self.focused)
            .finish_non_exhaustive()
    }
}

impl Slider {
    /// Create a slider at its minimum.
    #[must_use]
    pub fn new(config: SliderConfig) -> Self {
        Self {
            config,
            value: ContinuousValue::new(config.value_range(), config.min),
            observer: TrackMetricsObserver::new(ObserverConfig::track(config.orientation)),
            metrics: None,
            controller: DragController::default(),
            grab_offset: 0.0,
            focused: false,
            on_change: None,
        }
    }

    /// Start at `value` (snapped into range).
    #[must_use]
    pub fn with_value(mut self, value: f64) -> Self {
        self.value.set(value);
        self
    }

    /// Register the callback invoked with every committed change.
    #[must_use]
    pub fn on_change(mut self, callback: impl FnMut(f64) + 'static) -> Self {
        self.on_change = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub const fn config(&self) -> SliderConfig {
        self.config
    }

    /// Replace the configuration, re-snapping the value into the new range.
    ///
    /// A new orientation re-targets the track observer; disabling the slider
    /// ends any live drag.
    pub fn set_config(&mut self, config: SliderConfig) -> SliderUpdate {
        let previous = self.config;
        self.config = config;
        self.value.set_range(config.value_range());
        let mut update = SliderUpdate::default();
        if previous.orientation != config.orientation {
            self.metrics = None;
            update.observer = self
                .observer
                .reconfigure(ObserverConfig::track(config.orientation));
        }
        if config.disabled && !previous.disabled && self.controller.is_active() {
            self.grab_offset = 0.0;
            update.drag = Some(self.controller.teardown());
        }
        update
    }

    /// Committed value.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value.raw()
    }

    /// Committed value as a ratio of the range.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        self.value.ratio()
    }

    /// Set the value from the host. Does not invoke `on_change`.
    pub fn set_value(&mut self, value: f64) -> bool {
        self.value.set(value)
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.controller.is_dragging()
    }

    #[must_use]
    pub const fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Subscribe to track size changes.
    pub fn mount(&mut self) -> Vec<ObserverCommand> {
        self.observer.mount()
    }

    /// Unsubscribe and end any live drag.
    pub fn unmount(&mut self) -> Unmount<f64> {
        Unmount {
            drag: self.controller.teardown(),
            observer: self.observer.unmount(),
        }
    }

    pub fn notify(&mut self, trigger: Triggers) -> Option<ObserverCommand> {
        self.observer.notify(trigger)
    }

    /// Animation frame fired; returns `true` if the track metrics changed.
    pub fn on_frame(&mut self, source: &dyn LayoutSource) -> bool {
        if self.observer.on_frame(source).is_err() {
            return false;
        }
        self.metrics = self.observer.track_metrics();
        true
    }

    /// Supply track metrics measured elsewhere.
    pub fn set_track_metrics(&mut self, metrics: Option<TrackMetrics>) {
        self.metrics = metrics.filter(|m| !m.is_degenerate());
    }

    /// Pointer/ratio mapping for the current track, if measured.
    #[must_use]
    pub fn mapping(&self) -> Option<TrackMapping> {
        self.metrics.map(|metrics| {
            TrackMapping::new(metrics, self.config.orientation)
                .thumb_size(self.config.thumb_size)
                .edge_overlap(self.config.edge_overlap)
                .reversed(self.config.reversed)
        })
    }

    /// Thumb leading edge relative to the track start.
    #[must_use]
    pub fn thumb_offset(&self) -> Option<f64> {
        self.mapping()
            .map(|mapping| mapping.ratio_to_offset(self.value.ratio()))
    }

    /// Filled segment from the logical minimum to the thumb centre.
    #[must_use]
    pub fn fill(&self) -> Option<FillGeometry> {
        let mapping = self.mapping()?;
        let track_length = mapping.metrics.length;
        let center = mapping.ratio_to_center(self.value.ratio()) - mapping.metrics.main_axis_offset;
        let center = center.clamp(0.0, track_length);
        let (start, length) = if self.config.reversed {
            (center, track_length - center)
        } else {
            (0.0, center)
        };
        Some(match self.config.fill_mode {
            FillMode::Stretch => FillGeometry {
                start,
                length,
                background_size: length,
                background_offset: 0.0,
            },
            FillMode::Mask => FillGeometry {
                start,
                length,
                background_size: track_length,
                background_offset: -start,
            },
        })
    }

    /// Press on the track or thumb. `None` when disabled or unmeasured.
    pub fn pointer_down(&mut self, input: PointerInput) -> Option<DragDispatch<f64>> {
        if self.config.disabled {
            return None;
        }
        let mapping = self.mapping()?;
        let coord = input.position.along(self.config.orientation);
        let ratio = self.value.ratio();
        let acceptable = input.pointer_id != 0
            && input.button == self.controller.config().activation_button
            && input.position.is_finite();
        if mapping.thumb_contains(ratio, coord) || !acceptable {
            // A rejected press must leave the live session's grab untouched.
            let grab_offset = coord - mapping.ratio_to_center(ratio);
            let dispatch = self.controller.pointer_down(input, self.value.raw());
            if !dispatch.is_ignored() {
                self.grab_offset = grab_offset;
            }
            return Some(dispatch);
        }
        self.grab_offset = 0.0;
        self.commit(self.value_at(&mapping, coord));
        Some(self.controller.jump_down(input, self.value.raw()))
    }

    pub fn pointer_move(&mut self, input: PointerInput) -> DragDispatch<f64> {
        let dispatch = self.controller.pointer_move(input);
        if matches!(
            dispatch.effect(),
            Some(DragEffect::DragStarted { .. } | DragEffect::DragUpdated { .. })
        ) {
            self.drag_to(input);
        }
        dispatch
    }

    pub fn pointer_up(&mut self, input: PointerInput) -> DragDispatch<f64> {
        let dispatch = self.controller.pointer_up(input);
        if let Some(DragEffect::Committed { dragged: true, .. }) = dispatch.effect() {
            self.drag_to(input);
        }
        dispatch
    }

    pub fn capture_acquired(&mut self, pointer_id: u32) -> DragDispatch<f64> {
        self.controller.capture_acquired(pointer_id)
    }

    pub fn pointer_cancel(&mut self, pointer_id: Option<u32>) -> DragDispatch<f64> {
        self.controller.pointer_cancel(pointer_id)
    }

    pub fn pointer_leave(&mut self, pointer_id: u32) -> DragDispatch<f64> {
        self.controller.pointer_leave(pointer_id)
    }

    pub fn lost_pointer_capture(&mut self, pointer_id: u32) -> DragDispatch<f64> {
        self.controller.lost_pointer_capture(pointer_id)
    }

    pub fn window_blur(&mut self) -> DragDispatch<f64> {
        self.controller.blur()
    }

    pub fn visibility_hidden(&mut self) -> DragDispatch<f64> {
        self.controller.visibility_hidden()
    }

    /// Keyboard stepping. Returns `true` if the key was handled.
    pub fn key_down(&mut self, key: KeyEvent) -> bool {
        if self.config.disabled {
            return false;
        }
        let range = self.value.range();
        let target = match key.code {
            KeyCode::Home => range.min,
            KeyCode::End => range.max,
            KeyCode::PageUp => self.value.raw() + self.config.page_increment(),
            KeyCode::PageDown => self.value.raw() - self.config.page_increment(),
            code => match arrow_direction(code, self.config.orientation, self.config.reversed) {
                Some(direction) => self.value.raw() + direction * range.step,
                None => return false,
            },
        };
        self.commit(target);
        true
    }

    fn drag_to(&mut self, input: PointerInput) {
        let Some(mapping) = self.mapping() else {
            return;
        };
        let coord = input.position.along(self.config.orientation) - self.grab_offset;
        self.commit(self.value_at(&mapping, coord));
    }

    fn value_at(&self, mapping: &TrackMapping, coord: f64) -> f64 {
        self.value.range().value_at(mapping.position_to_ratio(coord))
    }

    fn commit(&mut self, value: f64) -> bool {
        if !self.value.set(value) {
            return false;
        }
        let committed = self.value.raw();
        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: gripline_core::logging::TARGET_COMMIT,
            value = committed,
            "slider value committed"
        );
        if let Some(callback) = self.on_change.as_mut() {
            callback(committed);
        }
        true
    }
}
