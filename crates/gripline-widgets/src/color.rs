#![forbid(unsafe_code)]

//! Saturation/value field, hue bar, and the picker that ties them together.
//!
//! The field is a plane of two independent tracks: the horizontal ratio maps
//! to saturation and the vertical ratio, read bottom-up, maps to value. Hue
//! lives on a separate [`Slider`] over `0..=360`.
//!
//! Hue cannot be recovered from a gray, white, or black color. When the
//! host hands the picker such a color, the picker keeps the hue it already
//! had so the next chromatic edit continues from there.

use std::fmt;

use serde::{Deserialize, Serialize};

use gripline_core::drag::DragEffect;
use gripline_core::event::{KeyCode, KeyEvent, PointerInput};
use gripline_core::geometry::{Axis, PlaneMapping, Point, RatioPair, Rect, TrackMapping};
use gripline_core::metrics::TrackMetrics;
use gripline_core::value::{ContinuousValue, DEFAULT_STEP, ValueRange};
use gripline_web::pointer_capture::{DragController, DragDispatch};

use crate::slider::{Slider, SliderConfig};

/// Saturation or value below this counts as achromatic.
pub const ACHROMATIC_THRESHOLD: f64 = 0.5;

/// Multiplier applied to arrow steps while Shift is held.
const SHIFT_STEP_FACTOR: f64 = 10.0;

/// Hue in degrees, saturation and value in percent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

impl Hsv {
    #[must_use]
    pub const fn new(h: f64, s: f64, v: f64) -> Self {
        Self { h, s, v }
    }

    /// Hue is meaningless for this color.
    #[must_use]
    pub fn is_achromatic(&self) -> bool {
        self.s < ACHROMATIC_THRESHOLD || self.v < ACHROMATIC_THRESHOLD
    }

    #[must_use]
    pub fn to_rgb(self) -> Rgb {
        hsv_to_rgb(self)
    }
}

/// 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb`.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    #[must_use]
    pub fn to_hsv(self) -> Hsv {
        rgb_to_hsv(self)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn channel(unit: f64) -> u8 {
    (unit.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Convert HSV (degrees, percent, percent) to RGB.
#[must_use]
pub fn hsv_to_rgb(hsv: Hsv) -> Rgb {
    let h = hsv.h.rem_euclid(360.0);
    let s = (hsv.s / 100.0).clamp(0.0, 1.0);
    let v = (hsv.v / 100.0).clamp(0.0, 1.0);
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match (h / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Rgb::new(channel(r + m), channel(g + m), channel(b + m))
}

/// Convert RGB to HSV. Achromatic colors report hue `0`.
#[must_use]
pub fn rgb_to_hsv(rgb: Rgb) -> Hsv {
    let r = f64::from(rgb.r) / 255.0;
    let g = f64::from(rgb.g) / 255.0;
    let b = f64::from(rgb.b) / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let s = if max == 0.0 { 0.0 } else { delta / max * 100.0 };
    Hsv::new(h, s, max * 100.0)
}

/// Saturation/value field configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorFieldConfig {
    pub thumb_size: f64,
    pub edge_overlap: f64,
    /// Step for both saturation and value, in percent.
    pub step: f64,
    pub disabled: bool,
}

impl Default for ColorFieldConfig {
    fn default() -> Self {
        Self {
            thumb_size: 0.0,
            edge_overlap: 0.0,
            step: DEFAULT_STEP,
            disabled: false,
        }
    }
}

impl ColorFieldConfig {
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
    pub const fn step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    #[must_use]
    pub const fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    fn percent_range(&self) -> ValueRange {
        ValueRange::new(0.0, 100.0, self.step)
    }
}

/// Two-dimensional saturation x value control.
///
/// Every press jumps: the thumb centre moves under the pointer and the
/// session starts in the dragging state.
#[derive(Debug, Clone)]
pub struct ColorField {
    config: ColorFieldConfig,
    area: Option<Rect>,
    saturation: ContinuousValue,
    value: ContinuousValue,
    controller: DragController<RatioPair>,
}

impl ColorField {
    #[must_use]
    pub fn new(config: ColorFieldConfig) -> Self {
        let range = config.percent_range();
        Self {
            config,
            area: None,
            saturation: ContinuousValue::new(range, 100.0),
            value: ContinuousValue::new(range, 100.0),
            controller: DragController::default(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> ColorFieldConfig {
        self.config
    }

    #[must_use]
    pub const fn saturation(&self) -> f64 {
        self.saturation.raw()
    }

    /// Brightness (the V of HSV).
    #[must_use]
    pub const fn brightness(&self) -> f64 {
        self.value.raw()
    }

    /// Set both components. Returns `true` if either changed.
    pub fn set(&mut self, saturation: f64, brightness: f64) -> bool {
        let s = self.saturation.set(saturation);
        let v = self.value.set(brightness);
        s || v
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.controller.is_dragging()
    }

    /// Supply the field's measured rectangle. Empty rects leave it unmeasured.
    pub fn set_area(&mut self, area: Option<Rect>) {
        self.area = area.filter(|rect| !rect.is_empty());
    }

    #[must_use]
    pub fn mapping(&self) -> Option<PlaneMapping> {
        let area = self.area?;
        let track = |axis: Axis| {
            let metrics = TrackMetrics {
                length: area.extent(axis),
                thickness: area.extent(axis.perpendicular()),
                main_axis_offset: area.start(axis),
                cross_axis_offset: area.start(axis.perpendicular()),
            };
            TrackMapping::new(metrics, axis)
                .thumb_size(self.config.thumb_size)
                .edge_overlap(self.config.edge_overlap)
        };
        Some(PlaneMapping {
            horizontal: track(Axis::Horizontal),
            vertical: track(Axis::Vertical).reversed(true),
        })
    }

    /// Current ratios: saturation across, value up.
    #[must_use]
    pub fn ratios(&self) -> RatioPair {
        RatioPair {
            x: self.saturation.ratio(),
            y: self.value.ratio(),
        }
    }

    /// Container-local thumb centre.
    #[must_use]
    pub fn thumb_center(&self) -> Option<Point> {
        self.mapping()
            .map(|mapping| mapping.ratios_to_center(self.ratios()))
    }

    pub fn pointer_down(&mut self, input: PointerInput) -> Option<DragDispatch<RatioPair>> {
        if self.config.disabled {
            return None;
        }
        let mapping = self.mapping()?;
        let acceptable = input.pointer_id != 0
            && input.button == self.controller.config().activation_button
            && input.position.is_finite();
        if !acceptable {
            return Some(self.controller.pointer_down(input, self.ratios()));
        }
        self.commit_at(&mapping, input.position);
        Some(self.controller.jump_down(input, self.ratios()))
    }

    pub fn pointer_move(&mut self, input: PointerInput) -> DragDispatch<RatioPair> {
        let dispatch = self.controller.pointer_move(input);
        if matches!(
            dispatch.effect(),
            Some(DragEffect::DragStarted { .. } | DragEffect::DragUpdated { .. })
        ) && let Some(mapping) = self.mapping()
        {
            self.commit_at(&mapping, input.position);
        }
        dispatch
    }

    pub fn pointer_up(&mut self, input: PointerInput) -> DragDispatch<RatioPair> {
        let dispatch = self.controller.pointer_up(input);
        if let Some(DragEffect::Committed { dragged: true, .. }) = dispatch.effect()
            && let Some(mapping) = self.mapping()
        {
            self.commit_at(&mapping, input.position);
        }
        dispatch
    }

    pub fn capture_acquired(&mut self, pointer_id: u32) -> DragDispatch<RatioPair> {
        self.controller.capture_acquired(pointer_id)
    }

    pub fn pointer_cancel(&mut self, pointer_id: Option<u32>) -> DragDispatch<RatioPair> {
        self.controller.pointer_cancel(pointer_id)
    }

    pub fn pointer_leave(&mut self, pointer_id: u32) -> DragDispatch<RatioPair> {
        self.controller.pointer_leave(pointer_id)
    }

    pub fn lost_pointer_capture(&mut self, pointer_id: u32) -> DragDispatch<RatioPair> {
        self.controller.lost_pointer_capture(pointer_id)
    }

    pub fn window_blur(&mut self) -> DragDispatch<RatioPair> {
        self.controller.blur()
    }

    pub fn visibility_hidden(&mut self) -> DragDispatch<RatioPair> {
        self.controller.visibility_hidden()
    }

    pub fn teardown(&mut self) -> DragDispatch<RatioPair> {
        self.controller.teardown()
    }

    /// Left/Right adjust saturation, Up/Down adjust value. Shift moves ten
    /// steps.
    pub fn key_down(&mut self, key: KeyEvent) -> bool {
        if self.config.disabled {
            return false;
        }
        let steps = if key.shift() { SHIFT_STEP_FACTOR } else { 1.0 };
        match key.code {
            KeyCode::ArrowRight => self.saturation.step_by(steps),
            KeyCode::ArrowLeft => self.saturation.step_by(-steps),
            KeyCode::ArrowUp => self.value.step_by(steps),
            KeyCode::ArrowDown => self.value.step_by(-steps),
            _ => return false,
        };
        true
    }

    fn commit_at(&mut self, mapping: &PlaneMapping, position: Point) {
        let ratios = mapping.point_to_ratios(position);
        let range = self.saturation.range();
        if self.set(range.value_at(ratios.x), range.value_at(ratios.y)) {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                target: gripline_core::logging::TARGET_COMMIT,
                saturation = self.saturation.raw(),
                brightness = self.value.raw(),
                "color field committed"
            );
        }
    }
}

/// Hue bar configuration: a slider over `0..=360` degrees.
#[must_use]
pub fn hue_bar_config() -> SliderConfig {
    SliderConfig::default().range(0.0, 360.0).step(1.0)
}

/// A color picker composed of a [`ColorField`] and a hue [`Slider`].
///
/// Interactions go through [`ColorPicker::with_field`] and
/// [`ColorPicker::with_hue_bar`]; afterwards the picker compares the
/// resulting color with the last one it reported and invokes `on_change`
/// once per distinct color.
pub struct ColorPicker {
    field: ColorField,
    hue_bar: Slider,
    last_emitted: Rgb,
    on_change: Option<Box<dyn FnMut(Rgb)>>,
}

impl fmt::Debug for ColorPicker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorPicker")
            .field("field", &self.field)
            .field("hue_bar", &self.hue_bar)
            .field("last_emitted", &self.last_emitted)
            .finish_non_exhaustive()
    }
}

impl ColorPicker {
    #[must_use]
    pub fn new(field: ColorFieldConfig, hue_bar: SliderConfig) -> Self {
        let field = ColorField::new(field);
        let hue_bar = Slider::new(hue_bar);
        let mut picker = Self {
            field,
            hue_bar,
            last_emitted: Rgb::default(),
            on_change: None,
        };
        picker.last_emitted = picker.rgb();
        picker
    }

    /// Start at `hsv` without reporting a change.
    #[must_use]
    pub fn with_hsv(mut self, hsv: Hsv) -> Self {
        self.set_hsv(hsv);
        self
    }

    #[must_use]
    pub fn on_change(mut self, callback: impl FnMut(Rgb) + 'static) -> Self {
        self.on_change = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn hsv(&self) -> Hsv {
        Hsv::new(
            self.hue_bar.value(),
            self.field.saturation(),
            self.field.brightness(),
        )
    }

    #[must_use]
    pub fn rgb(&self) -> Rgb {
        self.hsv().to_rgb()
    }

    #[must_use]
    pub const fn field(&self) -> &ColorField {
        &self.field
    }

    #[must_use]
    pub const fn hue_bar(&self) -> &Slider {
        &self.hue_bar
    }

    /// Set the color from the host in HSV. Does not invoke `on_change`.
    pub fn set_hsv(&mut self, hsv: Hsv) {
        self.hue_bar.set_value(hsv.h);
        self.field.set(hsv.s, hsv.v);
        self.last_emitted = self.rgb();
    }

    /// Set the color from the host in RGB. Does not invoke `on_change`.
    ///
    /// An echo of the last reported color is ignored so rounding through RGB
    /// never drifts the HSV state. For an achromatic color the current hue
    /// is kept, and at near-zero brightness the current saturation too.
    /// Returns `true` if the picker state changed.
    pub fn set_rgb(&mut self, rgb: Rgb) -> bool {
        if rgb == self.last_emitted {
            return false;
        }
        let incoming = rgb.to_hsv();
        let current = self.hsv();
        let h = if incoming.is_achromatic() {
            current.h
        } else {
            incoming.h
        };
        let s = if incoming.v < ACHROMATIC_THRESHOLD {
            current.s
        } else {
            incoming.s
        };
        let hue_changed = self.hue_bar.set_value(h);
        let field_changed = self.field.set(s, incoming.v);
        self.last_emitted = rgb;
        hue_changed || field_changed
    }

    /// Run an interaction against the field, then report any color change.
    pub fn with_field<R>(&mut self, interact: impl FnOnce(&mut ColorField) -> R) -> R {
        let result = interact(&mut self.field);
        self.emit_if_changed();
        result
    }

    /// Run an interaction against the hue bar, then report any color change.
    pub fn with_hue_bar<R>(&mut self, interact: impl FnOnce(&mut Slider) -> R) -> R {
        let result = interact(&mut self.hue_bar);
        self.emit_if_changed();
        result
    }

    fn emit_if_changed(&mut self) {
        let rgb = self.rgb();
        if rgb == self.last_emitted {
            return;
        }
        self.last_emitted = rgb;
        if let Some(callback) = self.on_change.as_mut() {
            callback(rgb);
        }
    }
}
