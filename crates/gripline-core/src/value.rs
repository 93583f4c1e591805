#![forbid(unsafe_code)]

//! Value clamping and step quantization.
//!
//! All functions are total: bad configuration (non-positive step, `max <
//! min`, NaN) degrades to a usable value instead of panicking, because a
//! panic here would take the host's render pass down with it.
//! [`ValueRange::validate`] exists for hosts that want to surface the
//! misconfiguration anyway.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::clamp_ratio;

/// Step substituted when the configured step is zero, negative, or NaN.
pub const DEFAULT_STEP: f64 = 1.0;

/// Decimal places values are rounded to before storage or comparison.
pub const VALUE_DECIMALS: i32 = 6;

const PRECISION_SCALE: f64 = 1_000_000.0;

/// Round to [`VALUE_DECIMALS`] decimal places.
#[inline]
#[must_use]
pub fn round_to_precision(value: f64) -> f64 {
    let scaled = (value * PRECISION_SCALE).round() / PRECISION_SCALE;
    // `-0.0` compares equal but formats differently; normalize it away.
    if scaled == 0.0 { 0.0 } else { scaled }
}

/// Replace an unusable step with [`DEFAULT_STEP`].
#[inline]
#[must_use]
pub fn normalize_step(step: f64) -> f64 {
    if step.is_finite() && step > 0.0 {
        step
    } else {
        DEFAULT_STEP
    }
}

/// Constrain `value` to `[min, max]`.
///
/// When `max < min` the result is whatever `max(min).min(max)` yields; the
/// engine does not swap bounds. NaN maps to `min`.
#[inline]
#[must_use]
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    value.max(min).min(max)
}

/// Quantize `value` to the nearest `min + k * step` inside `[min, max]`.
///
/// Rounding is half-away-from-zero on the step index. If rounding lands past
/// `max` (because `max - min` is not a multiple of `step`) the index is
/// pulled back to the last step that fits, so the result stays both in range
/// and on the step grid.
#[must_use]
pub fn snap_to_step(value: f64, min: f64, max: f64, step: f64) -> f64 {
    let step = normalize_step(step);
    let clamped = clamp(value, min, max);
    let span = (max - min).max(0.0);
    let last_index = (span / step + 1e-9).floor();
    let index = ((clamped - min) / step).round().clamp(0.0, last_index);
    // Rounding can nudge a bound with more than six decimals past itself.
    clamp(round_to_precision(min + index * step), min, max)
}

/// Configuration problems detected by [`ValueRange::validate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueRangeError {
    /// Step is zero or negative.
    NonPositiveStep { step: f64 },
    /// Upper bound below lower bound.
    MaxBelowMin { min: f64, max: f64 },
    /// A bound or the step is NaN or infinite.
    NonFinite,
}

impl fmt::Display for ValueRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveStep { step } => write!(f, "step must be > 0 (got {step})"),
            Self::MaxBelowMin { min, max } => {
                write!(f, "max ({max}) must not be below min ({min})")
            }
            Self::NonFinite => write!(f, "range bounds and step must be finite"),
        }
    }
}

impl std::error::Error for ValueRangeError {}

/// Bounds and step of a continuous value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Default for ValueRange {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 100.0,
            step: DEFAULT_STEP,
        }
    }
}

impl ValueRange {
    /// Create a range.
    #[must_use]
    pub const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// Report configuration errors without altering anything.
    pub fn validate(&self) -> Result<(), ValueRangeError> {
        if !(self.min.is_finite() && self.max.is_finite()) || self.step.is_nan() {
            return Err(ValueRangeError::NonFinite);
        }
        if self.step <= 0.0 {
            return Err(ValueRangeError::NonPositiveStep { step: self.step });
        }
        if !self.step.is_finite() {
            return Err(ValueRangeError::NonFinite);
        }
        if self.max < self.min {
            return Err(ValueRangeError::MaxBelowMin {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    /// Copy with an unusable step replaced by [`DEFAULT_STEP`].
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            step: normalize_step(self.step),
            ..self
        }
    }

    /// Clamp and quantize a raw value.
    #[inline]
    #[must_use]
    pub fn snap(&self, value: f64) -> f64 {
        snap_to_step(value, self.min, self.max, self.step)
    }

    /// Distance between the bounds, never negative.
    #[inline]
    #[must_use]
    pub fn span(&self) -> f64 {
        (self.max - self.min).max(0.0)
    }

    /// Position of `value` as a ratio of the range. An empty range reports `0`.
    #[must_use]
    pub fn ratio_of(&self, value: f64) -> f64 {
        let span = self.span();
        if span <= 0.0 {
            return 0.0;
        }
        clamp_ratio((value - self.min) / span)
    }

    /// Snapped value at `ratio` of the range.
    #[must_use]
    pub fn value_at(&self, ratio: f64) -> f64 {
        self.snap(self.min + clamp_ratio(ratio) * self.span())
    }
}

/// A committed, clamped, and stepped value.
///
/// Invariant: `range.min <= raw <= range.max` and `raw - range.min` is a
/// multiple of `range.step` within [`VALUE_DECIMALS`] precision (when the
/// range itself is valid).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContinuousValue {
    raw: f64,
    range: ValueRange,
}

impl ContinuousValue {
    /// Create a value, snapping `raw` into the (normalized) range.
    #[must_use]
    pub fn new(range: ValueRange, raw: f64) -> Self {
        let range = range.normalized();
        Self {
            raw: range.snap(raw),
            range,
        }
    }

    /// Current value.
    #[inline]
    #[must_use]
    pub const fn raw(&self) -> f64 {
        self.raw
    }

    /// Normalized range.
    #[inline]
    #[must_use]
    pub const fn range(&self) -> ValueRange {
        self.range
    }

    /// Current value as a ratio of the range.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        self.range.ratio_of(self.raw)
    }

    /// Snap and store `value`. Returns `true` if the stored value changed.
    pub fn set(&mut self, value: f64) -> bool {
        let next = self.range.snap(value);
        if next == self.raw {
            return false;
        }
        self.raw = next;
        true
    }

    /// Move by `steps` whole steps (negative moves down).
    pub fn step_by(&mut self, steps: f64) -> bool {
        self.set(self.raw + steps * self.range.step)
    }

    /// Replace the range, re-snapping the current value into it.
    pub fn set_range(&mut self, range: ValueRange) -> bool {
        self.range = range.normalized();
        let next = self.range.snap(self.raw);
        let changed = next != self.raw;
        self.raw = next;
        changed
    }
}
