#![forbid(unsafe_code)]

//! Geometric primitives and the pointer <-> ratio mapper.
//!
//! Everything here is stateless. A [`TrackMapping`] borrows nothing: it is a
//! small copyable description of one track (its measured metrics plus the
//! thumb size, edge overlap, and direction) and answers two questions:
//!
//! - where along the track is this pointer, as a ratio in `[0, 1]`?
//! - where should the thumb be drawn for this ratio?
//!
//! Coordinates are CSS pixels in the track's positioning container.

use serde::{Deserialize, Serialize};

use crate::metrics::TrackMetrics;

/// A point in container-local pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Origin.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Create a point.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component along `axis`.
    #[inline]
    #[must_use]
    pub const fn along(self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }

    /// Component-wise difference `self - other`.
    #[inline]
    #[must_use]
    pub fn delta_from(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    /// Both components are finite.
    #[inline]
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A rectangle in container-local pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: f64,
    /// Top edge (inclusive).
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// True when either dimension is zero, negative, or not finite.
    ///
    /// This is what an element that has not been laid out yet, or is
    /// `display: none`, measures as.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Leading edge along `axis`.
    #[inline]
    #[must_use]
    pub const fn start(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }

    /// Extent along `axis`.
    #[inline]
    #[must_use]
    pub const fn extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }
}

/// Axis of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    #[default]
    Horizontal,
    Vertical,
}

impl Axis {
    /// The other axis.
    #[inline]
    #[must_use]
    pub const fn perpendicular(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}

/// Apply a track's direction to a ratio.
///
/// Raw ratios are measured from the track's leading edge (left or top). A
/// reversed track puts its logical minimum at the trailing edge, so the
/// ratio is mirrored. The operation is its own inverse and is the only place
/// reversal happens.
#[inline]
#[must_use]
pub fn apply_direction(ratio: f64, reversed: bool) -> f64 {
    if reversed { 1.0 - ratio } else { ratio }
}

/// Clamp a ratio into `[0, 1]`, mapping NaN to `0`.
#[inline]
#[must_use]
pub fn clamp_ratio(ratio: f64) -> f64 {
    if ratio.is_nan() {
        0.0
    } else {
        ratio.clamp(0.0, 1.0)
    }
}

/// The span the thumb's centre may travel along.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Travel {
    /// Container-local coordinate of the centre at ratio 0 (before reversal).
    pub start: f64,
    /// Distance the centre covers from ratio 0 to ratio 1. Always positive.
    pub length: f64,
}

/// Stateless mapping between pointer coordinates and ratios for one track.
///
/// The thumb's centre travels over
/// `[start + thumb/2 - overlap, end - thumb/2 + overlap]`: half the thumb is
/// reserved at each end so the thumb never overruns the track, and edge
/// overlap hands part of that reserve back symmetrically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackMapping {
    pub metrics: TrackMetrics,
    pub axis: Axis,
    pub thumb_size: f64,
    pub edge_overlap: f64,
    pub reversed: bool,
}

impl TrackMapping {
    /// A mapping with a zero-size thumb and no overlap.
    #[must_use]
    pub const fn new(metrics: TrackMetrics, axis: Axis) -> Self {
        Self {
            metrics,
            axis,
            thumb_size: 0.0,
            edge_overlap: 0.0,
            reversed: false,
        }
    }

    /// Set the thumb size along the axis of travel.
    #[must_use]
    pub const fn thumb_size(mut self, thumb_size: f64) -> Self {
        self.thumb_size = thumb_size;
        self
    }

    /// Set the edge overlap allowance.
    #[must_use]
    pub const fn edge_overlap(mut self, edge_overlap: f64) -> Self {
        self.edge_overlap = edge_overlap;
        self
    }

    /// Mirror the track direction.
    #[must_use]
    pub const fn reversed(mut self, reversed: bool) -> Self {
        self.reversed = reversed;
        self
    }

    /// Margin reserved at each end of the track. Negative when the overlap
    /// lets the thumb centre pass the geometric ends.
    #[inline]
    #[must_use]
    pub fn end_margin(&self) -> f64 {
        self.thumb_size.max(0.0) / 2.0 - self.edge_overlap
    }

    /// Centre travel range, or `None` when the track cannot host the thumb.
    #[must_use]
    pub fn travel(&self) -> Option<Travel> {
        let margin = self.end_margin();
        let length = self.metrics.length - 2.0 * margin;
        if !(length.is_finite() && length > 0.0) {
            return None;
        }
        Some(Travel {
            start: self.metrics.main_axis_offset + margin,
            length,
        })
    }

    /// Map a container-local coordinate along the axis to a logical ratio.
    ///
    /// The coordinate is clamped into the travel range first, so pointers far
    /// outside the track during fast drags pin to `0` or `1`. A degenerate
    /// track maps everything to `0`.
    #[must_use]
    pub fn position_to_ratio(&self, coord: f64) -> f64 {
        let Some(travel) = self.travel() else {
            return 0.0;
        };
        let clamped = coord.clamp(travel.start, travel.start + travel.length);
        let raw = (clamped - travel.start) / travel.length;
        apply_direction(clamp_ratio(raw), self.reversed)
    }

    /// Map a container-local point to a logical ratio along this track's axis.
    #[inline]
    #[must_use]
    pub fn point_to_ratio(&self, point: Point) -> f64 {
        self.position_to_ratio(point.along(self.axis))
    }

    /// Container-local coordinate of the thumb centre for a logical ratio.
    #[must_use]
    pub fn ratio_to_center(&self, ratio: f64) -> f64 {
        let raw = apply_direction(clamp_ratio(ratio), self.reversed);
        match self.travel() {
            Some(travel) => travel.start + raw * travel.length,
            None => self.metrics.main_axis_offset + self.metrics.length.max(0.0) / 2.0,
        }
    }

    /// Offset of the thumb's leading edge from the track's leading edge.
    ///
    /// This is the value a renderer writes into `left`/`top` (or a
    /// translate transform) for the thumb.
    #[must_use]
    pub fn ratio_to_offset(&self, ratio: f64) -> f64 {
        self.ratio_to_center(ratio) - self.metrics.main_axis_offset - self.thumb_size.max(0.0) / 2.0
    }

    /// Whether `coord` falls on the thumb currently drawn at `ratio`.
    #[must_use]
    pub fn thumb_contains(&self, ratio: f64, coord: f64) -> bool {
        let half = self.thumb_size.max(0.0) / 2.0;
        let center = self.ratio_to_center(ratio);
        coord >= center - half && coord <= center + half
    }
}

/// A pair of ratios for two-dimensional controls.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RatioPair {
    pub x: f64,
    pub y: f64,
}

/// Two independent track mappings sharing one pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneMapping {
    pub horizontal: TrackMapping,
    pub vertical: TrackMapping,
}

impl PlaneMapping {
    /// Map a point to a ratio on each axis independently.
    #[must_use]
    pub fn point_to_ratios(&self, point: Point) -> RatioPair {
        RatioPair {
            x: self.horizontal.position_to_ratio(point.x),
            y: self.vertical.position_to_ratio(point.y),
        }
    }

    /// Thumb centre for a ratio pair.
    #[must_use]
    pub fn ratios_to_center(&self, ratios: RatioPair) -> Point {
        Point::new(
            self.horizontal.ratio_to_center(ratios.x),
            self.vertical.ratio_to_center(ratios.y),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(length: f64) -> TrackMetrics {
        TrackMetrics {
            length,
            thickness: 8.0,
            main_axis_offset: 0.0,
            cross_axis_offset: 0.0,
        }
    }

    #[test]
    fn rect_contains_edges() {
        let rect = Rect::new(2.0, 3.0, 4.0, 5.0);
        assert!(rect.contains(Point::new(2.0, 3.0)));
        assert!(rect.contains(Point::new(5.5, 7.5)));
        assert!(!rect.contains(Point::new(6.0, 3.0)));
        assert!(!rect.contains(Point::new(2.0, 8.0)));
    }

    #[test]
    fn rect_empty_covers_unmeasured_elements() {
        assert!(Rect::default().is_empty());
        assert!(Rect::new(0.0, 0.0, 10.0, -1.0).is_empty());
        assert!(Rect::new(0.0, 0.0, f64::NAN, 4.0).is_empty());
        assert!(!Rect::new(0.0, 0.0, 1.0, 1.0).is_empty());
    }

    #[test]
    fn direction_is_an_involution() {
        for ratio in [0.0, 0.25, 0.5, 1.0] {
            assert_eq!(apply_direction(apply_direction(ratio, true), true), ratio);
            assert_eq!(apply_direction(ratio, false), ratio);
        }
    }

    #[test]
    fn out_of_range_pointer_pins_to_ends() {
        let mapping = TrackMapping::new(track(200.0), Axis::Horizontal);
        assert_eq!(mapping.position_to_ratio(-500.0), 0.0);
        assert_eq!(mapping.position_to_ratio(9_000.0), 1.0);
        assert_eq!(mapping.position_to_ratio(100.0), 0.5);
    }

    #[test]
    fn reversed_track_inverts_ratio() {
        let mapping = TrackMapping::new(track(200.0), Axis::Horizontal).reversed(true);
        assert_eq!(mapping.position_to_ratio(0.0), 1.0);
        assert_eq!(mapping.position_to_ratio(150.0), 0.25);
        assert_eq!(mapping.ratio_to_center(0.25), 150.0);
    }

    #[test]
    fn thumb_reserve_and_overlap_shape_travel() {
        let mapping = TrackMapping::new(track(300.0), Axis::Horizontal)
            .thumb_size(72.0)
            .edge_overlap(6.0);
        let travel = mapping.travel().expect("track is long enough");
        assert_eq!(travel.start, 30.0);
        assert_eq!(travel.length, 240.0);
        assert_eq!(mapping.ratio_to_offset(0.0), -6.0);
        assert_eq!(mapping.ratio_to_offset(1.0), 300.0 - 72.0 + 6.0);
    }

    #[test]
    fn degenerate_track_maps_to_zero() {
        let mapping = TrackMapping::new(track(20.0), Axis::Vertical).thumb_size(40.0);
        assert!(mapping.travel().is_none());
        assert_eq!(mapping.position_to_ratio(15.0), 0.0);
        assert_eq!(mapping.ratio_to_center(1.0), 10.0);
    }

    #[test]
    fn track_offset_shifts_coordinates() {
        let metrics = TrackMetrics {
            main_axis_offset: 50.0,
            ..track(100.0)
        };
        let mapping = TrackMapping::new(metrics, Axis::Vertical);
        assert_eq!(mapping.point_to_ratio(Point::new(999.0, 75.0)), 0.25);
        assert_eq!(mapping.ratio_to_offset(0.25), 25.0);
    }

    #[test]
    fn plane_mapping_is_per_axis() {
        let plane = PlaneMapping {
            horizontal: TrackMapping::new(track(100.0), Axis::Horizontal),
            vertical: TrackMapping::new(track(50.0), Axis::Vertical).reversed(true),
        };
        let ratios = plane.point_to_ratios(Point::new(25.0, 10.0));
        assert_eq!(ratios.x, 0.25);
        assert!((ratios.y - 0.8).abs() < 1e-9);
        let center = plane.ratios_to_center(ratios);
        assert!((center.x - 25.0).abs() < 1e-9);
        assert!((center.y - 10.0).abs() < 1e-9);
    }

    #[test]
    fn thumb_hit_test() {
        let mapping = TrackMapping::new(track(100.0), Axis::Horizontal).thumb_size(10.0);
        // Travel 5..95; ratio 0.5 puts the centre at 50.
        assert!(mapping.thumb_contains(0.5, 46.0));
        assert!(!mapping.thumb_contains(0.5, 56.0));
    }
}
