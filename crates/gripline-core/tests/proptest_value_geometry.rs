//! Property invariants for step quantization and the pointer/ratio mapper.
//!
//! These exercise the pure math that every control funnels through, so a
//! regression here shows up as a thumb drifting off its value or a committed
//! value escaping its bounds.

use gripline_core::geometry::{Axis, Point, TrackMapping};
use gripline_core::metrics::TrackMetrics;
use gripline_core::value::{ContinuousValue, ValueRange, clamp, snap_to_step};
use proptest::prelude::*;

const TOLERANCE: f64 = 1e-9;

fn axis_strategy() -> impl Strategy<Value = Axis> {
    prop_oneof![Just(Axis::Horizontal), Just(Axis::Vertical)]
}

fn metrics(length: f64, offset: f64) -> TrackMetrics {
    TrackMetrics {
        length,
        thickness: 8.0,
        main_axis_offset: offset,
        cross_axis_offset: 0.0,
    }
}

/// Container-local pointer coordinate that lands on the thumb centre drawn at
/// `offset` from the track start.
fn pointer_for_offset(mapping: &TrackMapping, offset: f64) -> f64 {
    mapping.metrics.main_axis_offset + offset + mapping.thumb_size / 2.0
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn snap_to_step_stays_within_bounds(
        raw in -1.0e6f64..1.0e6,
        min in -1.0e4f64..1.0e4,
        span in 0.0f64..1.0e4,
        step in -10.0f64..250.0,
    ) {
        let max = min + span;
        let out = snap_to_step(raw, min, max, step);
        prop_assert!(out >= min, "{out} below {min}");
        prop_assert!(out <= max, "{out} above {max}");
    }

    #[test]
    fn snap_to_step_handles_non_finite_raw(
        min in -100.0f64..100.0,
        span in 0.0f64..100.0,
        raw in prop_oneof![Just(f64::NAN), Just(f64::INFINITY), Just(f64::NEG_INFINITY)],
    ) {
        let max = min + span;
        let out = snap_to_step(raw, min, max, 1.0);
        prop_assert!(out.is_finite());
        prop_assert!((min..=max).contains(&out));
    }

    #[test]
    fn snapped_values_sit_on_the_step_grid(
        raw in -500.0f64..500.0,
        min in -100.0f64..100.0,
        span in 0.0f64..400.0,
        step in 0.01f64..50.0,
    ) {
        let max = min + span;
        let out = snap_to_step(raw, min, max, step);
        let steps = (out - min) / step;
        // Either on a grid point or pinned at a bound that is off-grid.
        let on_grid = (steps - steps.round()).abs() < 1e-4;
        prop_assert!(on_grid || out == max || out == min, "{out} not on grid from {min} by {step}");
    }

    #[test]
    fn snapping_is_idempotent(
        raw in -1.0e3f64..1.0e3,
        min in -100.0f64..100.0,
        span in 0.0f64..500.0,
        step in 0.5f64..20.0,
    ) {
        let max = min + span;
        let once = snap_to_step(raw, min, max, step);
        prop_assert_eq!(snap_to_step(once, min, max, step), once);
    }

    #[test]
    fn continuous_value_upholds_range_invariant(
        raw in -1.0e4f64..1.0e4,
        nudges in proptest::collection::vec(-3i32..=3, 0..40),
    ) {
        let range = ValueRange::new(-20.0, 80.0, 0.5);
        let mut value = ContinuousValue::new(range, raw);
        for nudge in nudges {
            value.step_by(f64::from(nudge));
            prop_assert!((range.min..=range.max).contains(&value.raw()));
        }
    }

    #[test]
    fn clamp_never_escapes_ordered_bounds(
        value in proptest::num::f64::ANY,
        min in -1.0e6f64..1.0e6,
        span in 0.0f64..1.0e6,
    ) {
        let max = min + span;
        let out = clamp(value, min, max);
        prop_assert!((min..=max).contains(&out));
    }

    #[test]
    fn offset_round_trips_to_ratio(
        length in 1.0f64..4000.0,
        offset in -500.0f64..500.0,
        ratio in 0.0f64..=1.0,
        axis in axis_strategy(),
        reversed in any::<bool>(),
    ) {
        let mapping = TrackMapping::new(metrics(length, offset), axis).reversed(reversed);
        let thumb_offset = mapping.ratio_to_offset(ratio);
        let back = mapping.position_to_ratio(pointer_for_offset(&mapping, thumb_offset));
        prop_assert!((back - ratio).abs() < TOLERANCE, "{ratio} -> {thumb_offset} -> {back}");
    }

    #[test]
    fn offset_round_trips_with_thumb_and_overlap(
        length in 100.0f64..2000.0,
        thumb in 0.0f64..80.0,
        overlap in 0.0f64..10.0,
        ratio in 0.0f64..=1.0,
        axis in axis_strategy(),
        reversed in any::<bool>(),
    ) {
        let mapping = TrackMapping::new(metrics(length, 12.0), axis)
            .thumb_size(thumb)
            .edge_overlap(overlap)
            .reversed(reversed);
        prop_assume!(mapping.travel().is_some());
        let thumb_offset = mapping.ratio_to_offset(ratio);
        let back = mapping.position_to_ratio(pointer_for_offset(&mapping, thumb_offset));
        prop_assert!((back - ratio).abs() < TOLERANCE, "{ratio} -> {thumb_offset} -> {back}");
    }

    #[test]
    fn any_pointer_maps_into_unit_interval(
        length in 0.0f64..2000.0,
        thumb in 0.0f64..120.0,
        coord in -1.0e5f64..1.0e5,
        reversed in any::<bool>(),
    ) {
        let mapping = TrackMapping::new(metrics(length, 0.0), Axis::Horizontal)
            .thumb_size(thumb)
            .reversed(reversed);
        let ratio = mapping.point_to_ratio(Point::new(coord, coord));
        prop_assert!((0.0..=1.0).contains(&ratio));
    }
}
