//! Property tests for the coordinate mapper: the round-trip law
//! (position_to_value inverts value_to_position), monotonicity in x,
//! and exact clipping at the bar edges, for both scales.

use proptest::prelude::*;
use wtp_core::{position_to_value, value_to_position, Range, Scale, ScaledRange, SliderGeometry};

fn arb_geom() -> impl Strategy<Value = SliderGeometry> {
    (-20.0..20.0f64, 1.0..40.0f64).prop_map(|(bar_origin, bar_width)| SliderGeometry {
        bar_origin,
        bar_width,
        marker_width: bar_width * 0.05,
    })
}

fn arb_linear_range() -> impl Strategy<Value = ScaledRange> {
    (-100.0..100.0f64, 0.5..500.0f64).prop_map(|(low, width)| {
        ScaledRange::new(Range::new(low, low + width).unwrap(), Scale::Linear).unwrap()
    })
}

fn arb_log_range() -> impl Strategy<Value = ScaledRange> {
    (0.01..10.0f64, 1.5..1000.0f64).prop_map(|(low, factor)| {
        ScaledRange::new(Range::new(low, low * factor).unwrap(), Scale::Log).unwrap()
    })
}

proptest! {
    #[test]
    fn linear_round_trip(sr in arb_linear_range(), geom in arb_geom(), t in 0.0..=1.0f64) {
        let v = sr.range().low() + t * sr.range().width();
        let x = value_to_position(v, &sr, &geom);
        let back = position_to_value(x, &sr, &geom);
        prop_assert!((back - v).abs() <= 1e-9 * sr.range().width().max(1.0));
    }

    #[test]
    fn log_round_trip(sr in arb_log_range(), geom in arb_geom(), t in 0.0..=1.0f64) {
        let v = sr.value_at(t);
        let x = value_to_position(v, &sr, &geom);
        let back = position_to_value(x, &sr, &geom);
        prop_assert!((back - v).abs() <= 1e-6 * v.max(1.0));
    }

    #[test]
    fn monotone_in_x(sr in arb_linear_range(), geom in arb_geom(), x1 in -100.0..100.0f64, dx in 0.0..50.0f64) {
        let v1 = position_to_value(x1, &sr, &geom);
        let v2 = position_to_value(x1 + dx, &sr, &geom);
        prop_assert!(v1 <= v2);
    }

    #[test]
    fn log_monotone_in_x(sr in arb_log_range(), geom in arb_geom(), x1 in -100.0..100.0f64, dx in 0.0..50.0f64) {
        let v1 = position_to_value(x1, &sr, &geom);
        let v2 = position_to_value(x1 + dx, &sr, &geom);
        prop_assert!(v1 <= v2);
    }

    #[test]
    fn off_bar_clips_to_bounds(sr in arb_linear_range(), geom in arb_geom(), slack in 0.001..100.0f64) {
        let left = geom.bar_origin - geom.bar_width / 2.0 - slack;
        let right = geom.bar_origin + geom.bar_width / 2.0 + slack;
        prop_assert_eq!(position_to_value(left, &sr, &geom), sr.range().low());
        prop_assert_eq!(position_to_value(right, &sr, &geom), sr.range().high());
    }

    #[test]
    fn mapped_values_stay_in_range(sr in arb_linear_range(), geom in arb_geom(), x in -1000.0..1000.0f64) {
        let v = position_to_value(x, &sr, &geom);
        prop_assert!(sr.range().contains(v));
    }
}
