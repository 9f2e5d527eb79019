//! Pointer-coordinate <-> slider-value mapping.
//!
//! The marker's screen position is a pure function of
//! `(value, range, scale, geometry)`; widgets recompute it from
//! scratch on every update instead of nudging it incrementally.

use crate::range::ScaledRange;
use serde::{Deserialize, Serialize};

/// Screen-space description of a slider bar. `bar_origin` is the x
/// coordinate of the bar's center; `marker_width` only affects how the
/// marker is drawn, not the value mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderGeometry {
    pub bar_origin: f64,
    pub bar_width: f64,
    pub marker_width: f64,
}

/// Maps a slider value to the marker's x coordinate.
pub fn value_to_position(value: f64, scaled: &ScaledRange, geom: &SliderGeometry) -> f64 {
    let fraction = scaled.fraction_of(value);
    geom.bar_origin + fraction * geom.bar_width - geom.bar_width / 2.0
}

/// Maps a pointer x coordinate back to a slider value. Positions
/// outside the bar clip to the range bounds exactly.
pub fn position_to_value(x: f64, scaled: &ScaledRange, geom: &SliderGeometry) -> f64 {
    let fraction = (x - geom.bar_origin + geom.bar_width / 2.0) / geom.bar_width;
    scaled.value_at(fraction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::{Range, Scale, ScaledRange};

    fn geom() -> SliderGeometry {
        SliderGeometry {
            bar_origin: 0.0,
            bar_width: 10.0,
            marker_width: 0.5,
        }
    }

    #[test]
    fn linear_bar_edges_hit_range_bounds() {
        // range (0,100), bar width 10 centered at 0: right edge is
        // x=+5 -> 100, left edge x=-5 -> 0, center -> 50.
        let sr = ScaledRange::new(Range::new(0.0, 100.0).unwrap(), Scale::Linear).unwrap();
        let g = geom();
        assert_eq!(position_to_value(5.0, &sr, &g), 100.0);
        assert_eq!(position_to_value(-5.0, &sr, &g), 0.0);
        assert_eq!(position_to_value(0.0, &sr, &g), 50.0);
    }

    #[test]
    fn off_bar_positions_clip_exactly() {
        let sr = ScaledRange::new(Range::new(0.0, 100.0).unwrap(), Scale::Linear).unwrap();
        let g = geom();
        assert_eq!(position_to_value(500.0, &sr, &g), 100.0);
        assert_eq!(position_to_value(-500.0, &sr, &g), 0.0);
    }

    #[test]
    fn log_round_trip_within_tolerance() {
        let sr = ScaledRange::new(Range::new(1.0, 1000.0).unwrap(), Scale::Log).unwrap();
        let g = geom();
        for v in [1.0, 3.3, 10.0, 99.0, 1000.0] {
            let x = value_to_position(v, &sr, &g);
            let back = position_to_value(x, &sr, &g);
            assert!((back - v).abs() < 1e-9 * v.max(1.0), "{v} -> {x} -> {back}");
        }
    }

    #[test]
    fn value_to_position_spans_the_bar() {
        let sr = ScaledRange::new(Range::new(0.0, 60.0).unwrap(), Scale::Linear).unwrap();
        let g = geom();
        assert_eq!(value_to_position(0.0, &sr, &g), -5.0);
        assert_eq!(value_to_position(60.0, &sr, &g), 5.0);
    }
}
