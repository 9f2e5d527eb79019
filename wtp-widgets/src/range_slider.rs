use crate::slider::{ResponseSlider, SliderParams};
use crate::Slider;
use rand::Rng;
use wtp_core::{DomainError, Range, Rgba, Surface};

/// Slider whose marker stands for a sub-window of the parent range
/// rather than a point: the participant picks a coarse interval
/// `[value - half, value + half]`. The effective range is deflated by
/// half the window width per side so the window never overflows the
/// parent, and the marker width is scaled to the window width.
#[derive(Debug, Clone)]
pub struct RangeResponseSlider {
    inner: ResponseSlider,
    parent: Range,
    proportion: f64,
}

impl RangeResponseSlider {
    pub fn new(
        mut params: SliderParams,
        proportion: f64,
        rng: &mut impl Rng,
    ) -> Result<Self, DomainError> {
        if !(0.0 < proportion && proportion < 1.0) {
            return Err(DomainError::BadProportion(proportion));
        }
        let parent = params.range;
        let margin = proportion * parent.width() / 2.0;
        params.range = parent.deflate(margin)?;
        // Marker width mirrors the window width geometrically.
        params.marker_width = Some(proportion * params.length);
        if let Some(start) = params.start_value {
            params.start_value = Some(params.range.clip(start));
        }

        Ok(Self {
            inner: ResponseSlider::new(params, rng)?,
            parent,
            proportion,
        })
    }

    pub fn parent_range(&self) -> Range {
        self.parent
    }

    pub fn proportion(&self) -> f64 {
        self.proportion
    }

    fn half_window(&self) -> f64 {
        self.proportion * self.parent.width() / 2.0
    }

    pub fn label_text(&self) -> String {
        let half = self.half_window();
        let v = self.inner.value();
        format!("${:.2} - ${:.2}", v - half, v + half)
    }
}

impl Slider for RangeResponseSlider {
    fn value(&self) -> f64 {
        self.inner.value()
    }

    fn set_value(&mut self, value: f64) {
        self.inner.set_value(value);
    }

    fn value_from_pointer(&self, x: f64) -> f64 {
        self.inner.value_from_pointer(x)
    }

    fn visible(&self) -> bool {
        self.inner.visible()
    }

    fn set_visible(&mut self, visible: bool) {
        self.inner.set_visible(visible);
    }

    fn marker_x(&self) -> f64 {
        self.inner.marker_x()
    }

    fn range(&self) -> Range {
        self.inner.range()
    }

    fn set_range(&mut self, range: Range) -> Result<(), DomainError> {
        let margin = self.proportion * range.width() / 2.0;
        self.parent = range;
        self.inner.set_range(range.deflate(margin)?)
    }

    fn set_inner_color(&mut self, color: Rgba) {
        self.inner.set_inner_color(color);
    }

    fn window(&self) -> Option<(f64, f64)> {
        let half = self.half_window();
        let v = self.inner.value();
        Some((v - half, v + half))
    }

    fn draw(&self, surface: &mut dyn Surface) {
        self.inner.draw_with_label(surface, Some(self.label_text()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn range_slider(parent: (f64, f64), proportion: f64, start: f64) -> RangeResponseSlider {
        let mut params = SliderParams::new(
            Range::new(parent.0, parent.1).unwrap(),
            (0.0, 0.0),
            15.0,
            1.0,
        );
        params.start_value = Some(start);
        RangeResponseSlider::new(params, proportion, &mut StdRng::seed_from_u64(3)).unwrap()
    }

    #[test]
    fn effective_range_is_deflated_parent() {
        // parent (0,60), proportion 0.1 -> effective (3,57)
        let s = range_slider((0.0, 60.0), 0.1, 30.0);
        assert_eq!(s.range().low(), 3.0);
        assert_eq!(s.range().high(), 57.0);
    }

    #[test]
    fn effective_width_law() {
        for proportion in [0.05, 0.1, 0.25, 0.5] {
            let s = range_slider((0.0, 60.0), proportion, 30.0);
            let parent = s.parent_range();
            let eff = s.range();
            assert!(parent.low() < eff.low() && eff.high() < parent.high());
            let expect = (1.0 - proportion) * parent.width();
            assert!((eff.width() - expect).abs() < 1e-12);
        }
    }

    #[test]
    fn window_is_centered_on_value() {
        let s = range_slider((0.0, 60.0), 0.1, 30.0);
        assert_eq!(s.window(), Some((27.0, 33.0)));
    }

    #[test]
    fn window_never_overflows_parent() {
        for start in [0.0, 3.0, 31.0, 57.0, 60.0] {
            let s = range_slider((0.0, 60.0), 0.1, start);
            let (lo, hi) = s.window().unwrap();
            assert!(lo >= -1e-12 && hi <= 60.0 + 1e-12, "window ({lo},{hi})");
        }
    }

    #[test]
    fn rejects_out_of_bounds_proportion() {
        let params = SliderParams::new(Range::new(0.0, 60.0).unwrap(), (0.0, 0.0), 15.0, 1.0);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            RangeResponseSlider::new(params.clone(), 0.0, &mut rng),
            Err(DomainError::BadProportion(_))
        ));
        assert!(matches!(
            RangeResponseSlider::new(params, 1.0, &mut rng),
            Err(DomainError::BadProportion(_))
        ));
    }

    #[test]
    fn interval_label_shows_window() {
        let s = range_slider((0.0, 60.0), 0.1, 30.0);
        assert_eq!(s.label_text(), "$27.00 - $33.00");
    }
}
