use crate::Slider;
use rand::Rng;
use wtp_core::{
    mapper, DomainError, Range, Rgba, Scale, ScaledRange, SliderGeometry, Surface,
};

/// Construction parameters for [`ResponseSlider`].
#[derive(Debug, Clone)]
pub struct SliderParams {
    pub pos: (f64, f64),
    pub length: f64,
    pub height: f64,
    pub color: Rgba,
    pub border_color: Rgba,
    pub marker_color: Rgba,
    pub range: Range,
    pub scale: Scale,
    /// Initial marker value; drawn uniformly from the range when
    /// `None`.
    pub start_value: Option<f64>,
    pub show_label: bool,
    pub text_height: f64,
    /// Defaults to half the bar height.
    pub marker_width: Option<f64>,
}

impl SliderParams {
    pub fn new(range: Range, pos: (f64, f64), length: f64, height: f64) -> Self {
        Self {
            pos,
            length,
            height,
            color: [128, 128, 128, 255],
            border_color: [255, 255, 255, 255],
            marker_color: [64, 64, 64, 255],
            range,
            scale: Scale::Linear,
            start_value: None,
            show_label: true,
            text_height: 0.5,
            marker_width: None,
        }
    }
}

/// Horizontal response slider: a bar, a draggable marker, and a
/// currency label under the bar. The marker position is always
/// recomputed from `(value, range, scale, geometry)`.
#[derive(Debug, Clone)]
pub struct ResponseSlider {
    scaled: ScaledRange,
    geom: SliderGeometry,
    pos: (f64, f64),
    height: f64,
    color: Rgba,
    border_color: Rgba,
    inner_color: Rgba,
    border_width: f64,
    value: f64,
    marker_x: f64,
    visible: bool,
    show_label: bool,
    text_height: f64,
}

impl ResponseSlider {
    pub fn new(params: SliderParams, rng: &mut impl Rng) -> Result<Self, DomainError> {
        let scaled = ScaledRange::new(params.range, params.scale)?;
        let geom = SliderGeometry {
            bar_origin: params.pos.0,
            bar_width: params.length,
            marker_width: params.marker_width.unwrap_or(params.height * 0.5),
        };
        let start = params
            .start_value
            .unwrap_or_else(|| rng.random_range(params.range.low()..=params.range.high()));

        let mut slider = Self {
            scaled,
            geom,
            pos: params.pos,
            height: params.height,
            color: params.color,
            border_color: params.border_color,
            inner_color: params.marker_color,
            border_width: 0.05,
            value: start,
            marker_x: 0.0,
            visible: false,
            show_label: params.show_label,
            text_height: params.text_height,
        };
        slider.set_value(start);
        Ok(slider)
    }

    pub fn geometry(&self) -> &SliderGeometry {
        &self.geom
    }

    pub fn pos(&self) -> (f64, f64) {
        self.pos
    }

    pub fn bar_height(&self) -> f64 {
        self.height
    }

    pub fn label_text(&self) -> String {
        format!("${:.2}", self.value)
    }

    fn draw_bar(&self, surface: &mut dyn Surface) {
        let (x, y) = self.pos;
        surface.fill_rect(x, y, self.geom.bar_width, self.height, self.color);
        surface.stroke_rect(
            x,
            y,
            self.geom.bar_width,
            self.height,
            self.border_width,
            self.border_color,
        );
    }

    fn draw_marker(&self, surface: &mut dyn Surface) {
        // Rounded marker: border-color rect with an inset fill, the
        // inset being the border width.
        let y = self.pos.1;
        let w = self.geom.marker_width;
        let h = self.height * 1.5;
        let corner = self.height * 0.15;
        surface.fill_round_rect(self.marker_x, y, w, h, corner, self.border_color);
        surface.fill_round_rect(
            self.marker_x,
            y,
            w - self.border_width * 2.0,
            h - self.border_width * 2.0,
            (corner - self.border_width).max(0.0),
            self.inner_color,
        );
    }

    fn draw_label(&self, surface: &mut dyn Surface, text: &str) {
        let (x, y) = self.pos;
        surface.draw_text(
            text,
            x,
            y - self.height * 1.75,
            self.text_height,
            [255, 255, 255, 255],
        );
    }

    pub(crate) fn draw_with_label(&self, surface: &mut dyn Surface, label: Option<String>) {
        self.draw_bar(surface);
        if self.visible {
            self.draw_marker(surface);
            if self.show_label {
                let text = label.unwrap_or_else(|| self.label_text());
                self.draw_label(surface, &text);
            }
        }
    }
}

impl Slider for ResponseSlider {
    fn value(&self) -> f64 {
        self.value
    }

    fn set_value(&mut self, value: f64) {
        self.value = self.scaled.range().clip(value);
        self.marker_x = mapper::value_to_position(self.value, &self.scaled, &self.geom);
    }

    fn value_from_pointer(&self, x: f64) -> f64 {
        mapper::position_to_value(x, &self.scaled, &self.geom)
    }

    fn visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn marker_x(&self) -> f64 {
        self.marker_x
    }

    fn range(&self) -> Range {
        self.scaled.range()
    }

    fn set_range(&mut self, range: Range) -> Result<(), DomainError> {
        self.scaled = self.scaled.with_range(range)?;
        self.set_value(self.value);
        Ok(())
    }

    fn set_inner_color(&mut self, color: Rgba) {
        self.inner_color = color;
    }

    fn window(&self) -> Option<(f64, f64)> {
        None
    }

    fn draw(&self, surface: &mut dyn Surface) {
        self.draw_with_label(surface, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn slider(range: (f64, f64), start: f64) -> ResponseSlider {
        let mut params = SliderParams::new(
            Range::new(range.0, range.1).unwrap(),
            (0.0, 0.0),
            10.0,
            1.0,
        );
        params.start_value = Some(start);
        ResponseSlider::new(params, &mut StdRng::seed_from_u64(7)).unwrap()
    }

    #[test]
    fn set_value_clips_into_range() {
        let mut s = slider((0.0, 100.0), 50.0);
        s.set_value(180.0);
        assert_eq!(s.value(), 100.0);
        s.set_value(-3.0);
        assert_eq!(s.value(), 0.0);
    }

    #[test]
    fn marker_tracks_value_exactly() {
        let mut s = slider((0.0, 100.0), 50.0);
        assert_eq!(s.marker_x(), 0.0);
        s.set_value(100.0);
        assert_eq!(s.marker_x(), 5.0);
        s.set_value(0.0);
        assert_eq!(s.marker_x(), -5.0);
    }

    #[test]
    fn pointer_mapping_does_not_mutate() {
        let s = slider((0.0, 100.0), 50.0);
        assert_eq!(s.value_from_pointer(5.0), 100.0);
        assert_eq!(s.value(), 50.0);
    }

    #[test]
    fn random_start_lands_in_range() {
        let params = SliderParams::new(Range::new(2.0, 9.0).unwrap(), (0.0, 0.0), 10.0, 1.0);
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..50 {
            let s = ResponseSlider::new(params.clone(), &mut rng).unwrap();
            assert!(s.range().contains(s.value()));
        }
    }

    #[test]
    fn reassigning_range_clips_current_value() {
        let mut s = slider((0.0, 60.0), 50.0);
        s.set_range(Range::new(27.0, 33.0).unwrap()).unwrap();
        assert_eq!(s.value(), 33.0);
        assert!(s.range().contains(s.value()));
    }

    #[test]
    fn visibility_leaves_value_alone() {
        let mut s = slider((0.0, 60.0), 41.0);
        s.set_visible(true);
        s.set_visible(false);
        assert_eq!(s.value(), 41.0);
    }

    #[test]
    fn label_formats_as_currency() {
        let s = slider((0.0, 60.0), 12.5);
        assert_eq!(s.label_text(), "$12.50");
    }
}
