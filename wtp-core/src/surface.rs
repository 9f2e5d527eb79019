/// RGBA color, straight alpha.
pub type Rgba = [u8; 4];

/// Draw sink for widgets and stimuli. Coordinates are centered slider
/// units (origin mid-screen, y up); rectangles and text are positioned
/// by their centers. Implementations rasterize however they like; draw
/// calls return nothing and never fail.
pub trait Surface {
    fn fill_rect(&mut self, cx: f64, cy: f64, w: f64, h: f64, color: Rgba);

    fn stroke_rect(&mut self, cx: f64, cy: f64, w: f64, h: f64, line_width: f64, color: Rgba);

    fn fill_round_rect(&mut self, cx: f64, cy: f64, w: f64, h: f64, corner: f64, color: Rgba);

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgba);

    fn stroke_circle(&mut self, cx: f64, cy: f64, radius: f64, line_width: f64, color: Rgba);

    /// Pie wedge from `start_deg` to `end_deg`, measured clockwise
    /// from twelve o'clock.
    fn fill_pie(&mut self, cx: f64, cy: f64, radius: f64, start_deg: f64, end_deg: f64, color: Rgba);

    fn stroke_line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, line_width: f64, color: Rgba);

    /// Text centered on `(cx, cy)` with the given glyph height.
    fn draw_text(&mut self, text: &str, cx: f64, cy: f64, height: f64, color: Rgba);
}
