//! tiny-skia implementation of the draw-call surface.
//!
//! Widgets and stimuli draw in centered slider units (y up); this
//! rasterizer converts to pixel space and paints into a `Pixmap` the
//! application blits to its frame buffer.

use ab_glyph::{Font, FontVec, Glyph, PxScale, ScaleFont, point};
use anyhow::{Context, Result, anyhow};
use tiny_skia::{
    Color, FillRule, Paint, PathBuilder, Pixmap, PremultipliedColorU8, Rect, Stroke, Transform,
};
use wtp_core::{Rgba, Surface};

pub struct SkiaSurface {
    pixmap: Pixmap,
    font: FontVec,
    /// Pixels per slider unit.
    scale: f32,
}

impl SkiaSurface {
    pub fn new(width: u32, height: u32, scale: f32, font_bytes: Vec<u8>) -> Result<Self> {
        let pixmap = Pixmap::new(width, height)
            .ok_or_else(|| anyhow!("zero-sized surface {width}x{height}"))?;
        let font = FontVec::try_from_vec(font_bytes).context("invalid font data")?;
        Ok(Self {
            pixmap,
            font,
            scale,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn clear(&mut self, color: Rgba) {
        self.pixmap
            .fill(Color::from_rgba8(color[0], color[1], color[2], color[3]));
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Copies the rendered frame into an RGBA8 buffer of the same
    /// dimensions.
    pub fn copy_to_frame(&self, frame: &mut [u8]) {
        frame.copy_from_slice(self.pixmap.data());
    }

    /// Converts a point from centered slider units (y up) to pixel
    /// space (y down).
    fn to_px(&self, x: f64, y: f64) -> (f32, f32) {
        let cx = self.pixmap.width() as f32 / 2.0;
        let cy = self.pixmap.height() as f32 / 2.0;
        (cx + x as f32 * self.scale, cy - y as f32 * self.scale)
    }

    fn px(&self, len: f64) -> f32 {
        len as f32 * self.scale
    }
}

fn paint(color: Rgba) -> Paint<'static> {
    let mut p = Paint::default();
    p.set_color(Color::from_rgba8(color[0], color[1], color[2], color[3]));
    p.anti_alias = true;
    p
}

fn round_rect_path(x: f32, y: f32, w: f32, h: f32, corner: f32) -> Option<tiny_skia::Path> {
    let r = corner.clamp(0.0, w.min(h) / 2.0);
    let (x0, y0, x1, y1) = (x, y, x + w, y + h);
    let mut pb = PathBuilder::new();
    pb.move_to(x0 + r, y0);
    pb.line_to(x1 - r, y0);
    pb.quad_to(x1, y0, x1, y0 + r);
    pb.line_to(x1, y1 - r);
    pb.quad_to(x1, y1, x1 - r, y1);
    pb.line_to(x0 + r, y1);
    pb.quad_to(x0, y1, x0, y1 - r);
    pb.line_to(x0, y0 + r);
    pb.quad_to(x0, y0, x0 + r, y0);
    pb.close();
    pb.finish()
}

/// Point on a circle at `deg` measured clockwise from twelve o'clock,
/// in pixel space (y down).
fn pie_point(cx: f32, cy: f32, r: f32, deg: f32) -> (f32, f32) {
    let rad = deg.to_radians();
    (cx + r * rad.sin(), cy - r * rad.cos())
}

impl Surface for SkiaSurface {
    fn fill_rect(&mut self, cx: f64, cy: f64, w: f64, h: f64, color: Rgba) {
        let (px, py) = self.to_px(cx, cy);
        let (pw, ph) = (self.px(w), self.px(h));
        if let Some(rect) = Rect::from_xywh(px - pw / 2.0, py - ph / 2.0, pw, ph) {
            self.pixmap
                .fill_rect(rect, &paint(color), Transform::identity(), None);
        }
    }

    fn stroke_rect(&mut self, cx: f64, cy: f64, w: f64, h: f64, line_width: f64, color: Rgba) {
        let (px, py) = self.to_px(cx, cy);
        let (pw, ph) = (self.px(w), self.px(h));
        let Some(rect) = Rect::from_xywh(px - pw / 2.0, py - ph / 2.0, pw, ph) else {
            return;
        };
        let path = PathBuilder::from_rect(rect);
        let stroke = Stroke {
            width: self.px(line_width).max(1.0),
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &paint(color), &stroke, Transform::identity(), None);
    }

    fn fill_round_rect(&mut self, cx: f64, cy: f64, w: f64, h: f64, corner: f64, color: Rgba) {
        let (px, py) = self.to_px(cx, cy);
        let (pw, ph) = (self.px(w), self.px(h));
        if pw <= 0.0 || ph <= 0.0 {
            return;
        }
        if let Some(path) = round_rect_path(px - pw / 2.0, py - ph / 2.0, pw, ph, self.px(corner)) {
            self.pixmap.fill_path(
                &path,
                &paint(color),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgba) {
        let (px, py) = self.to_px(cx, cy);
        let mut pb = PathBuilder::new();
        pb.push_circle(px, py, self.px(radius));
        if let Some(path) = pb.finish() {
            self.pixmap.fill_path(
                &path,
                &paint(color),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    fn stroke_circle(&mut self, cx: f64, cy: f64, radius: f64, line_width: f64, color: Rgba) {
        let (px, py) = self.to_px(cx, cy);
        let mut pb = PathBuilder::new();
        pb.push_circle(px, py, self.px(radius));
        if let Some(path) = pb.finish() {
            let stroke = Stroke {
                width: self.px(line_width).max(1.0),
                ..Stroke::default()
            };
            self.pixmap
                .stroke_path(&path, &paint(color), &stroke, Transform::identity(), None);
        }
    }

    fn fill_pie(
        &mut self,
        cx: f64,
        cy: f64,
        radius: f64,
        start_deg: f64,
        end_deg: f64,
        color: Rgba,
    ) {
        let (start, end) = (start_deg.min(end_deg) as f32, start_deg.max(end_deg) as f32);
        if end - start < f32::EPSILON {
            return;
        }
        let (px, py) = self.to_px(cx, cy);
        let r = self.px(radius);

        // Arc as short chords; 2 degrees per segment is invisible at
        // stimulus sizes.
        let mut pb = PathBuilder::new();
        pb.move_to(px, py);
        let steps = (((end - start) / 2.0).ceil() as usize).max(1);
        for i in 0..=steps {
            let deg = start + (end - start) * i as f32 / steps as f32;
            let (ax, ay) = pie_point(px, py, r, deg);
            pb.line_to(ax, ay);
        }
        pb.close();
        if let Some(path) = pb.finish() {
            self.pixmap.fill_path(
                &path,
                &paint(color),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    fn stroke_line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, line_width: f64, color: Rgba) {
        let (ax, ay) = self.to_px(x0, y0);
        let (bx, by) = self.to_px(x1, y1);
        let mut pb = PathBuilder::new();
        pb.move_to(ax, ay);
        pb.line_to(bx, by);
        if let Some(path) = pb.finish() {
            let stroke = Stroke {
                width: self.px(line_width).max(1.0),
                ..Stroke::default()
            };
            self.pixmap
                .stroke_path(&path, &paint(color), &stroke, Transform::identity(), None);
        }
    }

    fn draw_text(&mut self, text: &str, cx: f64, cy: f64, height: f64, color: Rgba) {
        let (sx, sy) = self.to_px(cx, cy);
        let px_scale = PxScale::from(self.px(height).max(1.0));
        let font = &self.font;
        let sf = font.as_scaled(px_scale);

        // Lay the line out with kerning, baseline at the ascent.
        let mut pen_x = 0.0f32;
        let mut glyphs = Vec::<Glyph>::new();
        for ch in text.chars() {
            let id = font.glyph_id(ch);
            if let Some(prev) = glyphs.last() {
                pen_x += sf.kern(prev.id, id);
            }
            glyphs.push(Glyph {
                id,
                scale: px_scale,
                position: point(pen_x, sf.ascent()),
            });
            pen_x += sf.h_advance(id);
        }

        let mut min_x = f32::INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut max_y = f32::NEG_INFINITY;
        for g in &glyphs {
            if let Some(out) = font.outline_glyph(g.clone()) {
                let b = out.px_bounds();
                min_x = min_x.min(b.min.x);
                min_y = min_y.min(b.min.y);
                max_x = max_x.max(b.max.x);
                max_y = max_y.max(b.max.y);
            }
        }
        if min_x == f32::INFINITY {
            return;
        }

        let offset_x = sx - (min_x + max_x) / 2.0;
        let offset_y = sy - (min_y + max_y) / 2.0;

        let pixmap = &mut self.pixmap;
        for g in &glyphs {
            if let Some(out) = font.outline_glyph(g.clone()) {
                let b = out.px_bounds();
                out.draw(|gx, gy, coverage| {
                    let x = (b.min.x + gx as f32 + offset_x).round() as i32;
                    let y = (b.min.y + gy as f32 + offset_y).round() as i32;
                    blend_pixel(pixmap, x, y, color, coverage);
                });
            }
        }
    }
}

/// Source-over blend of one coverage sample into the premultiplied
/// pixmap.
fn blend_pixel(pixmap: &mut Pixmap, x: i32, y: i32, color: Rgba, coverage: f32) {
    if x < 0 || y < 0 || x >= pixmap.width() as i32 || y >= pixmap.height() as i32 {
        return;
    }
    let alpha = (color[3] as f32 / 255.0 * coverage).clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }
    let idx = y as usize * pixmap.width() as usize + x as usize;
    let pixels = pixmap.pixels_mut();
    let dst = pixels[idx];

    let blend = |src: u8, dst: u8| -> u8 {
        let s = src as f32 / 255.0 * alpha;
        let d = dst as f32 / 255.0 * (1.0 - alpha);
        ((s + d) * 255.0).round().clamp(0.0, 255.0) as u8
    };
    let out = PremultipliedColorU8::from_rgba(
        blend(color[0], dst.red()),
        blend(color[1], dst.green()),
        blend(color[2], dst.blue()),
        blend(255, dst.alpha()),
    );
    if let Some(out) = out {
        pixels[idx] = out;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Shape rasterization needs a real font only because the
    // constructor parses one; text tests are skipped when no system
    // font is available.
    fn test_font() -> Option<Vec<u8>> {
        [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        ]
        .iter()
        .find_map(|p| std::fs::read(p).ok())
    }

    fn lit_pixels(s: &SkiaSurface) -> usize {
        s.pixmap()
            .pixels()
            .iter()
            .filter(|p| p.alpha() != 0)
            .count()
    }

    #[test]
    fn fill_rect_touches_expected_area() {
        let Some(bytes) = test_font() else { return };
        let mut s = SkiaSurface::new(200, 100, 10.0, bytes).unwrap();
        s.fill_rect(0.0, 0.0, 2.0, 2.0, [255, 255, 255, 255]);
        // 2x2 units at 10 px/unit = ~400 px.
        let lit = lit_pixels(&s);
        assert!((350..=450).contains(&lit), "lit {lit}");
    }

    #[test]
    fn half_pie_covers_half_the_circle() {
        let Some(bytes) = test_font() else { return };
        let mut s = SkiaSurface::new(200, 200, 10.0, bytes.clone()).unwrap();
        s.fill_pie(0.0, 0.0, 5.0, 0.0, 360.0, [255, 255, 255, 255]);
        let full = lit_pixels(&s);

        let mut half = SkiaSurface::new(200, 200, 10.0, bytes).unwrap();
        half.fill_pie(0.0, 0.0, 5.0, 0.0, 180.0, [255, 255, 255, 255]);
        let half_lit = lit_pixels(&half);
        assert!(
            (half_lit as f64 - full as f64 / 2.0).abs() < full as f64 * 0.05,
            "full {full}, half {half_lit}"
        );
    }

    #[test]
    fn text_marks_pixels() {
        let Some(bytes) = test_font() else { return };
        let mut s = SkiaSurface::new(200, 100, 10.0, bytes).unwrap();
        s.draw_text("$15.00", 0.0, 0.0, 1.0, [255, 255, 255, 255]);
        assert!(lit_pixels(&s) > 0);
    }

    #[test]
    fn zero_sized_surface_is_an_error() {
        assert!(SkiaSurface::new(0, 10, 1.0, Vec::new()).is_err());
    }
}
