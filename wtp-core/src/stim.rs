//! Passive visual stimuli: draw composition only, no input logic.

use crate::surface::{Rgba, Surface};

/// Central fixation cross plus the outer "wagon wheel" diagonals and
/// aperture circle that frame the stimulus cloud.
#[derive(Debug, Clone)]
pub struct FixationLines {
    pub circle_radius: f64,
    pub center_size: f64,
    pub line_width: f64,
    cross_color: Rgba,
    frame_color: Rgba,
    max_extent: f64,
    draw_circle: bool,
    draw_outer_cross: bool,
}

impl FixationLines {
    pub fn new(circle_radius: f64, color: Rgba, max_extent: f64) -> Self {
        Self {
            circle_radius,
            center_size: 0.25,
            line_width: 0.1,
            cross_color: color,
            frame_color: color,
            max_extent,
            draw_circle: true,
            draw_outer_cross: true,
        }
    }

    /// Recolors the center cross, and unless `cross_only`, the outer
    /// frame as well.
    pub fn set_color(&mut self, color: Rgba, cross_only: bool) {
        self.cross_color = color;
        if !cross_only {
            self.frame_color = color;
        }
    }

    pub fn draw(&self, surface: &mut dyn Surface, with_cross: bool) {
        let s = self.center_size;
        if with_cross {
            surface.stroke_line(-s, -s, s, s, self.line_width, self.cross_color);
            surface.stroke_line(-s, s, s, -s, self.line_width, self.cross_color);
        }

        if self.draw_outer_cross {
            // Diagonals start just outside the aperture and run off
            // the screen.
            let c = self.circle_radius * 1.1 * (std::f64::consts::FRAC_PI_4).cos();
            let m = self.max_extent;
            surface.stroke_line(-c, -c, -m, -m, self.line_width, self.frame_color);
            surface.stroke_line(c, c, m, m, self.line_width, self.frame_color);
            surface.stroke_line(-c, c, -m, m, self.line_width, self.frame_color);
            surface.stroke_line(c, -c, m, -m, self.line_width, self.frame_color);
        }

        if self.draw_circle {
            surface.stroke_circle(
                0.0,
                0.0,
                self.circle_radius * 1.1,
                self.line_width,
                self.frame_color,
            );
        }
    }
}

/// Two-wedge pie chart cueing the win probability, with an optional
/// percentage label above it.
#[derive(Debug, Clone)]
pub struct ProbabilityPieChart {
    pub prob: f64,
    pub size: f64,
    pub pos: (f64, f64),
    pub color_pos: Rgba,
    pub color_neg: Rgba,
    pub label: Option<String>,
}

impl ProbabilityPieChart {
    pub fn new(prob: f64, size: f64, pos: (f64, f64), include_text: bool) -> Self {
        Self {
            prob,
            size,
            pos,
            color_pos: [210, 210, 210, 255],
            color_neg: [45, 45, 45, 255],
            label: include_text.then(|| format!("{:.0}%", prob * 100.0)),
        }
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        let deg = self.prob * 360.0;
        let (x, y) = self.pos;
        surface.fill_pie(x, y, self.size / 2.0, 0.0, deg, self.color_pos);
        surface.fill_pie(x, y, self.size / 2.0, deg, 360.0, self.color_neg);
        if let Some(label) = &self.label {
            surface.draw_text(label, x, y + self.size, self.size * 0.375, [255, 255, 255, 255]);
        }
    }
}

/// Payoff dot cloud inside the fixation aperture. Positions are
/// pre-scattered by the caller so this type stays free of RNG state.
#[derive(Debug, Clone)]
pub struct DotArray {
    pub dot_radius: f64,
    pub color: Rgba,
    positions: Vec<(f64, f64)>,
}

impl DotArray {
    pub fn new(positions: Vec<(f64, f64)>, dot_radius: f64) -> Self {
        Self {
            dot_radius,
            color: [230, 200, 60, 255],
            positions,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        for &(x, y) in &self.positions {
            surface.fill_circle(x, y, self.dot_radius, self.color);
        }
    }
}
