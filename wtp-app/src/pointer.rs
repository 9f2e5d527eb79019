use std::sync::Arc;

use winit::dpi::PhysicalPosition;
use winit::window::Window;
use wtp_core::{Pointer, PointerAccessError};

/// Mouse state fed from the winit event stream, exposed to the task in
/// centered slider units (y up).
pub struct WinitPointer {
    window: Arc<Window>,
    /// Pixels per slider unit.
    px_per_unit: f64,
    size: (f64, f64),
    pos_px: (f64, f64),
    buttons: (bool, bool, bool),
}

impl WinitPointer {
    pub fn new(window: Arc<Window>, px_per_unit: f64, width: u32, height: u32) -> Self {
        Self {
            window,
            px_per_unit,
            size: (width as f64, height as f64),
            pos_px: (width as f64 / 2.0, height as f64 / 2.0),
            buttons: (false, false, false),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32, px_per_unit: f64) {
        self.size = (width as f64, height as f64);
        self.px_per_unit = px_per_unit;
    }

    pub fn on_cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        self.pos_px = (position.x, position.y);
    }

    pub fn on_button(&mut self, button: winit::event::MouseButton, pressed: bool) {
        use winit::event::MouseButton;
        match button {
            MouseButton::Left => self.buttons.0 = pressed,
            MouseButton::Middle => self.buttons.1 = pressed,
            MouseButton::Right => self.buttons.2 = pressed,
            _ => {}
        }
    }

    fn to_units(&self, px: (f64, f64)) -> (f64, f64) {
        (
            (px.0 - self.size.0 / 2.0) / self.px_per_unit,
            (self.size.1 / 2.0 - px.1) / self.px_per_unit,
        )
    }

    fn to_px(&self, units: (f64, f64)) -> (f64, f64) {
        (
            self.size.0 / 2.0 + units.0 * self.px_per_unit,
            self.size.1 / 2.0 - units.1 * self.px_per_unit,
        )
    }
}

impl Pointer for WinitPointer {
    fn position(&self) -> Result<(f64, f64), PointerAccessError> {
        Ok(self.to_units(self.pos_px))
    }

    fn pressed(&self) -> Result<(bool, bool, bool), PointerAccessError> {
        Ok(self.buttons)
    }

    fn set_position(&mut self, pos: (f64, f64)) -> Result<(), PointerAccessError> {
        let px = self.to_px(pos);
        self.window
            .set_cursor_position(PhysicalPosition::new(px.0, px.1))
            .map_err(|e| PointerAccessError(format!("cursor warp failed: {e}")))?;
        // The matching CursorMoved may arrive a frame late; keep the
        // cached position consistent with what was just requested.
        self.pos_px = px;
        Ok(())
    }
}
