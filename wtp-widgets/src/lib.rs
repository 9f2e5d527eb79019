pub mod range_slider;
pub mod slider;

pub use range_slider::RangeResponseSlider;
pub use slider::{ResponseSlider, SliderParams};

use wtp_core::{DomainError, Range, Rgba, Surface};

/// Common surface of the slider family. Trials hold sliders behind
/// this trait so the single, two-stage, and two-slider variants can
/// share one polling path.
pub trait Slider {
    fn value(&self) -> f64;

    /// Clips into the effective range and recomputes the marker
    /// position.
    fn set_value(&mut self, value: f64);

    /// Inverse-maps a pointer x coordinate without mutating state.
    fn value_from_pointer(&self, x: f64) -> f64;

    fn visible(&self) -> bool;

    fn set_visible(&mut self, visible: bool);

    /// Marker center x, recomputed from the current value.
    fn marker_x(&self) -> f64;

    /// Effective range the marker value is confined to.
    fn range(&self) -> Range;

    /// Reassigns the effective range, clipping the value into it.
    fn set_range(&mut self, range: Range) -> Result<(), DomainError>;

    fn set_inner_color(&mut self, color: Rgba);

    /// Sub-window `[value - half, value + half]` for interval
    /// responses; `None` for point-response sliders.
    fn window(&self) -> Option<(f64, f64)>;

    fn draw(&self, surface: &mut dyn Surface);
}
