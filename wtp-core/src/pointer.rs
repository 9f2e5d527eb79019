use crate::error::PointerAccessError;

/// Pointer hardware behind a trait so trial logic can be driven by a
/// scripted pointer in tests. All three operations may fail on real
/// hardware; callers log and skip the frame rather than abort.
pub trait Pointer {
    /// Current pointer position in slider units.
    fn position(&self) -> Result<(f64, f64), PointerAccessError>;

    /// (left, middle, right) button state.
    fn pressed(&self) -> Result<(bool, bool, bool), PointerAccessError>;

    /// Warps the pointer. Best-effort: some platforms refuse.
    fn set_position(&mut self, pos: (f64, f64)) -> Result<(), PointerAccessError>;
}
