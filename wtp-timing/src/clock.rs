use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Trial-relative clock. Monotonic within a session; the zero point
/// is whenever the clock was constructed or last reset.
pub trait Clock {
    /// Seconds elapsed since the clock's zero point.
    fn now(&self) -> f64;

    fn elapsed_since(&self, t0: f64) -> f64 {
        self.now() - t0
    }
}

/// Wall clock over `std::time::Instant`.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Manually stepped clock for driving state-machine tests one frame
/// at a time. Clones share the underlying time, so a test can hold
/// one handle while the session holds another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    t: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, dt: f64) {
        self.t.set(self.t.get() + dt);
    }

    pub fn set(&self, t: f64) {
        debug_assert!(t >= self.t.get(), "manual clock must not run backwards");
        self.t.set(t);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.t.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances() {
        let c = ManualClock::new();
        assert_eq!(c.now(), 0.0);
        c.advance(0.016);
        c.advance(0.016);
        assert!((c.now() - 0.032).abs() < 1e-12);
        assert!((c.elapsed_since(0.016) - 0.016).abs() < 1e-12);
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let a = ManualClock::new();
        let b = a.clone();
        a.advance(1.5);
        assert_eq!(b.now(), 1.5);
    }

    #[test]
    fn monotonic_clock_does_not_go_backwards() {
        let c = MonotonicClock::new();
        let a = c.now();
        let b = c.now();
        assert!(b >= a);
    }
}
