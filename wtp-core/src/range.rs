use crate::error::DomainError;
use serde::{Deserialize, Serialize};

/// Closed value interval. All marker values live inside one of these;
/// every mutation clips back into it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    low: f64,
    high: f64,
}

impl Range {
    pub fn new(low: f64, high: f64) -> Result<Self, DomainError> {
        if !(low < high) {
            return Err(DomainError::InvertedRange { low, high });
        }
        Ok(Self { low, high })
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    pub fn clip(&self, value: f64) -> f64 {
        value.clamp(self.low, self.high)
    }

    pub fn contains(&self, value: f64) -> bool {
        self.low <= value && value <= self.high
    }

    /// Shrinks the interval by `margin` on each side.
    pub fn deflate(&self, margin: f64) -> Result<Self, DomainError> {
        Self::new(self.low + margin, self.high - margin)
    }
}

/// How a slider maps values onto its bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scale {
    #[default]
    Linear,
    Log,
}

/// A range paired with a validated scale. A logarithmic scale over a
/// non-positive lower bound has no valid mapping, so the pair is
/// checked once here instead of on every conversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaledRange {
    range: Range,
    scale: Scale,
}

impl ScaledRange {
    pub fn new(range: Range, scale: Scale) -> Result<Self, DomainError> {
        if scale == Scale::Log && range.low() <= 0.0 {
            return Err(DomainError::NonPositiveLogBound { low: range.low() });
        }
        Ok(Self { range, scale })
    }

    pub fn range(&self) -> Range {
        self.range
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// Replaces the range, keeping the scale and re-running the
    /// log-bound check.
    pub fn with_range(&self, range: Range) -> Result<Self, DomainError> {
        Self::new(range, self.scale)
    }

    /// Fraction of the way through the range a value sits, in the
    /// active scale. Exactly 0.0 / 1.0 at the bounds.
    pub fn fraction_of(&self, value: f64) -> f64 {
        let value = self.range.clip(value);
        match self.scale {
            Scale::Linear => {
                if value == self.range.high {
                    1.0
                } else {
                    (value - self.range.low) / self.range.width()
                }
            }
            Scale::Log => {
                if value == self.range.high {
                    1.0
                } else {
                    let log_min = self.range.low.log10();
                    let log_max = self.range.high.log10();
                    (value.log10() - log_min) / (log_max - log_min)
                }
            }
        }
    }

    /// Inverse of [`fraction_of`](Self::fraction_of); `fraction` is
    /// clipped to [0, 1] first.
    pub fn value_at(&self, fraction: f64) -> f64 {
        let fraction = fraction.clamp(0.0, 1.0);
        match self.scale {
            Scale::Linear => {
                if fraction == 1.0 {
                    self.range.high
                } else {
                    self.range.low + fraction * self.range.width()
                }
            }
            Scale::Log => {
                if fraction == 1.0 {
                    self.range.high
                } else if fraction == 0.0 {
                    self.range.low
                } else {
                    let log_min = self.range.low.log10();
                    let log_max = self.range.high.log10();
                    10f64.powf(log_min + fraction * (log_max - log_min))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_inverted_range() {
        assert!(matches!(
            Range::new(10.0, 10.0),
            Err(DomainError::InvertedRange { .. })
        ));
        assert!(matches!(
            Range::new(5.0, -5.0),
            Err(DomainError::InvertedRange { .. })
        ));
    }

    #[test]
    fn clip_stays_inclusive() {
        let r = Range::new(0.0, 100.0).unwrap();
        assert_eq!(r.clip(-3.0), 0.0);
        assert_eq!(r.clip(250.0), 100.0);
        assert_eq!(r.clip(42.0), 42.0);
        assert!(r.contains(0.0) && r.contains(100.0));
    }

    #[test]
    fn log_scale_needs_positive_low() {
        let r = Range::new(0.0, 10.0).unwrap();
        assert!(matches!(
            ScaledRange::new(r, Scale::Log),
            Err(DomainError::NonPositiveLogBound { .. })
        ));
        let r = Range::new(1.0, 10.0).unwrap();
        assert!(ScaledRange::new(r, Scale::Log).is_ok());
    }

    #[test]
    fn fractions_exact_at_bounds() {
        for scale in [Scale::Linear, Scale::Log] {
            let sr = ScaledRange::new(Range::new(1.0, 100.0).unwrap(), scale).unwrap();
            assert_eq!(sr.fraction_of(1.0), 0.0);
            assert_eq!(sr.fraction_of(100.0), 1.0);
            assert_eq!(sr.value_at(0.0), 1.0);
            assert_eq!(sr.value_at(1.0), 100.0);
        }
    }
}
