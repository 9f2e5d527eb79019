use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};

/// Named phases of a task trial, in presentation order. `Response2`
/// only appears in the two-stage and two-slider variants. `Iti` is
/// the spillover phase that absorbs early responses so every trial
/// takes the same wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseName {
    Fixation1,
    ProbCue,
    Stimulus,
    Jitter,
    Response,
    Response2,
    Feedback,
    Iti,
}

impl PhaseName {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseName::Fixation1 => "fixation1",
            PhaseName::ProbCue => "prob_cue",
            PhaseName::Stimulus => "stimulus",
            PhaseName::Jitter => "jitter",
            PhaseName::Response => "response",
            PhaseName::Response2 => "response2",
            PhaseName::Feedback => "feedback",
            PhaseName::Iti => "iti",
        }
    }

    pub fn is_response(&self) -> bool {
        matches!(self, PhaseName::Response | PhaseName::Response2)
    }
}

/// Ordered `(name, duration)` schedule for one trial. Durations are
/// seconds; the last entry is the adjustable spillover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSchedule {
    entries: Vec<(PhaseName, f64)>,
    total: f64,
}

impl PhaseSchedule {
    pub fn new(entries: Vec<(PhaseName, f64)>) -> Result<Self, ConfigurationError> {
        if entries.is_empty() {
            return Err(ConfigurationError::EmptyConditionList("phase"));
        }
        for &(_, d) in &entries {
            if d < 0.0 || !d.is_finite() {
                return Err(ConfigurationError::NegativeDuration(d));
            }
        }
        let total = entries.iter().map(|&(_, d)| d).sum();
        Ok(Self { entries, total })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn name(&self, idx: usize) -> PhaseName {
        self.entries[idx].0
    }

    pub fn duration(&self, idx: usize) -> f64 {
        self.entries[idx].1
    }

    /// Index of the first phase with the given name, if present.
    pub fn index_of(&self, name: PhaseName) -> Option<usize> {
        self.entries.iter().position(|&(n, _)| n == name)
    }

    /// Total scheduled duration. Invariant under
    /// [`stop_early`](Self::stop_early).
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Sum of the currently scheduled durations.
    pub fn scheduled_sum(&self) -> f64 {
        self.entries.iter().map(|&(_, d)| d).sum()
    }

    /// Ends phase `idx` after `elapsed` seconds instead of its full
    /// duration, handing the unused remainder to the spillover phase
    /// so the trial total stays fixed.
    pub fn stop_early(&mut self, idx: usize, elapsed: f64) {
        let last = self.entries.len() - 1;
        if idx >= last {
            return;
        }
        let elapsed = elapsed.clamp(0.0, self.entries[idx].1);
        let remainder = self.entries[idx].1 - elapsed;
        self.entries[idx].1 = elapsed;
        self.entries[last].1 += remainder;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule() -> PhaseSchedule {
        PhaseSchedule::new(vec![
            (PhaseName::Fixation1, 0.5),
            (PhaseName::Stimulus, 1.0),
            (PhaseName::Response, 3.0),
            (PhaseName::Feedback, 0.75),
            (PhaseName::Iti, 1.0),
        ])
        .unwrap()
    }

    #[test]
    fn rejects_negative_durations() {
        let err = PhaseSchedule::new(vec![(PhaseName::Fixation1, -0.1)]);
        assert!(matches!(err, Err(ConfigurationError::NegativeDuration(_))));
    }

    #[test]
    fn early_stop_conserves_total() {
        let mut s = schedule();
        let total = s.total();
        s.stop_early(2, 1.2);
        assert!((s.scheduled_sum() - total).abs() < 1e-12);
        assert_eq!(s.duration(2), 1.2);
        assert!((s.duration(4) - 2.8).abs() < 1e-12);
    }

    #[test]
    fn early_stop_on_spillover_is_a_no_op() {
        let mut s = schedule();
        let before = s.clone();
        s.stop_early(4, 0.1);
        assert_eq!(s, before);
    }

    #[test]
    fn index_of_finds_phases() {
        let s = schedule();
        assert_eq!(s.index_of(PhaseName::Response), Some(2));
        assert_eq!(s.index_of(PhaseName::Response2), None);
    }
}
