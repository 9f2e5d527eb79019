use crate::trial::TrialKind;
use serde::{Deserialize, Serialize};
use wtp_core::{ConfigurationError, Range, Rgba, Scale, ScaledRange};

/// Full experiment configuration, loadable from JSON. Section names
/// follow the settings file of the original task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    pub task: TaskSection,
    pub durations: DurationsSection,
    pub slider: SliderSection,
    pub prob_cue: ProbCueSection,
    pub cloud: CloudSection,
    pub interface: InterfaceSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskSection {
    pub n_trials: usize,
    pub probabilities: Vec<f64>,
    pub payoffs: Vec<f64>,
    pub show_prob_during_payoff: bool,
    pub kind: TrialKind,
}

impl Default for TaskSection {
    fn default() -> Self {
        Self {
            n_trials: 8,
            probabilities: vec![0.55, 1.0],
            payoffs: vec![5.0, 10.0, 15.0, 20.0],
            show_prob_during_payoff: true,
            kind: TrialKind::Single,
        }
    }
}

/// Phase durations in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DurationsSection {
    pub first_fixation: f64,
    pub prob_cue: f64,
    pub array_duration: f64,
    /// Inter-stimulus jitters, cycled over the trial list.
    pub isi: Vec<f64>,
    pub response_screen: f64,
    /// Second response window for the two-stage / two-slider kinds.
    pub second_response_screen: f64,
    pub feedback: f64,
    /// Duration of the stand-alone probability cue trials.
    pub cue_trials: f64,
}

impl Default for DurationsSection {
    fn default() -> Self {
        Self {
            first_fixation: 0.5,
            prob_cue: 0.5,
            array_duration: 1.5,
            isi: vec![3.0, 5.0, 7.0],
            response_screen: 3.0,
            second_response_screen: 3.0,
            feedback: 0.75,
            cue_trials: 4.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SliderSection {
    pub range: (f64, f64),
    pub scale: Scale,
    pub max_length: f64,
    pub height: f64,
    pub color: Rgba,
    pub border_color: Rgba,
    pub marker_color: Rgba,
    pub feedback_color: Rgba,
    pub text_height: f64,
    /// Sub-window width as a proportion of the range, for the
    /// two-stage coarse slider.
    pub sub_window_proportion: f64,
    /// Bin count for the two-slider kind.
    pub n_discrete_bins: usize,
    /// Minimum dwell before a press is honored in the second response
    /// window of the two-slider kind.
    pub dwell_secs: f64,
}

impl Default for SliderSection {
    fn default() -> Self {
        Self {
            range: (0.0, 60.0),
            scale: Scale::Linear,
            max_length: 15.0,
            height: 1.0,
            color: [128, 128, 128, 255],
            border_color: [255, 255, 255, 255],
            marker_color: [64, 64, 64, 255],
            feedback_color: [60, 179, 113, 255],
            text_height: 0.5,
            sub_window_proportion: 0.1,
            n_discrete_bins: 6,
            dwell_secs: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbCueSection {
    /// Pie size in the stand-alone cue trials.
    pub cue_size: f64,
    /// Pie size when drawn at fixation during the payoff array.
    pub fixation_size: f64,
}

impl Default for ProbCueSection {
    fn default() -> Self {
        Self {
            cue_size: 2.0,
            fixation_size: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudSection {
    pub aperture_radius: f64,
    pub dot_radius: f64,
}

impl Default for CloudSection {
    fn default() -> Self {
        Self {
            aperture_radius: 4.0,
            dot_radius: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceSection {
    /// Pointer sensitivity divisor applied before value mapping.
    pub mouse_multiplier: f64,
    /// Minimum raw pointer movement before the marker follows.
    pub movement_threshold: f64,
    /// Half-extent of the display in slider units; the fixation
    /// diagonals run out to it.
    pub screen_extent: f64,
}

impl Default for InterfaceSection {
    fn default() -> Self {
        Self {
            mouse_multiplier: 1.0,
            movement_threshold: 0.05,
            screen_extent: 20.0,
        }
    }
}

impl TaskConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigurationError> {
        let config: Self =
            serde_json::from_str(s).map_err(|e| ConfigurationError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn slider_range(&self) -> Result<Range, ConfigurationError> {
        Ok(Range::new(self.slider.range.0, self.slider.range.1)?)
    }

    /// Fatal checks run before any trial is built.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.task.probabilities.is_empty() {
            return Err(ConfigurationError::EmptyConditionList("probabilities"));
        }
        if self.task.payoffs.is_empty() {
            return Err(ConfigurationError::EmptyConditionList("payoffs"));
        }
        if self.durations.isi.is_empty() {
            return Err(ConfigurationError::EmptyConditionList("isi"));
        }
        if self.task.n_trials % self.task.probabilities.len() != 0 {
            return Err(ConfigurationError::TrialCountMismatch {
                n_trials: self.task.n_trials,
                what: "probabilities",
                n: self.task.probabilities.len(),
            });
        }
        if self.task.n_trials % self.task.payoffs.len() != 0 {
            return Err(ConfigurationError::TrialCountMismatch {
                n_trials: self.task.n_trials,
                what: "payoffs",
                n: self.task.payoffs.len(),
            });
        }
        // Surfaces an invalid range/scale pair before the session
        // constructs any widget.
        ScaledRange::new(self.slider_range()?, self.slider.scale)?;
        if self.task.kind == TrialKind::TwoStage
            && !(0.0 < self.slider.sub_window_proportion && self.slider.sub_window_proportion < 1.0)
        {
            return Err(ConfigurationError::Domain(
                wtp_core::DomainError::BadProportion(self.slider.sub_window_proportion),
            ));
        }
        if self.task.kind == TrialKind::TwoSlider && self.slider.n_discrete_bins < 2 {
            return Err(ConfigurationError::TooFewBins(self.slider.n_discrete_bins));
        }
        if self.interface.mouse_multiplier <= 0.0 {
            return Err(ConfigurationError::BadMultiplier(
                self.interface.mouse_multiplier,
            ));
        }
        for &d in [
            self.durations.first_fixation,
            self.durations.prob_cue,
            self.durations.array_duration,
            self.durations.response_screen,
            self.durations.second_response_screen,
            self.durations.feedback,
            self.durations.cue_trials,
            self.slider.dwell_secs,
        ]
        .iter()
        .chain(&self.durations.isi)
        {
            if d < 0.0 || !d.is_finite() {
                return Err(ConfigurationError::NegativeDuration(d));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        TaskConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_indivisible_trial_count() {
        let mut c = TaskConfig::default();
        c.task.n_trials = 9;
        assert!(matches!(
            c.validate(),
            Err(ConfigurationError::TrialCountMismatch { .. })
        ));
    }

    #[test]
    fn rejects_log_scale_over_zero_bound() {
        let mut c = TaskConfig::default();
        c.slider.scale = Scale::Log;
        c.slider.range = (0.0, 60.0);
        assert!(matches!(c.validate(), Err(ConfigurationError::Domain(_))));
    }

    #[test]
    fn parses_partial_json() {
        let c = TaskConfig::from_json_str(
            r#"{ "task": { "n_trials": 4, "probabilities": [0.5], "payoffs": [10.0, 20.0] } }"#,
        )
        .unwrap();
        assert_eq!(c.task.n_trials, 4);
        assert_eq!(c.slider.range, (0.0, 60.0));
    }

    #[test]
    fn bad_json_is_a_parse_error() {
        assert!(matches!(
            TaskConfig::from_json_str("{ nope"),
            Err(ConfigurationError::Parse(_))
        ));
    }
}
