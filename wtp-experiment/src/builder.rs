//! Builds the experiment's trial list from configuration.

use crate::config::TaskConfig;
use crate::trial::{CueTrial, SliderSet, TaskTrial, TrialKind};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;
use wtp_core::{ConfigurationError, Scale};
use wtp_widgets::{RangeResponseSlider, ResponseSlider, SliderParams};

pub enum Trial {
    Cue(CueTrial),
    Task(TaskTrial),
}

/// Probability blocks, each announced by a cue trial and followed by
/// one task trial per shuffled payoff; jitters cycle through the
/// configured ISI list in trial order.
pub fn build_trials(
    config: &TaskConfig,
    rng: &mut impl Rng,
) -> Result<Vec<Trial>, ConfigurationError> {
    config.validate()?;

    let mut probs = config.task.probabilities.clone();
    probs.shuffle(rng);

    let n_task_trials = config.task.n_trials;
    let n_per_block = n_task_trials / probs.len();
    let isis: Vec<f64> = config
        .durations
        .isi
        .iter()
        .copied()
        .cycle()
        .take(n_task_trials)
        .collect();

    let mut trials = Vec::with_capacity(n_task_trials + probs.len());
    let mut trial_nr = 1usize;
    for &prob in &probs {
        trials.push(Trial::Cue(CueTrial::new(
            prob,
            config.prob_cue.cue_size,
            config.durations.cue_trials,
        )));

        let mut payoffs: Vec<f64> = config
            .task
            .payoffs
            .iter()
            .copied()
            .cycle()
            .take(n_per_block)
            .collect();
        payoffs.shuffle(rng);
        for &payoff in &payoffs {
            let jitter = isis[trial_nr - 1];
            trials.push(Trial::Task(TaskTrial::new(
                config, trial_nr, prob, payoff, jitter, rng,
            )?));
            trial_nr += 1;
        }
    }

    info!(
        n_trials = n_task_trials,
        n_blocks = probs.len(),
        kind = ?config.task.kind,
        "trial list built"
    );
    Ok(trials)
}

/// Wires the slider widgets a session owns, per trial kind: a single
/// point slider, a coarse range slider plus refinement slider, or a
/// bin slider plus refinement slider.
pub fn build_slider_set(
    config: &TaskConfig,
    rng: &mut impl Rng,
) -> Result<SliderSet, ConfigurationError> {
    let range = config.slider_range()?;
    let base = |scale: Scale| {
        let mut params = SliderParams::new(
            range,
            (0.0, 0.0),
            config.slider.max_length,
            config.slider.height,
        );
        params.scale = scale;
        params.color = config.slider.color;
        params.border_color = config.slider.border_color;
        params.marker_color = config.slider.marker_color;
        params.text_height = config.slider.text_height;
        params
    };

    let set = match config.task.kind {
        TrialKind::Single => SliderSet {
            first: Box::new(ResponseSlider::new(base(config.slider.scale), rng)?),
            second: None,
        },
        TrialKind::TwoStage => SliderSet {
            first: Box::new(RangeResponseSlider::new(
                base(config.slider.scale),
                config.slider.sub_window_proportion,
                rng,
            )?),
            // Range is reassigned to the chosen sub-window at the
            // stage-0 commit; the refinement slider is linear within
            // it regardless of the coarse scale.
            second: Some(Box::new(ResponseSlider::new(base(Scale::Linear), rng)?)),
        },
        TrialKind::TwoSlider => SliderSet {
            first: Box::new(ResponseSlider::new(base(config.slider.scale), rng)?),
            second: Some(Box::new(ResponseSlider::new(base(Scale::Linear), rng)?)),
        },
    };
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use wtp_widgets::Slider;

    #[test]
    fn builds_cue_plus_task_trials() {
        let config = TaskConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let trials = build_trials(&config, &mut rng).unwrap();

        let n_probs = config.task.probabilities.len();
        let n_per_block = config.task.n_trials / n_probs;
        assert_eq!(trials.len(), n_probs + config.task.n_trials);

        // Each block starts with a cue trial.
        assert!(matches!(trials[0], Trial::Cue(_)));
        assert!(matches!(trials[1], Trial::Task(_)));
        assert!(matches!(trials[n_per_block + 1], Trial::Cue(_)));
    }

    #[test]
    fn task_trial_numbers_are_sequential() {
        let config = TaskConfig::default();
        let mut rng = StdRng::seed_from_u64(2);
        let trials = build_trials(&config, &mut rng).unwrap();
        let numbers: Vec<usize> = trials
            .iter()
            .filter_map(|t| match t {
                Trial::Task(t) => Some(t.trial_nr),
                Trial::Cue(_) => None,
            })
            .collect();
        let expected: Vec<usize> = (1..=numbers.len()).collect();
        assert_eq!(numbers, expected);
    }

    #[test]
    fn invalid_ratio_fails_before_any_trial() {
        let mut config = TaskConfig::default();
        config.task.n_trials = 7;
        let mut rng = StdRng::seed_from_u64(3);
        assert!(matches!(
            build_trials(&config, &mut rng),
            Err(ConfigurationError::TrialCountMismatch { .. })
        ));
    }

    #[test]
    fn slider_set_matches_kind() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut config = TaskConfig::default();

        let set = build_slider_set(&config, &mut rng).unwrap();
        assert!(set.second.is_none());

        config.task.kind = TrialKind::TwoStage;
        let set = build_slider_set(&config, &mut rng).unwrap();
        assert!(set.second.is_some());
        // Coarse slider range is deflated by half a window per side.
        assert_eq!(set.first.range().low(), 3.0);
        assert_eq!(set.first.range().high(), 57.0);
    }
}
