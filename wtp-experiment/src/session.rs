use crate::builder::{build_slider_set, build_trials, Trial};
use crate::config::TaskConfig;
use crate::log::TrialLog;
use crate::trial::{SliderSet, TrialStatus};
use rand::Rng;
use tracing::info;
use wtp_core::stim::FixationLines;
use wtp_core::{ConfigurationError, DomainError, Pointer, Surface};
use wtp_timing::Clock;

const FIXATION_COLOR: [u8; 4] = [255, 64, 64, 255];

/// Owns the trial list, the slider widgets, and the session log.
/// Exactly one trial is active at a time and borrows the widget set
/// for the duration of a frame; nothing else mutates it.
pub struct Session<C: Clock, R: Rng> {
    pub config: TaskConfig,
    clock: C,
    rng: R,
    trials: Vec<Trial>,
    current: usize,
    widgets: SliderSet,
    fixation: FixationLines,
    log: TrialLog,
}

impl<C: Clock, R: Rng> Session<C, R> {
    pub fn new(config: TaskConfig, clock: C, mut rng: R) -> Result<Self, ConfigurationError> {
        let trials = build_trials(&config, &mut rng)?;
        let widgets = build_slider_set(&config, &mut rng)?;
        let fixation = FixationLines::new(
            config.cloud.aperture_radius,
            FIXATION_COLOR,
            config.interface.screen_extent,
        );
        info!(trials = trials.len(), "session ready");
        Ok(Self {
            config,
            clock,
            rng,
            trials,
            current: 0,
            widgets,
            fixation,
            log: TrialLog::new(),
        })
    }

    pub fn finished(&self) -> bool {
        self.current >= self.trials.len()
    }

    pub fn log(&self) -> &TrialLog {
        &self.log
    }

    pub fn into_log(self) -> TrialLog {
        self.log
    }

    /// One frame of session logic: update the active trial, draw it,
    /// and move on when it finishes. Returns `false` once the trial
    /// list is exhausted.
    pub fn tick(
        &mut self,
        pointer: &mut dyn Pointer,
        surface: &mut dyn Surface,
    ) -> Result<bool, DomainError> {
        let now = self.clock.now();
        if self.finished() {
            return Ok(false);
        }

        match &mut self.trials[self.current] {
            Trial::Cue(trial) => {
                if !trial.started() {
                    trial.start(now, &mut self.log);
                }
                if trial.frame(now) == TrialStatus::Finished {
                    self.current += 1;
                } else {
                    trial.draw(surface);
                }
            }
            Trial::Task(trial) => {
                if !trial.started() {
                    trial.start(now, &mut self.widgets, &mut self.log);
                }
                let status =
                    trial.frame(now, pointer, &mut self.widgets, &mut self.rng, &mut self.log)?;
                if status == TrialStatus::Finished {
                    self.log
                        .append_params(trial.trial_nr as i64, now, trial.params.clone());
                    self.current += 1;
                } else {
                    trial.draw(&self.widgets, &mut self.fixation, surface);
                }
            }
        }

        if self.finished() {
            info!("session complete");
        }
        Ok(!self.finished())
    }
}
