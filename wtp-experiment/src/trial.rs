//! Per-trial phase state machine.
//!
//! One `TaskTrial` is driven once per rendered frame by the session:
//! `frame()` advances expired phases, polls the pointer during the
//! response windows, and freezes the widgets once every required
//! response is in. All timing flows through the injected clock value;
//! nothing here blocks.

use crate::config::TaskConfig;
use crate::log::TrialLog;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use wtp_core::stim::{DotArray, FixationLines, ProbabilityPieChart};
use wtp_core::{
    ConfigurationError, DomainError, PhaseName, PhaseSchedule, Pointer, Range, Rgba, Surface,
    TrialParameters,
};
use wtp_widgets::Slider;

const CROSS_GREEN: Rgba = [0, 191, 0, 255];
const CROSS_RED: Rgba = [255, 64, 64, 255];
const TOO_LATE_COLOR: Rgba = [255, 64, 64, 255];

/// Trial variants share one phase runner; the kind only decides how
/// many response stages there are and how a stage-0 commit rewires
/// the second widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialKind {
    #[default]
    Single,
    /// Coarse interval pick, then a refinement slider over the chosen
    /// sub-window.
    TwoStage,
    /// Discrete bin pick, then a refinement slider over the bin, with
    /// a dwell gate against double-registration.
    TwoSlider,
}

impl TrialKind {
    pub fn response_stages(&self) -> usize {
        match self {
            TrialKind::Single => 1,
            TrialKind::TwoStage | TrialKind::TwoSlider => 2,
        }
    }
}

/// One committed response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResponseRecord {
    pub value: f64,
    pub onset: f64,
    /// Onset minus the enclosing response phase's onset.
    pub response_time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialStatus {
    Running,
    Finished,
}

/// The slider widgets a trial polls and draws. The session owns the
/// set and lends it to the active trial each frame; no other trial
/// touches it.
pub struct SliderSet {
    pub first: Box<dyn Slider>,
    pub second: Option<Box<dyn Slider>>,
}

impl SliderSet {
    pub fn active(&self, stage: usize) -> &dyn Slider {
        match stage {
            0 => self.first.as_ref(),
            _ => self
                .second
                .as_deref()
                .expect("stage 1 requires a second slider"),
        }
    }

    pub fn active_mut(&mut self, stage: usize) -> &mut dyn Slider {
        match stage {
            0 => self.first.as_mut(),
            _ => self
                .second
                .as_deref_mut()
                .expect("stage 1 requires a second slider"),
        }
    }
}

/// Edge pair of the discrete bin containing `value`.
pub fn discrete_bin(range: Range, n_bins: usize, value: f64) -> (f64, f64) {
    let bin_width = range.width() / n_bins as f64;
    let idx = ((range.clip(value) - range.low()) / bin_width)
        .floor()
        .min(n_bins as f64 - 1.0)
        .max(0.0);
    let lo = range.low() + idx * bin_width;
    (lo, lo + bin_width)
}

#[derive(Debug, Clone)]
struct Tuning {
    mouse_multiplier: f64,
    movement_threshold: f64,
    dwell_secs: f64,
    n_bins: usize,
    marker_color: Rgba,
    feedback_color: Rgba,
}

pub struct TaskTrial {
    pub trial_nr: usize,
    kind: TrialKind,
    schedule: PhaseSchedule,
    pub params: TrialParameters,
    start_marker: f64,
    phase: usize,
    phase_onset: f64,
    onset: Option<f64>,
    last_raw_x: Option<f64>,
    responses: [Option<ResponseRecord>; 2],
    response2_entry: Option<f64>,
    release_seen: bool,
    pie: ProbabilityPieChart,
    fixation_pie: Option<ProbabilityPieChart>,
    dots: DotArray,
    tuning: Tuning,
}

impl TaskTrial {
    pub fn new(
        config: &TaskConfig,
        trial_nr: usize,
        prob: f64,
        payoff: f64,
        jitter: f64,
        rng: &mut impl Rng,
    ) -> Result<Self, ConfigurationError> {
        let kind = config.task.kind;
        let schedule = build_schedule(kind, config, jitter)?;
        let range = config.slider_range()?;
        let start_marker = rng.random_range(range.low()..=range.high()).round();

        let n_dots = payoff.round().max(1.0) as usize;
        let dots = DotArray::new(
            scatter_dots(
                n_dots,
                config.cloud.aperture_radius,
                config.cloud.dot_radius,
                rng,
            ),
            config.cloud.dot_radius,
        );
        let fixation_pie = config
            .task
            .show_prob_during_payoff
            .then(|| ProbabilityPieChart::new(prob, config.prob_cue.fixation_size, (0.0, 0.0), false));

        let mut params = TrialParameters::new();
        params.record("prob", prob);
        params.record("payoff", payoff);
        params.record("jitter", jitter);
        params.record("start_marker_position", start_marker);

        Ok(Self {
            trial_nr,
            kind,
            schedule,
            params,
            start_marker,
            phase: 0,
            phase_onset: 0.0,
            onset: None,
            last_raw_x: None,
            responses: [None, None],
            response2_entry: None,
            release_seen: false,
            pie: ProbabilityPieChart::new(prob, config.prob_cue.fixation_size, (0.0, 0.0), false),
            fixation_pie,
            dots,
            tuning: Tuning {
                mouse_multiplier: config.interface.mouse_multiplier,
                movement_threshold: config.interface.movement_threshold,
                dwell_secs: config.slider.dwell_secs,
                n_bins: config.slider.n_discrete_bins,
                marker_color: config.slider.marker_color,
                feedback_color: config.slider.feedback_color,
            },
        })
    }

    pub fn kind(&self) -> TrialKind {
        self.kind
    }

    pub fn schedule(&self) -> &PhaseSchedule {
        &self.schedule
    }

    pub fn phase_name(&self) -> PhaseName {
        self.schedule.name(self.phase.min(self.schedule.len() - 1))
    }

    pub fn started(&self) -> bool {
        self.onset.is_some()
    }

    pub fn start_marker(&self) -> f64 {
        self.start_marker
    }

    pub fn response(&self, stage: usize) -> Option<&ResponseRecord> {
        self.responses[stage].as_ref()
    }

    fn all_responses_recorded(&self) -> bool {
        (0..self.kind.response_stages()).all(|s| self.responses[s].is_some())
    }

    fn last_stage(&self) -> usize {
        self.kind.response_stages() - 1
    }

    /// Resets widgets and opens the first phase.
    pub fn start(&mut self, now: f64, widgets: &mut SliderSet, log: &mut TrialLog) {
        self.onset = Some(now);
        self.phase = 0;
        self.phase_onset = now;
        self.responses = [None, None];
        self.response2_entry = None;
        self.release_seen = false;
        self.last_raw_x = None;

        widgets.first.set_value(self.start_marker);
        widgets.first.set_visible(false);
        widgets.first.set_inner_color(self.tuning.marker_color);
        if let Some(second) = widgets.second.as_deref_mut() {
            second.set_visible(false);
            second.set_inner_color(self.tuning.marker_color);
        }

        debug!(trial_nr = self.trial_nr, onset = now, "trial started");
        log.append_onset(self.trial_nr as i64, self.schedule.name(0), now);
    }

    /// One frame of trial logic. Call once per rendered frame with a
    /// monotonic `now`.
    pub fn frame(
        &mut self,
        now: f64,
        pointer: &mut dyn Pointer,
        widgets: &mut SliderSet,
        rng: &mut impl Rng,
        log: &mut TrialLog,
    ) -> Result<TrialStatus, DomainError> {
        debug_assert!(self.started(), "frame() before start()");

        if self.advance_expired(now, pointer, widgets, log) == TrialStatus::Finished {
            return Ok(TrialStatus::Finished);
        }

        match self.schedule.name(self.phase) {
            PhaseName::Jitter => self.pre_response_frame(pointer, widgets),
            name if name.is_response() => {
                let stage = if name == PhaseName::Response { 0 } else { 1 };
                self.response_frame(now, stage, pointer, widgets, rng)?;
            }
            _ => {}
        }

        // A commit shortens the current phase, so re-check expiry
        // instead of waiting a frame.
        Ok(self.advance_expired(now, pointer, widgets, log))
    }

    fn advance_expired(
        &mut self,
        now: f64,
        pointer: &mut dyn Pointer,
        widgets: &mut SliderSet,
        log: &mut TrialLog,
    ) -> TrialStatus {
        while now - self.phase_onset >= self.schedule.duration(self.phase) {
            self.phase_onset += self.schedule.duration(self.phase);
            self.phase += 1;
            if self.phase >= self.schedule.len() {
                return TrialStatus::Finished;
            }
            let name = self.schedule.name(self.phase);
            log.append_onset(self.trial_nr as i64, name, self.phase_onset);
            self.on_enter(name, pointer, widgets);
        }
        TrialStatus::Running
    }

    fn on_enter(&mut self, name: PhaseName, pointer: &mut dyn Pointer, widgets: &mut SliderSet) {
        match name {
            PhaseName::Jitter => {
                widgets.first.set_value(self.start_marker);
                widgets.first.set_visible(false);
            }
            PhaseName::Response => {
                widgets.first.set_inner_color(self.tuning.marker_color);
            }
            PhaseName::Response2 => {
                self.response2_entry = Some(self.phase_onset);
                self.release_seen = false;
                self.last_raw_x = None;
                let marker_x = widgets.active(1).marker_x();
                self.snap_pointer(pointer, marker_x);
            }
            PhaseName::Feedback => {
                if self.all_responses_recorded() {
                    widgets
                        .active_mut(self.last_stage())
                        .set_inner_color(self.tuning.feedback_color);
                }
            }
            _ => {}
        }
    }

    /// Best-effort pointer warp; a refusal is logged and skipped so
    /// the next frame retries naturally.
    fn snap_pointer(&self, pointer: &mut dyn Pointer, x: f64) {
        if let Err(e) = pointer.set_position((x, 0.0)) {
            warn!(trial_nr = self.trial_nr, error = %e, "pointer snap failed, skipping");
        }
    }

    /// During the phase before the response window the marker sits
    /// hidden at its start position and the pointer is kept parked on
    /// it, so the marker does not jump when the window opens.
    fn pre_response_frame(&mut self, pointer: &mut dyn Pointer, widgets: &mut SliderSet) {
        let marker_x = widgets.first.marker_x();
        match pointer.pressed() {
            Ok((false, _, _)) => {
                let off_marker = match pointer.position() {
                    Ok((x, _)) => x != marker_x,
                    Err(_) => false,
                };
                if off_marker {
                    self.snap_pointer(pointer, marker_x);
                }
            }
            Ok(_) => {}
            Err(e) => warn!(trial_nr = self.trial_nr, error = %e, "pointer query failed"),
        }

        if let Ok((x, _)) = pointer.position() {
            self.last_raw_x = Some(x);
        }
    }

    fn response_frame(
        &mut self,
        now: f64,
        stage: usize,
        pointer: &mut dyn Pointer,
        widgets: &mut SliderSet,
        rng: &mut impl Rng,
    ) -> Result<(), DomainError> {
        if self.responses[stage].is_some() {
            // Frozen: this stage already committed.
            return Ok(());
        }

        let raw_x = match pointer.position() {
            Ok((x, _)) => x,
            Err(e) => {
                warn!(trial_nr = self.trial_nr, error = %e, "pointer query failed");
                return Ok(());
            }
        };

        match self.last_raw_x {
            Some(last) if (raw_x - last).abs() > self.tuning.movement_threshold => {
                let slider = widgets.active_mut(stage);
                let value = slider.value_from_pointer(raw_x / self.tuning.mouse_multiplier);
                slider.set_value(value);
                slider.set_visible(true);
                self.last_raw_x = Some(raw_x);
            }
            Some(_) => {}
            None => self.last_raw_x = Some(raw_x),
        }

        let pressed = match pointer.pressed() {
            Ok((left, _, _)) => left,
            Err(e) => {
                warn!(trial_nr = self.trial_nr, error = %e, "button query failed");
                false
            }
        };
        if stage == 1 && !pressed {
            self.release_seen = true;
        }

        if pressed && self.press_honored(stage, now) {
            self.commit(stage, now, widgets, rng)?;
        }
        Ok(())
    }

    /// The click that committed stage 0 must not register again in the
    /// second response window: the two-stage variant waits for the
    /// button to come up first, the two-slider variant for the dwell
    /// time to elapse.
    fn press_honored(&self, stage: usize, now: f64) -> bool {
        if stage == 0 {
            return true;
        }
        match self.kind {
            TrialKind::TwoStage => self.release_seen,
            TrialKind::TwoSlider => {
                let entry = self.response2_entry.unwrap_or(self.phase_onset);
                now - entry >= self.tuning.dwell_secs
            }
            TrialKind::Single => true,
        }
    }

    fn commit(
        &mut self,
        stage: usize,
        now: f64,
        widgets: &mut SliderSet,
        rng: &mut impl Rng,
    ) -> Result<(), DomainError> {
        let value = widgets.active(stage).value();
        let response_time = now - self.phase_onset;
        self.responses[stage] = Some(ResponseRecord {
            value,
            onset: now,
            response_time,
        });

        let (key, rt_key) = if stage == 0 {
            ("response", "response_time")
        } else {
            ("response2", "response_time2")
        };
        self.params.record(key, value);
        self.params.record(rt_key, response_time);
        debug!(
            trial_nr = self.trial_nr,
            stage, value, response_time, "response committed"
        );

        match (self.kind, stage) {
            (TrialKind::TwoStage, 0) => {
                let (lo, hi) = widgets
                    .first
                    .window()
                    .expect("two-stage first slider exposes a window");
                self.rewire_second(widgets, lo, hi, rng)?;
            }
            (TrialKind::TwoSlider, 0) => {
                let (lo, hi) = discrete_bin(widgets.first.range(), self.tuning.n_bins, value);
                self.rewire_second(widgets, lo, hi, rng)?;
            }
            _ => {}
        }

        // Hand the unused response time to the spillover so the trial
        // total stays fixed.
        self.schedule.stop_early(self.phase, now - self.phase_onset);
        Ok(())
    }

    fn rewire_second(
        &mut self,
        widgets: &mut SliderSet,
        lo: f64,
        hi: f64,
        rng: &mut impl Rng,
    ) -> Result<(), DomainError> {
        let second = widgets.active_mut(1);
        second.set_range(Range::new(lo, hi)?)?;
        second.set_value(rng.random_range(lo..=hi));
        second.set_visible(false);
        Ok(())
    }

    pub fn draw(
        &self,
        widgets: &SliderSet,
        fixation: &mut FixationLines,
        surface: &mut dyn Surface,
    ) {
        let name = self.schedule.name(self.phase.min(self.schedule.len() - 1));
        let responded = self.all_responses_recorded();

        match name {
            PhaseName::Fixation1 => fixation.set_color(CROSS_GREEN, true),
            PhaseName::ProbCue => fixation.set_color(CROSS_RED, true),
            _ => {}
        }
        let with_cross =
            !(name == PhaseName::Stimulus || (name == PhaseName::Feedback && !responded));
        fixation.draw(surface, with_cross);

        match name {
            PhaseName::ProbCue => self.pie.draw(surface),
            PhaseName::Stimulus => {
                if let Some(pie) = &self.fixation_pie {
                    pie.draw(surface);
                }
                self.dots.draw(surface);
            }
            PhaseName::Response => widgets.active(0).draw(surface),
            PhaseName::Response2 => widgets.active(1).draw(surface),
            PhaseName::Feedback => {
                if responded {
                    widgets.active(self.last_stage()).draw(surface);
                } else {
                    surface.draw_text("Too late!", 0.0, 0.0, 0.5, TOO_LATE_COLOR);
                }
            }
            _ => {}
        }
    }
}

fn build_schedule(
    kind: TrialKind,
    config: &TaskConfig,
    jitter: f64,
) -> Result<PhaseSchedule, ConfigurationError> {
    let d = &config.durations;
    let mut entries = vec![
        (PhaseName::Fixation1, d.first_fixation),
        (PhaseName::ProbCue, d.prob_cue),
        (PhaseName::Stimulus, d.array_duration),
        (PhaseName::Jitter, jitter),
        (PhaseName::Response, d.response_screen),
    ];
    if kind != TrialKind::Single {
        entries.push((PhaseName::Response2, d.second_response_screen));
    }
    entries.push((PhaseName::Feedback, d.feedback));
    entries.push((PhaseName::Iti, 0.0));
    PhaseSchedule::new(entries)
}

/// Scatters `n` non-overlapping dot centers uniformly over the
/// aperture disc. Gives up on a candidate after enough rejections so
/// an over-full disc cannot loop forever.
pub fn scatter_dots(
    n: usize,
    aperture_radius: f64,
    dot_radius: f64,
    rng: &mut impl Rng,
) -> Vec<(f64, f64)> {
    let max_r = (aperture_radius - dot_radius).max(0.0);
    let min_gap = 2.0 * dot_radius;
    let mut points: Vec<(f64, f64)> = Vec::with_capacity(n);
    let mut attempts = 0usize;
    while points.len() < n && attempts < n.max(1) * 1000 {
        attempts += 1;
        let r = max_r * rng.random::<f64>().sqrt();
        let theta = rng.random_range(0.0..std::f64::consts::TAU);
        let candidate = (r * theta.cos(), r * theta.sin());
        let clear = points.iter().all(|&(x, y)| {
            let dx = x - candidate.0;
            let dy = y - candidate.1;
            (dx * dx + dy * dy).sqrt() >= min_gap
        });
        if clear {
            points.push(candidate);
        }
    }
    // The dot count carries the payoff, so an under-filled cloud is a
    // stimulus error worth surfacing.
    if points.len() < n {
        warn!(
            requested = n,
            placed = points.len(),
            aperture_radius,
            dot_radius,
            "dot cloud under-filled, aperture too small for payoff"
        );
    }
    points
}

/// Stand-alone probability announcement shown before each block of
/// task trials.
pub struct CueTrial {
    pub trial_nr: i64,
    duration: f64,
    onset: Option<f64>,
    pie: ProbabilityPieChart,
}

impl CueTrial {
    pub fn new(prob: f64, size: f64, duration: f64) -> Self {
        Self {
            trial_nr: -1,
            duration,
            onset: None,
            pie: ProbabilityPieChart::new(prob, size, (0.0, -1.0), true),
        }
    }

    pub fn started(&self) -> bool {
        self.onset.is_some()
    }

    pub fn start(&mut self, now: f64, log: &mut TrialLog) {
        self.onset = Some(now);
        log.append_onset(self.trial_nr, PhaseName::ProbCue, now);
    }

    pub fn frame(&self, now: f64) -> TrialStatus {
        match self.onset {
            Some(onset) if now - onset >= self.duration => TrialStatus::Finished,
            _ => TrialStatus::Running,
        }
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        self.pie.draw(surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discrete_bin_edges() {
        let range = Range::new(0.0, 60.0).unwrap();
        assert_eq!(discrete_bin(range, 6, 3.0), (0.0, 10.0));
        assert_eq!(discrete_bin(range, 6, 59.0), (50.0, 60.0));
        // Top edge belongs to the last bin, not a phantom seventh.
        assert_eq!(discrete_bin(range, 6, 60.0), (50.0, 60.0));
        assert_eq!(discrete_bin(range, 6, -5.0), (0.0, 10.0));
    }

    #[test]
    fn scatter_terminates_on_overfull_disc() {
        let mut rng = rand::rng();
        // A 0.5-unit disc cannot hold 1000 dots of radius 0.2; the
        // sampler must give up instead of spinning, and whatever it
        // placed still honors the spacing rule.
        let pts = scatter_dots(1000, 0.5, 0.2, &mut rng);
        assert!(pts.len() < 1000);
        for (i, &(x, y)) in pts.iter().enumerate() {
            assert!((x * x + y * y).sqrt() <= 0.3 + 1e-9);
            for &(x2, y2) in &pts[i + 1..] {
                let d = ((x - x2).powi(2) + (y - y2).powi(2)).sqrt();
                assert!(d >= 0.4 - 1e-9);
            }
        }
    }

    #[test]
    fn scatter_respects_aperture_and_spacing() {
        let mut rng = rand::rng();
        let pts = scatter_dots(20, 4.0, 0.1, &mut rng);
        assert_eq!(pts.len(), 20);
        for (i, &(x, y)) in pts.iter().enumerate() {
            assert!((x * x + y * y).sqrt() <= 3.9 + 1e-9);
            for &(x2, y2) in &pts[i + 1..] {
                let d = ((x - x2).powi(2) + (y - y2).powi(2)).sqrt();
                assert!(d >= 0.2 - 1e-9);
            }
        }
    }
}
