use serde::{Deserialize, Serialize};
use wtp_core::{PhaseName, TrialParameters};

/// One row of the session log: a phase onset, or the parameter dump
/// emitted when a trial ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub trial_nr: i64,
    pub event: String,
    pub onset: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<TrialParameters>,
}

/// Append-only session log. Records are never rewritten; the driver
/// serializes the whole thing at shutdown.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrialLog {
    records: Vec<LogRecord>,
}

impl TrialLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_onset(&mut self, trial_nr: i64, phase: PhaseName, onset: f64) {
        self.records.push(LogRecord {
            trial_nr,
            event: phase.as_str().to_owned(),
            onset,
            params: None,
        });
    }

    pub fn append_params(&mut self, trial_nr: i64, onset: f64, params: TrialParameters) {
        self.records.push(LogRecord {
            trial_nr,
            event: "parameters".to_owned(),
            onset,
            params: Some(params),
        });
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn onsets_accumulate_in_order() {
        let mut log = TrialLog::new();
        log.append_onset(1, PhaseName::Fixation1, 0.0);
        log.append_onset(1, PhaseName::Response, 2.5);
        let mut params = TrialParameters::new();
        params.record("response", 31.0);
        log.append_params(1, 6.0, params);

        assert_eq!(log.records().len(), 3);
        assert_eq!(log.records()[1].event, "response");
        assert!(log.records()[2].params.is_some());
    }

    #[test]
    fn serializes_to_json() {
        let mut log = TrialLog::new();
        log.append_onset(-1, PhaseName::ProbCue, 1.0);
        let json = log.to_json().unwrap();
        assert!(json.contains("prob_cue"));
    }
}
