use thiserror::Error;

/// Invalid range or range/scale combination. Fatal: raised at
/// construction or update time, never recovered from.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("range low ({low}) must be strictly below high ({high})")]
    InvertedRange { low: f64, high: f64 },
    #[error("logarithmic scale requires a positive lower bound, got {low}")]
    NonPositiveLogBound { low: f64 },
    #[error("sub-window proportion must lie in (0, 1), got {0}")]
    BadProportion(f64),
}

/// Pointer reposition or query failure. Recoverable: the frame that
/// hit it is skipped and the next frame polls again.
#[derive(Debug, Clone, Error)]
#[error("pointer access failed: {0}")]
pub struct PointerAccessError(pub String);

/// Malformed experiment configuration. Fatal at build time, surfaced
/// to the operator before any trial runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("n_trials ({n_trials}) must be a multiple of the number of {what} ({n})")]
    TrialCountMismatch {
        n_trials: usize,
        what: &'static str,
        n: usize,
    },
    #[error("{0} list must not be empty")]
    EmptyConditionList(&'static str),
    #[error("phase duration must be non-negative, got {0}")]
    NegativeDuration(f64),
    #[error("discrete bin count must be at least 2, got {0}")]
    TooFewBins(usize),
    #[error("mouse multiplier must be positive, got {0}")]
    BadMultiplier(f64),
    #[error("failed to parse configuration: {0}")]
    Parse(String),
    #[error(transparent)]
    Domain(#[from] DomainError),
}
