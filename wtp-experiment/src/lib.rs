pub mod builder;
pub mod config;
pub mod log;
pub mod session;
pub mod trial;

pub use builder::{build_slider_set, build_trials, Trial};
pub use config::TaskConfig;
pub use log::{LogRecord, TrialLog};
pub use session::Session;
pub use trial::{
    CueTrial, ResponseRecord, SliderSet, TaskTrial, TrialKind, TrialStatus,
};
