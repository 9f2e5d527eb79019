pub mod error;
pub mod mapper;
pub mod params;
pub mod phase;
pub mod pointer;
pub mod range;
pub mod stim;
pub mod surface;

pub use error::{ConfigurationError, DomainError, PointerAccessError};
pub use mapper::{position_to_value, value_to_position, SliderGeometry};
pub use params::{ParamValue, TrialParameters};
pub use phase::{PhaseName, PhaseSchedule};
pub use pointer::Pointer;
pub use range::{Range, Scale, ScaledRange};
pub use surface::{Rgba, Surface};
