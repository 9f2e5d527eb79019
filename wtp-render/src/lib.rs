pub mod surface;

pub use surface::SkiaSurface;
