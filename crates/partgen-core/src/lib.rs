//! Units, locations and shared rendering parameters.

pub mod config;
pub mod error;
pub mod location;
pub mod units;

pub use config::{Palette, RenderConfig};
pub use error::Error;
pub use location::{DEFAULT_PRECISION, Location, LocationList, generate_row, round_to};
pub use units::Unit;
