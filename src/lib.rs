pub mod cli;
mod error;
pub mod params;
pub mod runoff;
mod storm;
pub mod table;
mod unit_hydrograph;

pub use error::{HydrographError, Result};
pub use params::TransformParams;
pub use storm::StormRecord;
pub use unit_hydrograph::UnitHydrograph;
