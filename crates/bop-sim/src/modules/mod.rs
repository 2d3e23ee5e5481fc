//! Plant modules: component models wrapped with ports, histories and a run
//! configuration.

pub mod cooling_tower;
pub mod pipe;
pub mod quantities;
pub mod source;
pub mod steamer;
pub mod turbine;
pub mod water_heater;

pub use cooling_tower::{CoolingTowerModule, CoolingTowerParams};
pub use pipe::{PipeModule, PipeParams};
pub use source::{Source, SourceParams, StepChange};
pub use steamer::{Steamer, SteamerParams};
pub use turbine::{TurbineModule, TurbineParams};
pub use water_heater::{WaterHeater, WaterHeaterParams};
