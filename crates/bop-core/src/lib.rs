//! bop-core: stable foundation for the balance-of-plant simulator.
//!
//! Contains:
//! - units (uom SI types + constructors + water constants)
//! - numeric (Real + tolerances + float helpers)
//! - unit_system (display units, passed explicitly instead of globals)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod unit_system;
pub mod units;

pub use error::{BopError, BopResult};
pub use numeric::*;
pub use unit_system::{PressureUnit, TemperatureUnit, TimeUnit, UnitSystem};
pub use units::*;
