//! bop-fluids: water property oracle for the balance-of-plant simulator.
//!
//! Provides:
//! - `PropertyOracle` trait: (T, P) and (P, quality) lookups, saturation pairs,
//!   inverse T(P, h) and T(P, s) solves
//! - `CoolPropWater`: real water properties via CoolProp (`rfluids`)
//! - `SurrogateWater`: closed-form water model for fast deterministic runs
//!
//! The oracle is stateless and `Send + Sync`, so any number of module threads
//! can share one instance behind an `Arc`.
//!
//! # Example
//!
//! ```no_run
//! use bop_core::units::{bar, k};
//! use bop_fluids::{CoolPropWater, PropertyOracle};
//!
//! let water = CoolPropWater::new();
//! let props = water.at_pt(bar(20.0), k(293.0)).unwrap();
//! println!("rho = {} kg/m³, phase = {:?}", props.rho.value, props.phase);
//! ```

pub mod coolprop;
pub mod error;
pub mod model;
pub mod state;
pub mod surrogate;

pub use coolprop::CoolPropWater;
pub use error::{FluidError, FluidResult};
pub use model::PropertyOracle;
pub use state::{FluidPhase, SaturationPair, WaterProperties};
pub use surrogate::SurrogateWater;
