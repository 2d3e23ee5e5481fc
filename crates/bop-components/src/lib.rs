//! bop-components: equipment physics for the balance-of-plant simulator.
//!
//! Pure models with no knowledge of ports or time stepping:
//! - `SingleVolume`: lumped heater/cooler, integrated over one step
//! - `CounterflowExchanger`: two coupled volumes with ε-NTU heat transfer and
//!   secondary boiling
//! - `Turbine`: isentropic expansion with efficiency
//! - `Pipe` + `friction`: Reynolds number and five friction correlations
//! - `CoolingTower`: closed-form outflow
//!
//! Every model takes the water property oracle as `&dyn PropertyOracle`.

pub mod common;
pub mod cooling_tower;
pub mod error;
pub mod friction;
pub mod heat_exchanger;
pub mod heater;
pub mod pipe;
pub mod turbine;

pub use common::Stream;
pub use cooling_tower::CoolingTower;
pub use error::{ComponentError, ComponentResult};
pub use friction::{CORRELATIONS, Correlation, friction_factors};
pub use heat_exchanger::{CounterflowExchanger, ExchangerStep, HeatTransfer, counterflow_effectiveness};
pub use heater::{HeaterStep, SingleVolume, single_volume_rhs};
pub use pipe::{FrictionEstimate, Pipe, PipeDiagnostics, ramped_flow};
pub use turbine::{ExitRegion, ExitState, Expansion, Turbine};
