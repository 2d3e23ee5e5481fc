//! Single-volume heater/cooler.
//!
//! One well-mixed liquid volume with through-flow and an external heat rate.
//! The state is the outflow temperature:
//!
//! ```text
//! dT/dt = -(T - T_in)/τ + Q/(ρ·cp·V),   τ = V·ρ/ṁ_in
//! ```
//!
//! ρ and cp are looked up at the candidate temperature and the inflow
//! pressure on every right-hand-side evaluation.

use crate::common::{EPSILON_MDOT, Stream, reject_vapor, require_liquid, residence_time};
use crate::error::{ComponentError, ComponentResult};
use bop_core::units::{Power, Pressure, Temperature, Volume, k};
use bop_fluids::{FluidPhase, PropertyOracle};
use bop_solver::{OdeOptions, integrate};
use nalgebra::DVector;

/// Right-hand side of the single-volume energy balance.
///
/// `tau = None` means no through-flow, which drops the mixing term.
pub fn single_volume_rhs(
    t: f64,
    t_in: f64,
    tau: Option<f64>,
    heat_rate: f64,
    rho: f64,
    cp: f64,
    volume: f64,
) -> f64 {
    let mixing = match tau {
        Some(tau) => -(t - t_in) / tau,
        None => 0.0,
    };
    mixing + heat_rate / (rho * cp * volume)
}

#[derive(Clone, Debug)]
pub struct SingleVolume {
    pub volume: Volume,
}

/// Result of one heater step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeaterStep {
    pub outflow_temperature: Temperature,
    /// Residence time at the new state [s]; infinite without through-flow.
    pub residence_time: f64,
    pub phase: FluidPhase,
}

impl SingleVolume {
    pub fn new(volume: Volume) -> ComponentResult<Self> {
        if !volume.value.is_finite() || volume.value <= 0.0 {
            return Err(ComponentError::InvalidArg {
                what: "heater volume must be positive",
            });
        }
        Ok(Self { volume })
    }

    /// dT/dt at candidate outflow temperature `t_k`.
    pub fn derivative(
        &self,
        oracle: &dyn PropertyOracle,
        t_k: f64,
        inflow: &Stream,
        heat_rate: Power,
    ) -> ComponentResult<f64> {
        let props = oracle.at_pt(inflow.pressure, k(t_k))?;
        reject_vapor("single-volume heater", &props)?;
        let rho = props.rho.value;
        let tau = residence_time(self.volume.value, rho, inflow.mass_flowrate.value);
        Ok(single_volume_rhs(
            t_k,
            inflow.temperature.value,
            tau,
            heat_rate.value,
            rho,
            props.cp,
            self.volume.value,
        ))
    }

    /// Advance the outflow temperature over `[t0, t0 + dt]`.
    ///
    /// The new state must be liquid at `outflow_pressure`.
    #[allow(clippy::too_many_arguments)]
    pub fn step(
        &self,
        oracle: &dyn PropertyOracle,
        outflow_temperature: Temperature,
        inflow: &Stream,
        heat_rate: Power,
        outflow_pressure: Pressure,
        t0: f64,
        dt: f64,
        opts: &OdeOptions,
    ) -> ComponentResult<HeaterStep> {
        inflow.validate()?;
        if !dt.is_finite() || dt <= 0.0 {
            return Err(ComponentError::InvalidArg {
                what: "time step must be positive",
            });
        }

        let rhs = |_t: f64, u: &DVector<f64>| -> ComponentResult<DVector<f64>> {
            let dtdt = self.derivative(oracle, u[0], inflow, heat_rate)?;
            Ok(DVector::from_element(1, dtdt))
        };
        let u0 = DVector::from_element(1, outflow_temperature.value);
        let solution = integrate(rhs, &u0, t0, t0 + dt, opts)?;
        let t_new = k(solution.u[0]);

        let phase = require_liquid(oracle, "single-volume heater", outflow_pressure, t_new)?;
        let rho = oracle.at_pt(inflow.pressure, t_new)?.rho.value;
        let tau = if inflow.mass_flowrate.value > EPSILON_MDOT {
            self.volume.value * rho / inflow.mass_flowrate.value
        } else {
            f64::INFINITY
        };

        tracing::trace!(
            t_out = t_new.value,
            accepted = solution.accepted_steps,
            rejected = solution.rejected_steps,
            "heater step"
        );

        Ok(HeaterStep {
            outflow_temperature: t_new,
            residence_time: tau,
            phase,
        })
    }
}
