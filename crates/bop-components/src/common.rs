//! Shared stream type and small helpers.

use crate::error::{ComponentError, ComponentResult};
use bop_core::numeric::ensure_finite;
use bop_core::units::{MassRate, Pressure, Temperature, kgps, k, pa};
use bop_fluids::{FluidPhase, PropertyOracle, WaterProperties};

/// Mass flow rates below this are treated as no flow (kg/s).
pub const EPSILON_MDOT: f64 = 1e-9;

/// Temperature, pressure and mass flow of one fluid stream.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stream {
    pub temperature: Temperature,
    pub pressure: Pressure,
    pub mass_flowrate: MassRate,
}

impl Stream {
    pub fn new(temperature: Temperature, pressure: Pressure, mass_flowrate: MassRate) -> Self {
        Self {
            temperature,
            pressure,
            mass_flowrate,
        }
    }

    /// Build from raw SI values (K, Pa, kg/s).
    pub fn from_si(t_k: f64, p_pa: f64, mdot_kgps: f64) -> Self {
        Self::new(k(t_k), pa(p_pa), kgps(mdot_kgps))
    }

    pub fn validate(&self) -> ComponentResult<()> {
        check_finite(self.temperature.value, "stream temperature")?;
        check_finite(self.pressure.value, "stream pressure")?;
        check_finite(self.mass_flowrate.value, "stream mass flow rate")?;
        if self.temperature.value <= 0.0 || self.pressure.value <= 0.0 {
            return Err(ComponentError::NonPhysical {
                what: "stream temperature and pressure must be positive",
            });
        }
        if self.mass_flowrate.value < 0.0 {
            return Err(ComponentError::NonPhysical {
                what: "stream mass flow rate must be non-negative",
            });
        }
        Ok(())
    }
}

/// Ensure a value is finite, returning ComponentError if not.
pub fn check_finite(value: f64, what: &'static str) -> ComponentResult<()> {
    ensure_finite(value, what).map_err(|_| ComponentError::NonPhysical { what })?;
    Ok(())
}

/// Residence time V·ρ/ṁ [s]. `None` when there is no through-flow.
pub fn residence_time(volume_m3: f64, rho: f64, mdot: f64) -> Option<f64> {
    if mdot <= EPSILON_MDOT {
        None
    } else {
        Some(volume_m3 * rho / mdot)
    }
}

/// Fail with `PhaseViolation` unless the oracle reports liquid at (P, T).
pub fn require_liquid(
    oracle: &dyn PropertyOracle,
    what: &'static str,
    p: Pressure,
    t: Temperature,
) -> ComponentResult<FluidPhase> {
    let phase = oracle.phase_at(p, t)?;
    if !phase.is_liquid() {
        return Err(ComponentError::PhaseViolation {
            what,
            found: phase,
            t_k: t.value,
            p_pa: p.value,
        });
    }
    Ok(phase)
}

/// Reject vapor property packs inside a liquid-volume balance.
pub fn reject_vapor(what: &'static str, props: &WaterProperties) -> ComponentResult<()> {
    if matches!(props.phase, FluidPhase::Vapor | FluidPhase::Supercritical) {
        return Err(ComponentError::PhaseViolation {
            what,
            found: props.phase,
            t_k: props.t.value,
            p_pa: props.p.value,
        });
    }
    Ok(())
}
