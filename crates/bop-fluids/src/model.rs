//! Property oracle trait and validation helpers.

use crate::error::{FluidError, FluidResult};
use crate::state::{FluidPhase, SaturationPair, WaterProperties};
use bop_core::units::{Pressure, SpecEnthalpy, SpecEntropy, Temperature};

/// Thermophysical lookups for water.
///
/// Implementations are pure functions of their inputs and must be thread-safe
/// (Send + Sync); modules running on separate threads share one oracle.
pub trait PropertyOracle: Send + Sync {
    /// Backend name (for logging).
    fn name(&self) -> &str;

    /// Full property pack at pressure and temperature.
    fn at_pt(&self, p: Pressure, t: Temperature) -> FluidResult<WaterProperties>;

    /// Property pack on the saturation line at pressure `p` and vapor quality
    /// `quality` in [0, 1].
    fn saturated(&self, p: Pressure, quality: f64) -> FluidResult<WaterProperties>;

    /// Temperature from pressure and specific enthalpy.
    fn t_from_ph(&self, p: Pressure, h: SpecEnthalpy) -> FluidResult<Temperature>;

    /// Temperature from pressure and specific entropy.
    fn t_from_ps(&self, p: Pressure, s: SpecEntropy) -> FluidResult<Temperature>;

    /// Saturation temperature at pressure `p`.
    fn t_sat(&self, p: Pressure) -> FluidResult<Temperature> {
        Ok(self.saturated(p, 0.0)?.t)
    }

    /// Bubble and dew states at pressure `p`.
    fn saturation(&self, p: Pressure) -> FluidResult<SaturationPair> {
        Ok(SaturationPair {
            bubble: self.saturated(p, 0.0)?,
            dew: self.saturated(p, 1.0)?,
        })
    }

    /// Phase region at (P, T).
    fn phase_at(&self, p: Pressure, t: Temperature) -> FluidResult<FluidPhase> {
        validation::validate_pressure(p)?;
        validation::validate_temperature(t)?;
        let t_sat = if p.value < bop_core::constants::WATER_P_CRIT_PA {
            Some(self.t_sat(p)?.value)
        } else {
            None
        };
        Ok(FluidPhase::classify(p.value, t.value, t_sat))
    }
}

/// Validation helpers for oracle inputs and outputs.
pub mod validation {
    use super::*;

    /// Ensure pressure is positive and finite.
    pub fn validate_pressure(p: Pressure) -> FluidResult<()> {
        if !p.value.is_finite() || p.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "pressure must be positive and finite",
            });
        }
        Ok(())
    }

    /// Ensure temperature is positive and finite.
    pub fn validate_temperature(t: Temperature) -> FluidResult<()> {
        if !t.value.is_finite() || t.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "temperature must be positive and finite",
            });
        }
        Ok(())
    }

    /// Ensure density is positive and finite.
    pub fn validate_density(rho: f64) -> FluidResult<()> {
        if !rho.is_finite() || rho <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "density must be positive and finite",
            });
        }
        Ok(())
    }

    /// Ensure specific heat capacity is positive and finite.
    pub fn validate_cp(cp: f64) -> FluidResult<()> {
        if !cp.is_finite() || cp <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "cp must be positive and finite",
            });
        }
        Ok(())
    }

    /// Ensure a value that may be negative (enthalpy, entropy) is finite.
    pub fn validate_finite(v: f64, what: &'static str) -> FluidResult<()> {
        if !v.is_finite() {
            return Err(FluidError::NonPhysical { what });
        }
        Ok(())
    }

    /// Ensure vapor quality lies in [0, 1].
    pub fn validate_quality(x: f64) -> FluidResult<()> {
        if !x.is_finite() || !(0.0..=1.0).contains(&x) {
            return Err(FluidError::OutOfRange {
                what: "quality must lie in [0, 1]",
            });
        }
        Ok(())
    }

    /// Ensure the pressure admits a saturation line.
    pub fn validate_subcritical(p: Pressure) -> FluidResult<()> {
        validate_pressure(p)?;
        if p.value >= bop_core::constants::WATER_P_CRIT_PA {
            return Err(FluidError::OutOfRange {
                what: "no saturation line above the critical pressure",
            });
        }
        Ok(())
    }
}
