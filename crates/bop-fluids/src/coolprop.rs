//! CoolProp-based water property oracle.

use crate::error::{FluidError, FluidResult};
use crate::model::{PropertyOracle, validation};
use crate::state::{FluidPhase, WaterProperties};
use bop_core::constants::WATER_P_CRIT_PA;
use bop_core::units::{DynVisc, Pressure, SpecEnthalpy, SpecEntropy, Temperature, k, pa};
use rfluids::prelude::*;
use uom::si::dynamic_viscosity::pascal_second;
use uom::si::mass_density::kilogram_per_cubic_meter;

/// CoolProp backend for water (IAPWS-95 via `rfluids`).
///
/// Thread-safe: every query builds a fresh `Fluid`, nothing is cached.
#[derive(Debug, Default, Clone, Copy)]
pub struct CoolPropWater;

fn backend<E: std::fmt::Display>(what: &'static str) -> impl FnOnce(E) -> FluidError {
    move |e| FluidError::Backend {
        message: format!("rfluids error getting {}: {}", what, e),
    }
}

impl CoolPropWater {
    pub fn new() -> Self {
        Self
    }

    fn fluid_at_pt(&self, p_pa: f64, t_k: f64) -> FluidResult<Fluid> {
        Fluid::from(Pure::Water)
            .in_state(FluidInput::pressure(p_pa), FluidInput::temperature(t_k))
            .map_err(|e| FluidError::Backend {
                message: format!("rfluids error at P={} Pa, T={} K: {}", p_pa, t_k, e),
            })
    }

    fn fluid_at_pq(&self, p_pa: f64, quality: f64) -> FluidResult<Fluid> {
        Fluid::from(Pure::Water)
            .in_state(FluidInput::pressure(p_pa), FluidInput::quality(quality))
            .map_err(|e| FluidError::Backend {
                message: format!("rfluids error at P={} Pa, Q={}: {}", p_pa, quality, e),
            })
    }

    /// Read the full pack off a defined fluid state.
    fn pack(
        &self,
        fluid: &mut Fluid,
        p_pa: f64,
        t_k: f64,
        phase: FluidPhase,
        quality: Option<f64>,
    ) -> FluidResult<WaterProperties> {
        let rho = fluid.density().map_err(backend("density"))?;
        let h = fluid.enthalpy().map_err(backend("enthalpy"))?;
        let s = fluid.entropy().map_err(backend("entropy"))?;
        let cp = fluid.specific_heat().map_err(backend("specific heat"))?;
        let mu = fluid
            .dynamic_viscosity()
            .map_err(backend("dynamic viscosity"))?;

        validation::validate_density(rho)?;
        validation::validate_cp(cp)?;
        validation::validate_finite(h, "enthalpy must be finite")?;
        validation::validate_finite(s, "entropy must be finite")?;

        Ok(WaterProperties {
            p: pa(p_pa),
            t: k(t_k),
            rho: bop_core::units::Density::new::<kilogram_per_cubic_meter>(rho),
            h,
            s,
            cp,
            mu: DynVisc::new::<pascal_second>(mu),
            phase,
            quality,
        })
    }

    /// Saturated endpoint (quality exactly 0 or 1).
    fn endpoint(&self, p_pa: f64, quality: f64) -> FluidResult<WaterProperties> {
        let mut fluid = self.fluid_at_pq(p_pa, quality)?;
        let t_k = fluid.temperature().map_err(backend("temperature"))?;
        self.pack(&mut fluid, p_pa, t_k, FluidPhase::TwoPhase, Some(quality))
    }
}

impl PropertyOracle for CoolPropWater {
    fn name(&self) -> &str {
        "CoolProp"
    }

    fn at_pt(&self, p: Pressure, t: Temperature) -> FluidResult<WaterProperties> {
        validation::validate_pressure(p)?;
        validation::validate_temperature(t)?;

        let t_sat = if p.value < WATER_P_CRIT_PA {
            Some(self.t_sat(p)?.value)
        } else {
            None
        };
        let phase = FluidPhase::classify(p.value, t.value, t_sat);

        let mut fluid = self.fluid_at_pt(p.value, t.value)?;
        self.pack(&mut fluid, p.value, t.value, phase, None)
    }

    fn saturated(&self, p: Pressure, quality: f64) -> FluidResult<WaterProperties> {
        validation::validate_subcritical(p)?;
        validation::validate_quality(quality)?;

        if quality == 0.0 || quality == 1.0 {
            return self.endpoint(p.value, quality);
        }

        // cp and viscosity are undefined inside the dome; blend the endpoints.
        let bubble = self.endpoint(p.value, 0.0)?;
        let dew = self.endpoint(p.value, 1.0)?;
        Ok(blend(&bubble, &dew, quality))
    }

    fn t_sat(&self, p: Pressure) -> FluidResult<Temperature> {
        validation::validate_subcritical(p)?;
        let mut fluid = self.fluid_at_pq(p.value, 0.0)?;
        let t_k = fluid.temperature().map_err(backend("temperature"))?;
        Ok(k(t_k))
    }

    fn t_from_ph(&self, p: Pressure, h: SpecEnthalpy) -> FluidResult<Temperature> {
        validation::validate_pressure(p)?;
        validation::validate_finite(h, "enthalpy must be finite")?;
        let mut fluid = Fluid::from(Pure::Water)
            .in_state(FluidInput::pressure(p.value), FluidInput::enthalpy(h))
            .map_err(|e| FluidError::Backend {
                message: format!("rfluids error at P={} Pa, h={} J/kg: {}", p.value, h, e),
            })?;
        let t_k = fluid.temperature().map_err(backend("temperature"))?;
        Ok(k(t_k))
    }

    fn t_from_ps(&self, p: Pressure, s: SpecEntropy) -> FluidResult<Temperature> {
        validation::validate_pressure(p)?;
        validation::validate_finite(s, "entropy must be finite")?;
        let mut fluid = Fluid::from(Pure::Water)
            .in_state(FluidInput::pressure(p.value), FluidInput::entropy(s))
            .map_err(|e| FluidError::Backend {
                message: format!("rfluids error at P={} Pa, s={} J/kg/K: {}", p.value, s, e),
            })?;
        let t_k = fluid.temperature().map_err(backend("temperature"))?;
        Ok(k(t_k))
    }
}

/// Lever-rule mixture of two saturated endpoints at vapor fraction `x`.
pub(crate) fn blend(bubble: &WaterProperties, dew: &WaterProperties, x: f64) -> WaterProperties {
    let v = (1.0 - x) / bubble.rho.value + x / dew.rho.value;
    WaterProperties {
        p: bubble.p,
        t: bubble.t,
        rho: bop_core::units::Density::new::<kilogram_per_cubic_meter>(1.0 / v),
        h: bubble.h + x * (dew.h - bubble.h),
        s: bubble.s + x * (dew.s - bubble.s),
        cp: bubble.cp + x * (dew.cp - bubble.cp),
        mu: bubble.mu + (dew.mu - bubble.mu) * x,
        phase: FluidPhase::TwoPhase,
        quality: Some(x),
    }
}
