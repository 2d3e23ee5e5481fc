//! Closed-form surrogate water model.
//!
//! A small reference-state model for runs and tests that must not depend on
//! the CoolProp backend:
//! - **Liquid**: frozen cp and density, enthalpy and entropy measured from 0 °C
//! - **Saturation line**: Clausius-Clapeyron through the normal boiling point
//!   with a constant latent heat
//! - **Vapor**: ideal gas with frozen cp, anchored at the dew state
//!
//! It tracks real water to within a few percent over the feedwater and
//! low-pressure steam range and is thermodynamically self-consistent, so
//! isentropic expansions always release enthalpy.

use crate::error::{FluidError, FluidResult};
use crate::model::{PropertyOracle, validation};
use crate::state::{FluidPhase, WaterProperties};
use bop_core::constants::{ATM_PA, T_ZERO_C_K, WATER_P_CRIT_PA, WATER_T_CRIT_K};
use bop_core::units::{Density, DynVisc, Pressure, SpecEnthalpy, SpecEntropy, Temperature, k};
use uom::si::dynamic_viscosity::pascal_second;
use uom::si::mass_density::kilogram_per_cubic_meter;

#[derive(Debug, Clone)]
pub struct SurrogateWater {
    /// Liquid specific heat [J/(kg·K)]
    pub cp_liquid: f64,
    /// Liquid density [kg/m³]
    pub rho_liquid: f64,
    /// Vapor specific heat [J/(kg·K)]
    pub cp_vapor: f64,
    /// Vapor gas constant [J/(kg·K)]
    pub r_vapor: f64,
    /// Latent heat [J/kg]
    pub h_fg: f64,
    /// Saturation anchor: boiling point at `p_ref` [K]
    pub t_ref: f64,
    /// Saturation anchor pressure [Pa]
    pub p_ref: f64,
    /// Vapor viscosity [Pa·s]
    pub mu_vapor: f64,
}

impl Default for SurrogateWater {
    fn default() -> Self {
        Self {
            cp_liquid: 4186.0,
            rho_liquid: 998.0,
            cp_vapor: 2080.0,
            r_vapor: 461.5,
            h_fg: 2.257e6,
            t_ref: 373.15,
            p_ref: ATM_PA,
            mu_vapor: 1.2e-5,
        }
    }
}

impl SurrogateWater {
    pub fn new() -> Self {
        Self::default()
    }

    fn t_sat_k(&self, p_pa: f64) -> FluidResult<f64> {
        let inv = 1.0 / self.t_ref - self.r_vapor * (p_pa / self.p_ref).ln() / self.h_fg;
        if !inv.is_finite() || inv <= 0.0 {
            return Err(FluidError::OutOfRange {
                what: "pressure outside surrogate saturation range",
            });
        }
        Ok(1.0 / inv)
    }

    fn h_liquid(&self, t_k: f64) -> f64 {
        self.cp_liquid * (t_k - T_ZERO_C_K)
    }

    fn s_liquid(&self, t_k: f64) -> f64 {
        self.cp_liquid * (t_k / T_ZERO_C_K).ln()
    }

    /// Vogel fit for liquid water viscosity.
    fn mu_liquid(&self, t_k: f64) -> f64 {
        2.414e-5 * 10f64.powf(247.8 / (t_k - 140.0))
    }

    fn liquid(&self, p_pa: f64, t_k: f64, phase: FluidPhase, quality: Option<f64>) -> WaterProperties {
        WaterProperties {
            p: bop_core::units::pa(p_pa),
            t: k(t_k),
            rho: Density::new::<kilogram_per_cubic_meter>(self.rho_liquid),
            h: self.h_liquid(t_k),
            s: self.s_liquid(t_k),
            cp: self.cp_liquid,
            mu: DynVisc::new::<pascal_second>(self.mu_liquid(t_k)),
            phase,
            quality,
        }
    }

    /// Vapor at (P, T) anchored at the dew state of saturation temperature `t_sat`.
    fn vapor(&self, p_pa: f64, t_k: f64, t_sat: f64, phase: FluidPhase, quality: Option<f64>) -> WaterProperties {
        let h_dew = self.h_liquid(t_sat) + self.h_fg;
        let s_dew = self.s_liquid(t_sat) + self.h_fg / t_sat;
        WaterProperties {
            p: bop_core::units::pa(p_pa),
            t: k(t_k),
            rho: Density::new::<kilogram_per_cubic_meter>(p_pa / (self.r_vapor * t_k)),
            h: h_dew + self.cp_vapor * (t_k - t_sat),
            s: s_dew + self.cp_vapor * (t_k / t_sat).ln(),
            cp: self.cp_vapor,
            mu: DynVisc::new::<pascal_second>(self.mu_vapor),
            phase,
            quality,
        }
    }
}

impl PropertyOracle for SurrogateWater {
    fn name(&self) -> &str {
        "Surrogate"
    }

    fn at_pt(&self, p: Pressure, t: Temperature) -> FluidResult<WaterProperties> {
        validation::validate_pressure(p)?;
        validation::validate_temperature(t)?;
        let (p_pa, t_k) = (p.value, t.value);

        if p_pa >= WATER_P_CRIT_PA {
            let phase = FluidPhase::classify(p_pa, t_k, None);
            return Ok(if t_k < WATER_T_CRIT_K {
                self.liquid(p_pa, t_k, phase, None)
            } else {
                self.vapor(p_pa, t_k, WATER_T_CRIT_K, phase, None)
            });
        }

        let t_sat = self.t_sat_k(p_pa)?;
        let phase = FluidPhase::classify(p_pa, t_k, Some(t_sat));
        Ok(match phase {
            FluidPhase::Vapor => self.vapor(p_pa, t_k, t_sat, phase, None),
            _ => self.liquid(p_pa, t_k, phase, None),
        })
    }

    fn saturated(&self, p: Pressure, quality: f64) -> FluidResult<WaterProperties> {
        validation::validate_subcritical(p)?;
        validation::validate_quality(quality)?;
        let t_sat = self.t_sat_k(p.value)?;
        let bubble = self.liquid(p.value, t_sat, FluidPhase::TwoPhase, Some(0.0));
        let dew = self.vapor(p.value, t_sat, t_sat, FluidPhase::TwoPhase, Some(1.0));
        Ok(match quality {
            q if q == 0.0 => bubble,
            q if q == 1.0 => dew,
            q => crate::coolprop::blend(&bubble, &dew, q),
        })
    }

    fn t_sat(&self, p: Pressure) -> FluidResult<Temperature> {
        validation::validate_subcritical(p)?;
        Ok(k(self.t_sat_k(p.value)?))
    }

    fn t_from_ph(&self, p: Pressure, h: SpecEnthalpy) -> FluidResult<Temperature> {
        validation::validate_pressure(p)?;
        validation::validate_finite(h, "enthalpy must be finite")?;
        if p.value >= WATER_P_CRIT_PA {
            return Ok(k(T_ZERO_C_K + h / self.cp_liquid));
        }
        let t_sat = self.t_sat_k(p.value)?;
        let h_bubble = self.h_liquid(t_sat);
        let h_dew = h_bubble + self.h_fg;
        let t_k = if h < h_bubble {
            T_ZERO_C_K + h / self.cp_liquid
        } else if h > h_dew {
            t_sat + (h - h_dew) / self.cp_vapor
        } else {
            t_sat
        };
        validation::validate_temperature(k(t_k))?;
        Ok(k(t_k))
    }

    fn t_from_ps(&self, p: Pressure, s: SpecEntropy) -> FluidResult<Temperature> {
        validation::validate_pressure(p)?;
        validation::validate_finite(s, "entropy must be finite")?;
        if p.value >= WATER_P_CRIT_PA {
            return Ok(k(T_ZERO_C_K * (s / self.cp_liquid).exp()));
        }
        let t_sat = self.t_sat_k(p.value)?;
        let s_bubble = self.s_liquid(t_sat);
        let s_dew = s_bubble + self.h_fg / t_sat;
        let t_k = if s < s_bubble {
            T_ZERO_C_K * (s / self.cp_liquid).exp()
        } else if s > s_dew {
            t_sat * ((s - s_dew) / self.cp_vapor).exp()
        } else {
            t_sat
        };
        Ok(k(t_k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bop_core::units::{bar, mpa, pa};

    #[test]
    fn boils_at_100c_at_one_atmosphere() {
        let water = SurrogateWater::new();
        let t = water.t_sat(pa(ATM_PA)).unwrap();
        assert_relative_eq!(t.value, 373.15, epsilon = 1e-9);
    }

    #[test]
    fn saturation_temperature_rises_with_pressure() {
        let water = SurrogateWater::new();
        let t1 = water.t_sat(bar(1.0)).unwrap().value;
        let t2 = water.t_sat(bar(20.0)).unwrap().value;
        let t3 = water.t_sat(mpa(12.8)).unwrap().value;
        assert!(t1 < t2 && t2 < t3);
        // real water: 485.5 K at 20 bar
        assert!((t2 - 485.5).abs() < 15.0, "t_sat(20 bar) = {t2}");
    }

    #[test]
    fn ph_inverse_round_trips_each_region() {
        let water = SurrogateWater::new();
        let p = bar(20.0);
        for t in [300.0, 400.0, 600.0] {
            let props = water.at_pt(p, k(t)).unwrap();
            let back = water.t_from_ph(p, props.h).unwrap();
            assert_relative_eq!(back.value, t, epsilon = 1e-9);
        }
    }

    #[test]
    fn dew_state_is_continuous_with_superheated_vapor() {
        let water = SurrogateWater::new();
        let p = bar(5.0);
        let dew = water.saturated(p, 1.0).unwrap();
        let just_above = water.at_pt(p, k(dew.t.value + 1e-9)).unwrap();
        assert_relative_eq!(dew.h, just_above.h, epsilon = 1e-3);
        assert_relative_eq!(dew.s, just_above.s, epsilon = 1e-6);
    }

    #[test]
    fn interior_quality_blends_endpoints() {
        let water = SurrogateWater::new();
        let pair = water.saturation(bar(1.0)).unwrap();
        let mid = water.saturated(bar(1.0), 0.5).unwrap();
        assert_relative_eq!(mid.h, pair.h_at_quality(0.5), epsilon = 1e-9);
        assert_relative_eq!(pair.h_vap(), water.h_fg, epsilon = 1e-9);
        assert_eq!(mid.phase, FluidPhase::TwoPhase);
    }

    #[test]
    fn rejects_saturation_above_critical_pressure() {
        let water = SurrogateWater::new();
        assert!(water.saturated(mpa(23.0), 0.0).is_err());
        let props = water.at_pt(mpa(23.0), k(500.0)).unwrap();
        assert_eq!(props.phase, FluidPhase::Liquid);
    }
}
