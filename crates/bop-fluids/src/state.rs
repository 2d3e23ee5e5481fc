//! Property packs returned by the oracle.

use bop_core::units::constants::{WATER_P_CRIT_PA, WATER_T_CRIT_K};
use bop_core::units::{Density, DynVisc, Pressure, SpecEnthalpy, SpecEntropy, SpecHeatCapacity, Temperature};

/// Coarse phase region of a water state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FluidPhase {
    Liquid,
    Vapor,
    TwoPhase,
    Supercritical,
}

impl FluidPhase {
    /// Classify a (P, T) state against the saturation temperature at P.
    ///
    /// Above the critical pressure there is no saturation line; states below
    /// the critical temperature count as (compressed) liquid.
    pub fn classify(p_pa: f64, t_k: f64, t_sat_k: Option<f64>) -> Self {
        if p_pa >= WATER_P_CRIT_PA {
            return if t_k < WATER_T_CRIT_K {
                FluidPhase::Liquid
            } else {
                FluidPhase::Supercritical
            };
        }
        match t_sat_k {
            Some(t_sat) if t_k < t_sat => FluidPhase::Liquid,
            Some(t_sat) if t_k > t_sat => FluidPhase::Vapor,
            Some(_) => FluidPhase::TwoPhase,
            None => FluidPhase::Supercritical,
        }
    }

    pub fn is_liquid(self) -> bool {
        matches!(self, FluidPhase::Liquid)
    }
}

/// Batched water properties at one state.
#[derive(Clone, Debug)]
pub struct WaterProperties {
    /// Pressure [Pa]
    pub p: Pressure,

    /// Temperature [K]
    pub t: Temperature,

    /// Density [kg/m³]
    pub rho: Density,

    /// Specific enthalpy [J/kg]
    pub h: SpecEnthalpy,

    /// Specific entropy [J/(kg·K)]
    pub s: SpecEntropy,

    /// Isobaric specific heat [J/(kg·K)]
    pub cp: SpecHeatCapacity,

    /// Dynamic viscosity [Pa·s]
    pub mu: DynVisc,

    pub phase: FluidPhase,

    /// Vapor mass fraction, set only for states on the saturation line.
    pub quality: Option<f64>,
}

impl WaterProperties {
    pub fn summary(&self) -> String {
        format!(
            "Water(P={:.0}Pa,T={:.2}K,ρ={:.2}kg/m³,h={:.1}J/kg,s={:.2}J/kg·K,cp={:.1}J/kg·K,{:?})",
            self.p.value, self.t.value, self.rho.value, self.h, self.s, self.cp, self.phase
        )
    }
}

/// Bubble (quality 0) and dew (quality 1) states at one pressure.
#[derive(Clone, Debug)]
pub struct SaturationPair {
    pub bubble: WaterProperties,
    pub dew: WaterProperties,
}

impl SaturationPair {
    /// Latent heat of vaporization [J/kg].
    pub fn h_vap(&self) -> f64 {
        self.dew.h - self.bubble.h
    }

    pub fn t_sat(&self) -> Temperature {
        self.bubble.t
    }

    /// Quality from enthalpy by lever rule. Not clamped.
    pub fn quality_from_h(&self, h: f64) -> f64 {
        (h - self.bubble.h) / (self.dew.h - self.bubble.h)
    }

    /// Quality from entropy by lever rule. Not clamped.
    pub fn quality_from_s(&self, s: f64) -> f64 {
        (s - self.bubble.s) / (self.dew.s - self.bubble.s)
    }

    pub fn h_at_quality(&self, x: f64) -> f64 {
        self.bubble.h + x * (self.dew.h - self.bubble.h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_against_saturation() {
        assert_eq!(FluidPhase::classify(2.0e6, 293.0, Some(485.5)), FluidPhase::Liquid);
        assert_eq!(FluidPhase::classify(2.0e6, 500.0, Some(485.5)), FluidPhase::Vapor);
        assert_eq!(FluidPhase::classify(2.0e6, 485.5, Some(485.5)), FluidPhase::TwoPhase);
    }

    #[test]
    fn classify_above_critical_pressure() {
        assert_eq!(FluidPhase::classify(25.0e6, 500.0, None), FluidPhase::Liquid);
        assert_eq!(FluidPhase::classify(25.0e6, 700.0, None), FluidPhase::Supercritical);
    }
}
