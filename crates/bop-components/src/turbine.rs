//! Steam turbine isentropic-expansion model.
//!
//! An algebraic update, no ODE. The inlet is expanded at constant entropy to
//! the outlet pressure to get the ideal exit enthalpy. An isentropic
//! efficiency then gives the real specific work and the real exit state.
//!
//! ## Branching
//!
//! The ideal exit is classified on entropy against the bubble/dew entropy at
//! the outlet pressure; the real exit on enthalpy against the bubble/dew
//! enthalpy. Both classifications treat the saturation endpoints as two-phase,
//! so quality is continuous across them.

use crate::common::Stream;
use crate::error::{ComponentError, ComponentResult};
use bop_core::constants::WATER_P_CRIT_PA;
use bop_core::numeric::ensure_within;
use bop_core::units::{Power, Pressure, SpecEnthalpy, SpecEntropy, Temperature, w};
use bop_fluids::{PropertyOracle, SaturationPair, model::validation};

pub const DEFAULT_EFFICIENCY: f64 = 0.7784;

/// Hard inlet pressure bounds [Pa].
pub const INLET_PRESSURE_RANGE: (f64, f64) = (1.0, 100.0e6);

/// Hard inlet temperature bounds [K].
pub const INLET_TEMPERATURE_RANGE: (f64, f64) = (293.15, 1073.15);

/// Inlets this close to saturation are taken as dry saturated steam [K].
const SATURATION_TOLERANCE_K: f64 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitRegion {
    Subcooled,
    TwoPhase,
    Superheated,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExitState {
    pub region: ExitRegion,
    pub temperature: Temperature,
    pub enthalpy: SpecEnthalpy,
    pub quality: f64,
}

/// Ideal (isentropic) exit state at `p_out` for specific entropy `s`.
pub fn ideal_exit(oracle: &dyn PropertyOracle, p_out: Pressure, s: SpecEntropy) -> ComponentResult<ExitState> {
    let sat = oracle.saturation(p_out)?;
    let t_sat = sat.t_sat();

    if s >= sat.bubble.s && s <= sat.dew.s {
        let quality = sat.quality_from_s(s).clamp(0.0, 1.0);
        return Ok(ExitState {
            region: ExitRegion::TwoPhase,
            temperature: t_sat,
            enthalpy: sat.h_at_quality(quality),
            quality,
        });
    }

    let t = oracle.t_from_ps(p_out, s)?;
    if s > sat.dew.s {
        let enthalpy = if t.value <= t_sat.value + SATURATION_TOLERANCE_K {
            sat.dew.h
        } else {
            oracle.at_pt(p_out, t)?.h
        };
        Ok(ExitState {
            region: ExitRegion::Superheated,
            temperature: t,
            enthalpy,
            quality: 1.0,
        })
    } else {
        let enthalpy = if t.value >= t_sat.value - SATURATION_TOLERANCE_K {
            sat.bubble.h
        } else {
            oracle.at_pt(p_out, t)?.h
        };
        Ok(ExitState {
            region: ExitRegion::Subcooled,
            temperature: t,
            enthalpy,
            quality: 0.0,
        })
    }
}

/// Real exit state at `p_out` for specific enthalpy `h`.
pub fn real_exit(oracle: &dyn PropertyOracle, p_out: Pressure, h: SpecEnthalpy) -> ComponentResult<ExitState> {
    let sat: SaturationPair = oracle.saturation(p_out)?;

    if h < sat.bubble.h {
        Ok(ExitState {
            region: ExitRegion::Subcooled,
            temperature: oracle.t_from_ph(p_out, h)?,
            enthalpy: h,
            quality: 0.0,
        })
    } else if h > sat.dew.h {
        Ok(ExitState {
            region: ExitRegion::Superheated,
            temperature: oracle.t_from_ph(p_out, h)?,
            enthalpy: h,
            quality: 1.0,
        })
    } else {
        let quality = sat.quality_from_h(h).clamp(0.0, 1.0);
        Ok(ExitState {
            region: ExitRegion::TwoPhase,
            temperature: oracle.saturated(p_out, quality)?.t,
            enthalpy: h,
            quality,
        })
    }
}

/// Outcome of one turbine update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Expansion {
    pub outflow_temperature: Temperature,
    pub quality: f64,
    /// Shaft power, never negative.
    pub power: Power,
    /// Heat carried off by the irreversibility, ṁ·(w_ideal - w_real).
    pub process_heat: Power,
    pub w_ideal: f64,
    pub w_real: f64,
    pub exit_region: ExitRegion,
    /// The inlet was below saturation and nothing was expanded.
    pub bypassed: bool,
}

#[derive(Clone, Debug)]
pub struct Turbine {
    /// Isentropic efficiency (0 < eta <= 1)
    pub efficiency: f64,
    pub outflow_pressure: Pressure,
}

impl Turbine {
    pub fn new(efficiency: f64, outflow_pressure: Pressure) -> ComponentResult<Self> {
        if !(efficiency > 0.0 && efficiency <= 1.0) {
            return Err(ComponentError::InvalidArg {
                what: "turbine efficiency must be in (0,1]",
            });
        }
        validation::validate_subcritical(outflow_pressure)?;
        Ok(Self {
            efficiency,
            outflow_pressure,
        })
    }

    /// Expand `inflow` to the outflow pressure.
    ///
    /// # Errors
    /// `OutOfEnvelope` when the inlet pressure or temperature is outside the
    /// hard bounds; `NonPhysical` when the expansion would not release work.
    pub fn expand(&self, oracle: &dyn PropertyOracle, inflow: &Stream) -> ComponentResult<Expansion> {
        let p_in = inflow.pressure;
        let t_in = inflow.temperature;
        let mdot = inflow.mass_flowrate.value;
        ensure_within(
            p_in.value,
            INLET_PRESSURE_RANGE.0,
            INLET_PRESSURE_RANGE.1,
            "turbine inlet pressure",
        )?;
        ensure_within(
            t_in.value,
            INLET_TEMPERATURE_RANGE.0,
            INLET_TEMPERATURE_RANGE.1,
            "turbine inlet temperature",
        )?;

        let inlet = if p_in.value < WATER_P_CRIT_PA {
            let t_sat = oracle.t_sat(p_in)?;
            if t_in.value < t_sat.value - SATURATION_TOLERANCE_K {
                tracing::debug!(t_in = t_in.value, t_sat = t_sat.value, "turbine inlet below saturation");
                return Ok(Expansion {
                    outflow_temperature: t_sat,
                    quality: 0.0,
                    power: w(0.0),
                    process_heat: w(0.0),
                    w_ideal: 0.0,
                    w_real: 0.0,
                    exit_region: ExitRegion::Subcooled,
                    bypassed: true,
                });
            }
            if t_in.value <= t_sat.value + SATURATION_TOLERANCE_K {
                oracle.saturated(p_in, 1.0)?
            } else {
                oracle.at_pt(p_in, t_in)?
            }
        } else {
            oracle.at_pt(p_in, t_in)?
        };

        let ideal = ideal_exit(oracle, self.outflow_pressure, inlet.s)?;
        let w_ideal = inlet.h - ideal.enthalpy;
        if w_ideal.is_nan() || w_ideal <= 0.0 {
            return Err(ComponentError::NonPhysical {
                what: "ideal specific work must be positive",
            });
        }

        let w_real = self.efficiency * w_ideal;
        let h_real = inlet.h - w_real;
        if h_real.is_nan() || h_real <= 0.0 {
            return Err(ComponentError::NonPhysical {
                what: "real exit enthalpy must be positive",
            });
        }
        let real = real_exit(oracle, self.outflow_pressure, h_real)?;

        Ok(Expansion {
            outflow_temperature: real.temperature,
            quality: real.quality,
            power: w((mdot * w_real).max(0.0)),
            process_heat: w((mdot * (w_ideal - w_real)).max(0.0)),
            w_ideal,
            w_real,
            exit_region: real.region,
            bypassed: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bop_core::units::{k, kgps, mpa};
    use bop_fluids::SurrogateWater;

    fn condenser_pressure() -> Pressure {
        mpa(0.008066866)
    }

    #[test]
    fn dew_entropy_is_continuous_across_branches() {
        let water = SurrogateWater::new();
        let p_out = condenser_pressure();
        let s_dew = water.saturated(p_out, 1.0).unwrap().s;

        let on_line = ideal_exit(&water, p_out, s_dew).unwrap();
        let above = ideal_exit(&water, p_out, s_dew * (1.0 + 1e-9)).unwrap();

        assert_eq!(on_line.region, ExitRegion::TwoPhase);
        assert_relative_eq!(on_line.quality, 1.0, epsilon = 1e-12);
        assert_eq!(above.region, ExitRegion::Superheated);
        assert_eq!(above.quality, 1.0);
        assert_relative_eq!(on_line.enthalpy, above.enthalpy, max_relative = 1e-6);
    }

    #[test]
    fn expansion_releases_work() {
        let water = SurrogateWater::new();
        let turbine = Turbine::new(DEFAULT_EFFICIENCY, condenser_pressure()).unwrap();
        let inflow = Stream::new(k(600.0), mpa(3.4), kgps(67.0));
        let out = turbine.expand(&water, &inflow).unwrap();

        assert!(!out.bypassed);
        assert!(out.w_ideal > 0.0);
        assert_relative_eq!(out.w_real, DEFAULT_EFFICIENCY * out.w_ideal, epsilon = 1e-9);
        assert_relative_eq!(out.power.value, 67.0 * out.w_real, max_relative = 1e-12);
        assert_relative_eq!(
            out.process_heat.value,
            67.0 * (out.w_ideal - out.w_real),
            max_relative = 1e-12
        );
        let t_sat_out = water.t_sat(condenser_pressure()).unwrap().value;
        assert!(out.outflow_temperature.value >= t_sat_out - 1e-9);
    }

    #[test]
    fn wet_exit_reports_quality() {
        let water = SurrogateWater::new();
        let turbine = Turbine::new(0.95, condenser_pressure()).unwrap();
        let inflow = Stream::new(k(600.0), mpa(3.4), kgps(67.0));
        let out = turbine.expand(&water, &inflow).unwrap();

        assert_eq!(out.exit_region, ExitRegion::TwoPhase);
        assert!(out.quality > 0.0 && out.quality < 1.0);
        let t_sat_out = water.t_sat(condenser_pressure()).unwrap();
        assert_relative_eq!(out.outflow_temperature.value, t_sat_out.value, epsilon = 1e-9);
    }

    #[test]
    fn subsaturated_inlet_bypasses() {
        let water = SurrogateWater::new();
        let turbine = Turbine::new(DEFAULT_EFFICIENCY, condenser_pressure()).unwrap();
        let inflow = Stream::new(k(400.0), mpa(3.4), kgps(67.0));
        let out = turbine.expand(&water, &inflow).unwrap();

        assert!(out.bypassed);
        assert_eq!(out.power.value, 0.0);
        assert_eq!(out.quality, 0.0);
        let t_sat = water.t_sat(mpa(3.4)).unwrap();
        assert_eq!(out.outflow_temperature, t_sat);
    }

    #[test]
    fn saturated_inlet_uses_dew_state() {
        let water = SurrogateWater::new();
        let turbine = Turbine::new(DEFAULT_EFFICIENCY, condenser_pressure()).unwrap();
        let t_sat = water.t_sat(mpa(3.4)).unwrap();
        let inflow = Stream::new(t_sat, mpa(3.4), kgps(67.0));
        let out = turbine.expand(&water, &inflow).unwrap();
        assert!(!out.bypassed);
        assert!(out.power.value > 0.0);
    }

    #[test]
    fn hard_bounds_are_fatal() {
        let water = SurrogateWater::new();
        let turbine = Turbine::new(DEFAULT_EFFICIENCY, condenser_pressure()).unwrap();

        let hot = Stream::new(k(1100.0), mpa(3.4), kgps(67.0));
        assert!(matches!(
            turbine.expand(&water, &hot),
            Err(ComponentError::OutOfEnvelope { .. })
        ));

        let cold = Stream::new(k(280.0), mpa(3.4), kgps(67.0));
        assert!(matches!(
            turbine.expand(&water, &cold),
            Err(ComponentError::OutOfEnvelope { .. })
        ));

        let crushing = Stream::new(k(900.0), mpa(150.0), kgps(67.0));
        assert!(matches!(
            turbine.expand(&water, &crushing),
            Err(ComponentError::OutOfEnvelope { .. })
        ));
    }

    #[test]
    fn compression_is_rejected() {
        let water = SurrogateWater::new();
        let turbine = Turbine::new(DEFAULT_EFFICIENCY, mpa(3.4)).unwrap();
        let inflow = Stream::new(k(500.0), mpa(1.0), kgps(10.0));
        assert!(matches!(
            turbine.expand(&water, &inflow),
            Err(ComponentError::NonPhysical { .. })
        ));
    }

    #[test]
    fn efficiency_is_validated() {
        assert!(Turbine::new(0.0, condenser_pressure()).is_err());
        assert!(Turbine::new(1.2, condenser_pressure()).is_err());
        assert!(Turbine::new(0.8, mpa(30.0)).is_err());
    }
}
