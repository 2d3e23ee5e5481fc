//! Two-stream counter-flow heat exchanger (steam generator analog).
//!
//! Each stream is a single well-mixed volume. They are coupled through a heat
//! rate from the ε-NTU relation evaluated at the inflow temperatures, which
//! is held fixed over the step:
//!
//! ```text
//! ε = (1 - e^{-NTU(1-Cr)}) / (1 - Cr·e^{-NTU(1-Cr)})
//! Q = -ε·C_min·(T_p,in - T_s,in)
//! ```
//!
//! When the secondary's sensible heat gain crosses the saturation point at
//! its pressure, its outflow is reported as a saturation state with a quality
//! instead of a temperature.

use crate::common::{Stream, reject_vapor, require_liquid, residence_time};
use crate::error::{ComponentError, ComponentResult};
use crate::heater::single_volume_rhs;
use bop_core::constants::WATER_P_CRIT_PA;
use bop_core::units::{Power, Temperature, Volume, k, w};
use bop_fluids::{PropertyOracle, WaterProperties};
use bop_solver::{OdeOptions, integrate};
use nalgebra::DVector;

/// Default number of transfer units.
pub const DEFAULT_NTU: f64 = 4.5;

/// Secondary properties are taken at least this far below saturation [K].
const LIQUID_SIDE_MARGIN_K: f64 = 0.01;

/// Counter-flow effectiveness for `ntu >= 0` and capacity ratio `cr` in [0, 1].
///
/// At `cr = 1` the expression is 0/0; its limit NTU/(1+NTU) is used instead.
pub fn counterflow_effectiveness(ntu: f64, cr: f64) -> f64 {
    if ntu.is_nan() || ntu <= 0.0 {
        return 0.0;
    }
    let cr = cr.clamp(0.0, 1.0);
    let eps = if (1.0 - cr).abs() < 1e-6 {
        ntu / (1.0 + ntu)
    } else {
        let e = (-ntu * (1.0 - cr)).exp();
        (1.0 - e) / (1.0 - cr * e)
    };
    eps.clamp(0.0, 1.0)
}

/// Heat transfer between the two inflows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeatTransfer {
    /// Heat rate into the primary [W]; negative when the primary cools.
    pub heat_rate: f64,
    pub effectiveness: f64,
    pub c_min: f64,
    pub capacity_ratio: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExchangerStep {
    pub primary_outflow_temperature: Temperature,
    /// Secondary outflow temperature; the saturation temperature once boiling.
    pub secondary_outflow_temperature: Temperature,
    /// Integrated secondary volume temperature; runs past saturation while
    /// boiling and is the state to resume from on the next step.
    pub secondary_bulk_temperature: Temperature,
    pub secondary_quality: f64,
    pub boiling: bool,
    /// Heat rate into the primary [W].
    pub heat_rate: Power,
    pub tau_primary: f64,
    pub tau_secondary: f64,
}

#[derive(Clone, Debug)]
pub struct CounterflowExchanger {
    pub primary_volume: Volume,
    pub secondary_volume: Volume,
    pub ntu: f64,
}

impl CounterflowExchanger {
    pub fn new(primary_volume: Volume, secondary_volume: Volume, ntu: f64) -> ComponentResult<Self> {
        if primary_volume.value.is_nan()
            || secondary_volume.value.is_nan()
            || primary_volume.value <= 0.0
            || secondary_volume.value <= 0.0
        {
            return Err(ComponentError::InvalidArg {
                what: "exchanger volumes must be positive",
            });
        }
        if !ntu.is_finite() || ntu < 0.0 {
            return Err(ComponentError::InvalidArg {
                what: "NTU must be finite and non-negative",
            });
        }
        Ok(Self {
            primary_volume,
            secondary_volume,
            ntu,
        })
    }

    /// Secondary properties at `t_k`, kept on the liquid side of saturation.
    fn secondary_props(
        &self,
        oracle: &dyn PropertyOracle,
        secondary: &Stream,
        t_k: f64,
    ) -> ComponentResult<WaterProperties> {
        let t_eval = if secondary.pressure.value < WATER_P_CRIT_PA {
            let t_sat = oracle.t_sat(secondary.pressure)?.value;
            t_k.min(t_sat - LIQUID_SIDE_MARGIN_K)
        } else {
            t_k
        };
        Ok(oracle.at_pt(secondary.pressure, k(t_eval))?)
    }

    pub fn heat_transfer(
        &self,
        oracle: &dyn PropertyOracle,
        primary: &Stream,
        secondary: &Stream,
    ) -> ComponentResult<HeatTransfer> {
        let cp_p = oracle.at_pt(primary.pressure, primary.temperature)?.cp;
        let cp_s = self
            .secondary_props(oracle, secondary, secondary.temperature.value)?
            .cp;
        let c_p = primary.mass_flowrate.value * cp_p;
        let c_s = secondary.mass_flowrate.value * cp_s;
        let (c_min, c_max) = if c_p <= c_s { (c_p, c_s) } else { (c_s, c_p) };

        if c_max <= 0.0 {
            return Ok(HeatTransfer {
                heat_rate: 0.0,
                effectiveness: 0.0,
                c_min: 0.0,
                capacity_ratio: 0.0,
            });
        }
        let cr = c_min / c_max;
        let eps = counterflow_effectiveness(self.ntu, cr);
        let dt_in = primary.temperature.value - secondary.temperature.value;
        Ok(HeatTransfer {
            heat_rate: -eps * c_min * dt_in,
            effectiveness: eps,
            c_min,
            capacity_ratio: cr,
        })
    }

    /// Advance both outflow temperatures over `[t0, t0 + dt]`.
    #[allow(clippy::too_many_arguments)]
    pub fn step(
        &self,
        oracle: &dyn PropertyOracle,
        primary_temperature: Temperature,
        secondary_temperature: Temperature,
        primary: &Stream,
        secondary: &Stream,
        t0: f64,
        dt: f64,
        opts: &OdeOptions,
    ) -> ComponentResult<ExchangerStep> {
        primary.validate()?;
        secondary.validate()?;
        if !dt.is_finite() || dt <= 0.0 {
            return Err(ComponentError::InvalidArg {
                what: "time step must be positive",
            });
        }

        let transfer = self.heat_transfer(oracle, primary, secondary)?;
        let q = transfer.heat_rate;
        let v_p = self.primary_volume.value;
        let v_s = self.secondary_volume.value;

        let rhs = |_t: f64, u: &DVector<f64>| -> ComponentResult<DVector<f64>> {
            let props_p = oracle.at_pt(primary.pressure, k(u[0]))?;
            reject_vapor("exchanger primary", &props_p)?;
            let props_s = self.secondary_props(oracle, secondary, u[1])?;

            let tau_p = residence_time(v_p, props_p.rho.value, primary.mass_flowrate.value);
            let tau_s = residence_time(v_s, props_s.rho.value, secondary.mass_flowrate.value);
            let dtp = single_volume_rhs(
                u[0],
                primary.temperature.value,
                tau_p,
                q,
                props_p.rho.value,
                props_p.cp,
                v_p,
            );
            let dts = single_volume_rhs(
                u[1],
                secondary.temperature.value,
                tau_s,
                -q,
                props_s.rho.value,
                props_s.cp,
                v_s,
            );
            Ok(DVector::from_vec(vec![dtp, dts]))
        };

        let u0 = DVector::from_vec(vec![primary_temperature.value, secondary_temperature.value]);
        let solution = integrate(rhs, &u0, t0, t0 + dt, opts)?;
        let tp_new = k(solution.u[0]);
        let ts_sensible = solution.u[1];

        require_liquid(oracle, "exchanger primary", primary.pressure, tp_new)?;

        let props_p = oracle.at_pt(primary.pressure, tp_new)?;
        let props_s = self.secondary_props(oracle, secondary, ts_sensible)?;
        let tau_primary = residence_time(v_p, props_p.rho.value, primary.mass_flowrate.value)
            .unwrap_or(f64::INFINITY);
        let tau_secondary = residence_time(v_s, props_s.rho.value, secondary.mass_flowrate.value)
            .unwrap_or(f64::INFINITY);

        let (ts_out, quality, boiling) =
            self.secondary_outflow(oracle, secondary, ts_sensible)?;

        Ok(ExchangerStep {
            primary_outflow_temperature: tp_new,
            secondary_outflow_temperature: ts_out,
            secondary_bulk_temperature: k(ts_sensible),
            secondary_quality: quality,
            boiling,
            heat_rate: w(q),
            tau_primary,
            tau_secondary,
        })
    }

    /// Map the integrated secondary temperature onto an outflow state.
    ///
    /// With `q_total = (T_s - T_s,in)·cp` and `q_heat = (T_sat - T_s,in)·cp`,
    /// once `q_total >= q_heat` the outflow is saturated at the secondary
    /// pressure with `quality = (Δh_vap - (q_total - q_heat)) / Δh_vap`.
    pub fn secondary_outflow(
        &self,
        oracle: &dyn PropertyOracle,
        secondary: &Stream,
        ts_sensible: f64,
    ) -> ComponentResult<(Temperature, f64, bool)> {
        if secondary.pressure.value >= WATER_P_CRIT_PA {
            return Ok((k(ts_sensible), 0.0, false));
        }
        let sat = oracle.saturation(secondary.pressure)?;
        let t_sat = sat.t_sat().value;
        let cp_s = self
            .secondary_props(oracle, secondary, secondary.temperature.value)?
            .cp;
        let ts_in = secondary.temperature.value;
        let q_total = (ts_sensible - ts_in) * cp_s;
        let q_heat = (t_sat - ts_in) * cp_s;

        if q_total < q_heat {
            return Ok((k(ts_sensible), 0.0, false));
        }

        let h_vap = sat.h_vap();
        if h_vap.is_nan() || h_vap <= 0.0 {
            return Err(ComponentError::NonPhysical {
                what: "latent heat must be positive",
            });
        }
        let raw = (h_vap - (q_total - q_heat)) / h_vap;
        let quality = raw.clamp(0.0, 1.0);
        if quality != raw {
            tracing::warn!(raw, quality, "secondary quality clamped");
        }
        Ok((sat.t_sat(), quality, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn balanced_streams_use_limit() {
        for ntu in [0.5, 1.0, 4.5, 10.0] {
            assert_relative_eq!(
                counterflow_effectiveness(ntu, 1.0),
                ntu / (1.0 + ntu),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn limit_is_continuous() {
        let at_one = counterflow_effectiveness(4.5, 1.0);
        let near_one = counterflow_effectiveness(4.5, 1.0 - 1e-4);
        assert!((at_one - near_one).abs() < 1e-3);
    }

    #[test]
    fn zero_capacity_ratio_reduces_to_single_stream() {
        let eps = counterflow_effectiveness(2.0, 0.0);
        assert_relative_eq!(eps, 1.0 - (-2.0f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn zero_ntu_transfers_nothing() {
        assert_eq!(counterflow_effectiveness(0.0, 0.3), 0.0);
    }

    #[test]
    fn rejects_bad_geometry() {
        use bop_core::units::m3;
        assert!(CounterflowExchanger::new(m3(0.0), m3(1.0), 4.5).is_err());
        assert!(CounterflowExchanger::new(m3(1.0), m3(1.0), -1.0).is_err());
    }

    proptest! {
        #[test]
        fn effectiveness_stays_in_unit_interval(ntu in 0.0f64..50.0, cr in 0.0f64..=1.0) {
            let eps = counterflow_effectiveness(ntu, cr);
            prop_assert!((0.0..=1.0).contains(&eps));
        }

        #[test]
        fn effectiveness_grows_with_ntu(ntu in 0.01f64..20.0, cr in 0.0f64..=1.0) {
            let lo = counterflow_effectiveness(ntu, cr);
            let hi = counterflow_effectiveness(ntu * 1.5, cr);
            prop_assert!(hi + 1e-12 >= lo);
        }
    }
}
