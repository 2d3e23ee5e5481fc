//! Closed-form cooling tower.
//!
//! Returns water at a fixed temperature and pressure and passes the mass
//! flow straight through. No internal state is integrated.

use crate::common::Stream;
use crate::error::{ComponentError, ComponentResult};
use bop_core::units::{Pressure, Temperature, bar, celsius};

#[derive(Clone, Debug)]
pub struct CoolingTower {
    pub outflow_temperature: Temperature,
    pub outflow_pressure: Pressure,
}

impl Default for CoolingTower {
    fn default() -> Self {
        Self {
            outflow_temperature: celsius(50.0),
            outflow_pressure: bar(34.0),
        }
    }
}

impl CoolingTower {
    pub fn new(outflow_temperature: Temperature, outflow_pressure: Pressure) -> ComponentResult<Self> {
        if !(outflow_temperature.value > 0.0 && outflow_pressure.value > 0.0) {
            return Err(ComponentError::InvalidArg {
                what: "tower outflow temperature and pressure must be positive",
            });
        }
        Ok(Self {
            outflow_temperature,
            outflow_pressure,
        })
    }

    pub fn update(&self, inflow: &Stream) -> ComponentResult<Stream> {
        inflow.validate()?;
        Ok(Stream::new(
            self.outflow_temperature,
            self.outflow_pressure,
            inflow.mass_flowrate,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bop_core::units::{k, kgps, mpa};

    #[test]
    fn passes_flow_through_at_target_state() {
        let tower = CoolingTower::default();
        let inflow = Stream::new(k(313.0), mpa(0.008066866), kgps(67.0));
        let out = tower.update(&inflow).unwrap();
        assert_eq!(out.mass_flowrate, inflow.mass_flowrate);
        assert!((out.temperature.value - 323.15).abs() < 1e-9);
        assert!((out.pressure.value - 3.4e6).abs() < 1e-6);
    }

    #[test]
    fn rejects_invalid_targets() {
        assert!(CoolingTower::new(k(0.0), bar(34.0)).is_err());
    }
}
