//! Pipe friction diagnostics.
//!
//! Computes the Reynolds number of the inflow and, for every correlation in
//! [`crate::friction::CORRELATIONS`], the friction factor and pressure
//! gradient
//!
//! ```text
//! Re = 4ṁ/(π·D·μ),   v = ṁ/(ρ·π·D²/4),   ΔP = (ρ/2)·v²/D·f
//! ```
//!
//! Nothing here feeds back into the flow; the values are recorded only.

use crate::common::{Stream, check_finite};
use crate::error::{ComponentError, ComponentResult};
use crate::friction::CORRELATIONS;
use bop_core::units::Length;
use bop_fluids::PropertyOracle;
use std::f64::consts::PI;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrictionEstimate {
    pub key: &'static str,
    pub factor: f64,
    /// Pressure drop per metre of pipe [Pa/m].
    pub pressure_drop: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PipeDiagnostics {
    pub reynolds: f64,
    pub velocity: f64,
    pub density: f64,
    pub viscosity: f64,
    pub estimates: Vec<FrictionEstimate>,
}

#[derive(Clone, Debug)]
pub struct Pipe {
    /// Pipe inner diameter
    pub diameter: Length,
    /// Surface roughness (absolute)
    pub roughness: Length,
}

impl Pipe {
    pub fn new(diameter: Length, roughness: Length) -> ComponentResult<Self> {
        if diameter.value.is_nan() || diameter.value <= 0.0 {
            return Err(ComponentError::InvalidArg {
                what: "pipe diameter must be positive",
            });
        }
        if roughness.value.is_nan() || roughness.value < 0.0 {
            return Err(ComponentError::InvalidArg {
                what: "pipe roughness must be non-negative",
            });
        }
        Ok(Self {
            diameter,
            roughness,
        })
    }

    /// e/D
    pub fn relative_roughness(&self) -> f64 {
        self.roughness.value / self.diameter.value
    }

    pub fn flow_area(&self) -> f64 {
        PI * self.diameter.value.powi(2) / 4.0
    }

    pub fn evaluate(&self, oracle: &dyn PropertyOracle, inflow: &Stream) -> ComponentResult<PipeDiagnostics> {
        inflow.validate()?;
        let props = oracle.at_pt(inflow.pressure, inflow.temperature)?;
        let rho = props.rho.value;
        let mu = props.mu.value;
        check_finite(mu, "dynamic viscosity")?;
        if mu <= 0.0 {
            return Err(ComponentError::NonPhysical {
                what: "dynamic viscosity must be positive",
            });
        }

        let d = self.diameter.value;
        let mdot = inflow.mass_flowrate.value;
        let reynolds = 4.0 * mdot / (PI * d * mu);
        let velocity = mdot / (self.flow_area() * rho);
        let rel = self.relative_roughness();
        let dynamic_head = 0.5 * rho * velocity.powi(2) / d;

        let estimates = CORRELATIONS
            .iter()
            .map(|c| {
                let factor = c.factor(reynolds, rel);
                FrictionEstimate {
                    key: c.key,
                    factor,
                    pressure_drop: dynamic_head * factor,
                }
            })
            .collect();

        Ok(PipeDiagnostics {
            reynolds,
            velocity,
            density: rho,
            viscosity: mu,
            estimates,
        })
    }
}

/// Linear flow sweep from zero at t = 0 to `peak` at `end_time`.
pub fn ramped_flow(time: f64, end_time: f64, peak: f64) -> f64 {
    if end_time <= 0.0 {
        return peak;
    }
    (time / end_time).clamp(0.0, 1.0) * peak
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bop_core::units::{k, m, mpa};
    use bop_fluids::SurrogateWater;

    fn demo_pipe() -> Pipe {
        Pipe::new(m(0.2), m(0.061e-3)).unwrap()
    }

    #[test]
    fn reynolds_and_velocity() {
        let water = SurrogateWater::new();
        let pipe = demo_pipe();
        let inflow = Stream::new(k(400.0), mpa(12.8), bop_core::units::kgps(500.0));
        let diag = pipe.evaluate(&water, &inflow).unwrap();

        let expected_re = 4.0 * 500.0 / (PI * 0.2 * diag.viscosity);
        assert_relative_eq!(diag.reynolds, expected_re, max_relative = 1e-12);
        assert_relative_eq!(diag.velocity, 500.0 / (pipe.flow_area() * 998.0), max_relative = 1e-12);
        assert_eq!(diag.estimates.len(), 5);
        for est in &diag.estimates {
            assert!(est.factor > 0.0, "{}", est.key);
            assert_relative_eq!(
                est.pressure_drop,
                0.5 * diag.density * diag.velocity.powi(2) / 0.2 * est.factor,
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn no_flow_has_no_friction() {
        let water = SurrogateWater::new();
        let inflow = Stream::new(k(400.0), mpa(12.8), bop_core::units::kgps(0.0));
        let diag = demo_pipe().evaluate(&water, &inflow).unwrap();
        assert_eq!(diag.reynolds, 0.0);
        assert!(diag.estimates.iter().all(|e| e.factor == 0.0 && e.pressure_drop == 0.0));
    }

    #[test]
    fn ramp_is_linear_and_bounded() {
        assert_eq!(ramped_flow(0.0, 100.0, 1000.0), 0.0);
        assert_eq!(ramped_flow(50.0, 100.0, 1000.0), 500.0);
        assert_eq!(ramped_flow(150.0, 100.0, 1000.0), 1000.0);
    }

    #[test]
    fn rejects_bad_geometry() {
        assert!(Pipe::new(m(0.0), m(1e-4)).is_err());
        assert!(Pipe::new(m(0.2), m(-1e-4)).is_err());
    }
}
