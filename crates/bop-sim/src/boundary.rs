//! Boundary-condition records exchanged over ports.

use bop_components::Stream;
use bop_core::units::{MassRate, Power, Pressure, Temperature, kgps, k, pa, w};
use std::fmt;

/// Optional fields a port can require on top of the physical triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Quality,
    Power,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Quality => write!(f, "quality"),
            Field::Power => write!(f, "power"),
        }
    }
}

/// Why a record was rejected at a port.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordDefect {
    Missing(Field),
    Invalid(&'static str),
}

/// State passed between adjacent modules.
///
/// Temperature, pressure and mass flow are always present; quality and power
/// are carried only by ports that publish them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundaryCondition {
    pub temperature: Temperature,
    pub pressure: Pressure,
    pub mass_flowrate: MassRate,
    pub quality: Option<f64>,
    pub power: Option<Power>,
}

impl BoundaryCondition {
    pub fn new(temperature: Temperature, pressure: Pressure, mass_flowrate: MassRate) -> Self {
        Self {
            temperature,
            pressure,
            mass_flowrate,
            quality: None,
            power: None,
        }
    }

    /// Build from raw SI values (K, Pa, kg/s).
    pub fn from_si(t_k: f64, p_pa: f64, mdot_kgps: f64) -> Self {
        Self::new(k(t_k), pa(p_pa), kgps(mdot_kgps))
    }

    pub fn with_quality(mut self, quality: f64) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn with_power(mut self, watts: f64) -> Self {
        self.power = Some(w(watts));
        self
    }

    pub fn stream(&self) -> Stream {
        Stream::new(self.temperature, self.pressure, self.mass_flowrate)
    }

    pub fn get(&self, field: Field) -> Option<f64> {
        match field {
            Field::Quality => self.quality,
            Field::Power => self.power.map(|p| p.value),
        }
    }

    /// Check the physical triple and the presence of `required` fields.
    pub fn check(&self, required: &[Field]) -> Result<(), RecordDefect> {
        let t = self.temperature.value;
        let p = self.pressure.value;
        let mdot = self.mass_flowrate.value;
        if !(t.is_finite() && t > 0.0) {
            return Err(RecordDefect::Invalid("temperature must be positive and finite"));
        }
        if !(p.is_finite() && p > 0.0) {
            return Err(RecordDefect::Invalid("pressure must be positive and finite"));
        }
        if !(mdot.is_finite() && mdot >= 0.0) {
            return Err(RecordDefect::Invalid("mass flow rate must be non-negative and finite"));
        }
        for &field in required {
            match self.get(field) {
                None => return Err(RecordDefect::Missing(field)),
                Some(v) if !v.is_finite() => {
                    return Err(RecordDefect::Invalid("optional field must be finite"));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

impl From<Stream> for BoundaryCondition {
    fn from(s: Stream) -> Self {
        Self::new(s.temperature, s.pressure, s.mass_flowrate)
    }
}
