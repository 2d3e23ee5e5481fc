//! Display unit system.
//!
//! Everything inside the simulator is SI. A `UnitSystem` only decides how
//! times, temperatures and pressures are shown in progress lines and exports.
//! It is immutable and handed to each module at construction.

use crate::units::constants::T_ZERO_C_K;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TimeUnit {
    Second,
    #[default]
    Minute,
    Hour,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TemperatureUnit {
    #[default]
    Kelvin,
    Celsius,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PressureUnit {
    #[default]
    Pascal,
    Bar,
    Megapascal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UnitSystem {
    pub time: TimeUnit,
    pub temperature: TemperatureUnit,
    pub pressure: PressureUnit,
}

impl TimeUnit {
    pub fn seconds_per_unit(self) -> f64 {
        match self {
            TimeUnit::Second => 1.0,
            TimeUnit::Minute => 60.0,
            TimeUnit::Hour => 3600.0,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TimeUnit::Second => "s",
            TimeUnit::Minute => "min",
            TimeUnit::Hour => "h",
        }
    }
}

impl TemperatureUnit {
    pub fn symbol(self) -> &'static str {
        match self {
            TemperatureUnit::Kelvin => "K",
            TemperatureUnit::Celsius => "C",
        }
    }
}

impl PressureUnit {
    pub fn pascals_per_unit(self) -> f64 {
        match self {
            PressureUnit::Pascal => 1.0,
            PressureUnit::Bar => 1.0e5,
            PressureUnit::Megapascal => 1.0e6,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            PressureUnit::Pascal => "Pa",
            PressureUnit::Bar => "bar",
            PressureUnit::Megapascal => "MPa",
        }
    }
}

impl UnitSystem {
    pub fn time_from_si(&self, seconds: f64) -> f64 {
        seconds / self.time.seconds_per_unit()
    }

    pub fn temperature_from_si(&self, kelvin: f64) -> f64 {
        match self.temperature {
            TemperatureUnit::Kelvin => kelvin,
            TemperatureUnit::Celsius => kelvin - T_ZERO_C_K,
        }
    }

    pub fn pressure_from_si(&self, pascal: f64) -> f64 {
        pascal / self.pressure.pascals_per_unit()
    }

    /// Convert an SI value carrying unit label `unit` into display units.
    ///
    /// Returns the converted value and its display label. Labels other than
    /// `s`, `K` and `Pa` pass through unchanged.
    pub fn display(&self, value: f64, unit: &str) -> (f64, &'static str) {
        match unit {
            "s" => (self.time_from_si(value), self.time.symbol()),
            "K" => (self.temperature_from_si(value), self.temperature.symbol()),
            "Pa" => (self.pressure_from_si(value), self.pressure.symbol()),
            _ => (value, ""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_shows_minutes_kelvin_pascal() {
        let units = UnitSystem::default();
        assert_eq!(units.time_from_si(120.0), 2.0);
        assert_eq!(units.temperature_from_si(300.0), 300.0);
        assert_eq!(units.pressure_from_si(5.0), 5.0);
    }

    #[test]
    fn celsius_and_bar_conversion() {
        let units = UnitSystem {
            time: TimeUnit::Hour,
            temperature: TemperatureUnit::Celsius,
            pressure: PressureUnit::Bar,
        };
        assert!((units.temperature_from_si(373.15) - 100.0).abs() < 1e-9);
        assert!((units.pressure_from_si(2.0e6) - 20.0).abs() < 1e-9);
        assert!((units.time_from_si(7200.0) - 2.0).abs() < 1e-12);

        let (v, label) = units.display(3.4e6, "Pa");
        assert!((v - 34.0).abs() < 1e-9);
        assert_eq!(label, "bar");

        let (v, label) = units.display(0.5, "");
        assert_eq!(v, 0.5);
        assert_eq!(label, "");
    }
}
