//! Standard quantity definitions shared by the module adapters.

use crate::boundary::BoundaryCondition;
use crate::error::SimResult;
use bop_results::{Phase, Quantity};

/// Time tag of every module history; rows are stamped in seconds.
pub const TIME_UNIT: &str = "s";

pub fn temp(value: f64, info: &str) -> Quantity {
    Quantity::new("temp", "K", value)
        .formal("T")
        .latex(r"$T$")
        .info(info)
}

pub fn pressure(value: f64, info: &str) -> Quantity {
    Quantity::new("pressure", "Pa", value)
        .formal("P")
        .latex(r"$P$")
        .info(info)
}

pub fn flowrate(value: f64, info: &str) -> Quantity {
    Quantity::new("flowrate", "kg/s", value)
        .formal("m_dot")
        .latex(r"$\dot{m}$")
        .info(info)
}

pub fn quality(value: f64, info: &str) -> Quantity {
    Quantity::new("quality", "", value)
        .formal("X")
        .latex(r"$\chi$")
        .info(info)
}

pub fn power(value: f64, info: &str) -> Quantity {
    Quantity::new("power", "W", value)
        .formal("W")
        .latex(r"$\dot{W}$")
        .info(info)
}

pub fn stream_quantities(bc: &BoundaryCondition, label: &str) -> Vec<Quantity> {
    vec![
        temp(bc.temperature.value, &format!("{label} temperature")),
        pressure(bc.pressure.value, &format!("{label} pressure")),
        flowrate(bc.mass_flowrate.value, &format!("{label} mass flow rate")),
    ]
}

/// Phase holding the boundary-condition triple, first row at `time`.
pub fn stream_phase(time: f64, bc: &BoundaryCondition, label: &str) -> SimResult<Phase> {
    Ok(Phase::new(time, TIME_UNIT, stream_quantities(bc, label))?)
}

/// Overwrite the triple (and any carried optional fields) in the row at `time`.
pub fn write_record(phase: &mut Phase, bc: &BoundaryCondition, time: f64) -> SimResult<()> {
    phase.set_value("temp", bc.temperature.value, time)?;
    phase.set_value("pressure", bc.pressure.value, time)?;
    phase.set_value("flowrate", bc.mass_flowrate.value, time)?;
    if let (Some(x), Some(_)) = (bc.quality, phase.quantity("quality")) {
        phase.set_value("quality", x, time)?;
    }
    if let (Some(p), Some(_)) = (bc.power, phase.quantity("power")) {
        phase.set_value("power", p.value, time)?;
    }
    Ok(())
}

/// Write an accepted record into the newest row.
pub fn apply_to_latest(phase: &mut Phase, bc: &BoundaryCondition) -> SimResult<()> {
    let time = phase.latest_time();
    write_record(phase, bc, time)
}

pub fn read_record(phase: &Phase, time: f64) -> SimResult<BoundaryCondition> {
    Ok(BoundaryCondition::from_si(
        phase.get_value("temp", time)?,
        phase.get_value("pressure", time)?,
        phase.get_value("flowrate", time)?,
    ))
}

/// Copy every phase's row at `from` forward to `to`.
pub fn carry_forward_all(phases: &mut [&mut Phase], from: f64, to: f64) -> SimResult<()> {
    for phase in phases.iter_mut() {
        phase.carry_forward(from, to)?;
    }
    Ok(())
}
