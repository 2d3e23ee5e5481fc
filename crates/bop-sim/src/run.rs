//! Per-module run loop.
//!
//! `Idle -> {sync ports -> advance -> record} -> (time >= end)? -> Done`.
//! If the first step already passes `end_time` the end is moved to
//! `initial_time + time_step`; after the loop `end_time` is set to the last
//! time actually reached.

use crate::error::{SimError, SimResult};
use crate::module::Module;
use crate::sync::PortSet;
use bop_core::numeric::TIME_TOLERANCE;

/// Order of synchronization and stepping within one iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LoopOrder {
    /// Pull inflows at the current time, then advance.
    #[default]
    SyncThenStep,
    /// Advance first, then synchronize at the new time.
    StepThenSync,
}

/// Periodic progress logging.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShowTime {
    pub enabled: bool,
    /// Reporting interval [s]; never shorter than the time step.
    pub interval: f64,
}

impl Default for ShowTime {
    fn default() -> Self {
        Self {
            enabled: false,
            interval: 10.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    /// [s]
    pub initial_time: f64,
    /// [s]
    pub end_time: f64,
    /// [s]
    pub time_step: f64,
    pub show_time: ShowTime,
    pub order: LoopOrder,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            initial_time: 0.0,
            end_time: 3600.0,
            time_step: 10.0,
            show_time: ShowTime::default(),
            order: LoopOrder::default(),
        }
    }
}

impl RunConfig {
    pub fn with_order(mut self, order: LoopOrder) -> Self {
        self.order = order;
        self
    }

    pub fn validate(&self) -> SimResult<()> {
        if !(self.initial_time.is_finite() && self.end_time.is_finite()) {
            return Err(SimError::InvalidConfig {
                what: "initial and end time must be finite",
            });
        }
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return Err(SimError::InvalidConfig {
                what: "time step must be positive",
            });
        }
        if self.end_time < self.initial_time {
            return Err(SimError::InvalidConfig {
                what: "end time precedes initial time",
            });
        }
        Ok(())
    }

    /// End time after the one-step correction.
    pub fn effective_end(&self) -> f64 {
        let first = self.initial_time + self.time_step;
        if first > self.end_time { first } else { self.end_time }
    }

    /// Number of iterations the run loop will perform.
    pub fn step_count(&self) -> usize {
        let end = self.effective_end();
        let mut time = self.initial_time;
        let mut steps = 0;
        while time < end - TIME_TOLERANCE {
            time += self.time_step;
            steps += 1;
        }
        steps
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub module: String,
    pub initial_time: f64,
    /// Last time reached.
    pub end_time: f64,
    pub time_step: f64,
    pub steps: usize,
}

/// Drive `module` from its initial to its end time.
///
/// Any error aborts the loop; there is no retry.
pub fn run_module(module: &mut dyn Module, ports: &PortSet) -> SimResult<RunSummary> {
    let config = module.config().clone();
    config.validate()?;

    let dt = config.time_step;
    let end = config.effective_end();
    if end != config.end_time {
        tracing::debug!(
            module = module.name(),
            end_time = config.end_time,
            corrected = end,
            "end time moved to one full step"
        );
    }

    let show = config.show_time.enabled;
    let interval = config.show_time.interval.max(dt);
    let mut time = config.initial_time;
    let mut last_report = time;
    let mut steps = 0;

    if show {
        report_progress(module, time);
    }

    while time < end - TIME_TOLERANCE {
        match config.order {
            LoopOrder::SyncThenStep => {
                ports.sync(module, time)?;
                module.step(time, dt)?;
            }
            LoopOrder::StepThenSync => {
                module.step(time, dt)?;
                ports.sync(module, time + dt)?;
            }
        }
        time += dt;
        steps += 1;
        tracing::trace!(module = module.name(), time, "step done");

        if show && time - last_report >= interval - TIME_TOLERANCE {
            report_progress(module, time);
            last_report = time;
        }
    }

    module.config_mut().end_time = time;
    tracing::debug!(module = module.name(), steps, end_time = time, "run loop finished");

    Ok(RunSummary {
        module: module.name().to_string(),
        initial_time: config.initial_time,
        end_time: time,
        time_step: dt,
        steps,
    })
}

fn report_progress(module: &dyn Module, time: f64) {
    let (value, unit) = module.units().display(time, "s");
    tracing::info!(module = module.name(), "time = {value:.3} {unit}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_run_is_stretched_to_one_step() {
        let cfg = RunConfig {
            initial_time: 0.0,
            end_time: 3.0,
            time_step: 10.0,
            ..RunConfig::default()
        };
        assert_eq!(cfg.effective_end(), 10.0);
        assert_eq!(cfg.step_count(), 1);
    }

    #[test]
    fn undershooting_last_step_adds_one() {
        let cfg = RunConfig {
            initial_time: 0.0,
            end_time: 25.0,
            time_step: 10.0,
            ..RunConfig::default()
        };
        assert_eq!(cfg.step_count(), 3);
    }

    #[test]
    fn exact_multiple_has_no_extra_step() {
        let cfg = RunConfig {
            initial_time: 0.0,
            end_time: 1.0,
            time_step: 0.1,
            ..RunConfig::default()
        };
        assert_eq!(cfg.step_count(), 10);
    }

    #[test]
    fn invalid_configs() {
        let mut cfg = RunConfig::default();
        cfg.time_step = 0.0;
        assert!(cfg.validate().is_err());
        let mut cfg = RunConfig::default();
        cfg.end_time = -1.0;
        assert!(cfg.validate().is_err());
    }
}
