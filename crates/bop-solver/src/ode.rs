//! One-interval adaptive ODE integration.
//!
//! `integrate` advances `du/dt = f(t, u)` from `t0` to `t1` and returns only
//! the state at `t1`; sub-steps are internal. Step size is controlled on a
//! weighted RMS error norm with per-component scale `atol + rtol * |u|`.

use crate::error::SolverError;
use crate::jacobian::finite_difference_jacobian;
use crate::newton::{NewtonConfig, newton_solve};
use bop_core::numeric::weighted_rms;
use nalgebra::DVector;

/// Integration method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OdeMethod {
    /// Backward Euler with step-doubling error estimate. L-stable, suited to
    /// stiff energy balances; never overshoots a relaxing equilibrium.
    #[default]
    BackwardEuler,
    /// Explicit Dormand-Prince 4(5) with embedded error estimate.
    DormandPrince,
}

#[derive(Debug, Clone)]
pub struct OdeOptions {
    pub rtol: f64,
    pub atol: f64,
    /// Budget of internal step attempts per call, rejected ones included.
    pub max_steps: usize,
    /// First trial step; defaults to the whole interval.
    pub initial_step: Option<f64>,
    /// Absolute floor on the step size.
    pub min_step: f64,
    /// Lower bound on every state component during implicit solves.
    pub min_state: Option<f64>,
    pub method: OdeMethod,
}

impl Default for OdeOptions {
    fn default() -> Self {
        Self {
            rtol: 1e-4,
            atol: 1e-8,
            max_steps: 1000,
            initial_step: None,
            min_step: 1e-12,
            min_state: None,
            method: OdeMethod::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OdeSolution {
    /// State at the end of the interval.
    pub u: DVector<f64>,
    pub accepted_steps: usize,
    pub rejected_steps: usize,
}

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 5.0;

/// Outcome of one trial step.
enum Trial {
    Done { u: DVector<f64>, err: f64 },
    /// Implicit stage did not converge; shrink and retry.
    StageFailed,
}

/// A single-step scheme with an error estimate.
trait StepScheme {
    /// Order of the propagated solution, sets the step-size exponent.
    const ORDER: i32;

    fn attempt<F, E>(
        rhs: &F,
        t: f64,
        u: &DVector<f64>,
        h: f64,
        opts: &OdeOptions,
    ) -> Result<Trial, E>
    where
        F: Fn(f64, &DVector<f64>) -> Result<DVector<f64>, E>,
        E: From<SolverError>;
}

struct BackwardEuler;
struct DormandPrince;

impl BackwardEuler {
    /// Solve `y - u - h f(t + h, y) = 0` by Newton from `y = u`.
    fn stage<F, E>(
        rhs: &F,
        t: f64,
        u: &DVector<f64>,
        h: f64,
        opts: &OdeOptions,
    ) -> Result<Option<DVector<f64>>, E>
    where
        F: Fn(f64, &DVector<f64>) -> Result<DVector<f64>, E>,
        E: From<SolverError>,
    {
        let t_new = t + h;
        let residual = |y: &DVector<f64>| -> Result<DVector<f64>, E> {
            let f = rhs(t_new, y)?;
            Ok(y - u - f * h)
        };
        let jacobian = |y: &DVector<f64>, r: &DVector<f64>| {
            finite_difference_jacobian(y, r, residual, 1e-7)
        };

        let scale = u.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        let config = NewtonConfig {
            max_iterations: 10,
            abs_tol: 1e-6 * (opts.atol + opts.rtol * scale),
            rel_tol: 0.0,
            min_value: opts.min_state,
            ..NewtonConfig::default()
        };

        let result = newton_solve(u.clone(), residual, jacobian, &config)?;
        Ok(result.converged.then_some(result.x))
    }
}

impl StepScheme for BackwardEuler {
    const ORDER: i32 = 1;

    fn attempt<F, E>(
        rhs: &F,
        t: f64,
        u: &DVector<f64>,
        h: f64,
        opts: &OdeOptions,
    ) -> Result<Trial, E>
    where
        F: Fn(f64, &DVector<f64>) -> Result<DVector<f64>, E>,
        E: From<SolverError>,
    {
        let Some(full) = Self::stage(rhs, t, u, h, opts)? else {
            return Ok(Trial::StageFailed);
        };
        let Some(half) = Self::stage(rhs, t, u, 0.5 * h, opts)? else {
            return Ok(Trial::StageFailed);
        };
        let Some(two_halves) = Self::stage(rhs, t + 0.5 * h, &half, 0.5 * h, opts)? else {
            return Ok(Trial::StageFailed);
        };

        let diff = &two_halves - &full;
        let err = weighted_rms(
            diff.as_slice(),
            u.as_slice(),
            two_halves.as_slice(),
            opts.rtol,
            opts.atol,
        );
        Ok(Trial::Done {
            u: two_halves,
            err,
        })
    }
}

// Dormand-Prince 5(4) tableau.
const DP_C: [f64; 7] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0];
const DP_A: [[f64; 6]; 7] = [
    [0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0 / 5.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [3.0 / 40.0, 9.0 / 40.0, 0.0, 0.0, 0.0, 0.0],
    [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0, 0.0, 0.0, 0.0],
    [
        19372.0 / 6561.0,
        -25360.0 / 2187.0,
        64448.0 / 6561.0,
        -212.0 / 729.0,
        0.0,
        0.0,
    ],
    [
        9017.0 / 3168.0,
        -355.0 / 33.0,
        46732.0 / 5247.0,
        49.0 / 176.0,
        -5103.0 / 18656.0,
        0.0,
    ],
    [
        35.0 / 384.0,
        0.0,
        500.0 / 1113.0,
        125.0 / 192.0,
        -2187.0 / 6784.0,
        11.0 / 84.0,
    ],
];
const DP_B5: [f64; 7] = [
    35.0 / 384.0,
    0.0,
    500.0 / 1113.0,
    125.0 / 192.0,
    -2187.0 / 6784.0,
    11.0 / 84.0,
    0.0,
];
const DP_B4: [f64; 7] = [
    5179.0 / 57600.0,
    0.0,
    7571.0 / 16695.0,
    393.0 / 640.0,
    -92097.0 / 339200.0,
    187.0 / 2100.0,
    1.0 / 40.0,
];

impl StepScheme for DormandPrince {
    const ORDER: i32 = 4;

    fn attempt<F, E>(
        rhs: &F,
        t: f64,
        u: &DVector<f64>,
        h: f64,
        opts: &OdeOptions,
    ) -> Result<Trial, E>
    where
        F: Fn(f64, &DVector<f64>) -> Result<DVector<f64>, E>,
        E: From<SolverError>,
    {
        let mut k: Vec<DVector<f64>> = Vec::with_capacity(7);
        for stage in 0..7 {
            let mut y = u.clone();
            for (j, kj) in k.iter().enumerate() {
                let a = DP_A[stage][j];
                if a != 0.0 {
                    y += kj * (a * h);
                }
            }
            k.push(rhs(t + DP_C[stage] * h, &y)?);
        }

        let mut u5 = u.clone();
        let mut u4 = u.clone();
        for (i, ki) in k.iter().enumerate() {
            u5 += ki * (DP_B5[i] * h);
            u4 += ki * (DP_B4[i] * h);
        }

        let diff = &u5 - &u4;
        let err = weighted_rms(
            diff.as_slice(),
            u.as_slice(),
            u5.as_slice(),
            opts.rtol,
            opts.atol,
        );
        Ok(Trial::Done { u: u5, err })
    }
}

/// Advance `u0` from `t0` to `t1`.
///
/// Fails with `SolverError::IntegrationFailure` when the step budget is spent,
/// the step size underflows, or the state turns non-finite. Errors raised by
/// `rhs` are returned unchanged.
pub fn integrate<F, E>(
    rhs: F,
    u0: &DVector<f64>,
    t0: f64,
    t1: f64,
    opts: &OdeOptions,
) -> Result<OdeSolution, E>
where
    F: Fn(f64, &DVector<f64>) -> Result<DVector<f64>, E>,
    E: From<SolverError>,
{
    match opts.method {
        OdeMethod::BackwardEuler => drive::<BackwardEuler, F, E>(&rhs, u0, t0, t1, opts),
        OdeMethod::DormandPrince => drive::<DormandPrince, F, E>(&rhs, u0, t0, t1, opts),
    }
}

fn drive<S, F, E>(
    rhs: &F,
    u0: &DVector<f64>,
    t0: f64,
    t1: f64,
    opts: &OdeOptions,
) -> Result<OdeSolution, E>
where
    S: StepScheme,
    F: Fn(f64, &DVector<f64>) -> Result<DVector<f64>, E>,
    E: From<SolverError>,
{
    if !(t0.is_finite() && t1.is_finite()) || t1 < t0 {
        return Err(SolverError::InvalidInput {
            what: "integration interval must be finite with t1 >= t0",
        }
        .into());
    }
    if opts.rtol <= 0.0 || opts.atol <= 0.0 {
        return Err(SolverError::InvalidInput {
            what: "tolerances must be positive",
        }
        .into());
    }
    if u0.iter().any(|v| !v.is_finite()) {
        return Err(SolverError::InvalidInput {
            what: "initial state must be finite",
        }
        .into());
    }

    let span = t1 - t0;
    let end_eps = 1e-12 * t1.abs().max(1.0);
    let mut t = t0;
    let mut u = u0.clone();
    let mut h = opts.initial_step.unwrap_or(span).min(span);
    let mut accepted = 0;
    let mut rejected = 0;
    let exponent = -1.0 / f64::from(S::ORDER + 1);

    while t1 - t > end_eps {
        if accepted + rejected >= opts.max_steps {
            return Err(SolverError::IntegrationFailure {
                message: format!(
                    "excess work: {} step attempts at t={:.6} without reaching t1={:.6} (h={:.3e})",
                    opts.max_steps, t, t1, h
                ),
            }
            .into());
        }

        h = h.min(t1 - t);
        if h < opts.min_step {
            return Err(SolverError::IntegrationFailure {
                message: format!("step size underflow: h={:.3e} at t={:.6}", h, t),
            }
            .into());
        }

        match S::attempt(rhs, t, &u, h, opts)? {
            Trial::StageFailed => {
                rejected += 1;
                tracing::trace!(t, h, "ode: implicit stage failed, shrinking step");
                h *= 0.25;
            }
            Trial::Done { u: u_new, err } if err.is_finite() && err <= 1.0 => {
                if u_new.iter().any(|v| !v.is_finite()) {
                    return Err(SolverError::IntegrationFailure {
                        message: format!("non-finite state at t={:.6}", t + h),
                    }
                    .into());
                }
                accepted += 1;
                t += h;
                u = u_new;
                let factor = if err == 0.0 {
                    MAX_FACTOR
                } else {
                    (SAFETY * err.powf(exponent)).clamp(MIN_FACTOR, MAX_FACTOR)
                };
                h *= factor;
            }
            Trial::Done { err, .. } => {
                rejected += 1;
                let factor = if err.is_finite() {
                    (SAFETY * err.powf(exponent)).clamp(MIN_FACTOR, 1.0)
                } else {
                    MIN_FACTOR
                };
                tracing::trace!(t, h, err, "ode: step rejected");
                h *= factor;
            }
        }
    }

    Ok(OdeSolution {
        u,
        accepted_steps: accepted,
        rejected_steps: rejected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SolverResult;

    fn decay(_t: f64, u: &DVector<f64>) -> SolverResult<DVector<f64>> {
        Ok(-u.clone())
    }

    #[test]
    fn zero_length_interval_returns_initial_state() {
        let u0 = DVector::from_element(1, 3.0);
        let sol = integrate(decay, &u0, 5.0, 5.0, &OdeOptions::default()).unwrap();
        assert_eq!(sol.u[0], 3.0);
        assert_eq!(sol.accepted_steps, 0);
    }

    #[test]
    fn reversed_interval_rejected() {
        let u0 = DVector::from_element(1, 1.0);
        let err = integrate(decay, &u0, 1.0, 0.0, &OdeOptions::default()).unwrap_err();
        assert!(matches!(err, SolverError::InvalidInput { .. }));
    }

    #[test]
    fn backward_euler_tracks_exponential_decay() {
        let u0 = DVector::from_element(1, 1.0);
        let sol = integrate(decay, &u0, 0.0, 1.0, &OdeOptions::default()).unwrap();
        let exact = (-1.0_f64).exp();
        assert!(
            ((sol.u[0] - exact) / exact).abs() < 1e-2,
            "u = {}, exact = {}",
            sol.u[0],
            exact
        );
    }

    #[test]
    fn dormand_prince_tracks_exponential_decay() {
        let opts = OdeOptions {
            method: OdeMethod::DormandPrince,
            ..OdeOptions::default()
        };
        let u0 = DVector::from_element(1, 1.0);
        let sol = integrate(decay, &u0, 0.0, 1.0, &opts).unwrap();
        let exact = (-1.0_f64).exp();
        assert!(((sol.u[0] - exact) / exact).abs() < 1e-4);
    }
}
