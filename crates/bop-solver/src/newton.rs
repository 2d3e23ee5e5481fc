//! Damped Newton solver.

use crate::error::SolverError;
use nalgebra::{DMatrix, DVector};

/// Newton solver configuration.
#[derive(Debug, Clone)]
pub struct NewtonConfig {
    /// Maximum iterations
    pub max_iterations: usize,
    /// Absolute tolerance for residual norm
    pub abs_tol: f64,
    /// Relative tolerance for residual norm
    pub rel_tol: f64,
    /// Lower bound every unknown must respect (e.g. absolute temperature)
    pub min_value: Option<f64>,
    /// Line search backtracking factor
    pub line_search_beta: f64,
    /// Maximum line search iterations
    pub max_line_search_iters: usize,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            abs_tol: 1e-6,
            rel_tol: 1e-6,
            min_value: None,
            line_search_beta: 0.5,
            max_line_search_iters: 20,
        }
    }
}

/// Newton iteration result.
#[derive(Debug, Clone)]
pub struct NewtonResult {
    /// Last iterate
    pub x: DVector<f64>,
    /// Final residual norm
    pub residual_norm: f64,
    /// Number of iterations
    pub iterations: usize,
    /// Converged flag
    pub converged: bool,
}

/// Newton solver with backtracking line search.
///
/// Non-convergence (iteration cap, stagnated line search, singular Jacobian)
/// is reported through `converged == false`; `Err` is reserved for errors
/// raised by the residual or Jacobian callbacks themselves.
pub fn newton_solve<F, J, E>(
    x0: DVector<f64>,
    residual_fn: F,
    jacobian_fn: J,
    config: &NewtonConfig,
) -> Result<NewtonResult, E>
where
    F: Fn(&DVector<f64>) -> Result<DVector<f64>, E>,
    J: Fn(&DVector<f64>, &DVector<f64>) -> Result<DMatrix<f64>, E>,
    E: From<SolverError>,
{
    let mut x = x0;
    let mut r = residual_fn(&x)?;
    let mut r_norm = r.norm();
    let r0_norm = r_norm;

    let not_converged = |x: DVector<f64>, r_norm: f64, iterations: usize| NewtonResult {
        x,
        residual_norm: r_norm,
        iterations,
        converged: false,
    };

    for iter in 0..config.max_iterations {
        if r_norm < config.abs_tol || r_norm < config.rel_tol * r0_norm {
            return Ok(NewtonResult {
                x,
                residual_norm: r_norm,
                iterations: iter,
                converged: true,
            });
        }

        let jac = jacobian_fn(&x, &r)?;

        // Solve J * dx = -r
        let Some(dx) = jac.lu().solve(&(-&r)) else {
            tracing::trace!(iter, "newton: singular Jacobian");
            return Ok(not_converged(x, r_norm, iter));
        };

        let within_bounds =
            |v: &DVector<f64>| config.min_value.is_none_or(|lo| v.iter().all(|&xi| xi >= lo));

        let mut alpha = 1.0;
        let mut x_new = &x + alpha * &dx;
        let mut accepted = false;
        let mut r_new = r.clone();
        let mut r_new_norm = r_norm;

        for _ in 0..config.max_line_search_iters {
            if within_bounds(&x_new) {
                r_new = residual_fn(&x_new)?;
                r_new_norm = r_new.norm();
                if r_new_norm.is_finite() && r_new_norm < r_norm {
                    accepted = true;
                    break;
                }
            }

            alpha *= config.line_search_beta;
            x_new = &x + alpha * &dx;
        }

        if !accepted {
            return Ok(not_converged(x, r_norm, iter));
        }

        x = x_new;
        r = r_new;
        r_norm = r_new_norm;
    }

    if r_norm < config.abs_tol || r_norm < config.rel_tol * r0_norm {
        return Ok(NewtonResult {
            x,
            residual_norm: r_norm,
            iterations: config.max_iterations,
            converged: true,
        });
    }

    Ok(not_converged(x, r_norm, config.max_iterations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SolverResult;
    use crate::jacobian::finite_difference_jacobian;

    #[test]
    fn simple_quadratic() {
        // Solve x^2 - 4 = 0, x > 0
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0] - 4.0))
        };
        let jacobian = |x: &DVector<f64>, _r: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_element(1, 1, 2.0 * x[0]))
        };

        let x0 = DVector::from_element(1, 3.0);
        let config = NewtonConfig::default();
        let result = newton_solve(x0, residual, jacobian, &config).unwrap();

        assert!(result.converged);
        assert!((result.x[0] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn finite_difference_jacobian_drives_newton() {
        // x^3 = 8 and y = x + 1
        let residual = |v: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_vec(vec![v[0].powi(3) - 8.0, v[1] - v[0] - 1.0]))
        };
        let jacobian = |v: &DVector<f64>, r: &DVector<f64>| {
            finite_difference_jacobian(v, r, residual, 1e-7)
        };

        let result = newton_solve(
            DVector::from_vec(vec![3.0, 0.0]),
            residual,
            jacobian,
            &NewtonConfig::default(),
        )
        .unwrap();

        assert!(result.converged);
        assert!((result.x[0] - 2.0).abs() < 1e-6);
        assert!((result.x[1] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn singular_jacobian_reports_not_converged() {
        let residual = |_: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, 1.0))
        };
        let jacobian = |_: &DVector<f64>, _: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::zeros(1, 1))
        };
        let result = newton_solve(
            DVector::from_element(1, 0.0),
            residual,
            jacobian,
            &NewtonConfig::default(),
        )
        .unwrap();
        assert!(!result.converged);
    }

    #[test]
    fn lower_bound_is_respected() {
        // Root at x = -2 is excluded by min_value; x = 2 is found instead.
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0] - 4.0))
        };
        let jacobian = |x: &DVector<f64>, _r: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_element(1, 1, 2.0 * x[0]))
        };
        let config = NewtonConfig {
            min_value: Some(0.0),
            ..NewtonConfig::default()
        };
        let result = newton_solve(DVector::from_element(1, 0.5), residual, jacobian, &config)
            .unwrap();
        assert!(result.converged);
        assert!(result.x[0] > 0.0);
    }
}
