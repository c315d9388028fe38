//! Damped Gauss-Newton solver for the 3-parameter logistic model.
//!
//! Given observations `(x_i, y_i)` and an initial guess, minimize the sum of
//! squared residuals `r_i = y_i - f(x_i, p)` over `p = (a0, a1, a2)`.
//!
//! Per iteration:
//! 1. Form the residual vector and the Jacobian `J` (columns are the negated
//!    parameter gradients).
//! 2. If `JᵗJ` has full rank, take the Gauss-Newton step from the normal
//!    equations `JᵗJ Δp = -Jᵗr`.
//! 3. Otherwise solve the damped system `(AᵗA + λI) Δp = Aᵗb` with
//!    `A = JᵗJ`, `b = -Jᵗr` and fixed `λ = 1e-3`. The damping constant is
//!    deliberately not adaptive; the fallback only has to get the iterate
//!    past a degenerate Jacobian.
//! 4. Backtracking line search: halve the step while it increases the
//!    residual norm, up to 5 halvings. The final candidate is accepted even
//!    if still worse (no step rejection).
//!
//! The convergence test runs at the top of each iteration on the previous
//! iteration's quantities: `‖Δp/p‖ <= rel_tol` (raw step over the updated
//! parameter vector, componentwise) and `‖Jᵗr‖ <= 1e-3`. Running past `k_max`
//! without meeting it is not an error; the caller inspects `converged`.

use nalgebra::{Matrix3, Vector3};

use crate::domain::LogisticParams;
use crate::error::AppError;
use crate::math::{rank3, solve3, solve3_damped};
use crate::model;

/// Gradient-norm half of the convergence test.
const GRAD_TOL: f64 = 1e-3;

/// Fixed damping for the rank-deficient fallback.
const DAMPING: f64 = 1e-3;

/// Step-halving cap in the backtracking line search.
const MAX_HALVINGS: usize = 5;

/// Raw solver output. Parameters are on the same scale as the input `y`.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub params: LogisticParams,
    /// `1 - SS_res / SS_tot` at the final iterate (can be negative).
    pub r_squared: f64,
    /// Iterations actually performed.
    pub iterations: usize,
    /// Whether the tolerance test was met within `k_max` iterations.
    pub converged: bool,
    /// Iterations that used the damped fallback.
    pub rank_deficient_steps: usize,
}

/// Fit the logistic model to `(x, y)` starting from `p0`.
///
/// # Errors
/// Fails fast on precondition violations: mismatched or empty inputs, or
/// `k_max < 1`. Non-convergence is reported through [`SolveOutcome`], not as
/// an error.
pub fn solve(
    x: &[f64],
    y: &[f64],
    p0: LogisticParams,
    k_max: usize,
    rel_tol: f64,
) -> Result<SolveOutcome, AppError> {
    if x.len() != y.len() {
        return Err(AppError::input(format!(
            "Abscissa/ordinate length mismatch: {} vs {}.",
            x.len(),
            y.len()
        )));
    }
    if x.is_empty() {
        return Err(AppError::input("Cannot fit an empty series."));
    }
    if k_max < 1 {
        return Err(AppError::input("Iteration cap k_max must be >= 1."));
    }

    let mut p = Vector3::new(p0.a0, p0.a1, p0.a2);
    let mut k = 0usize;
    let mut rank_deficient_steps = 0usize;
    let mut converged = false;

    // Previous-iteration quantities driving the convergence test.
    let mut step_norm = f64::INFINITY;
    let mut grad_norm = f64::INFINITY;

    loop {
        if step_norm <= rel_tol && grad_norm <= GRAD_TOL {
            converged = true;
            break;
        }
        if k >= k_max {
            break;
        }
        k += 1;

        let params = to_params(&p);
        let r = residuals(x, y, &params);

        // J[:, j] = -∂f/∂a_j; accumulate JᵗJ and Jᵗr row by row.
        let mut jtj = Matrix3::<f64>::zeros();
        let mut jtr = Vector3::<f64>::zeros();
        for (i, &ti) in x.iter().enumerate() {
            let jrow = -model::gradient(ti, &params);
            jtj += jrow * jrow.transpose();
            jtr += jrow * r[i];
        }
        let b = -jtr;

        let delta = if rank3(&jtj) == 3 {
            match solve3(&jtj, &b) {
                Some(d) => d,
                None => {
                    rank_deficient_steps += 1;
                    damped_step(&jtj, &b)?
                }
            }
        } else {
            rank_deficient_steps += 1;
            damped_step(&jtj, &b)?
        };

        // Backtracking: halve while the residual norm got worse, then accept
        // whatever is left.
        let norm_old = norm2(&r);
        let mut step = 1.0f64;
        let mut p_new = p + delta * step;
        let mut norm_new = residual_norm(x, y, &to_params(&p_new));
        let mut halvings = 0usize;
        while norm_new > norm_old && halvings <= MAX_HALVINGS {
            step *= 0.5;
            p_new = p + delta * step;
            norm_new = residual_norm(x, y, &to_params(&p_new));
            halvings += 1;
        }
        p = p_new;

        // Raw (unscaled) step over the *updated* parameter vector. This exact
        // form is load-bearing for reproducibility; do not "fix" it.
        step_norm = delta.component_div(&p).norm();
        grad_norm = jtr.norm();
    }

    let params = to_params(&p);
    let r = residuals(x, y, &params);
    let ss_res: f64 = r.iter().map(|v| v * v).sum();
    let mean_y: f64 = y.iter().sum::<f64>() / y.len() as f64;
    let ss_tot: f64 = y.iter().map(|v| (v - mean_y) * (v - mean_y)).sum();
    let r_squared = 1.0 - ss_res / ss_tot;

    Ok(SolveOutcome {
        params,
        r_squared,
        iterations: k,
        converged,
        rank_deficient_steps,
    })
}

fn damped_step(jtj: &Matrix3<f64>, b: &Vector3<f64>) -> Result<Vector3<f64>, AppError> {
    solve3_damped(jtj, b, DAMPING)
        .ok_or_else(|| AppError::numeric("Normal equations unsolvable even with damping."))
}

fn to_params(p: &Vector3<f64>) -> LogisticParams {
    LogisticParams::new(p[0], p[1], p[2])
}

fn residuals(x: &[f64], y: &[f64], p: &LogisticParams) -> Vec<f64> {
    x.iter()
        .zip(y.iter())
        .map(|(&xi, &yi)| yi - model::value(xi, p))
        .collect()
}

fn residual_norm(x: &[f64], y: &[f64], p: &LogisticParams) -> f64 {
    norm2(&residuals(x, y, p))
}

fn norm2(v: &[f64]) -> f64 {
    v.iter().map(|e| e * e).sum::<f64>().sqrt()
}
