//! Fitting a prepared surge series.
//!
//! This is the caller-side wrapper around the raw solver:
//! - normalize the counts by their maximum so the solver works on O(1) values
//! - build the heuristic initial guess
//! - run the solver
//! - rescale `a0` back to the count axis
//! - enforce the post-fit sign constraints
//!
//! The normalization is purely a conditioning device; the rescaled curve is
//! the same one a fit on raw counts would produce.

use crate::domain::{FitQuality, FitResult, LogisticParams, SurgeSeries};
use crate::error::AppError;
use crate::fit::solver;

/// Initial decay-rate guess. The same fixed constant works across surges
/// because the series is normalized and day offsets start at the first
/// nonzero count.
const A2_GUESS: f64 = -0.15;

/// Fit the logistic surge model to a prepared series.
///
/// # Errors
/// - input preconditions are delegated to the solver (exit code 2)
/// - a non-positive count maximum means there is nothing to fit (exit code 3)
/// - parameters outside `a0>0, a1>0, a2<0` are a fit failure (exit code 4)
pub fn fit_series(series: &SurgeSeries, k_max: usize, rel_tol: f64) -> Result<FitResult, AppError> {
    let scale = series.y.iter().copied().fold(f64::MIN, f64::max);
    if !(scale.is_finite() && scale > 0.0) {
        return Err(AppError::no_data(
            "Series maximum is not positive; nothing to fit.",
        ));
    }

    let y_scaled: Vec<f64> = series.y.iter().map(|v| v / scale).collect();

    // Heuristic guess on the normalized axis: the last value approximates the
    // asymptote, the first pins the offset, and the rate starts at a fixed
    // constant.
    let y_first = y_scaled[0];
    let y_last = y_scaled[y_scaled.len() - 1];
    let a0_guess = y_last;
    let p0 = LogisticParams::new(a0_guess, a0_guess / y_first - 1.0, A2_GUESS);

    let out = solver::solve(&series.t, &y_scaled, p0, k_max, rel_tol)?;

    let params = LogisticParams::new(out.params.a0 * scale, out.params.a1, out.params.a2);
    if !params.has_surge_signs() {
        return Err(AppError::numeric(format!(
            "Fit failed: parameters violate sign constraints (a0={:.6e}, a1={:.6e}, a2={:.6e}).",
            params.a0, params.a1, params.a2
        )));
    }

    Ok(FitResult {
        params,
        scale,
        quality: FitQuality {
            r_squared: out.r_squared,
            iterations: out.iterations,
            k_max,
            converged: out.converged,
            rank_deficient_steps: out.rank_deficient_steps,
        },
    })
}
