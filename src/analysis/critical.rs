//! Critical times of a fitted surge curve.
//!
//! All quantities are closed-form; nothing is found by search. Zeroing the
//! second derivative of the logistic curve gives the time of peak growth
//! rate, and zeroing the third derivative gives the two extrema of the
//! growth acceleration:
//!
//! - `tc = -ln(a1) / a2`, where the growth rate peaks at `-a0 a2 / 4`
//! - `t_max_accel = -ln(a1 / (2 + √3)) / a2`
//! - `t_min_accel = -ln(a1 / (2 - √3)) / a2`
//!
//! The two acceleration extrema sit symmetrically around `tc`, and their
//! values are `a0 a2² (5 ± 3√3) / (3 ± √3)³`. Both identities are verified
//! against the model's derivatives before returning; a violation means the
//! algebra and the model implementation have diverged.

use crate::domain::{CriticalTimes, LogisticParams};
use crate::error::AppError;
use crate::model;

/// Absolute tolerance for the surge-window symmetry identity.
const SYMMETRY_TOL: f64 = 1e-5;

/// Relative tolerance for the derivative cross-checks.
const CROSS_CHECK_TOL: f64 = 1e-8;

/// Compute the critical times `(tc, Δtc)` and the associated extrema.
///
/// # Errors
/// - parameters outside `a0>0, a1>0, a2<0` (exit code 2): the formulas are
///   only meaningful for a saturating surge curve
/// - internal identity violations (exit code 4)
pub fn critical_times(p: &LogisticParams) -> Result<CriticalTimes, AppError> {
    if !p.has_surge_signs() {
        return Err(AppError::input(format!(
            "Critical-time analysis requires a0>0, a1>0, a2<0; got a0={:.6e}, a1={:.6e}, a2={:.6e}.",
            p.a0, p.a1, p.a2
        )));
    }

    let sqrt3 = 3.0_f64.sqrt();

    let tc = -p.a1.ln() / p.a2;
    let t_max_accel = -(p.a1 / (2.0 + sqrt3)).ln() / p.a2;
    let t_min_accel = -(p.a1 / (2.0 - sqrt3)).ln() / p.a2;
    let dtc = tc - t_max_accel;

    let sym_err = ((tc - t_max_accel) - (t_min_accel - tc)).abs();
    if sym_err > SYMMETRY_TOL {
        return Err(AppError::numeric(format!(
            "Surge-window symmetry violated: |(tc - t_max) - (t_min - tc)| = {sym_err:.3e}."
        )));
    }

    let peak_rate = -p.a0 * p.a2 / 4.0;
    let max_accel = p.a0 * p.a2 * p.a2 * (5.0 + 3.0 * sqrt3) / (3.0 + sqrt3).powi(3);
    let min_accel = p.a0 * p.a2 * p.a2 * (5.0 - 3.0 * sqrt3) / (3.0 - sqrt3).powi(3);

    cross_check("peak growth rate", peak_rate, model::first_derivative(tc, p))?;
    cross_check(
        "maximum growth acceleration",
        max_accel,
        model::second_derivative(t_max_accel, p),
    )?;
    cross_check(
        "minimum growth acceleration",
        min_accel,
        model::second_derivative(t_min_accel, p),
    )?;

    Ok(CriticalTimes {
        tc,
        dtc,
        t_max_accel,
        t_min_accel,
        peak_rate,
        max_accel,
        min_accel,
    })
}

fn cross_check(what: &str, closed_form: f64, from_model: f64) -> Result<(), AppError> {
    let tol = CROSS_CHECK_TOL * closed_form.abs().max(1.0);
    if (closed_form - from_model).abs() > tol {
        return Err(AppError::numeric(format!(
            "Closed-form {what} {closed_form:.12e} disagrees with the model derivative {from_model:.12e}."
        )));
    }
    Ok(())
}
