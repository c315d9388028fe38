//! Logistic model evaluation.
//!
//! The model is `f(t) = a0 / (1 + a1 * exp(a2 * t))` with `a2 < 0` for a
//! saturating surge curve. The fitter and the critical-time analysis rely on
//! four primitive operations, all closed-form:
//!
//! - `value`: f(t)
//! - `first_derivative`: df/dt (the daily growth rate)
//! - `second_derivative`: d²f/dt² (the growth acceleration)
//! - `gradient`: (∂f/∂a0, ∂f/∂a1, ∂f/∂a2) for the Jacobian
//!
//! Numerical notes:
//! - `exp(a2 * t)` can overflow to infinity when the solver wanders into
//!   `a2 > 0` territory mid-iteration. Every quantity below has a finite
//!   saturation limit in that regime, so we take the limit explicitly instead
//!   of propagating `inf/inf` NaNs.

use nalgebra::Vector3;

use crate::domain::LogisticParams;

/// Sigmoid factor `s = u/(1+u)` and its complement `inv = 1/(1+u)` for
/// `u = a1 * exp(a2 * t)`, with the overflow limit `u -> inf` handled.
fn sigmoid_parts(t: f64, p: &LogisticParams) -> (f64, f64, f64) {
    let ex = (p.a2 * t).exp();
    let u = p.a1 * ex;
    if u.is_infinite() {
        // Saturation limit: s -> 1, 1/(1+u) -> 0.
        (ex, 1.0, 0.0)
    } else {
        (ex, u / (1.0 + u), 1.0 / (1.0 + u))
    }
}

/// Model value `f(t) = a0 / (1 + a1 * exp(a2 * t))`.
pub fn value(t: f64, p: &LogisticParams) -> f64 {
    let (_, _, inv) = sigmoid_parts(t, p);
    p.a0 * inv
}

/// First time-derivative `f'(t) = g(t) * f(t)` with
/// `g(t) = -a1 * a2 * exp(a2 t) / (1 + a1 * exp(a2 t))`.
pub fn first_derivative(t: f64, p: &LogisticParams) -> f64 {
    let (_, s, inv) = sigmoid_parts(t, p);
    let g = -p.a2 * s;
    g * p.a0 * inv
}

/// Second time-derivative `f''(t) = (g'(t) + g(t)^2) * f(t)` with
/// `g'(t) = -a1 * a2^2 * exp(a2 t) / (1 + a1 * exp(a2 t))^2`.
pub fn second_derivative(t: f64, p: &LogisticParams) -> f64 {
    let (_, s, inv) = sigmoid_parts(t, p);
    let g = -p.a2 * s;
    let gp = -p.a2 * p.a2 * s * inv;
    (gp + g * g) * p.a0 * inv
}

/// Parameter gradient `(∂f/∂a0, ∂f/∂a1, ∂f/∂a2)` at `t`.
///
/// Closed forms:
/// - `∂f/∂a0 = 1 / (1 + a1 e^{a2 t})`
/// - `∂f/∂a1 = -a0 e^{a2 t} / (1 + a1 e^{a2 t})^2`
/// - `∂f/∂a2 = -a0 a1 t e^{a2 t} / (1 + a1 e^{a2 t})^2`
pub fn gradient(t: f64, p: &LogisticParams) -> Vector3<f64> {
    let (ex, s, inv) = sigmoid_parts(t, p);
    let d0 = inv;
    // For a1 > 0 and ex -> inf both partials tend to 0; `s * inv` already
    // carries that limit, so only ∂f/∂a1 needs the explicit guard.
    let d1 = if ex.is_infinite() {
        0.0
    } else {
        -p.a0 * ex * inv * inv
    };
    let d2 = -p.a0 * t * s * inv;
    Vector3::new(d0, d1, d2)
}

/// Evaluate the model over a slice of time points.
pub fn values(ts: &[f64], p: &LogisticParams) -> Vec<f64> {
    ts.iter().map(|&t| value(t, p)).collect()
}
