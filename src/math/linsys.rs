//! 3x3 linear solves for the Gauss-Newton normal equations.
//!
//! The solver repeatedly forms `JᵗJ Δp = -Jᵗr` with a 3-parameter model, so
//! everything here is fixed-size (`Matrix3`/`Vector3`). Rank detection uses
//! singular values with the usual `max_sv * dim * eps` cutoff; the actual
//! solve goes through LU, which is exact enough at this size and cheap.

use nalgebra::{Matrix3, Vector3};

/// Numerical rank of a 3x3 matrix.
///
/// Singular values below `max_sv * 3 * eps` are treated as zero.
pub fn rank3(a: &Matrix3<f64>) -> usize {
    let svd = a.svd(false, false);
    let max_sv = svd.singular_values.max();
    if !(max_sv.is_finite() && max_sv > 0.0) {
        return 0;
    }
    let tol = max_sv * 3.0 * f64::EPSILON;
    svd.singular_values.iter().filter(|&&s| s > tol).count()
}

/// Solve `a * x = b` via LU.
///
/// Returns `None` when the factorization fails or produces non-finite values.
pub fn solve3(a: &Matrix3<f64>, b: &Vector3<f64>) -> Option<Vector3<f64>> {
    let x = a.lu().solve(b)?;
    if x.iter().all(|v| v.is_finite()) {
        Some(x)
    } else {
        None
    }
}

/// Solve the damped system `(aᵗa + lambda I) x = aᵗ b`.
///
/// This is the rank-deficiency fallback: squaring `a` and shifting the
/// diagonal makes the system solvable even when `a` itself is singular.
pub fn solve3_damped(a: &Matrix3<f64>, b: &Vector3<f64>, lambda: f64) -> Option<Vector3<f64>> {
    let ata = a.transpose() * a;
    let shifted = ata + Matrix3::identity() * lambda;
    let rhs = a.transpose() * b;
    solve3(&shifted, &rhs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank3_full_and_deficient() {
        let full = Matrix3::new(2.0, 0.0, 0.0, 0.0, 3.0, 0.0, 0.0, 0.0, 4.0);
        assert_eq!(rank3(&full), 3);

        // Two identical columns.
        let deficient = Matrix3::new(1.0, 1.0, 0.0, 2.0, 2.0, 0.0, 3.0, 3.0, 1.0);
        assert_eq!(rank3(&deficient), 2);

        assert_eq!(rank3(&Matrix3::zeros()), 0);
    }

    #[test]
    fn solve3_simple_system() {
        let a = Matrix3::new(2.0, 0.0, 0.0, 0.0, 4.0, 0.0, 0.0, 0.0, 8.0);
        let b = Vector3::new(2.0, 4.0, 8.0);
        let x = solve3(&a, &b).unwrap();
        assert!((x - Vector3::new(1.0, 1.0, 1.0)).norm() < 1e-12);
    }

    #[test]
    fn solve3_damped_handles_singular_matrix() {
        let singular = Matrix3::new(1.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0);
        let b = Vector3::new(1.0, 1.0, 0.0);
        let x = solve3_damped(&singular, &b, 1e-3).unwrap();
        assert!(x.iter().all(|v| v.is_finite()));
    }
}
