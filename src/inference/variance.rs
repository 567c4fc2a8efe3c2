//! Delta-method variance of the restricted beta.
//!
//! Purpose
//! -------
//! Turn the curvature of the concentrated likelihood in `φ` into the
//! covariance of `vec(β̂)` and the standard errors reported beside each
//! coefficient.
//!
//! Key behaviors
//! -------------
//! - The precision of the stacked free parameters is assembled block by
//!   block: for vectors `i`, `j` with free parameters,
//!   `P_ij = T·(αᵗΩ⁻¹α)_ij · Hᵢᵗ·S11·Hⱼ`.
//! - `V_φ = P⁻¹` (Cholesky); if `P` is numerically singular, the
//!   eigenvalue pseudoinverse is used instead and a warning is logged.
//! - `Var(vec β̂) = H·V_φ·Hᵗ`; standard errors are the square roots of its
//!   diagonal, reshaped to `p × r`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Moments are sample averages, hence the explicit factor `T`.
//! - Pinned vectors contribute no rows to `P` and get zero standard errors;
//!   a fully pinned system has identically zero variance.
use ndarray::{Array2, ArrayView2, s};
use tracing::warn;

use crate::{
    inference::errors::{InferenceError, InferenceResult},
    linalg::{pinv_sym, spd_solve, sym_inverse, unvec_cols},
    vecm::core::restrictions::RestrictionDesign,
};

/// Covariance of the restricted beta at the optimum.
#[derive(Debug, Clone, PartialEq)]
pub struct BetaVariance {
    /// `Σkᵢ × Σkᵢ` covariance of `φ̂`.
    pub phi_cov: Array2<f64>,
    /// `p·r × p·r` covariance of `vec(β̂)`.
    pub vec_cov: Array2<f64>,
    /// `p × r` standard errors.
    pub se: Array2<f64>,
    /// `true` when the precision had to be pseudo-inverted.
    pub pseudo_inverse: bool,
}

/// Delta-method covariance of `vec(β̂)`.
///
/// # Errors
/// - [`InferenceError::DimensionMismatch`] for non-conformable `α`, `Ω` or
///   `S11`.
/// - Linear-algebra failures inverting `Ω`.
/// - [`InferenceError::NonFinite`] if the covariance is not finite.
pub fn beta_variance(
    alpha: ArrayView2<f64>, omega: ArrayView2<f64>, s11: ArrayView2<f64>,
    design: &RestrictionDesign, nobs: usize,
) -> InferenceResult<BetaVariance> {
    let (p, r) = (design.p, design.r);
    let n = omega.nrows();
    if alpha.dim() != (n, r) {
        return Err(InferenceError::DimensionMismatch {
            what: "alpha",
            expected: (n, r),
            found: alpha.dim(),
        });
    }
    if s11.dim() != (p, p) {
        return Err(InferenceError::DimensionMismatch {
            what: "S11",
            expected: (p, p),
            found: s11.dim(),
        });
    }

    let k = design.n_free();
    if k == 0 {
        return Ok(BetaVariance {
            phi_cov: Array2::zeros((0, 0)),
            vec_cov: Array2::zeros((p * r, p * r)),
            se: Array2::zeros((p, r)),
            pseudo_inverse: false,
        });
    }

    let omega_inv_alpha = spd_solve(omega, alpha)?;
    let weight = alpha.t().dot(&omega_inv_alpha) * nobs as f64;

    let mut precision = Array2::<f64>::zeros((k, k));
    for (i, bi) in design.blocks.iter().enumerate() {
        let Some(hi) = &bi.h else { continue };
        let s11_hi = s11.dot(hi);
        for (j, bj) in design.blocks.iter().enumerate() {
            let Some(hj) = &bj.h else { continue };
            let block = s11_hi.t().dot(hj) * weight[[i, j]];
            let (oi, oj) = (design.offsets[i], design.offsets[j]);
            precision.slice_mut(s![oi..oi + hi.ncols(), oj..oj + hj.ncols()]).assign(&block);
        }
    }

    let (phi_cov, pseudo_inverse) = match sym_inverse(precision.view()) {
        Ok(v) => (v, false),
        Err(err) => {
            warn!(%err, free = k, "precision of beta is singular; using pseudoinverse");
            (pinv_sym(precision.view()), true)
        }
    };

    let vec_cov = design.h.dot(&phi_cov).dot(&design.h.t());
    if vec_cov.iter().any(|v| !v.is_finite()) {
        return Err(InferenceError::NonFinite { context: "variance of beta" });
    }
    let diag = vec_cov.diag().mapv(|v| v.max(0.0).sqrt());
    let se = unvec_cols(diag.view(), p, r);
    Ok(BetaVariance { phi_cov, vec_cov, se, pseudo_inverse })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vecm::core::restrictions::RestrictionSet;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The rank-1 closed form: Var(b) = 1 / (T·α'Ω⁻¹α·h'S11h).
    // - Zero variance for pinned vectors.
    // - Shape validation.
    // -------------------------------------------------------------------------

    fn design(r: Array2<f64>, q: ndarray::Array1<f64>, rank: usize) -> RestrictionDesign {
        RestrictionDesign::from_set(&RestrictionSet::new(r, q, rank).expect("set")).expect("h")
    }

    #[test]
    // Purpose
    // -------
    // One free coefficient reproduces the scalar delta-method formula.
    //
    // Given
    // -----
    // - β = (1, b), H = e₂, α = (0.5, 0.2)ᵗ, Ω = I, S11 = [[1, .3], [.3, 2]],
    //   T = 100.
    //
    // Expect
    // ------
    // - se[1] = 1/sqrt(100·0.29·2), se[0] = 0.
    fn single_free_coefficient_matches_closed_form() {
        // Arrange
        let d = design(array![[1.0, 0.0]], array![1.0], 1);
        let alpha = array![[0.5], [0.2]];
        let omega = Array2::<f64>::eye(2);
        let s11 = array![[1.0, 0.3], [0.3, 2.0]];

        // Act
        let v = beta_variance(alpha.view(), omega.view(), s11.view(), &d, 100).expect("var");

        // Assert
        let expected = 1.0 / (100.0_f64 * 0.29 * 2.0);
        assert_relative_eq!(v.vec_cov[[1, 1]], expected, epsilon = 1e-12);
        assert_relative_eq!(v.se[[1, 0]], expected.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(v.se[[0, 0]], 0.0, epsilon = 1e-12);
        assert!(!v.pseudo_inverse);
    }

    #[test]
    fn pinned_system_has_zero_variance() {
        let d = design(array![[1.0, 0.0], [0.0, 1.0]], array![1.0, -1.0], 1);
        let alpha = array![[0.5], [0.2]];
        let omega = Array2::<f64>::eye(2);
        let s11 = Array2::<f64>::eye(2);

        let v = beta_variance(alpha.view(), omega.view(), s11.view(), &d, 100).expect("var");

        assert!(v.vec_cov.iter().all(|&x| x == 0.0));
        assert!(v.se.iter().all(|&x| x == 0.0));
        assert_eq!(v.phi_cov.dim(), (0, 0));
    }

    #[test]
    fn rejects_non_conformable_alpha() {
        let d = design(array![[1.0, 0.0]], array![1.0], 1);
        let alpha = array![[0.5, 0.1], [0.2, 0.3]];
        let eye = Array2::<f64>::eye(2);

        let res = beta_variance(alpha.view(), eye.view(), eye.view(), &d, 100);

        assert!(matches!(res, Err(InferenceError::DimensionMismatch { what: "alpha", .. })));
    }
}
