//! Initial values for the restricted beta search.
//!
//! Purpose
//! -------
//! Produce a starting free-parameter vector `φ₀` that already lies close to
//! the restricted optimum: take the unrestricted Johansen beta, rotate it so
//! that it satisfies the restrictions as well as a rotation can, and project
//! the result onto the affine space `vec(β) = H·φ + s`.
//!
//! Key behaviors
//! -------------
//! - Baseline: the `r` leading eigenvectors of `S10·S00⁻¹·S01` relative to
//!   `S11` (descending eigenvalues).
//! - Normalization: with `vec(β₀Q) = (I_r ⊗ β₀)·vec(Q)`, solve
//!   `R·(I_r ⊗ β₀)·vec(Q) ≈ q` for the `r × r` rotation `Q` by least
//!   squares. Skipped (logged at `debug`) when the system cannot pin down
//!   `Q` or the fitted `Q` is singular.
//! - Projection: `φ₀ = (HᵗH)⁻¹·Hᵗ·(vec(β) − s)`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Only the final `HᵗH` solve is fatal (`VecmError::SingularProjection`);
//!   the rotation is best effort.
//! - When every vector is pinned, `φ₀` is empty.
use ndarray::{Array1, Array2};
use tracing::debug;

use crate::{
    linalg::{RANK_TOL, frobenius_norm, kron, lstsq, rank_with_tol, unvec_cols},
    vecm::{
        core::{
            moments::VecmSystem,
            restrictions::{RestrictionDesign, RestrictionSet},
        },
        errors::VecmResult,
    },
};

/// Starting point of the optimizer.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialValues {
    /// Rotated (or raw) Johansen beta before projection.
    pub beta0: Array2<f64>,
    pub phi0: Array1<f64>,
    /// Whether the normalizing rotation was applied.
    pub normalized: bool,
    /// Leading Johansen eigenvalues.
    pub eigenvalues: Array1<f64>,
}

/// Compute `φ₀` for `design` from the unrestricted solution of `system`.
///
/// # Errors
/// - Propagates failures of the generalized eigenproblem.
/// - [`SingularProjection`](crate::vecm::errors::VecmError::SingularProjection)
///   if `HᵗH` cannot be inverted.
pub fn initial_values(
    system: &VecmSystem, design: &RestrictionDesign, set: &RestrictionSet,
) -> VecmResult<InitialValues> {
    let r = design.r;
    let (eigenvalues, baseline) = system.johansen_eigen(r)?;

    let (beta0, normalized) = match normalizing_rotation(&baseline, set, r) {
        Some(q) => (baseline.dot(&q), true),
        None => (baseline, false),
    };

    let phi0 = design.project(beta0.view())?;

    Ok(InitialValues { beta0, phi0, normalized, eigenvalues })
}

/// Least-squares rotation `Q` with `R·vec(β₀Q) ≈ q`, or `None` when it is not
/// determined.
fn normalizing_rotation(
    baseline: &Array2<f64>, set: &RestrictionSet, r: usize,
) -> Option<Array2<f64>> {
    let design = set.r.dot(&kron(Array2::<f64>::eye(r).view(), baseline.view()));
    let (m, n) = design.dim();
    let floor = RANK_TOL
        * (m.max(n) as f64)
        * frobenius_norm(set.r.view())
        * frobenius_norm(baseline.view());
    if rank_with_tol(design.view(), floor) < r * r {
        debug!(
            restrictions = set.r.nrows(),
            required = r * r,
            "normalization of initial beta skipped: rotation not identified"
        );
        return None;
    }
    let q_col = set.q.view().insert_axis(ndarray::Axis(1));
    let vec_q = match lstsq(design.view(), q_col) {
        Ok(v) => v,
        Err(err) => {
            debug!(%err, "normalization of initial beta skipped: least squares failed");
            return None;
        }
    };
    let rotation = unvec_cols(vec_q.column(0), r, r);
    // Homogeneous rows give a zero right-hand side; a rotation fitted to
    // those alone is rounding residue.
    if rank_with_tol(rotation.view(), RANK_TOL) < r {
        debug!("normalization of initial beta skipped: fitted rotation is singular");
        return None;
    }
    Some(rotation)
}
