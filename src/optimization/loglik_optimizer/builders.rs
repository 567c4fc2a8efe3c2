//! loglik_optimizer::builders — L-BFGS solver construction helpers.
//!
//! Purpose
//! -------
//! Build configured L-BFGS solvers for the polishing stage of restricted
//! estimation, hiding Argmin's generic wiring behind two small functions.
//!
//! Key behaviors
//! -------------
//! - One builder per line search (Hager–Zhang, More–Thuente).
//! - Gradient and cost-change tolerances from [`MLEOptions`] are applied by
//!   the shared [`configure_lbfgs`].
//! - The history size is `opts.lbfgs_mem` or [`DEFAULT_LBFGS_MEM`].
//!
//! Conventions
//! -----------
//! - Builders never set `theta0` or `max_iters`; the runner does.
//! - Argmin configuration errors surface as [`OptError`](crate::optimization::errors::OptError).
use argmin::solver::quasinewton::LBFGS;

use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        traits::MLEOptions,
        types::{
            Cost, DEFAULT_LBFGS_MEM, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente,
            MoreThuenteLS, Theta,
        },
    },
};

/// L-BFGS with Hager–Zhang line search and the tolerances in `opts`.
///
/// # Errors
/// Returns an `OptError` if Argmin rejects a tolerance.
pub fn build_optimizer_hager_zhang(opts: &MLEOptions) -> OptResult<LbfgsHagerZhang> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsHagerZhang::new(HagerZhangLS::new(), mem), opts)
}

/// L-BFGS with More–Thuente line search and the tolerances in `opts`.
///
/// # Errors
/// Returns an `OptError` if Argmin rejects a tolerance.
pub fn build_optimizer_more_thuente(opts: &MLEOptions) -> OptResult<LbfgsMoreThuente> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsMoreThuente::new(MoreThuenteLS::new(), mem), opts)
}

/// Apply the optional gradient-norm and cost-change tolerances to an L-BFGS
/// solver of any line-search type. `None` leaves Argmin's default in place.
///
/// # Errors
/// Returns an `OptError` if Argmin rejects a tolerance.
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, opts: &MLEOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::{
        errors::OptError,
        loglik_optimizer::traits::{LineSearcher, Tolerances},
    };

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Construction of both L-BFGS variants with default and explicit memory.
    // - Tolerance wiring in `configure_lbfgs`, including rejection by Argmin.
    //
    // They intentionally DO NOT cover:
    // - Executor behavior, which is exercised through `maximize`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Both builders succeed with default and explicit history sizes.
    fn builders_accept_default_and_explicit_memory() {
        // Arrange
        let tols = Tolerances::new(Some(1e-6), Some(1e-10), Some(50)).expect("valid");
        for mem in [None, Some(3)] {
            let hz = MLEOptions::new(tols, LineSearcher::HagerZhang, mem).expect("valid");
            let mt = MLEOptions::new(tols, LineSearcher::MoreThuente, mem).expect("valid");

            // Act / Assert
            assert!(build_optimizer_hager_zhang(&hz).is_ok());
            assert!(build_optimizer_more_thuente(&mt).is_ok());
        }
    }

    #[test]
    // Purpose
    // -------
    // Absent tolerances leave Argmin defaults untouched.
    fn configure_lbfgs_without_tolerances_is_ok() {
        let raw = LBFGS::new(MoreThuenteLS::new(), DEFAULT_LBFGS_MEM);
        let tols = Tolerances::new(None, None, Some(10)).expect("valid");
        let opts = MLEOptions::new(tols, LineSearcher::MoreThuente, None).expect("valid");

        assert!(configure_lbfgs(raw, &opts).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // A tolerance that bypassed `Tolerances::new` is still refused by Argmin
    // and surfaces as an `OptError`.
    //
    // Given
    // -----
    // - `tol_grad = -1.0` written directly into the struct.
    //
    // Expect
    // ------
    // - `configure_lbfgs` returns `Err(OptError::InvalidParameter { .. })`.
    fn configure_lbfgs_surfaces_argmin_rejection() {
        let raw = LBFGS::new(HagerZhangLS::new(), DEFAULT_LBFGS_MEM);
        let mut opts = MLEOptions::default();
        opts.tols.tol_grad = Some(-1.0);

        let res = configure_lbfgs(raw, &opts);

        assert!(matches!(res, Err(OptError::InvalidParameter { .. })));
    }
}
