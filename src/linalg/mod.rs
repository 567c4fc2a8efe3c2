//! linalg — dense linear algebra provider for the restriction engine.
//!
//! Purpose
//! -------
//! Collect the matrix primitives used by restriction translation,
//! identification checks, initial values, the likelihood, and post-estimation
//! in one place, so the econometric modules read as algebra rather than as
//! decomposition plumbing.
//!
//! Conventions
//! -----------
//! - Public signatures use `ndarray` types; `nalgebra` is an implementation
//!   detail of [`dense`].
//! - Fallible routines return [`LinalgResult<T>`].

pub mod dense;
pub mod errors;

pub use self::dense::{
    EIGEN_EPS, RANK_TOL, chol_logdet_in_place, frobenius_norm, gen_sym_eigen, hconcat, kron,
    log_det_pd, lstsq, orth_complement, pinv_sym, quad_form_into, random_normal, rank,
    rank_with_tol, right_nullspace, solve,
    spd_solve, sym_inverse, unvec_cols, unvec_into, vec_cols,
};
pub use self::errors::{LinalgError, LinalgResult};
