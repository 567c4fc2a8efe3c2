//! rust_coint — restricted cointegration estimation for VECMs, with Python
//! bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the restricted-beta estimator to Python via the `_rust_coint`
//! extension module. When the `python-bindings` feature is enabled, this
//! module defines the Python-facing class used by the `rust_coint` package.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`linalg`, `optimization`, `vecm`,
//!   `inference`) as the public crate surface.
//! - Define the `RestrictedVECM` `#[pyclass]` and the `#[pymodule]`
//!   initializer for `_rust_coint`.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner modules; this file performs only
//!   FFI glue, input conversion, and error mapping.
//! - The Python class mirrors [`vecm::VecmSystem`]: moments are validated
//!   once at construction, and restrictions are applied by `restrict`.
//!
//! Conventions
//! -----------
//! - Matrices cross the FFI boundary row-major (`list[list[float]]` or
//!   C-contiguous numpy arrays).
//! - Errors from core Rust code convert to `ValueError` at the boundary.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should depend on [`vecm`] directly and can ignore the
//!   items guarded by the `python-bindings` feature.
//!
//! Testing notes
//! -------------
//! - Core numerical behavior is covered by unit tests in the inner modules and
//!   by `tests/integration_restricted_beta.rs`.

pub mod inference;
pub mod linalg;
pub mod optimization;
pub mod utils;
pub mod vecm;

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    utils::{build_restrict_options, extract_matrix, extract_vector, matrix_to_rows},
    vecm::{
        AlphaRestriction, RestrictedOutcome, RestrictionSet, VecmError, VecmSystem,
        estimate_restricted_cointegration,
    },
};

/// RestrictedVECM — Python-facing wrapper for restricted cointegration.
///
/// Purpose
/// -------
/// Hold a fitted Johansen system (moment matrices, sample size, rank and
/// log-likelihood) and estimate restricted cointegrating vectors on it.
///
/// Key behaviors
/// -------------
/// - Construct from `S00`, `S01`, `S11`, `nobs` and `rank`; the unrestricted
///   log-likelihood is derived from the moments unless supplied.
/// - `restrict(R, q, ...)` runs the full estimator and caches the outcome;
///   with `fold=True` the system itself takes the restricted estimates.
/// - Getters expose beta, alpha, Omega, standard errors, the LR test, and
///   the text report.
///
/// Notes
/// -----
/// - Native Rust callers should use [`VecmSystem`] and
///   [`estimate_restricted_cointegration`] directly.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_coint.vecm", unsendable)]
pub struct RestrictedVECM {
    pub system: VecmSystem,
    pub outcome: Option<RestrictedOutcome>,
}

#[cfg(feature = "python-bindings")]
impl RestrictedVECM {
    fn fitted(&self) -> PyResult<&RestrictedOutcome> {
        self.outcome.as_ref().ok_or_else(|| VecmError::ModelNotFitted.into())
    }
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl RestrictedVECM {
    #[new]
    #[pyo3(
        signature = (s00, s01, s11, nobs, rank, loglik = None, names = None, prior_df = None),
        text_signature = "(s00, s01, s11, nobs, rank, /, loglik=None, names=None, prior_df=None)"
    )]
    pub fn new<'py>(
        s00: &Bound<'py, PyAny>, s01: &Bound<'py, PyAny>, s11: &Bound<'py, PyAny>, nobs: usize,
        rank: usize, loglik: Option<f64>, names: Option<Vec<String>>, prior_df: Option<usize>,
    ) -> PyResult<Self> {
        let mut system =
            VecmSystem::new(extract_matrix(s00)?, extract_matrix(s01)?, extract_matrix(s11)?, nobs, rank)?;
        if let Some(ll) = loglik {
            system = system.with_loglik(ll);
        }
        if let Some(names) = names {
            system = system.with_names(names)?;
        }
        if let Some(df) = prior_df {
            system = system.with_prior_df(df);
        }
        Ok(RestrictedVECM { system, outcome: None })
    }

    #[pyo3(
        signature = (
            r,
            q,
            r_alpha = None,
            common = false,
            fold = false,
            verbose = false,
            anneal_iterations = None,
            seed = None,
            tol_grad = None,
            tol_cost = None,
            max_iter = None,
            line_searcher = None,
            lbfgs_mem = None,
        ),
        text_signature = "(self, r, q, /, r_alpha=None, common=False, fold=False, verbose=False, \
                          anneal_iterations=None, seed=None, tol_grad=None, tol_cost=None, \
                          max_iter=None, line_searcher=None, lbfgs_mem=None)"
    )]
    pub fn restrict<'py>(
        &mut self, py: Python<'py>, r: &Bound<'py, PyAny>, q: &Bound<'py, PyAny>,
        r_alpha: Option<&Bound<'py, PyAny>>, common: bool, fold: bool, verbose: bool,
        anneal_iterations: Option<usize>, seed: Option<u64>, tol_grad: Option<f64>,
        tol_cost: Option<f64>, max_iter: Option<usize>, line_searcher: Option<&str>,
        lbfgs_mem: Option<usize>,
    ) -> PyResult<()> {
        let r_mat = extract_matrix(r)?;
        let q_vec = extract_vector(py, q)?;
        let rank = self.system.rank;
        let mut set = if common {
            RestrictionSet::common(r_mat, q_vec, rank)?
        } else {
            RestrictionSet::new(r_mat, q_vec, rank)?
        };
        if let Some(ra) = r_alpha {
            set = set.with_alpha(AlphaRestriction::new(extract_matrix(ra)?)?);
        }
        let opts = build_restrict_options(
            verbose,
            fold,
            anneal_iterations,
            seed,
            tol_grad,
            tol_cost,
            max_iter,
            line_searcher,
            lbfgs_mem,
        )?;
        self.outcome = Some(estimate_restricted_cointegration(&mut self.system, &set, &opts)?);
        Ok(())
    }

    #[getter]
    pub fn beta(&self) -> PyResult<Vec<Vec<f64>>> {
        Ok(matrix_to_rows(&self.fitted()?.beta))
    }

    #[getter]
    pub fn alpha(&self) -> PyResult<Vec<Vec<f64>>> {
        Ok(matrix_to_rows(&self.fitted()?.alpha))
    }

    #[getter]
    pub fn omega(&self) -> PyResult<Vec<Vec<f64>>> {
        Ok(matrix_to_rows(&self.fitted()?.omega))
    }

    #[getter]
    pub fn se(&self) -> PyResult<Vec<Vec<f64>>> {
        Ok(matrix_to_rows(&self.fitted()?.beta_se))
    }

    #[getter]
    pub fn loglik(&self) -> PyResult<f64> {
        Ok(self.fitted()?.loglik)
    }

    /// Current log-likelihood of the system (restricted after a fold).
    #[getter]
    pub fn system_loglik(&self) -> f64 {
        self.system.loglik
    }

    #[getter]
    pub fn lr_statistic(&self) -> PyResult<f64> {
        Ok(self.fitted()?.lr.statistic)
    }

    #[getter]
    pub fn df(&self) -> PyResult<i64> {
        Ok(self.fitted()?.lr.df)
    }

    #[getter]
    pub fn pvalue(&self) -> PyResult<Option<f64>> {
        Ok(self.fitted()?.lr.p_value)
    }

    #[getter]
    pub fn report(&self) -> PyResult<String> {
        Ok(self.fitted()?.to_string())
    }
}

/// _rust_coint — PyO3 module initializer for the Python extension.
///
/// Creates the `vecm` submodule, attaches it to `_rust_coint`, and registers
/// it in `sys.modules` so that `rust_coint.vecm` is importable with dotted
/// paths.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_coint<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let vecm_mod = PyModule::new(_py, "vecm")?;
    vecm_mod.add_class::<RestrictedVECM>()?;
    m.add_submodule(&vecm_mod)?;

    // Manually add the submodule into sys.modules to allow for dot notation.
    _py.import("sys")?.getattr("modules")?.set_item("rust_coint.vecm", vecm_mod)?;
    Ok(())
}
