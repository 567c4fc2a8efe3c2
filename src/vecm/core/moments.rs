//! VECM system — moment matrices and the unrestricted fit being restricted.
//!
//! Purpose
//! -------
//! Hold what the restricted estimator reads from (and, when folding, writes
//! back to) a previously estimated Johansen VECM: the product-moment matrices
//! of the concentrated residuals, the sample size, the cointegrating rank, and
//! the current log-likelihood.
//!
//! Key behaviors
//! -------------
//! - [`VecmSystem::new`] validates shapes, finiteness, symmetry and positive
//!   definiteness, and derives the unrestricted log-likelihood at rank `r`
//!   from the moments unless the caller supplies one.
//! - [`VecmSystem::s11_concentrated`] and [`VecmSystem::log_det_s00`] give the
//!   derived quantities `S11m = S11 − S10·S00⁻¹·S01` and `ln|S00|`.
//! - [`VecmSystem::johansen_loglik`] evaluates the unrestricted maximum at
//!   any rank.
//!
//! Invariants & assumptions
//! ------------------------
//! - `S00` is `n × n`, `S01` is `n × p`, `S11` is `p × p`, `p ≥ n`; rows of
//!   beta beyond `n` belong to restricted deterministic terms.
//! - Moments are sample averages (`S_ij = T⁻¹ Σ R_i R_jᵗ`), so residual
//!   covariances need no further division by `T`.
//! - Moments never change after construction; folding only writes the
//!   `beta`/`alpha`/`omega`/`loglik` fields.
use std::f64::consts::PI;

use ndarray::{Array1, Array2, ArrayView2};

use crate::{
    linalg::{gen_sym_eigen, log_det_pd, spd_solve},
    vecm::errors::{VecmError, VecmResult},
};

/// Relative tolerance for the symmetry check on `S00` and `S11`.
const SYMMETRY_TOL: f64 = 1e-8;

/// A fitted Johansen VECM as seen by the restricted estimator.
#[derive(Debug, Clone, PartialEq)]
pub struct VecmSystem {
    pub s00: Array2<f64>,
    pub s01: Array2<f64>,
    pub s11: Array2<f64>,
    /// Effective sample size `T`.
    pub nobs: usize,
    /// Cointegrating rank `r`.
    pub rank: usize,
    /// Current log-likelihood (unrestricted until a fold replaces it).
    pub loglik: f64,
    /// Degrees of freedom already used by restrictions imposed earlier.
    pub prior_df: usize,
    /// Names of the `p` rows of beta.
    pub names: Vec<String>,
    pub beta: Option<Array2<f64>>,
    pub alpha: Option<Array2<f64>>,
    pub omega: Option<Array2<f64>>,
}

impl VecmSystem {
    /// Build and validate a system from its moment matrices.
    ///
    /// # Errors
    /// - [`VecmError::DimensionMismatch`] for non-conformable moments.
    /// - [`VecmError::InvalidRank`] unless `1 ≤ rank ≤ n`.
    /// - [`VecmError::InvalidMoments`] for non-finite, asymmetric or
    ///   non-positive-definite input, or `nobs == 0`.
    pub fn new(
        s00: Array2<f64>, s01: Array2<f64>, s11: Array2<f64>, nobs: usize, rank: usize,
    ) -> VecmResult<Self> {
        let n = s00.nrows();
        let p = s11.nrows();
        if s00.ncols() != n {
            return Err(VecmError::DimensionMismatch {
                what: "S00",
                expected: (n, n),
                found: s00.dim(),
            });
        }
        if s11.ncols() != p || p < n {
            return Err(VecmError::DimensionMismatch {
                what: "S11",
                expected: (p.max(n), p.max(n)),
                found: s11.dim(),
            });
        }
        if s01.dim() != (n, p) {
            return Err(VecmError::DimensionMismatch {
                what: "S01",
                expected: (n, p),
                found: s01.dim(),
            });
        }
        if rank == 0 || rank > n {
            return Err(VecmError::InvalidRank {
                rank,
                reason: "Rank must lie between 1 and the number of equations.",
            });
        }
        if nobs == 0 {
            return Err(VecmError::InvalidMoments { reason: "Sample size must be positive." });
        }
        if s00.iter().chain(s01.iter()).chain(s11.iter()).any(|v| !v.is_finite()) {
            return Err(VecmError::InvalidMoments { reason: "Moment matrices must be finite." });
        }
        if !is_symmetric(s00.view()) || !is_symmetric(s11.view()) {
            return Err(VecmError::InvalidMoments { reason: "S00 and S11 must be symmetric." });
        }
        if log_det_pd(s00.view()).is_err() || log_det_pd(s11.view()).is_err() {
            return Err(VecmError::InvalidMoments {
                reason: "S00 and S11 must be positive definite.",
            });
        }

        let mut system = Self {
            s00,
            s01,
            s11,
            nobs,
            rank,
            loglik: 0.0,
            prior_df: 0,
            names: default_names(n, p),
            beta: None,
            alpha: None,
            omega: None,
        };
        system.loglik = system.johansen_loglik(rank)?;
        Ok(system)
    }

    /// Replace the derived unrestricted log-likelihood with the caller's.
    pub fn with_loglik(mut self, loglik: f64) -> Self {
        self.loglik = loglik;
        self
    }

    /// Record degrees of freedom consumed by an earlier restriction.
    pub fn with_prior_df(mut self, prior_df: usize) -> Self {
        self.prior_df = prior_df;
        self
    }

    /// Set the row labels used in reports.
    ///
    /// # Errors
    /// [`VecmError::InvalidNames`] unless exactly `p` names are given.
    pub fn with_names(mut self, names: Vec<String>) -> VecmResult<Self> {
        if names.len() != self.nvars() {
            return Err(VecmError::InvalidNames { expected: self.nvars(), found: names.len() });
        }
        self.names = names;
        Ok(self)
    }

    /// Number of equations `n`.
    pub fn neqs(&self) -> usize {
        self.s00.nrows()
    }

    /// Rows of beta `p` (`n` plus restricted deterministic terms).
    pub fn nvars(&self) -> usize {
        self.s11.nrows()
    }

    pub fn log_det_s00(&self) -> VecmResult<f64> {
        Ok(log_det_pd(self.s00.view())?)
    }

    /// `S10·S00⁻¹·S01` (`p × p`).
    pub fn s10_s00i_s01(&self) -> VecmResult<Array2<f64>> {
        let s00i_s01 = spd_solve(self.s00.view(), self.s01.view())?;
        Ok(self.s01.t().dot(&s00i_s01))
    }

    /// Concentrated moment `S11m = S11 − S10·S00⁻¹·S01`.
    pub fn s11_concentrated(&self) -> VecmResult<Array2<f64>> {
        Ok(&self.s11 - &self.s10_s00i_s01()?)
    }

    /// Johansen eigenvalues `λ₁ ≥ … ≥ λ_r` and vectors (`S11`-orthonormal).
    pub fn johansen_eigen(&self, rank: usize) -> VecmResult<(Array1<f64>, Array2<f64>)> {
        let a = self.s10_s00i_s01()?;
        Ok(gen_sym_eigen(a.view(), self.s11.view(), rank)?)
    }

    /// Unrestricted maximized log-likelihood at cointegrating rank `rank`:
    /// `−T/2 · [n(1 + ln 2π) + ln|S00| + Σᵢ ln(1 − λᵢ)]`.
    ///
    /// # Errors
    /// Propagates decomposition failures; [`VecmError::NonFiniteResult`] if
    /// an eigenvalue reaches 1.
    pub fn johansen_loglik(&self, rank: usize) -> VecmResult<f64> {
        let (lambda, _) = self.johansen_eigen(rank)?;
        let sum_log: f64 = lambda.iter().map(|l| (1.0 - l).ln()).sum();
        let ll = -0.5
            * self.nobs as f64
            * (self.neqs() as f64 * (1.0 + (2.0 * PI).ln()) + self.log_det_s00()? + sum_log);
        if !ll.is_finite() {
            return Err(VecmError::NonFiniteResult { context: "unrestricted log-likelihood" });
        }
        Ok(ll)
    }
}

fn is_symmetric(a: ArrayView2<f64>) -> bool {
    let scale = a.iter().fold(1.0_f64, |m, v| m.max(v.abs()));
    a.indexed_iter().all(|((i, j), &v)| (v - a[[j, i]]).abs() <= SYMMETRY_TOL * scale)
}

/// `y1..yn`, then `const`, `trend`, `det3`, … for deterministic rows.
pub fn default_names(n: usize, p: usize) -> Vec<String> {
    (0..p)
        .map(|i| match i.checked_sub(n) {
            None => format!("y{}", i + 1),
            Some(0) => "const".to_string(),
            Some(1) => "trend".to_string(),
            Some(k) => format!("det{}", k + 1),
        })
        .collect()
}
