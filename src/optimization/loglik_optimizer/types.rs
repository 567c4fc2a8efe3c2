//! loglik_optimizer::types — numeric aliases and solver wiring.
//!
//! Purpose
//! -------
//! Name the vector and scalar shapes the optimizer works with and pin the
//! Argmin L-BFGS generics to them, so the rest of the crate can talk about
//! `Theta`/`Grad`/`Cost` instead of `ndarray` and Argmin type parameters.
//!
//! Conventions
//! -----------
//! - `Theta` is the free parameter vector of whatever is being maximized. For
//!   the restricted cointegration model it is φ, the stacked free parameters
//!   of all restriction blocks (`vec(β) = H·φ + s`).
//! - `Cost` is the minimized quantity `c(θ) = -ℓ(θ)`.
//! - `DEFAULT_LBFGS_MEM` is the L-BFGS history length unless overridden in
//!   `MLEOptions::lbfgs_mem`.
use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    quasinewton::LBFGS,
};
use ndarray::Array1;
use std::collections::HashMap;

/// Free parameter vector handed to the optimizer.
pub type Theta = Array1<f64>;

/// Gradient vector, same length as [`Theta`].
pub type Grad = Array1<f64>;

/// Scalar cost `c(θ) = -ℓ(θ)`.
pub type Cost = f64;

/// Function-evaluation counters as reported by Argmin
/// (`"cost_count"`, `"gradient_count"`).
pub type FnEvalMap = HashMap<String, u64>;

/// Default history size (`m`) for L-BFGS runs.
pub const DEFAULT_LBFGS_MEM: usize = 7;

/// Cost assigned to points where the log-likelihood is undefined (e.g. a
/// quadratic form that is not positive definite). Finite so line searches can
/// back off, and far above any attainable `-ℓ`.
pub const UNDEFINED_COST: Cost = 1e100;

pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;
pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;

/// L-BFGS solver wired to the Hager–Zhang line search.
pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Theta, Grad, Cost>;

/// L-BFGS solver wired to the More–Thuente line search.
pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Theta, Grad, Cost>;
