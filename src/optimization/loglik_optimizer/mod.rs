//! loglik_optimizer — argmin-powered log-likelihood maximizer.
//!
//! Purpose
//! -------
//! Provide the gradient-based stage of restricted estimation: a model
//! implements [`LogLikelihood`] and [`maximize`] polishes a starting point
//! with L-BFGS under a configurable line search and tolerances.
//!
//! Key behaviors
//! -------------
//! - [`adapter::ArgMinAdapter`] turns `ℓ(θ)` into the Argmin cost
//!   `c(θ) = -ℓ(θ)`, pricing undefined points at [`types::UNDEFINED_COST`]
//!   and falling back to finite differences when no analytic gradient exists.
//! - [`maximize`] validates the start with [`LogLikelihood::check`], selects a
//!   solver via [`builders`], and runs it through [`run::run_lbfgs`].
//! - [`validation`] centralizes finiteness and dimension checks.
//!
//! Invariants & assumptions
//! ------------------------
//! - The optimizer always maximizes `ℓ`; models never implement the cost.
//! - Configuration types are validated on construction and trusted by the
//!   solver layer.
//!
//! Conventions
//! -----------
//! - Outcomes ([`OptimOutcome::value`]) are reported as `ℓ`, not `-ℓ`.
//! - Errors bubble up as [`OptResult`](crate::optimization::errors::OptResult).
//!
//! Testing notes
//! -------------
//! - Unit tests cover sign conventions and penalty pricing in [`adapter`],
//!   solver construction in [`builders`], configuration invariants in
//!   [`traits`], and end-to-end toy maximizations in [`api`].

pub mod adapter;
pub mod api;
pub mod builders;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

pub use self::api::maximize;
pub use self::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Theta, UNDEFINED_COST};
