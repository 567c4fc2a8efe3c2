//! optimization — two-phase likelihood maximization and its error surface.
//!
//! Purpose
//! -------
//! Provide the numerical search used by restricted cointegration estimation:
//! a derivative-free global phase ([`annealing`]) followed by an Argmin-backed
//! L-BFGS polish ([`loglik_optimizer`]), both driven by the same
//! [`LogLikelihood`](loglik_optimizer::LogLikelihood) implementation.
//!
//! Key behaviors
//! -------------
//! - Callers implement `ℓ(θ)` (and optionally `∇ℓ(θ)`) once; both phases
//!   consume it.
//! - Undefined likelihood points are recoverable: annealing rejects them and
//!   the L-BFGS adapter prices them at a large finite cost.
//! - Configuration issues and backend solver errors are normalized into
//!   [`errors::OptError`] with the alias [`errors::OptResult`].
//!
//! Conventions
//! -----------
//! - Both phases *maximize* `ℓ`; the L-BFGS stage internally minimizes
//!   `c(θ) = -ℓ(θ)`. Reported values are always `ℓ`.
//! - Logging goes through `tracing` at `debug`/`trace` level; no subscriber
//!   is installed here.
//!
//! Testing notes
//! -------------
//! - `annealing`: schedule validation, best-point tracking, reproducibility.
//! - `loglik_optimizer`: adapter sign conventions, builders, toy
//!   maximizations with both line searches.
//! - `errors`: argmin error conversion.

pub mod annealing;
pub mod errors;
pub mod loglik_optimizer;

pub mod prelude {
    pub use super::annealing::{AnnealOptions, AnnealOutcome, anneal};
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::{
        LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Theta, Tolerances, maximize,
    };
}
