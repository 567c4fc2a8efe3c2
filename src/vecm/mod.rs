//! vecm — restricted cointegration for vector error-correction models.
//!
//! Purpose
//! -------
//! Estimate the cointegrating vectors of a fitted Johansen VECM subject to
//! general linear restrictions `R·vec(β) = q` (optionally with homogeneous
//! loading restrictions `R_a·α = 0`), and report the restricted estimates
//! with standard errors and the likelihood-ratio test of the restrictions.
//!
//! Key behaviors
//! -------------
//! - [`core`] holds the caller's system ([`VecmSystem`]), the restriction
//!   translator, the identification checker, initial values, options and
//!   scratch buffers.
//! - [`models`] implements the profile likelihood on top of the generic
//!   optimizer and exposes [`estimate_restricted_cointegration`].
//! - [`report`] renders a [`RestrictedOutcome`] as text.
//! - [`errors`] defines [`VecmError`] / [`VecmResult`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Moment matrices are validated once at construction and never mutated;
//!   only an explicit fold writes estimates back into a [`VecmSystem`].
//! - Identification is certified before any optimization; a failed check
//!   aborts the call with no partial estimate.
//! - A likelihood evaluation that hits a non-positive-definite form is a
//!   rejected trial point, never an error.
//!
//! Conventions
//! -----------
//! - `n` equations, `p ≥ n` rows of beta (levels plus restricted
//!   deterministic terms), cointegrating rank `r`.
//! - Errors and logs use 0-based row, block and vector indices.
//! - Diagnostics go through `tracing`; no subscriber is installed here.
//!
//! Downstream usage
//! ----------------
//! - Build a [`VecmSystem`] from `S00`, `S01`, `S11`, `T` and `r`, a
//!   [`RestrictionSet`], and [`RestrictOptions`]; call
//!   [`estimate_restricted_cointegration`]; print or inspect the outcome.
//!
//! Testing notes
//! -------------
//! - Unit tests live beside each submodule; end-to-end scenarios (including
//!   fully pinned systems, alpha restrictions and folding) are in
//!   `tests/integration_restricted_beta.rs`.

pub mod core;
pub mod errors;
pub mod models;
pub mod report;

pub use self::core::{
    AlphaRestriction, IdentificationMethod, RestrictOptions, RestrictionSet, VecmSystem,
};
pub use self::errors::{VecmError, VecmResult};
pub use self::models::{RestrictedOutcome, estimate_restricted_cointegration};

pub mod prelude {
    pub use super::{
        AlphaRestriction, IdentificationMethod, RestrictOptions, RestrictedOutcome,
        RestrictionSet, VecmError, VecmResult, VecmSystem, estimate_restricted_cointegration,
    };
}
