//! vecm::core — building blocks of restricted cointegration estimation.
//!
//! Purpose
//! -------
//! Hold everything the estimator needs before and around the likelihood:
//! the fitted VECM it restricts ([`moments`]), the restriction system and its
//! affine translation ([`restrictions`]), the identification check
//! ([`identification`]), starting values ([`init`]), run options
//! ([`options`]) and the hot-loop scratch buffers ([`workspace`]).
//!
//! Conventions
//! -----------
//! - `n` equations, `p ≥ n` rows of beta, rank `r`; `vec` stacks columns.
//! - Indices (rows, blocks, vectors) are 0-based in errors and logs.
//! - Everything here is single-threaded and owned by one estimation call.
//!
//! Testing notes
//! -------------
//! - Each submodule carries unit tests for its own invariants; the end-to-end
//!   behavior lives in `tests/integration_restricted_beta.rs`.

pub mod identification;
pub mod init;
pub mod moments;
pub mod options;
pub mod restrictions;
pub mod workspace;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::identification::{IdentificationMethod, check_identification, jacobian_probe};
pub use self::init::{InitialValues, initial_values};
pub use self::moments::{VecmSystem, default_names};
pub use self::options::{DEFAULT_JACOBIAN_SEED, RestrictOptions};
pub use self::restrictions::{
    AlphaBasis, AlphaRestriction, RestrictionBlock, RestrictionDesign, RestrictionSet,
    TranslatedBlock, split_blocks, translate_block,
};
pub use self::workspace::BetaScratch;
