//! inference — standard errors and the likelihood-ratio test for a
//! restricted beta.
//!
//! Purpose
//! -------
//! Provide the post-estimation uncertainty layer on top of a fitted
//! restricted cointegration model: delta-method covariance of `vec(β̂)` and
//! the LR test of the restrictions against the unrestricted Johansen fit.
//!
//! Key behaviors
//! -------------
//! - [`beta_variance`] assembles the block precision of the free parameters
//!   from `α`, `Ω`, `S11` and `H`, inverts it (pseudoinverse fallback) and
//!   maps it back to `vec(β̂)`.
//! - [`degrees_of_freedom`] and [`lr_test`] count over-identifying
//!   restrictions and compare `2·(ℓ_u − ℓ_r)` with `χ²(df)`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Moment matrices are sample averages; the sample size `T` scales the
//!   precision explicitly.
//! - The information matrix is block diagonal between beta and the loadings
//!   (super-consistency of β̂), so the beta block is inverted on its own.
//!
//! Conventions
//! -----------
//! - Standard errors are shaped like beta (`p × r`), one column per vector.
//! - Failures are reported via [`InferenceResult`]; the only log output is
//!   a `warn` on pseudo-inversion or negative degrees of freedom.
//!
//! Testing notes
//! -------------
//! - Unit tests check the scalar closed form of the variance, zero variance
//!   for pinned systems, df counting, and the χ² tail probability.

pub mod errors;
pub mod lr_test;
pub mod variance;

pub use self::errors::{InferenceError, InferenceResult};
pub use self::lr_test::{LrTest, degrees_of_freedom, lr_test};
pub use self::variance::{BetaVariance, beta_variance};
