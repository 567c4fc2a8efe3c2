//! Errors for restricted cointegration estimation.
//!
//! One enum, [`VecmError`], covers every way an estimation call can abort:
//! inconsistent moment matrices, malformed or singular restrictions, failed
//! identification, a singular initial-value projection, and failures bubbling
//! up from the linear-algebra and optimizer layers.
//!
//! ## Conventions
//! - **Indices are 0-based**: restriction rows and cointegrating-vector
//!   (block) numbers match `ndarray` indexing.
//! - A non-positive-definite quadratic form during a *single* likelihood
//!   evaluation is not an error here; the likelihood reports it as undefined
//!   and the optimizer moves on.
//! - With the `python-bindings` feature, errors convert to `ValueError`.
use thiserror::Error;

use crate::{inference::InferenceError, linalg::LinalgError, optimization::errors::OptError};

/// Result alias for restricted-estimation operations.
pub type VecmResult<T> = Result<T, VecmError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum VecmError {
    // ---- Input / data validation ----
    /// A matrix or vector does not have the shape implied by the system.
    #[error("Dimension mismatch for {what}: expected {expected:?}, found {found:?}")]
    DimensionMismatch { what: &'static str, expected: (usize, usize), found: (usize, usize) },

    /// Moment matrices are non-finite, asymmetric, or not positive definite.
    #[error("Invalid moment matrices: {reason}")]
    InvalidMoments { reason: &'static str },

    /// Cointegrating rank outside `1..=min(n, p)`.
    #[error("Invalid cointegrating rank {rank}: {reason}")]
    InvalidRank { rank: usize, reason: &'static str },

    /// Variable name list does not match the rows of beta.
    #[error("Expected {expected} variable names, got {found}")]
    InvalidNames { expected: usize, found: usize },

    // ---- Restrictions ----
    /// A restriction row cannot be assigned to a single cointegrating vector.
    #[error("Malformed restriction at row {row}: {reason}")]
    MalformedRestriction { row: usize, reason: &'static str },

    /// The restrictions do not identify the cointegrating vectors.
    #[error("Restrictions do not identify beta: {detail}")]
    NotIdentified { detail: String },

    /// A restriction block has linearly dependent rows or is inconsistent.
    #[error("Restrictions on cointegrating vector {block} are singular or inconsistent")]
    SingularRestriction { block: usize },

    // ---- Estimation ----
    /// `HᵗH` could not be inverted when projecting the initial values.
    #[error("Cannot project initial values onto the restricted space: HᵗH is singular")]
    SingularProjection,

    /// A post-estimation quantity came out NaN/±inf.
    #[error("Non-finite result while computing {context}")]
    NonFiniteResult { context: &'static str },

    /// Python wrapper accessed before estimation.
    #[error("Model hasn't been estimated yet.")]
    ModelNotFitted,

    // ---- Lower layers ----
    #[error(transparent)]
    Optimizer(#[from] OptError),

    #[error(transparent)]
    Linalg(#[from] LinalgError),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

#[cfg(feature = "python-bindings")]
impl From<VecmError> for pyo3::PyErr {
    fn from(err: VecmError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Lower-layer errors convert with `?` and keep their message.
    fn lower_layer_errors_convert_transparently() {
        let lin: VecmError = LinalgError::Singular { context: "solve" }.into();
        let opt: VecmError = OptError::MissingThetaHat.into();

        assert_eq!(lin.to_string(), LinalgError::Singular { context: "solve" }.to_string());
        assert!(matches!(opt, VecmError::Optimizer(OptError::MissingThetaHat)));
    }

    #[test]
    fn restriction_errors_name_the_row_or_block() {
        let row = VecmError::MalformedRestriction { row: 3, reason: "spans two vectors" };
        let block = VecmError::SingularRestriction { block: 1 };

        assert!(row.to_string().contains("row 3"));
        assert!(block.to_string().contains("vector 1"));
    }
}
