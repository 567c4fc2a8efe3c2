//! Unified error handling for post-estimation inference.
//!
//! `InferenceError` covers the ways variance and test computations can fail
//! after a restricted beta has been estimated: non-conformable inputs,
//! non-finite intermediate results, a chi-square distribution that cannot be
//! built, and linear-algebra failures. `InferenceResult<T>` is the matching
//! alias.
use thiserror::Error;

use crate::linalg::LinalgError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    /// Inputs do not conform (e.g. `α` and `Ω` disagree on `n`).
    #[error("Inference Error: dimension mismatch for {what}: expected {expected:?}, found {found:?}")]
    DimensionMismatch { what: &'static str, expected: (usize, usize), found: (usize, usize) },

    /// A covariance or test statistic came out NaN/±inf.
    #[error("Inference Error: non-finite {context}")]
    NonFinite { context: &'static str },

    /// The reference chi-square distribution could not be constructed.
    #[error("Inference Error: invalid chi-square distribution with {df} degrees of freedom: {reason}")]
    InvalidDistribution { df: i64, reason: String },

    #[error(transparent)]
    Linalg(#[from] LinalgError),
}

pub type InferenceResult<T> = Result<T, InferenceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_the_inference_prefix() {
        let err = InferenceError::NonFinite { context: "LR statistic" };
        let dist = InferenceError::InvalidDistribution { df: 2, reason: "bad".to_string() };

        assert_eq!(err.to_string(), "Inference Error: non-finite LR statistic");
        assert!(dist.to_string().contains("2 degrees of freedom"));
    }
}
