//! Errors raised by the dense linear-algebra layer.
//!
//! Every routine in [`crate::linalg::dense`] that can fail returns
//! [`LinalgResult<T>`]. The `context` payloads are static labels naming the
//! operation that failed (e.g. `"log_det_pd"`), so callers can surface a
//! precise diagnostic without carrying matrices around.
use thiserror::Error;

/// Result alias for linear-algebra operations.
pub type LinalgResult<T> = Result<T, LinalgError>;

/// Failure modes of the dense provider.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinalgError {
    /// A square solve or inversion hit a (numerically) singular matrix.
    #[error("Singular matrix in {context}")]
    Singular { context: &'static str },

    /// A Cholesky factorization failed because the matrix is not positive definite.
    #[error("Matrix is not positive definite in {context}")]
    NotPositiveDefinite { context: &'static str },

    /// Operand shapes are not conformable.
    #[error("Dimension mismatch in {context}: expected {expected:?}, found {found:?}")]
    DimensionMismatch { context: &'static str, expected: (usize, usize), found: (usize, usize) },

    /// A decomposition produced non-finite output.
    #[error("Non-finite result in {context}")]
    NonFinite { context: &'static str },
}
