//! vecm::models — restricted cointegration estimators.
//!
//! [`restricted`] holds the profile likelihood of a VECM whose cointegrating
//! vectors obey general linear restrictions, its [`LogLikelihood`] impl, and
//! the one-call entry point [`estimate_restricted_cointegration`].
//!
//! [`LogLikelihood`]: crate::optimization::loglik_optimizer::LogLikelihood

pub mod restricted;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::restricted::{
    ProfileData, RestrictedBeta, RestrictedOutcome, estimate_restricted_cointegration,
    profile_alpha, residual_covariance,
};
