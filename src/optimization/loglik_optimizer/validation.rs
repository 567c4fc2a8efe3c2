//! Validation helpers for log-likelihood optimization.
//!
//! - **Tolerances**: [`verify_tol_grad`], [`verify_tol_cost`] accept `None`
//!   or a finite, strictly positive value.
//! - **Inputs**: [`validate_theta_input`] checks a starting vector's length
//!   and finiteness before any solver is built.
//! - **Gradients**: [`validate_grad`] enforces dimension and finite entries.
//! - **Outcomes**: [`validate_theta_hat`] and [`validate_value`] reject
//!   missing or non-finite solver output.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{Grad, Theta},
};

/// Validate the optional gradient-norm tolerance.
///
/// # Errors
/// Returns [`OptError::InvalidTolGrad`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol_grad(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

/// Validate the optional cost-change tolerance.
///
/// # Errors
/// Returns [`OptError::InvalidTolCost`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol_cost(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(OptError::InvalidTolCost { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(OptError::InvalidTolCost { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

/// Validate a starting parameter vector against the expected length.
///
/// # Errors
/// - [`OptError::ThetaLengthMismatch`] if `theta.len() != expected`.
/// - [`OptError::InvalidThetaInput`] for the first non-finite entry.
pub fn validate_theta_input(theta: &Theta, expected: usize) -> OptResult<()> {
    if theta.len() != expected {
        return Err(OptError::ThetaLengthMismatch { expected, actual: theta.len() });
    }
    match theta.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(OptError::InvalidThetaInput { index, value: theta[index] }),
        None => Ok(()),
    }
}

/// Validate a gradient vector against dimension and finiteness.
///
/// # Errors
/// - [`OptError::GradientDimMismatch`] if length does not match `dim`.
/// - [`OptError::InvalidGradient`] for the first offending element.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    for (index, &value) in grad.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidGradient {
                index,
                value,
                reason: "Gradient elements must be finite.",
            });
        }
    }
    Ok(())
}

/// Validate and unwrap an estimated parameter vector.
///
/// # Errors
/// - [`OptError::MissingThetaHat`] if no vector was provided.
/// - [`OptError::InvalidThetaHat`] if any element is non-finite.
pub fn validate_theta_hat(theta_hat: Option<Theta>) -> OptResult<Theta> {
    let t = theta_hat.ok_or(OptError::MissingThetaHat)?;
    if let Some(index) = t.iter().position(|v| !v.is_finite()) {
        return Err(OptError::InvalidThetaHat {
            index,
            value: t[index],
            reason: "Parameter estimates must be finite.",
        });
    }
    Ok(t)
}

/// Validate that a scalar log-likelihood value is finite.
///
/// # Errors
/// Returns [`OptError::NonFiniteCost`] if the value is `NaN` or infinite.
pub fn validate_value(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::NonFiniteCost { value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn tolerances_reject_zero_and_nan() {
        assert!(verify_tol_grad(Some(0.0)).is_err());
        assert!(verify_tol_cost(Some(f64::NAN)).is_err());
        assert!(verify_tol_grad(None).is_ok());
        assert!(verify_tol_cost(Some(1e-8)).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Starting vectors of the wrong length or with NaNs are rejected with
    // the offending position.
    fn theta_input_reports_length_and_first_non_finite_index() {
        let theta = array![0.0, f64::NAN, 1.0];

        let wrong_len = validate_theta_input(&theta, 2);
        let non_finite = validate_theta_input(&theta, 3);

        assert_eq!(wrong_len, Err(OptError::ThetaLengthMismatch { expected: 2, actual: 3 }));
        assert!(matches!(non_finite, Err(OptError::InvalidThetaInput { index: 1, .. })));
    }

    #[test]
    fn theta_hat_missing_is_an_error() {
        assert_eq!(validate_theta_hat(None), Err(OptError::MissingThetaHat));
    }

    #[test]
    fn grad_with_infinite_entry_is_rejected() {
        let g = array![1.0, f64::INFINITY];

        assert!(matches!(validate_grad(&g, 2), Err(OptError::InvalidGradient { index: 1, .. })));
        assert!(matches!(validate_grad(&g, 3), Err(OptError::GradientDimMismatch { .. })));
    }
}
