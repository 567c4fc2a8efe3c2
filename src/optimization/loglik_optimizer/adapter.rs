//! Adapter that exposes a [`LogLikelihood`] as an `argmin` problem.
//!
//! Maximizing `ℓ(θ)` becomes minimizing `c(θ) = -ℓ(θ)`. Analytic gradients are
//! negated; without one, the **cost** closure is finite-differenced (no sign
//! flip needed in that branch).
//!
//! Points where `ℓ` is undefined (a non-finite value, or
//! [`OptError::NonFiniteCost`] from the model) are priced at
//! [`UNDEFINED_COST`] with a zero gradient. A line search never accepts such a
//! point, so it shrinks the step and the iterate stays in the valid region.
use std::cell::RefCell;

use crate::optimization::{
    errors::OptError,
    loglik_optimizer::{
        traits::LogLikelihood,
        types::{Cost, Grad, Theta, UNDEFINED_COST},
        validation::validate_grad,
    },
};
use argmin::core::{CostFunction, Error, Gradient};
use finitediff::FiniteDiff;
use tracing::trace;

/// Bridges a [`LogLikelihood`] to `argmin`'s `CostFunction` and `Gradient`.
#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: LogLikelihood> {
    pub f: &'a F,
    pub data: &'a F::Data,
}

impl<'a, F: LogLikelihood> ArgMinAdapter<'a, F> {
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data }
    }
}

impl<'a, F: LogLikelihood> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    /// Evaluate `c(θ) = -ℓ(θ)`, or [`UNDEFINED_COST`] outside the domain.
    ///
    /// # Errors
    /// Propagates any model error other than [`OptError::NonFiniteCost`].
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        match self.f.value(theta, self.data) {
            Ok(v) if v.is_finite() => Ok(-v),
            Ok(v) => {
                trace!(value = v, "log-likelihood undefined; assigning penalty cost");
                Ok(UNDEFINED_COST)
            }
            Err(OptError::NonFiniteCost { value }) => {
                trace!(value, "log-likelihood undefined; assigning penalty cost");
                Ok(UNDEFINED_COST)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl<'a, F: LogLikelihood> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// Evaluate the gradient of the cost at `θ`.
    ///
    /// - Analytic gradient: validated, then negated.
    /// - Undefined point: zero vector.
    /// - No analytic gradient: central differences of the cost, retried with
    ///   forward differences if a cost evaluation failed or the result is not
    ///   finite.
    ///
    /// # Errors
    /// Propagates model errors and gradient validation failures.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        let dim = theta.len();
        match self.f.grad(theta, self.data) {
            Ok(g) => {
                validate_grad(&g, dim)?;
                Ok(-g)
            }
            Err(OptError::NonFiniteCost { .. }) => Ok(Grad::zeros(dim)),
            Err(OptError::GradientNotImplemented) => self.fd_gradient(theta),
            Err(e) => Err(e.into()),
        }
    }
}

impl<'a, F: LogLikelihood> ArgMinAdapter<'a, F> {
    fn fd_gradient(&self, theta: &Theta) -> Result<Grad, Error> {
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let cost_func = |theta: &Theta| -> f64 {
            match self.cost(theta) {
                Ok(val) => val,
                Err(e) => {
                    let mut slot = closure_err.borrow_mut();
                    if slot.is_none() {
                        *slot = Some(e);
                    }
                    f64::NAN
                }
            }
        };
        let fd_grad = theta.central_diff(&cost_func);
        if closure_err.borrow().is_none() && validate_grad(&fd_grad, theta.len()).is_ok() {
            return Ok(fd_grad);
        }
        closure_err.replace(None);
        let fd_grad = theta.forward_diff(&cost_func);
        if let Some(err) = closure_err.take() {
            return Err(err);
        }
        validate_grad(&fd_grad, theta.len())?;
        Ok(fd_grad)
    }
}
