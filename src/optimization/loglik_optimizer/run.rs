//! Execution helper that runs an `argmin` solver on a log-likelihood problem
//! and returns a crate-friendly [`OptimOutcome`].
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        Grad, LogLikelihood, MLEOptions, OptimOutcome, Theta, adapter::ArgMinAdapter,
    },
};
use argmin::core::{CostFunction, Executor, Gradient, State};
use argmin_math::ArgminL2Norm;
use tracing::{debug, info};

/// Run an `argmin` solver for a log-likelihood problem.
///
/// Shared by both line-search variants. Sets `theta0` as the initial state,
/// applies `opts.tols.max_iter`, runs, and converts the final state into an
/// [`OptimOutcome`] with `value = -best_cost`.
///
/// With `opts.verbose` the starting log-likelihood and gradient norm are
/// logged at `info`; the `obs_slog` feature additionally attaches a
/// per-iteration slog observer.
///
/// # Errors
/// - Any `argmin` runtime error, converted through `From<argmin::core::Error>`.
/// - Validation errors while building the [`OptimOutcome`].
pub fn run_lbfgs<'a, F, S>(
    theta0: Theta, opts: &MLEOptions, problem: ArgMinAdapter<'a, F>, solver: S,
) -> OptResult<OptimOutcome>
where
    F: LogLikelihood,
    S: argmin::core::Solver<
            ArgMinAdapter<'a, F>,
            argmin::core::IterState<Theta, Grad, (), (), (), f64>,
        > + Send
        + 'static,
{
    if opts.verbose {
        log_initial_state(&theta0, &problem)?;
    }
    let mut optimizer = Executor::new(problem, solver);
    optimizer = optimizer.configure(|state| state.param(theta0));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }

    let mut result = optimizer.run()?.state().clone();
    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    let grad = result.take_gradient();
    let outcome = OptimOutcome::new(
        result.take_best_param(),
        -result.get_best_cost(),
        termination,
        iterations,
        function_counts,
        grad,
    )?;
    debug!(
        iterations = outcome.iterations,
        loglik = outcome.value,
        status = %outcome.status,
        "L-BFGS finished"
    );
    Ok(outcome)
}

fn log_initial_state<F>(theta0: &Theta, problem: &ArgMinAdapter<'_, F>) -> OptResult<()>
where
    F: LogLikelihood,
{
    let loglik = -problem.cost(theta0)?;
    match problem.gradient(theta0) {
        Ok(g) => info!(loglik, grad_norm = g.l2_norm(), n_params = theta0.len(), "L-BFGS start"),
        Err(_) => info!(loglik, n_params = theta0.len(), "L-BFGS start; gradient unavailable"),
    }
    Ok(())
}
