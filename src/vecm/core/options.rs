//! Options for restricted cointegration estimation.
//!
//! Purpose
//! -------
//! Bundle every knob of one estimation call: the verbose/fold flags, the
//! annealing schedule of the global phase, the L-BFGS configuration of the
//! local phase, and the seed of the identification probe.
//!
//! Conventions
//! -----------
//! - `anneal: None` skips the global phase and starts L-BFGS from the
//!   initial values directly.
//! - Schedule and tolerance validation live in the constructors of
//!   [`AnnealOptions`] and [`MLEOptions`]; this struct only aggregates them.
use crate::optimization::{annealing::AnnealOptions, loglik_optimizer::MLEOptions};

/// Seed used by the Jacobian identification probe unless overridden.
pub const DEFAULT_JACOBIAN_SEED: u64 = 7_919;

#[derive(Debug, Clone, PartialEq)]
pub struct RestrictOptions {
    /// Log phase summaries at `info` level and enable optimizer tracing.
    pub verbose: bool,
    /// Write the restricted beta/alpha/Omega/loglik back into the system.
    pub fold: bool,
    pub anneal: Option<AnnealOptions>,
    pub mle_opts: MLEOptions,
    pub jacobian_seed: u64,
}

impl RestrictOptions {
    pub fn new(
        verbose: bool, fold: bool, anneal: Option<AnnealOptions>, mle_opts: MLEOptions,
        jacobian_seed: u64,
    ) -> RestrictOptions {
        RestrictOptions { verbose, fold, anneal, mle_opts, jacobian_seed }
    }

    /// Copy with `fold` switched on.
    pub fn folding(mut self) -> Self {
        self.fold = true;
        self
    }
}

impl Default for RestrictOptions {
    fn default() -> Self {
        RestrictOptions {
            verbose: false,
            fold: false,
            anneal: Some(AnnealOptions::default()),
            mle_opts: MLEOptions::default(),
            jacobian_seed: DEFAULT_JACOBIAN_SEED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::loglik_optimizer::{LineSearcher, Tolerances};

    #[test]
    fn new_preserves_fields() {
        let tols = Tolerances::new(Some(1e-7), None, Some(50)).unwrap();
        let mle_opts = MLEOptions::new(tols, LineSearcher::HagerZhang, Some(5)).unwrap();
        let anneal = AnnealOptions::new(100, 0.5, 0.2, 0.99, 0.99, 3).unwrap();

        let opts = RestrictOptions::new(true, false, Some(anneal.clone()), mle_opts.clone(), 11);

        assert!(opts.verbose);
        assert!(!opts.fold);
        assert_eq!(opts.anneal, Some(anneal));
        assert_eq!(opts.mle_opts, mle_opts);
        assert_eq!(opts.jacobian_seed, 11);
    }

    #[test]
    fn default_runs_both_phases_without_folding() {
        let opts = RestrictOptions::default();

        assert!(!opts.verbose);
        assert!(!opts.fold);
        assert_eq!(opts.anneal, Some(AnnealOptions::default()));
        assert_eq!(opts.jacobian_seed, DEFAULT_JACOBIAN_SEED);
        assert!(opts.folding().fold);
    }
}
