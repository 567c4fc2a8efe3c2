//! Restricted-beta VECM: profile likelihood, analytic gradient, and the
//! estimation entry point.
//!
//! This module wires the affine parametrization `vec(β) = H·φ + s` to the
//! [`LogLikelihood`] trait. With alpha and Omega concentrated out, the
//! log-likelihood depends on `β` only through two `r × r` determinants:
//!
//! `ℓ(φ) = −T/2 · [c + ln|βᵗ·S11m·β| − ln|βᵗ·S11·β|]`
//!
//! where `c = n(1 + ln 2π) + ln|S00|` and `S11m = S11 − S10·S00⁻¹·S01`.
//! Under homogeneous loading restrictions `α = A·ψ` the same formula holds
//! with `S11`, `S11m` and `c` replaced by their counterparts conditional on
//! the restricted directions `A⊥ᵗ·R0` (see [`ProfileData::new`]).
//!
//! Key ideas:
//! - Evaluation writes `β` and both quadratic forms into [`BetaScratch`]
//!   and takes the determinants by in-place Cholesky: no allocation beyond
//!   `vec(β)` in the hot loop.
//! - A non-positive-definite form makes `ℓ` undefined (`NaN`); annealing
//!   rejects such points and the L-BFGS adapter prices them as
//!   [`UNDEFINED_COST`](crate::optimization::loglik_optimizer::UNDEFINED_COST).
//! - The gradient is analytic:
//!   `∇ℓ = −T·Hᵗ·vec(S11m·β·M₁⁻¹ − S11·β·M₂⁻¹)`.
//! - [`estimate_restricted_cointegration`] runs translator → identification
//!   → initial values → annealing → L-BFGS → post-estimation, and optionally
//!   folds the result back into the caller's [`VecmSystem`].
use std::f64::consts::PI;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use tracing::{debug, info, warn};

use crate::{
    inference::{LrTest, beta_variance, degrees_of_freedom, lr_test},
    linalg::{chol_logdet_in_place, log_det_pd, quad_form_into, spd_solve, vec_cols},
    optimization::{
        annealing::{AnnealOutcome, anneal},
        errors::{OptError, OptResult},
        loglik_optimizer::{
            Grad, LogLikelihood, OptimOutcome, Theta, maximize,
            validation::validate_theta_input,
        },
    },
    vecm::{
        core::{
            identification::{IdentificationMethod, check_identification},
            init::initial_values,
            moments::VecmSystem,
            options::RestrictOptions,
            restrictions::{AlphaBasis, RestrictionDesign, RestrictionSet},
            workspace::BetaScratch,
        },
        errors::{VecmError, VecmResult},
    },
};

/// Relative slack before a restricted log-likelihood above the unrestricted
/// maximum is reported.
const LR_NEGATIVE_TOL: f64 = 1e-6;

/// Concentrated moments the profile likelihood is evaluated on.
///
/// `s11`/`s11m` are `p × p`; `s_x1` is the cross moment of the admissible
/// equations with the levels (`S01` when alpha is free, `S_a1.b` when
/// `α = A·ψ`), used to recover the loadings.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileData {
    pub s11: Array2<f64>,
    pub s11m: Array2<f64>,
    pub s_x1: Array2<f64>,
    /// Basis `A` of admissible loadings; `None` for free alpha.
    pub alpha_basis: Option<Array2<f64>>,
    /// Constant `c` of the profile likelihood.
    pub ld_const: f64,
    pub nobs: f64,
}

impl ProfileData {
    /// Concentrate the moments of `system`, conditioning on `A⊥ᵗ·R0` when
    /// the loadings are restricted.
    ///
    /// With `A` orthonormal and `A⊥ = R_aᵗ`:
    /// - `S_aa.b = AᵗS00A − AᵗS00A⊥·S_bb⁻¹·A⊥ᵗS00A`, `S_bb = A⊥ᵗS00A⊥`,
    /// - `S_a1.b = AᵗS01 − AᵗS00A⊥·S_bb⁻¹·A⊥ᵗS01`,
    /// - `S11.b = S11 − S10A⊥·S_bb⁻¹·A⊥ᵗS01`,
    /// - `S11m = S11.b − S_a1.bᵗ·S_aa.b⁻¹·S_a1.b`,
    /// - `c = n(1 + ln 2π) + ln|S_aa.b| + ln|S_bb| − ln|AᵗA| − ln|A⊥ᵗA⊥|`.
    ///
    /// # Errors
    /// Propagates failures of the Cholesky-based solves and log-determinants.
    pub fn new(system: &VecmSystem, alpha: Option<&AlphaBasis>) -> VecmResult<Self> {
        let n = system.neqs() as f64;
        let base = n * (1.0 + (2.0 * PI).ln());
        let nobs = system.nobs as f64;
        let Some(basis) = alpha else {
            return Ok(Self {
                s11: system.s11.clone(),
                s11m: system.s11_concentrated()?,
                s_x1: system.s01.clone(),
                alpha_basis: None,
                ld_const: base + system.log_det_s00()?,
                nobs,
            });
        };

        let (a, a_perp) = (&basis.a, &basis.a_perp);
        let s00_aperp = system.s00.dot(a_perp);
        let s_bb = a_perp.t().dot(&s00_aperp);
        let s_ab = a.t().dot(&s00_aperp);
        let s_aa = a.t().dot(&system.s00).dot(a);
        let s_a1 = a.t().dot(&system.s01);
        let s_b1 = a_perp.t().dot(&system.s01);

        let bb_inv_ba = spd_solve(s_bb.view(), s_ab.t())?;
        let bb_inv_b1 = spd_solve(s_bb.view(), s_b1.view())?;
        let s_aa_b = &s_aa - &s_ab.dot(&bb_inv_ba);
        let s_a1_b = &s_a1 - &s_ab.dot(&bb_inv_b1);
        let s11_b = &system.s11 - &s_b1.t().dot(&bb_inv_b1);
        let aa_inv_a1 = spd_solve(s_aa_b.view(), s_a1_b.view())?;
        let s11m = &s11_b - &s_a1_b.t().dot(&aa_inv_a1);

        let ld_const = base + log_det_pd(s_aa_b.view())? + log_det_pd(s_bb.view())?
            - log_det_pd(a.t().dot(a).view())?
            - log_det_pd(a_perp.t().dot(a_perp).view())?;

        Ok(Self { s11: s11_b, s11m, s_x1: s_a1_b, alpha_basis: Some(a.clone()), ld_const, nobs })
    }
}

/// Profile log-likelihood of a restricted beta.
///
/// Holds the restriction design and the scratch buffers reused across
/// evaluations; the concentrated moments travel separately as
/// [`ProfileData`].
#[derive(Debug, Clone, PartialEq)]
pub struct RestrictedBeta {
    pub design: RestrictionDesign,
    pub scratch: BetaScratch,
}

impl RestrictedBeta {
    pub fn new(design: RestrictionDesign) -> RestrictedBeta {
        let scratch = BetaScratch::new(design.p, design.r);
        RestrictedBeta { design, scratch }
    }

    /// `ℓ(φ)`, or `NaN` where either quadratic form is not positive definite.
    pub fn profile_loglik(&self, phi: ArrayView1<f64>, data: &ProfileData) -> f64 {
        let mut beta = self.scratch.beta.borrow_mut();
        let mut tmp = self.scratch.tmp.borrow_mut();
        let mut m1 = self.scratch.m1.borrow_mut();
        let mut m2 = self.scratch.m2.borrow_mut();
        self.design.beta_into(phi, beta.view_mut());
        quad_form_into(beta.view(), data.s11m.view(), &mut tmp, &mut m1);
        quad_form_into(beta.view(), data.s11.view(), &mut tmp, &mut m2);
        match (chol_logdet_in_place(m1.view_mut()), chol_logdet_in_place(m2.view_mut())) {
            (Some(ld_m1), Some(ld_m2)) => -0.5 * data.nobs * (data.ld_const + ld_m1 - ld_m2),
            _ => f64::NAN,
        }
    }
}

impl LogLikelihood for RestrictedBeta {
    type Data = ProfileData;

    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<f64> {
        Ok(self.profile_loglik(theta.view(), data))
    }

    fn check(&self, theta: &Theta, _data: &Self::Data) -> OptResult<()> {
        validate_theta_input(theta, self.design.n_free())
    }

    /// `∇ℓ(φ) = −T·Hᵗ·vec(S11m·β·M₁⁻¹ − S11·β·M₂⁻¹)`.
    ///
    /// # Errors
    /// [`OptError::NonFiniteCost`] where `ℓ` is undefined.
    fn grad(&self, theta: &Theta, data: &Self::Data) -> OptResult<Grad> {
        let beta = self.design.beta(theta.view());
        let s11m_beta = data.s11m.dot(&beta);
        let s11_beta = data.s11.dot(&beta);
        let m1 = beta.t().dot(&s11m_beta);
        let m2 = beta.t().dot(&s11_beta);
        let (Ok(left), Ok(right)) =
            (spd_solve(m1.view(), s11m_beta.t()), spd_solve(m2.view(), s11_beta.t()))
        else {
            return Err(OptError::NonFiniteCost { value: f64::NAN });
        };
        let d_beta = (left - right).reversed_axes();
        Ok(self.design.h.t().dot(&vec_cols(d_beta.view())) * (-data.nobs))
    }
}

/// Loadings that maximize the likelihood for a given beta:
/// `α = S01·β·(βᵗS11β)⁻¹`, or `α = A·S_a1.b·β·(βᵗS11.bβ)⁻¹` under loading
/// restrictions.
///
/// # Errors
/// Linear-algebra failure if `βᵗS11β` is not positive definite.
pub fn profile_alpha(beta: ArrayView2<f64>, data: &ProfileData) -> VecmResult<Array2<f64>> {
    let m2 = beta.t().dot(&data.s11.dot(&beta));
    let cross = data.s_x1.dot(&beta);
    let psi = spd_solve(m2.view(), cross.t())?.reversed_axes();
    Ok(match &data.alpha_basis {
        Some(a) => a.dot(&psi),
        None => psi,
    })
}

/// Residual covariance `Ω = S00 − S01βαᵗ − αβᵗS10 + αβᵗS11βαᵗ`.
///
/// The moments are averages over the `T` observations, so the result is
/// the per-observation covariance and is not divided by `T` again.
pub fn residual_covariance(
    system: &VecmSystem, alpha: ArrayView2<f64>, beta: ArrayView2<f64>,
) -> Array2<f64> {
    let s01_beta = system.s01.dot(&beta);
    let bsb = beta.t().dot(&system.s11.dot(&beta));
    let cross = s01_beta.dot(&alpha.t());
    &system.s00 - &cross - &cross.t() + &alpha.dot(&bsb).dot(&alpha.t())
}

/// Everything produced by one restricted estimation.
#[derive(Debug, Clone, PartialEq)]
pub struct RestrictedOutcome {
    /// `p × r` restricted cointegrating vectors.
    pub beta: Array2<f64>,
    /// `n × r` loadings.
    pub alpha: Array2<f64>,
    /// `n × n` residual covariance
    /// `S00 − S01βαᵗ − αβᵗS10 + αβᵗS11βαᵗ`. The moments are sample averages,
    /// so this is already per observation: no further division by `T`.
    pub omega: Array2<f64>,
    /// `p·r × p·r` covariance of `vec(β̂)`.
    pub beta_var: Array2<f64>,
    /// `p × r` standard errors.
    pub beta_se: Array2<f64>,
    /// Free parameters of `beta`. With homogeneous vectors they refer to the
    /// normalized design, where each such vector has one parameter fewer.
    pub phi: Array1<f64>,
    pub loglik: f64,
    /// `ℓ(φ₀)` at the initial values.
    pub loglik_start: f64,
    pub loglik_unrestricted: f64,
    pub lr: LrTest,
    pub identification: IdentificationMethod,
    /// Whether the initial beta was rotated onto the restrictions.
    pub normalized: bool,
    pub anneal: Option<AnnealOutcome>,
    pub lbfgs: Option<OptimOutcome>,
    /// Likelihood evaluations across both phases.
    pub fncount: usize,
    /// Gradient evaluations (L-BFGS only).
    pub grcount: usize,
    /// Every vector was pinned; nothing was optimized.
    pub noest: bool,
    /// Labels of the rows of beta.
    pub names: Vec<String>,
}

/// Estimate a VECM whose cointegrating vectors obey `R·vec(β) = q` (and,
/// optionally, whose loadings obey `R_a·α = 0`).
///
/// ## Steps
/// 1. Check conformity of the restrictions with `system`.
/// 2. Translate the restrictions into `vec(β) = H·φ + s`.
/// 3. Certify identification (rank conditions or the Jacobian probe).
/// 4. Compute `φ₀` from the normalized Johansen solution.
/// 5. Unless every vector is pinned: anneal from `φ₀`, then polish with
///    L-BFGS. The L-BFGS result is kept only if it does not lose likelihood.
/// 6. Rescale homogeneous vectors (largest entry one), then recover `α`,
///    `Ω`, the variance of `β̂` and the LR test under that normalization.
/// 7. With `opts.fold`, write `β`, `α`, `Ω` and `ℓ` into `system`.
///
/// ## Errors
/// - [`VecmError::InvalidRank`] / [`VecmError::DimensionMismatch`] for
///   restrictions that do not fit `system`.
/// - Restriction, identification and projection errors from the core.
/// - Post-estimation failures; no partial result is returned.
pub fn estimate_restricted_cointegration(
    system: &mut VecmSystem, restrictions: &RestrictionSet, opts: &RestrictOptions,
) -> VecmResult<RestrictedOutcome> {
    validate_conformity(system, restrictions)?;
    let n = system.neqs();

    let design = RestrictionDesign::from_set(restrictions)?;
    let alpha_basis = restrictions.alpha.as_ref().map(AlphaBasis::new).transpose()?;
    let alpha_rows = alpha_basis.as_ref().map_or(0, AlphaBasis::restricted_rows);
    let identification =
        check_identification(&design, n, alpha_basis.as_ref(), opts.jacobian_seed)?;
    let data = ProfileData::new(system, alpha_basis.as_ref())?;
    let init = initial_values(system, &design, restrictions)?;

    let model = RestrictedBeta::new(design);
    let loglik_start = model.profile_loglik(init.phi0.view(), &data);
    let noest = model.design.noest();

    let mut phi = init.phi0;
    let mut annealed = None;
    let mut polished = None;
    if !noest {
        let mut ll_best = loglik_start;
        if let Some(anneal_opts) = &opts.anneal {
            let out = anneal(&model, phi.clone(), &data, anneal_opts)?;
            if opts.verbose {
                info!(
                    loglik_start = out.value_start,
                    loglik_best = out.value_best,
                    accepted = out.accepted,
                    improved = out.improved,
                    "simulated annealing finished"
                );
            }
            phi.assign(&out.theta_best);
            ll_best = out.value_best;
            annealed = Some(out);
        }

        let mle_opts = opts.mle_opts.clone().with_verbose(opts.verbose || opts.mle_opts.verbose);
        match maximize(&model, phi.clone(), &data, &mle_opts) {
            Ok(out) => {
                if out.value.is_finite() && out.value >= ll_best {
                    phi.assign(&out.theta_hat);
                } else {
                    debug!(
                        lbfgs = out.value,
                        kept = ll_best,
                        "L-BFGS ended below its start; keeping the annealing point"
                    );
                }
                polished = Some(out);
            }
            Err(err) => {
                warn!(%err, "L-BFGS refinement failed; keeping the annealing point");
            }
        }
    }

    let loglik = model.profile_loglik(phi.view(), &data);
    if !loglik.is_finite() {
        return Err(VecmError::NonFiniteResult { context: "restricted log-likelihood" });
    }
    let (beta, design) = model.design.normalize_homogeneous(model.design.beta(phi.view()).view())?;
    let phi = design.project(beta.view())?;
    let alpha = profile_alpha(beta.view(), &data)?;
    let omega = residual_covariance(system, alpha.view(), beta.view());
    let variance =
        beta_variance(alpha.view(), omega.view(), system.s11.view(), &design, system.nobs)?;

    let df = degrees_of_freedom(&design, alpha_rows, system.prior_df);
    let lr = lr_test(system.loglik, loglik, df)?;
    if lr.statistic < -LR_NEGATIVE_TOL * system.loglik.abs().max(1.0) {
        warn!(
            loglik_unrestricted = system.loglik,
            loglik,
            "restricted log-likelihood exceeds the unrestricted maximum"
        );
    }

    let fncount = annealed.as_ref().map_or(0, |a| a.iterations + 1)
        + polished.as_ref().map_or(0, |o| o.cost_count() as usize);
    let grcount = polished.as_ref().map_or(0, |o| o.gradient_count() as usize);

    if opts.verbose {
        info!(
            loglik_unrestricted = system.loglik,
            loglik,
            lr = lr.statistic,
            df,
            fncount,
            grcount,
            noest,
            "restricted cointegration estimated"
        );
    }

    let outcome = RestrictedOutcome {
        beta,
        alpha,
        omega,
        beta_var: variance.vec_cov,
        beta_se: variance.se,
        phi,
        loglik,
        loglik_start,
        loglik_unrestricted: system.loglik,
        lr,
        identification,
        normalized: init.normalized,
        anneal: annealed,
        lbfgs: polished,
        fncount,
        grcount,
        noest,
        names: system.names.clone(),
    };

    if opts.fold {
        fold_into(system, &outcome);
    }
    Ok(outcome)
}

/// Replace the system's estimates with the restricted ones.
///
/// The degrees of freedom of this restriction are added to `prior_df` so a
/// further restriction is tested against the folded model.
fn fold_into(system: &mut VecmSystem, outcome: &RestrictedOutcome) {
    system.beta = Some(outcome.beta.clone());
    system.alpha = Some(outcome.alpha.clone());
    system.omega = Some(outcome.omega.clone());
    system.loglik = outcome.loglik;
    system.prior_df = (system.prior_df as i64 + outcome.lr.df).max(0) as usize;
}

fn validate_conformity(system: &VecmSystem, restrictions: &RestrictionSet) -> VecmResult<()> {
    if restrictions.rank != system.rank {
        return Err(VecmError::InvalidRank {
            rank: restrictions.rank,
            reason: "Restrictions were built for a different cointegrating rank.",
        });
    }
    let cols = system.nvars() * system.rank;
    if restrictions.r.ncols() != cols {
        return Err(VecmError::DimensionMismatch {
            what: "R",
            expected: (restrictions.r.nrows(), cols),
            found: restrictions.r.dim(),
        });
    }
    if let Some(alpha) = &restrictions.alpha {
        if alpha.r_a.ncols() != system.neqs() {
            return Err(VecmError::DimensionMismatch {
                what: "R_alpha",
                expected: (alpha.r_a.nrows(), system.neqs()),
                found: alpha.r_a.dim(),
            });
        }
    }
    Ok(())
}
