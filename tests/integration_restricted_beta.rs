//! Integration tests for restricted cointegration estimation.
//!
//! Purpose
//! -------
//! - Validate the end-to-end pipeline: from validated moment matrices,
//!   through restriction translation, identification and optimization, to
//!   loadings, residual covariance, standard errors and the LR test.
//! - Exercise the outer behaviors a caller relies on: fully pinned systems,
//!   loading restrictions, common restrictions, folding and the report.
//!
//! Coverage
//! --------
//! - `vecm::core`:
//!   - `VecmSystem` construction and the derived Johansen log-likelihood.
//!   - `RestrictionSet::new` / `RestrictionSet::common` / `with_alpha`.
//! - `vecm::models::restricted::estimate_restricted_cointegration`:
//!   - Exactly identified, over-identified and pinned restrictions, with
//!     one and two cointegrating vectors.
//!   - Homogeneous restrictions normalized after estimation.
//!   - Identification failures aborting before optimization.
//!   - Folding the restricted estimates back into the system.
//! - `inference`:
//!   - Degrees of freedom and the χ² p-value of the LR test.
//!
//! Exclusions
//! ----------
//! - Low-level linear algebra, annealing and L-BFGS plumbing; those are
//!   covered by unit tests.
//! - Python bindings.
use std::f64::consts::PI;

use approx::assert_relative_eq;
use ndarray::{Array2, array};
use rust_coint::{
    linalg::log_det_pd,
    optimization::annealing::AnnealOptions,
    vecm::{
        AlphaRestriction, IdentificationMethod, RestrictOptions, RestrictionSet, VecmError,
        VecmSystem, estimate_restricted_cointegration,
    },
};

/// Two-variable system with `T = 100` and rank 1.
fn system2() -> VecmSystem {
    VecmSystem::new(
        array![[1.0, 0.2], [0.2, 1.0]],
        array![[0.5, 0.1], [0.1, 0.4]],
        array![[1.0, 0.3], [0.3, 1.0]],
        100,
        1,
    )
    .expect("valid two-variable system")
}

/// Three-variable system with `T = 120`.
fn system3(rank: usize) -> VecmSystem {
    VecmSystem::new(
        array![[1.0, 0.2, 0.1], [0.2, 1.0, 0.3], [0.1, 0.3, 1.2]],
        array![[0.4, 0.1, 0.0], [0.1, 0.3, 0.1], [0.0, 0.2, 0.5]],
        array![[1.0, 0.3, 0.2], [0.3, 1.1, 0.1], [0.2, 0.1, 0.9]],
        120,
        rank,
    )
    .expect("valid three-variable system")
}

/// Short annealing run so the tests stay fast while still using both phases.
fn quick_options() -> RestrictOptions {
    let mut opts = RestrictOptions::default();
    let defaults = AnnealOptions::default();
    opts.anneal = Some(
        AnnealOptions::new(
            500,
            defaults.initial_temp,
            defaults.initial_radius,
            defaults.temp_decay,
            defaults.radius_decay,
            11,
        )
        .expect("valid annealing options"),
    );
    opts
}

/// Gaussian log-likelihood implied by a residual covariance.
fn loglik_from_omega(sys: &VecmSystem, omega: &Array2<f64>) -> f64 {
    let n = sys.neqs() as f64;
    -0.5 * sys.nobs as f64 * (n * (1.0 + (2.0 * PI).ln()) + log_det_pd(omega.view()).expect("pd"))
}

#[test]
// Purpose
// -------
// A normalization-only restriction is exactly identifying, so the restricted
// maximum coincides with the Johansen maximum.
//
// Given
// -----
// - n = p = 2, r = 1, T = 100, R = [1 0], q = [1].
//
// Expect
// ------
// - β₀ = 1 exactly, df = 0 with no p-value, LR ≈ 0.
// - The reported log-likelihood equals the one implied by Ω̂.
// - The optimizer never ends below its starting value.
fn normalization_reproduces_johansen_maximum() {
    // Arrange
    let mut sys = system2();
    let ll_johansen = sys.loglik;
    let set = RestrictionSet::new(array![[1.0, 0.0]], array![1.0], 1).expect("set");

    // Act
    let out = estimate_restricted_cointegration(&mut sys, &set, &quick_options())
        .expect("estimation should succeed");

    // Assert
    assert_relative_eq!(out.beta[[0, 0]], 1.0, epsilon = 1e-12);
    assert_eq!(out.lr.df, 0);
    assert!(out.lr.p_value.is_none());
    assert!(out.loglik >= out.loglik_start - 1e-9);
    assert_relative_eq!(out.loglik, ll_johansen, max_relative = 1e-6);
    assert_relative_eq!(out.loglik, loglik_from_omega(&sys, &out.omega), max_relative = 1e-9);
    assert!(out.lr.statistic >= -1e-6 * ll_johansen.abs());
    assert!(matches!(out.identification, IdentificationMethod::JacobianProbe { .. }));
    assert!(!out.noest);
    assert!(out.fncount > 0);
    assert_eq!(out.beta_se[[0, 0]], 0.0);
    assert!(out.beta_se[[1, 0]] > 0.0);
}

#[test]
// Purpose
// -------
// Fully pinned vectors skip optimization and carry zero standard errors.
//
// Given
// -----
// - R = I₂, q = (1, −0.5): β is known.
//
// Expect
// ------
// - β = (1, −0.5), noest, no optimizer outcomes, zero counters and SEs.
// - df = p − r = 1 with a p-value.
fn pinned_restrictions_skip_optimization() {
    // Arrange
    let mut sys = system2();
    let set = RestrictionSet::new(array![[1.0, 0.0], [0.0, 1.0]], array![1.0, -0.5], 1)
        .expect("set");

    // Act
    let out = estimate_restricted_cointegration(&mut sys, &set, &RestrictOptions::default())
        .expect("estimation should succeed");

    // Assert
    assert!(out.noest);
    assert_relative_eq!(out.beta[[0, 0]], 1.0, epsilon = 1e-12);
    assert_relative_eq!(out.beta[[1, 0]], -0.5, epsilon = 1e-12);
    assert!(out.anneal.is_none());
    assert!(out.lbfgs.is_none());
    assert_eq!((out.fncount, out.grcount), (0, 0));
    assert!(out.beta_se.iter().all(|&v| v == 0.0));
    assert_eq!(out.phi.len(), 0);
    assert_eq!(out.lr.df, 1);
    assert!(out.lr.p_value.is_some());
    assert_relative_eq!(out.loglik, out.loglik_start, epsilon = 1e-12);
}

#[test]
// Purpose
// -------
// Over-identifying beta restrictions cost likelihood and are tested with
// positive degrees of freedom.
//
// Given
// -----
// - Three variables, r = 1, β = (1, φ, 0).
//
// Expect
// ------
// - β₂ = 0, df = 1, 0 ≤ p ≤ 1, lr ≤ lu up to tolerance.
fn over_identifying_zero_restriction_is_tested() {
    // Arrange
    let mut sys = system3(1);
    let set = RestrictionSet::new(
        array![[1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
        array![1.0, 0.0],
        1,
    )
    .expect("set");

    // Act
    let out = estimate_restricted_cointegration(&mut sys, &set, &quick_options())
        .expect("estimation should succeed");

    // Assert
    assert_relative_eq!(out.beta[[2, 0]], 0.0, epsilon = 1e-12);
    assert_eq!(out.lr.df, 1);
    let p = out.lr.p_value.expect("df > 0 yields a p-value");
    assert!((0.0..=1.0).contains(&p));
    assert!(out.loglik <= out.loglik_unrestricted + 1e-6);
    assert!(out.loglik >= out.loglik_start - 1e-9);
    assert_relative_eq!(out.loglik, loglik_from_omega(&sys, &out.omega), max_relative = 1e-9);
}

#[test]
// Purpose
// -------
// With two cointegrating vectors, the textbook just-identifying scheme
// reaches the Johansen maximum, and the cross-vector blocks of the
// information matrix yield finite standard errors.
//
// Given
// -----
// - Three variables, r = 2, β₀ = (1, 0, *), β₁ = (0, 1, *).
//
// Expect
// ------
// - Restricted entries hold exactly and carry zero SEs.
// - df = 0, no p-value, ℓ equal to the Johansen maximum.
// - Positive, finite SEs on β₀₂ and β₁₂.
fn two_vector_just_identified_reproduces_johansen_maximum() {
    // Arrange
    let mut sys = system3(2);
    let ll_johansen = sys.loglik;
    let set = RestrictionSet::new(
        array![
            [1.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        ],
        array![1.0, 0.0, 0.0, 1.0],
        2,
    )
    .expect("set");

    // Act
    let out = estimate_restricted_cointegration(&mut sys, &set, &quick_options())
        .expect("estimation should succeed");

    // Assert
    assert_eq!(out.identification, IdentificationMethod::RankConditions);
    assert_relative_eq!(out.beta[[0, 0]], 1.0, epsilon = 1e-12);
    assert_relative_eq!(out.beta[[1, 0]], 0.0, epsilon = 1e-12);
    assert_relative_eq!(out.beta[[0, 1]], 0.0, epsilon = 1e-12);
    assert_relative_eq!(out.beta[[1, 1]], 1.0, epsilon = 1e-12);
    assert_eq!(out.lr.df, 0);
    assert!(out.lr.p_value.is_none());
    assert_relative_eq!(out.loglik, ll_johansen, max_relative = 1e-6);
    assert_relative_eq!(out.loglik, loglik_from_omega(&sys, &out.omega), max_relative = 1e-9);
    for (row, col) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
        assert!(out.beta_se[[row, col]].abs() < 1e-8);
    }
    for col in 0..2 {
        let se = out.beta_se[[2, col]];
        assert!(se.is_finite() && se > 0.0);
    }
}

#[test]
// Purpose
// -------
// Pinning one of two vectors over-identifies the system by one restriction.
//
// Given
// -----
// - Three variables, r = 2, β₀ = (1, 0, 0), β₁ = (0, 1, *).
//
// Expect
// ------
// - β₀ pinned, df = 1 with a p-value, lr ≤ lu, ℓ consistent with Ω̂.
fn two_vector_over_identified_is_tested() {
    // Arrange
    let mut sys = system3(2);
    let set = RestrictionSet::new(
        array![
            [1.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        ],
        array![1.0, 0.0, 0.0, 0.0, 1.0],
        2,
    )
    .expect("set");

    // Act
    let out = estimate_restricted_cointegration(&mut sys, &set, &quick_options())
        .expect("estimation should succeed");

    // Assert
    assert_relative_eq!(out.beta[[0, 0]], 1.0, epsilon = 1e-12);
    assert_relative_eq!(out.beta[[1, 0]], 0.0, epsilon = 1e-12);
    assert_relative_eq!(out.beta[[2, 0]], 0.0, epsilon = 1e-12);
    assert_eq!(out.lr.df, 1);
    let p = out.lr.p_value.expect("df > 0 yields a p-value");
    assert!((0.0..=1.0).contains(&p));
    assert!(out.loglik <= out.loglik_unrestricted + 1e-6);
    assert!(out.loglik >= out.loglik_start - 1e-9);
    assert_relative_eq!(out.loglik, loglik_from_omega(&sys, &out.omega), max_relative = 1e-9);
    assert!(out.beta_se[[2, 1]] > 0.0);
}

#[test]
// Purpose
// -------
// A purely homogeneous restriction leaves the vector's scale free; the
// estimate is normalized afterwards and matches the explicitly normalized
// equivalent.
//
// Given
// -----
// - Three variables, r = 1, R = [1 −1 0], q = 0.
// - The same restriction plus β₀ = 1, estimated separately.
//
// Expect
// ------
// - β₀ = β₁, largest |entry| equal to one, zero SE at that entry.
// - df = 1 with a p-value, and the same ℓ as the normalized version.
fn homogeneous_restriction_is_normalized_after_estimation() {
    // Arrange
    let mut sys = system3(1);
    let mut sys_normalized = system3(1);
    let homogeneous = RestrictionSet::new(array![[1.0, -1.0, 0.0]], array![0.0], 1).expect("set");
    let normalized =
        RestrictionSet::new(array![[1.0, -1.0, 0.0], [1.0, 0.0, 0.0]], array![0.0, 1.0], 1)
            .expect("set");

    // Act
    let out = estimate_restricted_cointegration(&mut sys, &homogeneous, &quick_options())
        .expect("estimation should succeed");
    let reference =
        estimate_restricted_cointegration(&mut sys_normalized, &normalized, &quick_options())
            .expect("estimation should succeed");

    // Assert
    let beta = out.beta.column(0);
    assert_relative_eq!(beta[0], beta[1], epsilon = 1e-10);
    let pivot = (0..3).fold(0, |k, j| if beta[j].abs() > beta[k].abs() { j } else { k });
    assert_eq!(beta[pivot], 1.0);
    assert!(beta.iter().all(|v| v.abs() <= 1.0));
    assert!(out.beta_se[[pivot, 0]] < 1e-8);
    assert_eq!(out.lr.df, 1);
    assert!(out.lr.p_value.is_some());
    assert!(out.loglik <= out.loglik_unrestricted + 1e-6);
    assert_relative_eq!(out.loglik, loglik_from_omega(&sys, &out.omega), max_relative = 1e-9);
    assert_relative_eq!(out.loglik, reference.loglik, max_relative = 1e-6);
}

#[test]
// Purpose
// -------
// Loading restrictions zero the restricted rows of alpha and add their
// count (times r) to the degrees of freedom.
//
// Given
// -----
// - Three variables, r = 1, β normalized, R_a = [0 0 1].
//
// Expect
// ------
// - α₂ = 0, df = 1, ℓ consistent with Ω̂.
fn alpha_restriction_zeroes_loadings() {
    // Arrange
    let mut sys = system3(1);
    let set = RestrictionSet::new(array![[1.0, 0.0, 0.0]], array![1.0], 1)
        .expect("set")
        .with_alpha(AlphaRestriction::new(array![[0.0, 0.0, 1.0]]).expect("alpha"));

    // Act
    let out = estimate_restricted_cointegration(&mut sys, &set, &quick_options())
        .expect("estimation should succeed");

    // Assert
    assert_relative_eq!(out.alpha[[2, 0]], 0.0, epsilon = 1e-10);
    assert_eq!(out.lr.df, 1);
    assert!(out.lr.p_value.is_some());
    assert!(out.loglik <= out.loglik_unrestricted + 1e-6);
    assert_relative_eq!(out.loglik, loglik_from_omega(&sys, &out.omega), max_relative = 1e-9);
}

#[test]
// Purpose
// -------
// A common restriction is applied to the cointegrating vector exactly as
// written.
//
// Given
// -----
// - R_c = [[1 0 0], [0 1 1]], q_c = (1, 0) on a rank-1 system.
//
// Expect
// ------
// - β₀ = 1 and β₁ = −β₂.
fn common_restriction_applies_to_each_vector() {
    // Arrange
    let mut sys = system3(1);
    let set =
        RestrictionSet::common(array![[1.0, 0.0, 0.0], [0.0, 1.0, 1.0]], array![1.0, 0.0], 1)
            .expect("set");

    // Act
    let out = estimate_restricted_cointegration(&mut sys, &set, &quick_options())
        .expect("estimation should succeed");

    // Assert
    assert_relative_eq!(out.beta[[0, 0]], 1.0, epsilon = 1e-12);
    assert_relative_eq!(out.beta[[1, 0]], -out.beta[[2, 0]], epsilon = 1e-10);
    assert_eq!(out.identification, IdentificationMethod::RankConditions);
}

#[test]
// Purpose
// -------
// Restrictions that leave two vectors in the same plane abort before any
// estimate is produced, and leave the system untouched.
fn unidentified_restrictions_abort() {
    // Arrange
    let mut sys = system3(2);
    let before = sys.clone();
    let set = RestrictionSet::new(
        array![
            [1.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        ],
        array![1.0, 0.0, 2.0, 0.0],
        2,
    )
    .expect("set");

    // Act
    let res = estimate_restricted_cointegration(&mut sys, &set, &quick_options().folding());

    // Assert
    assert!(matches!(res, Err(VecmError::NotIdentified { .. })));
    assert_eq!(sys, before);
}

#[test]
// Purpose
// -------
// Folding writes the restricted estimates into the system and accumulates
// degrees of freedom, so a repeated restriction tests as a no-op.
//
// Given
// -----
// - β = (1, φ, 0) estimated with fold enabled, then re-estimated.
//
// Expect
// ------
// - The system carries β, α, Ω, the restricted ℓ and prior_df = 1.
// - The second call has df = 0 and LR ≈ 0.
fn fold_updates_system_and_prior_df() {
    // Arrange
    let mut sys = system3(1);
    let set = RestrictionSet::new(
        array![[1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
        array![1.0, 0.0],
        1,
    )
    .expect("set");
    let opts = quick_options().folding();

    // Act
    let first = estimate_restricted_cointegration(&mut sys, &set, &opts).expect("first");
    let folded = sys.clone();
    let second = estimate_restricted_cointegration(&mut sys, &set, &opts).expect("second");

    // Assert
    assert_eq!(folded.beta.as_ref(), Some(&first.beta));
    assert_eq!(folded.alpha.as_ref(), Some(&first.alpha));
    assert_eq!(folded.omega.as_ref(), Some(&first.omega));
    assert_eq!(folded.loglik, first.loglik);
    assert_eq!(folded.prior_df, 1);
    assert_eq!(second.lr.df, 0);
    assert_relative_eq!(second.lr.statistic, 0.0, epsilon = 1e-6);
}

#[test]
// Purpose
// -------
// The text report names the variables and carries the test summary.
fn report_lists_names_and_test() {
    // Arrange
    let mut sys = system3(1)
        .with_names(vec!["m2".to_string(), "y".to_string(), "r".to_string()])
        .expect("names");
    let set = RestrictionSet::new(
        array![[1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
        array![1.0, 0.0],
        1,
    )
    .expect("set");

    // Act
    let out = estimate_restricted_cointegration(&mut sys, &set, &quick_options())
        .expect("estimation should succeed");
    let text = out.to_string();

    // Assert
    assert!(text.contains("Restricted cointegration, rank 1"));
    assert!(text.contains("P(Chi-square(1) >"));
    assert!(text.lines().any(|l| l.starts_with("m2")));
    assert!(text.lines().any(|l| l.starts_with("y ")));
    assert!(text.contains("Function evaluations"));
}
