//! Likelihood-ratio test of the restrictions.
//!
//! Purpose
//! -------
//! Count the over-identifying restrictions and compare
//! `LR = 2·(ℓ_unrestricted − ℓ_restricted)` with a `χ²(df)` reference.
//!
//! Key behaviors
//! -------------
//! - Each vector contributes `p − r − kᵢ` degrees of freedom (restrictions
//!   beyond the `r` needed for just-identification), each homogeneous alpha
//!   restriction row contributes `r`, and restrictions already imposed on the
//!   system are subtracted.
//! - A negative count is logged at `warn` level and kept; no p-value is
//!   reported unless `df > 0`.
use statrs::distribution::{ChiSquared, ContinuousCDF};
use tracing::warn;

use crate::{
    inference::errors::{InferenceError, InferenceResult},
    vecm::core::restrictions::RestrictionDesign,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LrTest {
    pub statistic: f64,
    pub df: i64,
    /// `P(χ²(df) > LR)`; `None` when `df ≤ 0`.
    pub p_value: Option<f64>,
}

/// Degrees of freedom of the LR test for `design`.
///
/// `alpha_rows` is the number of homogeneous loading restrictions and
/// `prior_df` the degrees of freedom consumed by restrictions imposed before
/// this call.
pub fn degrees_of_freedom(design: &RestrictionDesign, alpha_rows: usize, prior_df: usize) -> i64 {
    let (p, r) = (design.p as i64, design.r as i64);
    let beta_df: i64 = design.blocks.iter().map(|b| p - r - b.free() as i64).sum();
    let df = beta_df + (alpha_rows as i64) * r - prior_df as i64;
    if df < 0 {
        warn!(df, beta_df, alpha_rows, prior_df, "negative degrees of freedom for the LR test");
    }
    df
}

/// `LR = 2·(ll_unrestricted − ll_restricted)` with its `χ²(df)` p-value.
///
/// # Errors
/// - [`InferenceError::NonFinite`] if either log-likelihood is not finite.
/// - [`InferenceError::InvalidDistribution`] if the reference distribution
///   cannot be built.
pub fn lr_test(ll_unrestricted: f64, ll_restricted: f64, df: i64) -> InferenceResult<LrTest> {
    let statistic = 2.0 * (ll_unrestricted - ll_restricted);
    if !statistic.is_finite() {
        return Err(InferenceError::NonFinite { context: "LR statistic" });
    }
    let p_value = if df > 0 {
        let chi2 = ChiSquared::new(df as f64)
            .map_err(|e| InferenceError::InvalidDistribution { df, reason: e.to_string() })?;
        Some(chi2.sf(statistic.max(0.0)))
    } else {
        None
    };
    Ok(LrTest { statistic, df, p_value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vecm::core::restrictions::RestrictionSet;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Degree-of-freedom counting for just- and over-identified systems.
    // - The chi-square p-value against a known quantile.
    // - No p-value for non-positive df.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // A normalization alone is just-identifying; pinning the vector adds one
    // testable restriction, and alpha rows add r each.
    fn df_counts_overidentifying_restrictions() {
        let just = RestrictionDesign::from_set(
            &RestrictionSet::new(array![[1.0, 0.0]], array![1.0], 1).expect("set"),
        )
        .expect("h");
        let pinned = RestrictionDesign::from_set(
            &RestrictionSet::new(array![[1.0, 0.0], [0.0, 1.0]], array![1.0, -1.0], 1)
                .expect("set"),
        )
        .expect("h");

        assert_eq!(degrees_of_freedom(&just, 0, 0), 0);
        assert_eq!(degrees_of_freedom(&pinned, 0, 0), 1);
        assert_eq!(degrees_of_freedom(&pinned, 1, 0), 2);
        assert_eq!(degrees_of_freedom(&just, 0, 1), -1);
    }

    #[test]
    // Purpose
    // -------
    // The p-value is the χ² survival function at the statistic.
    //
    // Given
    // -----
    // - LR = 3.841458820694124 (the 95% quantile of χ²(1)).
    //
    // Expect
    // ------
    // - p ≈ 0.05.
    fn p_value_matches_chi_square_quantile() {
        let stat = 3.841_458_820_694_124;

        let test = lr_test(0.5 * stat, 0.0, 1).expect("test");

        assert_relative_eq!(test.statistic, stat, epsilon = 1e-12);
        assert_relative_eq!(test.p_value.expect("df > 0"), 0.05, epsilon = 1e-8);
    }

    #[test]
    fn no_p_value_without_degrees_of_freedom() {
        let test = lr_test(-10.0, -10.0, 0).expect("test");

        assert_eq!(test.statistic, 0.0);
        assert_eq!(test.p_value, None);
    }

    #[test]
    fn non_finite_likelihood_is_rejected() {
        let res = lr_test(f64::NAN, -1.0, 1);

        assert!(matches!(res, Err(InferenceError::NonFinite { .. })));
    }
}
